use serde::{Deserialize, Serialize};

use super::entities::{Bet, Card, Chips, PlayerId};
use crate::table::errors::TableError;

/// A seat at the table. Players persist across hands; the per-hand fields
/// are cleared by [`Player::reset`].
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub cards: Vec<Card>,
    pub folded: bool,
    pub all_in: bool,
    /// Set once the player's whole stake is capped inside a side pot, so
    /// they are not matched again for a later, larger pot.
    pub has_side_pot: bool,
    pub bet: Option<Bet>,
    pub disconnected: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: &str, chips: Chips) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.to_string(),
            chips,
            cards: Vec::with_capacity(2),
            folded: false,
            all_in: false,
            has_side_pot: false,
            bet: None,
            disconnected: false,
        }
    }

    pub fn reset(&mut self) {
        self.cards.clear();
        self.folded = false;
        self.all_in = false;
        self.has_side_pot = false;
        self.bet = None;
    }

    /// Debit `amount` from the stack. Emptying the stack puts the player
    /// all-in.
    pub fn pay(&mut self, amount: Chips) -> Result<(), TableError> {
        if amount > self.chips {
            return Err(TableError::InsufficientFunds {
                requested: amount,
                available: self.chips,
            });
        }
        self.chips -= amount;
        if self.chips == 0 {
            self.all_in = true;
        }
        Ok(())
    }

    /// Still contesting the hand and able to act.
    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    #[must_use]
    pub fn paid(&self) -> Chips {
        self.bet.map_or(0, |bet| bet.amount)
    }

    #[must_use]
    pub fn view(&self, reveal: bool) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            chips: self.chips,
            bet: self.bet,
            folded: self.folded,
            all_in: self.all_in,
            has_side_pot: self.has_side_pot,
            disconnected: self.disconnected,
            cards: if reveal && !self.folded {
                self.cards.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// What other seats and the transport get to see of a player.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub bet: Option<Bet>,
    pub folded: bool,
    pub all_in: bool,
    pub has_side_pot: bool,
    pub disconnected: bool,
    pub cards: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{BetKind, Suit};

    #[test]
    fn test_player_new() {
        let player = Player::new("alice", 1000);
        assert_eq!(player.chips, 1000);
        assert!(player.cards.is_empty());
        assert!(player.can_act());
        assert_eq!(player.paid(), 0);
    }

    #[test]
    fn test_pay_debits_stack() {
        let mut player = Player::new("alice", 100);
        player.pay(40).unwrap();
        assert_eq!(player.chips, 60);
        assert!(!player.all_in);
    }

    #[test]
    fn test_pay_whole_stack_goes_all_in() {
        let mut player = Player::new("alice", 100);
        player.pay(100).unwrap();
        assert_eq!(player.chips, 0);
        assert!(player.all_in);
        assert!(!player.can_act());
    }

    #[test]
    fn test_pay_more_than_stack_is_rejected() {
        let mut player = Player::new("alice", 100);
        let err = player.pay(101).unwrap_err();
        assert_eq!(
            err,
            TableError::InsufficientFunds {
                requested: 101,
                available: 100
            }
        );
        assert_eq!(player.chips, 100);
    }

    #[test]
    fn test_reset_clears_hand_state() {
        let mut player = Player::new("alice", 100);
        player.cards = vec![Card(14, Suit::Spade), Card(13, Suit::Heart)];
        player.folded = true;
        player.all_in = true;
        player.has_side_pot = true;
        player.bet = Some(Bet::new(BetKind::Call, 20));
        player.disconnected = true;

        player.reset();

        assert!(player.cards.is_empty());
        assert!(!player.folded);
        assert!(!player.all_in);
        assert!(!player.has_side_pot);
        assert!(player.bet.is_none());
        // Connection state outlives the hand.
        assert!(player.disconnected);
    }

    #[test]
    fn test_view_hides_cards_unless_revealed() {
        let mut player = Player::new("alice", 100);
        player.cards = vec![Card(14, Suit::Spade), Card(13, Suit::Heart)];
        assert!(player.view(false).cards.is_empty());
        assert_eq!(player.view(true).cards.len(), 2);

        player.folded = true;
        assert!(player.view(true).cards.is_empty());
    }
}
