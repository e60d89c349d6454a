//! Outbound commands a table publishes for the transport layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{
    entities::{Bet, BetKind, Card, Chips, PlayerId, RoundType, SidePot},
    player::PlayerView,
};

/// Which pot a payout came from. Serialized as `main` or `sidepotN`
/// (1-based, oldest side pot first).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(into = "String", try_from = "String")]
pub enum PotKind {
    Main,
    SidePot(usize),
}

impl fmt::Display for PotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::SidePot(n) => write!(f, "sidepot{n}"),
        }
    }
}

impl From<PotKind> for String {
    fn from(value: PotKind) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for PotKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "main" {
            return Ok(Self::Main);
        }
        value
            .strip_prefix("sidepot")
            .and_then(|n| n.parse().ok())
            .map(Self::SidePot)
            .ok_or_else(|| format!("unknown pot type {value:?}"))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Winner {
    pub player_id: PlayerId,
    pub name: String,
    pub amount: Chips,
    pub pot: PotKind,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} won ${} from the {} pot", self.name, self.amount, self.pot)
    }
}

/// State-change events, published in the order they happened.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    /// Roster snapshot without hole cards
    PlayerUpdate(Vec<PlayerView>),
    PlayerBet {
        player_id: PlayerId,
        bet: Bet,
        max_bet: Chips,
        kind: BetKind,
    },
    /// Private: only `player_id` may see these
    HoleCards {
        player_id: PlayerId,
        cards: Vec<Card>,
    },
    /// Roster with every live hand revealed
    PlayersCards(Vec<PlayerView>),
    PotUpdate {
        pot: Chips,
        side_pots: Vec<SidePot>,
    },
    BoardUpdated(Vec<Card>),
    CurrentPlayer {
        player_id: PlayerId,
    },
    Dealer {
        player_id: PlayerId,
    },
    GameStarted {
        hand: u64,
    },
    NewRound {
        hand: u64,
        round: RoundType,
    },
    GameEnded {
        hand: u64,
    },
    GameWinners(Vec<Winner>),
    /// The table stopped dealing; `winner` is the last player standing
    TableClosed {
        winner: Option<PlayerId>,
    },
}

impl Command {
    /// The only player allowed to receive this command, if it is private.
    #[must_use]
    pub fn recipient(&self) -> Option<PlayerId> {
        match self {
            Self::HoleCards { player_id, .. } => Some(*player_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pot_kind_display() {
        assert_eq!(PotKind::Main.to_string(), "main");
        assert_eq!(PotKind::SidePot(2).to_string(), "sidepot2");
    }

    #[test]
    fn test_pot_kind_wire_format() {
        let json = serde_json::to_string(&PotKind::SidePot(1)).unwrap();
        assert_eq!(json, "\"sidepot1\"");
        let back: PotKind = serde_json::from_str("\"main\"").unwrap();
        assert_eq!(back, PotKind::Main);
        assert!(serde_json::from_str::<PotKind>("\"jackpot\"").is_err());
    }

    #[test]
    fn test_command_is_tagged() {
        let command = Command::GameStarted { hand: 3 };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["type"], "GameStarted");
        assert_eq!(value["payload"]["hand"], 3);
    }

    #[test]
    fn test_hole_cards_are_private() {
        let id = PlayerId::new();
        let private = Command::HoleCards {
            player_id: id,
            cards: vec![],
        };
        assert_eq!(private.recipient(), Some(id));
        assert_eq!(Command::GameEnded { hand: 1 }.recipient(), None);
    }
}
