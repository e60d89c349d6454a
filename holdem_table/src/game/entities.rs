use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

pub const MIN_VALUE: Value = 2;
pub const ACE: Value = 14;

/// A card is a tuple of a value (two=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// A single 52-card deck. Cards are drawn and burned from the tail.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// An ordered deck; call [`Deck::shuffle`] before dealing from it.
    #[must_use]
    pub fn new() -> Self {
        let cards = (MIN_VALUE..=ACE)
            .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
            .collect();
        Self { cards }
    }

    /// A fresh deck shuffled with the given RNG.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::new();
        deck.shuffle(rng);
        deck
    }

    /// Fisher-Yates over whatever cards remain.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deal the top card.
    ///
    /// # Panics
    ///
    /// Panics when the deck is exhausted. Seat limits guarantee a single
    /// deck covers a full hand, so this is a programming error.
    pub fn draw(&mut self) -> Card {
        self.cards
            .pop()
            .expect("deck exhausted: seat limits guarantee one deck covers a hand")
    }

    /// Discard the top card without dealing it.
    pub fn burn(&mut self) {
        let _ = self.draw();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Card>> for Deck {
    /// A stacked deck; the last card of the vector is dealt first.
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

/// Type alias for whole chips. Stacks, bets, and pots are all counted
/// in whole chips.
pub type Chips = u32;

/// Type alias for seat positions during the game. Seat order is turn order.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = format!("${}/{}", self.small, self.big);
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BetKind {
    SmallBlind,
    BigBlind,
    Bet,
    Call,
    Check,
    AllIn,
}

impl BetKind {
    #[must_use]
    pub fn is_blind(self) -> bool {
        matches!(self, Self::SmallBlind | Self::BigBlind)
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::SmallBlind => "small blind",
            Self::BigBlind => "big blind",
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Check => "check",
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

/// A seat's total wager for the current round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Bet {
    pub kind: BetKind,
    pub amount: Chips,
}

impl Bet {
    #[must_use]
    pub fn new(kind: BetKind, amount: Chips) -> Self {
        Self { kind, amount }
    }

    /// The bet after paying `delta` more chips. Returns `None` on overflow.
    #[must_use]
    pub fn raised(previous: Option<Bet>, delta: Chips, kind: BetKind) -> Option<Self> {
        let paid = previous.map_or(0, |bet| bet.amount);
        paid.checked_add(delta).map(|amount| Self { kind, amount })
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let amount = self.amount;
        match self.kind {
            BetKind::Check => write!(f, "check"),
            kind => write!(f, "{kind} of ${amount}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RoundType {
    Deal,
    Flop,
    Turn,
    River,
}

impl RoundType {
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Deal => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => None,
        }
    }

    /// Number of community cards dealt when the round opens.
    #[must_use]
    pub fn board_cards(self) -> usize {
        match self {
            Self::Deal => 0,
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Deal => "deal",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

/// One street of betting and its per-seat wager ledger.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Round {
    pub kind: RoundType,
    pub bets: BTreeMap<SeatIndex, Bet>,
}

impl Round {
    #[must_use]
    pub fn new(kind: RoundType) -> Self {
        Self {
            kind,
            bets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn max_bet(&self) -> Chips {
        self.bets.values().map(|bet| bet.amount).max().unwrap_or(0)
    }

    #[must_use]
    pub fn bet_by_seat(&self, seat: SeatIndex) -> Chips {
        self.bets.get(&seat).map_or(0, |bet| bet.amount)
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.bets.values().map(|bet| bet.amount).sum()
    }
}

/// A pot isolated for the players who could match its wager tier. The
/// player set is fixed when the pot is created.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SidePot {
    amount: Chips,
    players: Vec<PlayerId>,
}

impl SidePot {
    #[must_use]
    pub fn new(amount: Chips, players: Vec<PlayerId>) -> Self {
        Self { amount, players }
    }

    #[must_use]
    pub fn amount(&self) -> Chips {
        self.amount
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[must_use]
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains(id)
    }
}
