//! Hand-strength comparison.
//!
//! The table only needs a total order over hands: it hands each player's
//! hole cards plus the board to a [`HandEvaluator`] and compares the
//! resulting [`HandStrength`] values. Higher is better; ties are equality.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{ACE, Card, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
        };
        write!(f, "{repr}")
    }
}

/// Category first, then the tie-breaking values in significance order.
/// Unused trailing values are zero.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandStrength {
    pub category: HandCategory,
    pub values: [Value; 5],
}

impl HandStrength {
    #[must_use]
    pub fn new(category: HandCategory, values: [Value; 5]) -> Self {
        Self { category, values }
    }
}

/// Ranks the best hand out of 5 to 7 cards.
pub trait HandEvaluator: Send {
    fn evaluate(&self, cards: &[Card]) -> HandStrength;
}

impl<F> HandEvaluator for F
where
    F: Fn(&[Card]) -> HandStrength + Send,
{
    fn evaluate(&self, cards: &[Card]) -> HandStrength {
        self(cards)
    }
}

/// Exhaustive best-five-of-n evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    fn evaluate(&self, cards: &[Card]) -> HandStrength {
        let n = cards.len();
        if n <= 5 {
            return rank_hand(cards);
        }

        let mut best: Option<HandStrength> = None;
        for a in 0..n - 4 {
            for b in a + 1..n - 3 {
                for c in b + 1..n - 2 {
                    for d in c + 1..n - 1 {
                        for e in d + 1..n {
                            let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                            let strength = rank_hand(&five);
                            if best.is_none_or(|best| strength > best) {
                                best = Some(strength);
                            }
                        }
                    }
                }
            }
        }
        best.unwrap_or_else(|| rank_hand(cards))
    }
}

/// High card of a five-card straight, treating a wheel (A-2-3-4-5) as
/// five-high. `values` must be sorted descending.
fn straight_high(values: &[Value]) -> Option<Value> {
    if values.len() != 5 || values.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }
    if values[0] - values[4] == 4 {
        Some(values[0])
    } else if values == [ACE, 5, 4, 3, 2] {
        Some(5)
    } else {
        None
    }
}

/// Rank up to five cards.
fn rank_hand(cards: &[Card]) -> HandStrength {
    let mut values: Vec<Value> = cards.iter().map(|card| card.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.len() == 5 && cards.iter().all(|card| card.1 == cards[0].1);
    let straight = straight_high(&values);

    // (count, value), largest groups first, then higher values.
    let mut groups: Vec<(usize, Value)> = Vec::with_capacity(5);
    for &value in &values {
        match groups.iter_mut().find(|(_, v)| *v == value) {
            Some(group) => group.0 += 1,
            None => groups.push((1, value)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let largest = groups.first().map_or(0, |g| g.0);
    let second = groups.get(1).map_or(0, |g| g.0);
    let category = match (largest, second) {
        _ if is_flush && straight.is_some() => HandCategory::StraightFlush,
        (4, _) => HandCategory::FourOfAKind,
        (3, 2) => HandCategory::FullHouse,
        _ if is_flush => HandCategory::Flush,
        _ if straight.is_some() => HandCategory::Straight,
        (3, _) => HandCategory::ThreeOfAKind,
        (2, 2) => HandCategory::TwoPair,
        (2, _) => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };

    let mut ordered = [0; 5];
    match straight {
        Some(high) if category >= HandCategory::Straight && category != HandCategory::Flush => {
            for (i, slot) in ordered.iter_mut().enumerate() {
                // A wheel's ace plays low.
                *slot = high.saturating_sub(i as Value).max(1);
            }
        }
        _ => {
            let significant = groups
                .iter()
                .flat_map(|&(count, value)| std::iter::repeat_n(value, count));
            for (slot, value) in ordered.iter_mut().zip(significant) {
                *slot = value;
            }
        }
    }

    HandStrength::new(category, ordered)
}
