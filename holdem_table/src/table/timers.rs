//! Delayed table transitions.
//!
//! The table never sleeps. When a hand finishes it asks for events to be
//! fired later; the actor keeps them in a [`TimerRegistry`] tied to its own
//! lifetime, so tearing a table down drops every pending transition.

use std::{collections::BTreeMap, time::Duration};
use tokio::time::Instant;

/// Transitions a table asks to have fired later. Each carries the hand it
/// was scheduled for so a stale event can be ignored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimerEvent {
    /// Reveal-to-payout: settle the pots of `hand`
    EndGame { hand: u64 },
    /// Payout-to-next-hand: deal the hand after `hand`
    NewGame { hand: u64 },
}

/// "Fire `event` after `delay`", relative to when the request was drained.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScheduledEvent {
    pub delay: Duration,
    pub event: TimerEvent,
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    /// Breaks ties between events sharing a deadline
    next_seq: u64,
    pending: BTreeMap<(Instant, u64), TimerEvent>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, event: TimerEvent) {
        self.schedule_at(Instant::now() + delay, event);
    }

    pub fn schedule_at(&mut self, deadline: Instant, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((deadline, seq), event);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Remove and return every event due at `now`, earliest first. Events
    /// sharing a deadline come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_respects_deadlines() {
        let mut timers = TimerRegistry::new();
        let now = Instant::now();
        timers.schedule_at(now + Duration::from_secs(5), TimerEvent::NewGame { hand: 1 });
        timers.schedule_at(now + Duration::from_secs(2), TimerEvent::EndGame { hand: 1 });

        assert_eq!(timers.next_deadline(), Some(now + Duration::from_secs(2)));
        assert!(timers.pop_due(now).is_empty());
        assert_eq!(
            timers.pop_due(now + Duration::from_secs(2)),
            vec![TimerEvent::EndGame { hand: 1 }]
        );
        assert_eq!(
            timers.pop_due(now + Duration::from_secs(10)),
            vec![TimerEvent::NewGame { hand: 1 }]
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn test_same_deadline_fires_in_scheduling_order() {
        let mut timers = TimerRegistry::new();
        let deadline = Instant::now() + Duration::from_secs(1);
        timers.schedule_at(deadline, TimerEvent::EndGame { hand: 4 });
        timers.schedule_at(deadline, TimerEvent::NewGame { hand: 4 });
        assert_eq!(
            timers.pop_due(deadline),
            vec![
                TimerEvent::EndGame { hand: 4 },
                TimerEvent::NewGame { hand: 4 }
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = TimerRegistry::new();
        timers.schedule(Duration::from_secs(1), TimerEvent::EndGame { hand: 1 });
        timers.schedule(Duration::from_secs(2), TimerEvent::NewGame { hand: 1 });
        assert_eq!(timers.len(), 2);

        timers.cancel_all();
        assert!(timers.is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
