// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Last-write-wins-by-start-order slots for overlapping polls
//!
//! Polls are never cancelled when a newer one starts, so responses can land
//! out of order. Each poll takes a ticket before it issues its request and
//! hands it back with the result; results carrying an older ticket than the
//! one already applied are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

/// Start-order position of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollTicket(u64);

impl PollTicket {
    /// Position in start order, starting at 1
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Latest value of one polled dataset
#[derive(Debug)]
pub struct SequencedSlot<T> {
    next: AtomicU64,
    state: Mutex<SlotState<T>>,
}

#[derive(Debug)]
struct SlotState<T> {
    applied: u64,
    value: Option<T>,
}

impl<T> Default for SequencedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequencedSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            state: Mutex::new(SlotState {
                applied: 0,
                value: None,
            }),
        }
    }

    /// Draw a ticket for a poll about to start
    pub fn begin(&self) -> PollTicket {
        PollTicket(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Store `value` if `ticket` started after the last applied poll
    ///
    /// Returns whether the value was stored.
    pub fn apply(&self, ticket: PollTicket, value: T) -> bool {
        let mut state = self.state.lock();
        if ticket.0 <= state.applied {
            debug!(
                ticket = ticket.0,
                applied = state.applied,
                "discarding stale poll result"
            );
            return false;
        }
        state.applied = ticket.0;
        state.value = Some(value);
        true
    }

    /// Sequence number of the last applied poll, 0 before any
    pub fn applied_sequence(&self) -> u64 {
        self.state.lock().applied
    }
}

impl<T: Clone> SequencedSlot<T> {
    /// Copy of the last applied value
    pub fn latest(&self) -> Option<T> {
        self.state.lock().value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_increase_from_one() {
        let slot = SequencedSlot::<u32>::new();
        assert_eq!(slot.begin().sequence(), 1);
        assert_eq!(slot.begin().sequence(), 2);
        assert_eq!(slot.applied_sequence(), 0);
        assert!(slot.latest().is_none());
    }

    #[test]
    fn late_result_of_older_poll_is_discarded() {
        let slot = SequencedSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.apply(second, "fresh"));
        assert!(!slot.apply(first, "stale"));
        assert_eq!(slot.latest(), Some("fresh"));
        assert_eq!(slot.applied_sequence(), 2);
    }

    #[test]
    fn in_order_results_all_apply() {
        let slot = SequencedSlot::new();
        for value in 0..3 {
            let ticket = slot.begin();
            assert!(slot.apply(ticket, value));
        }
        assert_eq!(slot.latest(), Some(2));
    }

    #[test]
    fn same_ticket_applies_once() {
        let slot = SequencedSlot::new();
        let ticket = slot.begin();
        assert!(slot.apply(ticket, 1));
        assert!(!slot.apply(ticket, 2));
        assert_eq!(slot.latest(), Some(1));
    }

    #[test]
    fn concurrent_results_keep_the_newest() {
        let slot = std::sync::Arc::new(SequencedSlot::new());
        let tickets: Vec<_> = (0..16).map(|_| slot.begin()).collect();

        let handles: Vec<_> = tickets
            .into_iter()
            .rev()
            .map(|ticket| {
                let slot = std::sync::Arc::clone(&slot);
                std::thread::spawn(move || slot.apply(ticket, ticket.sequence()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(slot.applied_sequence(), 16);
        assert_eq!(slot.latest(), Some(16));
    }
}
