// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Latest-wins ordering for overlapping requests.
//!
//! Every request takes a ticket when it is issued. When its response arrives
//! it is applied only if no newer ticket has been issued since. In-flight work
//! is never cancelled; stale responses are simply dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket. The first ticket is 1.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// True if no request was issued after `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest() == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_latest_ticket_wins() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert!(first < second);
        assert_eq!(second.sequence(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_issue_yields_unique_tickets() {
        let sequencer = Arc::new(RequestSequencer::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let sequencer = Arc::clone(&sequencer);
            handles.push(tokio::spawn(async move { sequencer.issue() }));
        }

        let mut tickets = Vec::new();
        for handle in handles {
            tickets.push(handle.await.unwrap().sequence());
        }
        tickets.sort_unstable();
        assert_eq!(tickets, (1..=16).collect::<Vec<_>>());
        assert_eq!(sequencer.latest(), 16);
    }
}
