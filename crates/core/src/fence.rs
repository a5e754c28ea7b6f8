//! Request fencing for list refreshes.
//!
//! Every refresh of a table takes a ticket before calling the backend. When
//! the response arrives, only the holder of the most recent ticket may commit
//! it; anything older is discarded. This keeps a slow response for an old
//! search from overwriting the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Proof that a request was issued at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FenceTicket(u64);

impl FenceTicket {
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// A monotonically increasing ticket counter.
#[derive(Debug, Default)]
pub struct Fence {
    latest: AtomicU64,
}

impl Fence {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issue a ticket newer than every ticket issued before it.
    pub fn issue(&self) -> FenceTicket {
        FenceTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// True while no newer ticket has been issued.
    #[must_use]
    pub fn is_current(&self, ticket: FenceTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let fence = Fence::new();
        let first = fence.issue();
        assert!(fence.is_current(first));

        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_tickets_are_unique_across_threads() {
        let fence = std::sync::Arc::new(Fence::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let fence = fence.clone();
                std::thread::spawn(move || (0..100).map(|_| fence.issue().sequence()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
