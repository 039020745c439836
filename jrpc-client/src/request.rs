//! Request id allocation for the JSON-RPC client
//!
//! Every call built by a [`crate::Client`] carries a numeric id taken from
//! its own counter. Ids start at 0 (or a chosen value) and grow by one per
//! call. Notifications do not consume an id.

use jrpc_core::Id;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id source
#[derive(Debug, Default)]
pub struct IdCounter {
    next: AtomicU64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> Id {
        Id::from(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call will get, without taking it
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_from_zero() {
        let counter = IdCounter::new();
        assert_eq!(counter.next_id(), Id::from(0u64));
        assert_eq!(counter.next_id(), Id::from(1u64));
        assert_eq!(counter.peek(), 2);
    }

    #[test]
    fn test_custom_start() {
        let counter = IdCounter::starting_at(100);
        assert_eq!(counter.next_id(), Id::from(100u64));
    }
}
