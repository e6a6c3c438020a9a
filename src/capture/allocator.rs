//! Session id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::capture::event::SessionId;

/// Issues strictly increasing session ids, starting at 1.
#[derive(Debug, Default)]
pub struct CorrelationAllocator {
    last: AtomicU64,
}

impl CorrelationAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id. Never returns [`SessionId::NONE`].
    pub fn next_id(&self) -> SessionId {
        SessionId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued id, or [`SessionId::NONE`] if none was issued.
    pub fn last_issued(&self) -> SessionId {
        SessionId(self.last.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_one() {
        let alloc = CorrelationAllocator::new();
        assert_eq!(alloc.last_issued(), SessionId::NONE);
        assert_eq!(alloc.next_id(), SessionId(1));
        assert_eq!(alloc.next_id(), SessionId(2));
        assert_eq!(alloc.last_issued(), SessionId(2));
    }

    #[test]
    fn test_unique_across_threads() {
        let alloc = Arc::new(CorrelationAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let alloc = alloc.clone();
                std::thread::spawn(move || (0..500).map(|_| alloc.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(id.is_active());
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4_000);
        assert_eq!(alloc.last_issued(), SessionId(4_000));
    }
}
