//! Record identifier generation
//!
//! The store never invents identifiers itself: every insert asks an
//! [`IdGenerator`] for a fresh one. Identifiers only have to be unique and
//! comparable with [`compare_ids`](crate::record::compare_ids); generators
//! that hand out roughly increasing values make most inserts land at the end
//! of a catalog.

use crate::record::RecordId;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh record identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier that has never been returned before
    fn new_id(&self) -> RecordId;
}

/// Time-ordered UUIDv7 identifiers (default)
///
/// The hyphenated lowercase form sorts by creation time at millisecond
/// granularity, with random bits breaking ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn new_id(&self) -> RecordId {
        RecordId::new(Uuid::now_v7().to_string())
    }
}

/// Random UUIDv4 identifiers
///
/// Inserts land at random positions in the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn new_id(&self) -> RecordId {
        RecordId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic counter-based identifiers, zero-padded to 20 digits
///
/// Lexicographic order equals numeric order. Intended for tests and
/// reproducible fixtures.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start counting at `start`
    pub fn starting_at(start: u64) -> Self {
        SequentialIdGenerator {
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> RecordId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        RecordId::new(format!("{:020}", n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::compare_ids;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_v7_ids_are_unique() {
        let gen = UuidV7Generator;
        let ids: HashSet<_> = (0..1000).map(|_| gen.new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_uuid_v7_ids_are_hyphenated_lowercase() {
        let id = UuidV7Generator.new_id();
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(id.as_str(), id.as_str().to_lowercase());
    }

    #[test]
    fn test_sequential_ids_sort_numerically() {
        let gen = SequentialIdGenerator::starting_at(8);
        let a = gen.new_id();
        let b = gen.new_id();
        let c = gen.new_id();
        assert_eq!(a.as_str(), "00000000000000000008");
        assert_eq!(compare_ids(a.as_str(), b.as_str()), std::cmp::Ordering::Less);
        assert_eq!(compare_ids(b.as_str(), c.as_str()), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_generators_are_object_safe() {
        let gens: Vec<Box<dyn IdGenerator>> = vec![
            Box::new(UuidV7Generator),
            Box::new(UuidV4Generator),
            Box::new(SequentialIdGenerator::default()),
        ];
        for g in &gens {
            assert!(!g.new_id().as_str().is_empty());
        }
    }
}
