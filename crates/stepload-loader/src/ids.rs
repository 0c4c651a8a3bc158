//! Identifier generators handed to the registry on reset

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Cloneable source of fresh identifiers
#[derive(Clone)]
pub struct IdGenerator {
    next: Arc<dyn Fn() -> String + Send + Sync>,
}

impl IdGenerator {
    pub fn new(next: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self { next: Arc::new(next) }
    }

    /// Random v4 UUIDs
    pub fn uuid() -> Self {
        Self::new(|| Uuid::new_v4().to_string())
    }

    /// "0", "1", "2", ... shared across clones. Deterministic, for tests.
    pub fn incrementing() -> Self {
        let counter = Arc::new(AtomicU64::new(0));
        Self::new(move || counter.fetch_add(1, Ordering::Relaxed).to_string())
    }

    pub fn next_id(&self) -> String {
        (self.next)()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::uuid()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdGenerator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incrementing_is_shared_between_clones() {
        let ids = IdGenerator::incrementing();
        let other = ids.clone();
        assert_eq!(ids.next_id(), "0");
        assert_eq!(other.next_id(), "1");
        assert_eq!(ids.next_id(), "2");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = IdGenerator::uuid();
        let a = ids.next_id();
        assert_ne!(a, ids.next_id());
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
