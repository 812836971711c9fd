use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates process-unique identifiers of the form `<prefix>_<millis>_<seq>`.
///
/// The timestamp keeps ids readable and roughly sortable across restarts; the
/// monotonic sequence guarantees no two ids from the same generator collide
/// within a process run, even when minted in the same millisecond.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdGenerator {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}", self.prefix, Utc::now().timestamp_millis(), seq)
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }
}

/// Prefix used for the `id` of a withdrawal that has not been settled yet.
pub const PLACEHOLDER_PREFIX: &str = "PENDING";

/// Returns true when `id` was minted locally for an unsettled withdrawal.
pub fn is_placeholder(id: &str) -> bool {
    id.strip_prefix(PLACEHOLDER_PREFIX)
        .is_some_and(|rest| rest.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_within_a_run() {
        let ids = IdGenerator::new(PLACEHOLDER_PREFIX);
        let minted: HashSet<String> = (0..1_000).map(|_| ids.next_id()).collect();
        assert_eq!(minted.len(), 1_000);
        assert!(minted.iter().all(|id| is_placeholder(id)));
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("PENDING_1700000000000_1"));
        assert!(!is_placeholder("PENDINGX"));
        assert!(!is_placeholder("SIMULATED_BATCH_1700000000000_1"));
        assert!(!is_placeholder("5UXD2E8A7EBQJ"));
    }
}
