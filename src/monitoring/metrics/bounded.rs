//! Bounded collection utilities for metrics

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Helper trait for bounded VecDeque operations
pub(crate) trait BoundedPush<T> {
    fn push_bounded(&mut self, value: T, max_size: usize);
}

impl<T> BoundedPush<T> for VecDeque<T> {
    /// Push a value while maintaining a maximum size (O(1) amortized)
    #[inline]
    fn push_bounded(&mut self, value: T, max_size: usize) {
        while !self.is_empty() && self.len() >= max_size.max(1) {
            self.pop_front();
        }
        self.push_back(value);
    }
}

/// Anything carrying the time it was recorded
pub(crate) trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Drop entries older than `cutoff` from the front of a time-ordered deque
///
/// Returns the number of entries removed.
pub(crate) fn prune_before<T: Timestamped>(entries: &mut VecDeque<T>, cutoff: DateTime<Utc>) -> usize {
    let before = entries.len();
    while entries.front().is_some_and(|e| e.timestamp() < cutoff) {
        entries.pop_front();
    }
    before - entries.len()
}
