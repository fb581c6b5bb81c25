use std::collections::VecDeque;

/// Default number of remembered queries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded scrollback of recently issued queries.
///
/// Owned explicitly by whoever manages the search session and passed by
/// reference into presentation code; newest entries sit at the back and the
/// oldest entry is evicted once the capacity is reached.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl QueryHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record a query. Blank input and immediate repeats are skipped.
    pub fn push(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        if self.entries.back().is_some_and(|last| last == query) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(query.to_string());
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut history = QueryHistory::new(3);
        for query in ["a", "b", "c", "d"] {
            history.push(query);
        }
        let entries: Vec<_> = history.iter().collect();
        assert_eq!(entries, vec!["b", "c", "d"]);
    }

    #[test]
    fn blank_and_repeated_queries_are_skipped() {
        let mut history = QueryHistory::default();
        history.push("  ");
        history.push("foo");
        history.push("foo");
        history.push("bar");
        let entries: Vec<_> = history.iter().collect();
        assert_eq!(entries, vec!["foo", "bar"]);
    }

    #[test]
    fn non_consecutive_repeats_are_kept() {
        let mut history = QueryHistory::default();
        history.push("foo");
        history.push("bar");
        history.push("foo");
        assert_eq!(history.len(), 3);
    }
}
