use serde::{Deserialize, Serialize};

/// One browser-style history entry. Soft navigations are tagged
/// `ajax: true`; full document loads are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ajax: bool,
    pub href: String,
}

/// History stack with a cursor over the current entry.
///
/// Pushing while the cursor sits behind the top truncates the forward
/// entries, matching browser semantics. Back/forward traversal moves the
/// cursor without recording new entries.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ajax: bool, href: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(HistoryEntry {
            ajax,
            href: href.into(),
        });
        self.cursor = self.entries.len() - 1;
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Move the cursor one entry back. Returns the entry now current, or
    /// `None` at the oldest entry.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Move the cursor one entry forward. Returns the entry now current,
    /// or `None` at the newest entry.
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of soft-navigation entries in the stack.
    pub fn ajax_len(&self) -> usize {
        self.entries.iter().filter(|e| e.ajax).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_has_no_current() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), None);
    }

    #[test]
    fn test_push_sets_current() {
        let mut history = History::new();
        history.push(false, "http://x.test/");
        history.push(true, "http://x.test/dashboard");

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap().href, "http://x.test/dashboard");
        assert!(history.current().unwrap().ajax);
    }

    #[test]
    fn test_back_and_forward_move_cursor_without_growing() {
        let mut history = History::new();
        history.push(false, "a");
        history.push(true, "b");
        history.push(true, "c");

        assert_eq!(history.back().unwrap().href, "b");
        assert_eq!(history.back().unwrap().href, "a");
        assert_eq!(history.back(), None);
        assert_eq!(history.forward().unwrap().href, "b");
        assert_eq!(history.forward().unwrap().href, "c");
        assert_eq!(history.forward(), None);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_push_after_back_truncates_forward_entries() {
        let mut history = History::new();
        history.push(false, "a");
        history.push(true, "b");
        history.push(true, "c");
        history.back();
        history.back();
        history.push(true, "d");

        let hrefs: Vec<&str> = history.entries().iter().map(|e| e.href.as_str()).collect();
        assert_eq!(hrefs, vec!["a", "d"]);
        assert_eq!(history.current().unwrap().href, "d");
    }

    #[test]
    fn test_ajax_len_counts_only_soft_entries() {
        let mut history = History::new();
        history.push(false, "a");
        history.push(true, "b");
        history.push(false, "c");

        assert_eq!(history.ajax_len(), 1);
    }
}
