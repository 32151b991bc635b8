/// Pagination token meaning "start of collection"
pub const START_CURSOR: i64 = -1;

/// Tracks pagination progress through the subsets of a target's relations
///
/// A subset is one logical page-group (for example one direction of a social
/// connection) processed as a unit. The cursor is the opaque token returned by
/// the remote service for the next page inside the current subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCursor {
    subset: u32,
    cursor: i64,
}

impl CrawlCursor {
    /// Creates a cursor at the start of the first subset
    pub fn new() -> Self {
        Self {
            subset: 1,
            cursor: START_CURSOR,
        }
    }

    /// Rebuilds a cursor from persisted values
    ///
    /// Returns `None` if `subset` is zero.
    pub fn from_parts(subset: u32, cursor: i64) -> Option<Self> {
        (subset >= 1).then_some(Self { subset, cursor })
    }

    /// Moves on to the next subset
    ///
    /// Saturates at `u32::MAX`.
    pub fn advance_subset(&mut self) {
        self.subset = self.subset.saturating_add(1);
    }

    /// Overwrites the pagination token
    ///
    /// The token is opaque and accepted as-is.
    pub fn set_cursor(&mut self, token: i64) {
        self.cursor = token;
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn subset(&self) -> u32 {
        self.subset
    }

    /// Returns true if the cursor still holds the start sentinel
    pub fn is_at_start(&self) -> bool {
        self.cursor == START_CURSOR
    }
}

impl Default for CrawlCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor() {
        let cursor = CrawlCursor::new();
        assert_eq!(cursor.subset(), 1);
        assert_eq!(cursor.cursor(), -1);
        assert!(cursor.is_at_start());
    }

    #[test]
    fn test_advance_subset_saturates() {
        let mut cursor = CrawlCursor::from_parts(u32::MAX, 7).unwrap();
        cursor.advance_subset();
        assert_eq!(cursor.subset(), u32::MAX);
        assert_eq!(cursor.cursor(), 7);
    }

    #[test]
    fn test_advance_subset_is_monotonic() {
        let mut cursor = CrawlCursor::new();
        for n in 1..=10 {
            cursor.advance_subset();
            assert_eq!(cursor.subset(), 1 + n);
        }
    }

    #[test]
    fn test_set_cursor_accepts_any_token() {
        let mut cursor = CrawlCursor::new();
        cursor.set_cursor(1_489_567_112_345_678_901);
        assert_eq!(cursor.cursor(), 1_489_567_112_345_678_901);
        assert!(!cursor.is_at_start());

        cursor.set_cursor(0);
        assert_eq!(cursor.cursor(), 0);

        cursor.set_cursor(START_CURSOR);
        assert!(cursor.is_at_start());
    }

    #[test]
    fn test_set_cursor_does_not_touch_subset() {
        let mut cursor = CrawlCursor::new();
        cursor.advance_subset();
        cursor.set_cursor(55);
        assert_eq!(cursor.subset(), 2);
    }

    #[test]
    fn test_from_parts() {
        let cursor = CrawlCursor::from_parts(3, 77).unwrap();
        assert_eq!(cursor.subset(), 3);
        assert_eq!(cursor.cursor(), 77);
        assert!(CrawlCursor::from_parts(0, 77).is_none());
    }
}
