/// A byte range `[start, end)` into the note buffer.
///
/// Annotations store spans rather than copied text; spans are shifted through
/// each edit delta so they keep tracking the same region of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes shared with `other`.
    #[must_use]
    pub fn overlap(self, other: Span) -> usize {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }

    /// Returns true if any byte is shared with `other`.
    #[must_use]
    pub fn intersects(self, other: Span) -> bool {
        self.overlap(other) > 0
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_disjoint_spans_is_zero() {
        assert_eq!(Span::new(0, 4).overlap(Span::new(4, 8)), 0);
        assert!(!Span::new(0, 4).intersects(Span::new(4, 8)));
    }

    #[test]
    fn overlap_of_nested_spans_is_inner_length() {
        assert_eq!(Span::new(0, 10).overlap(Span::new(2, 5)), 3);
    }

    #[test]
    fn inverted_span_is_empty() {
        assert!(Span::new(5, 3).is_empty());
        assert_eq!(Span::new(5, 3).len(), 0);
    }
}
