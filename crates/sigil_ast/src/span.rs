//! Byte spans into the analyzed source.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Empty span at offset zero, for synthesized nodes
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely inside this span
    #[inline]
    pub const fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one byte
    #[inline]
    pub const fn overlaps(self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Slice the source text covered by this span
    #[inline]
    pub fn text(self, source: &str) -> &str {
        let start = (self.start as usize).min(source.len());
        let end = (self.end as usize).min(source.len());
        &source[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        assert!(Span::new(0, 5).overlaps(Span::new(4, 8)));
        assert!(!Span::new(0, 5).overlaps(Span::new(5, 8)));
        assert!(Span::new(2, 3).overlaps(Span::new(0, 10)));
    }

    #[test]
    fn test_contains() {
        assert!(Span::new(0, 10).contains(Span::new(3, 7)));
        assert!(!Span::new(3, 7).contains(Span::new(0, 10)));
    }

    #[test]
    fn test_text() {
        let src = "const x = 1";
        assert_eq!(Span::new(6, 7).text(src), "x");
    }
}
