//! Source locations for parsed lines and diagnostics.
//!
//! Profile documents are line-oriented, so every location carries the
//! 1-based line number alongside the byte range. Warnings point at lines,
//! the byte range lets tooling highlight the exact text.

use std::fmt;

use serde::Serialize;

/// A byte range in the source text plus the line it starts on.
///
/// Offsets are bytes (not characters), `[start, end)`.
///
/// # Example
///
/// ```rust
/// use devcard_core::span::Span;
///
/// let span = Span::new(4, 14, 2);
/// assert_eq!(span.len(), 10);
/// assert_eq!(span.to_string(), "line 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
    /// 1-based line number of `start`.
    pub line: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32, line: u32) -> Self {
        Self { start, end, line }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}
