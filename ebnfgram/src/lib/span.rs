#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the grammar source. Rule names, references and
/// errors carry one so diagnostics can point back into the file; the source text itself is
/// never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// The span `[start, end)`.
    ///
    /// # Panics
    ///
    /// If the range would be inverted.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "inverted span: {}..{}", start, end);
        Span { start, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The span as a range, suitable for slicing the source text back out.
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.as_range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
