use std::ops::Range;

/// Result of applying a command to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte span occupied by the inserted text (empty for pure deletions).
    pub changed: Range<usize>,
    /// Selection after transforming it through the edit.
    pub new_selection: Range<usize>,
    /// Document version after the edit.
    pub version: u64,
}
