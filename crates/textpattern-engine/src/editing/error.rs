/// Errors reported by range and anchor operations.
///
/// Every failure is reported synchronously to the immediate caller; nothing
/// is retried or swallowed. A failing operation leaves both endpoints of the
/// affected range untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Offset lies outside `[0, len]` of the document.
    #[error("offset {offset} is outside the document (length {len})")]
    OutOfRange { offset: usize, len: usize },

    /// A caller-supplied argument is malformed (e.g. `max_length < -1`).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The other range belongs to a different document.
    #[error("range belongs to a different document")]
    IncompatibleRange,

    /// The operation is not supported; only one selection range exists.
    #[error("multiple selections are not supported")]
    UnsupportedOperation,

    /// The document behind this range has been dropped by its host.
    #[error("no document is attached to this range")]
    NoDocument,
}
