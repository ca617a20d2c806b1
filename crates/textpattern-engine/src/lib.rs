pub mod editing;

// Re-export key types for easier usage
pub use editing::{
    AnchorId, AttributeValue, Cmd, Document, DocumentHandle, ElementHandle, Endpoint,
    MovementPolicy, Patch, RangeError, TextRange, TextRangeProvider, TextUnit,
};
