//! Edit commands and their compilation to rope deltas.

use std::ops::Range;
use xi_rope::delta::Builder;
use xi_rope::{Rope, RopeDelta};

use crate::editing::Document;

/// An edit to the document buffer.
///
/// Every command reduces to a single replacement: `removed` bytes at an
/// offset exchanged for the inserted text. Out-of-bounds offsets are
/// clamped to the buffer rather than rejected, matching how hosts feed
/// edits from UI events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
}

/// Reduce a command to `(edit_offset, removed_len, inserted_len)` with all
/// offsets clamped to the current buffer. This triple is what the anchor
/// table consumes.
pub(crate) fn normalized_edit(doc: &Document, cmd: &Cmd) -> (usize, usize, usize) {
    let len = doc.len();
    match cmd {
        Cmd::InsertText { at, text } => ((*at).min(len), 0, text.len()),
        Cmd::DeleteRange { range } => {
            let start = range.start.min(len);
            let end = range.end.min(len).max(start);
            (start, end - start, 0)
        }
        Cmd::ReplaceRange { range, text } => {
            let start = range.start.min(len);
            let end = range.end.min(len).max(start);
            (start, end - start, text.len())
        }
    }
}

/// Compile a command into a rope delta over the current buffer.
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> RopeDelta {
    let (at, removed, _) = normalized_edit(doc, cmd);
    let mut builder = Builder::new(doc.len());
    match cmd {
        Cmd::InsertText { text, .. } | Cmd::ReplaceRange { text, .. } => {
            builder.replace(at..at + removed, Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { .. } => {
            builder.delete(at..at + removed);
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_edit_clamps_to_buffer() {
        let doc = Document::new("hello");

        let (at, removed, inserted) = normalized_edit(
            &doc,
            &Cmd::DeleteRange { range: 3..99 },
        );
        assert_eq!((at, removed, inserted), (3, 2, 0));

        let (at, removed, inserted) = normalized_edit(
            &doc,
            &Cmd::InsertText {
                at: 99,
                text: "x".to_string(),
            },
        );
        assert_eq!((at, removed, inserted), (5, 0, 1));
    }

    #[test]
    fn test_replace_summary() {
        let doc = Document::new("hello world");
        let cmd = Cmd::ReplaceRange {
            range: 6..11,
            text: "there".to_string(),
        };

        assert_eq!(normalized_edit(&doc, &cmd), (6, 5, 5));
    }
}
