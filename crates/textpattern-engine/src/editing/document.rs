//! The editable text buffer behind every range.
//!
//! `Document` owns the character sequence (an `xi_rope::Rope`), the single
//! selection, a small view state, and the anchor table. All edits flow
//! through [`Document::apply`], which applies the compiled delta to the
//! buffer and then pushes the edit summary into the anchor table, so every
//! live anchor stays correct without callers revalidating offsets.

use std::borrow::Cow;
use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use tracing::{debug, trace};
use xi_rope::rope::BaseMetric;
use xi_rope::tree::Cursor;
use xi_rope::{LinesMetric, Rope};

use crate::editing::anchors::{AnchorId, AnchorTable, MovementPolicy};
use crate::editing::error::RangeError;
use crate::editing::{commands, Cmd, Patch};

/// Shared handle to a document. Ranges hold a `Weak` counterpart; when the
/// host drops its handle, every outstanding range reports `NoDocument`.
pub type DocumentHandle = Rc<RefCell<Document>>;

/// Opaque handle to the host UI element exposing this document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle(pub u64);

/// Minimal view facts the unit resolver needs: an optional wrap width (in
/// characters) and the line currently scrolled to the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub wrap_width: Option<usize>,
    pub top_line: usize,
}

/// A logical (hard, delimiter-terminated) line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset of the line delimiter (equals `start` for an empty line).
    pub end: usize,
    /// Length of the delimiter: 0 (end of buffer), 1 (`\n`) or 2 (`\r\n`).
    pub delimiter_len: usize,
}

/// A visual line: a possibly-wrapped on-screen segment of a logical line.
///
/// The carriage return of a `\r\n` delimiter counts toward the visual
/// length, so `start + visual_length + 1` always lands on the next line
/// start when a delimiter is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualLine {
    pub start: usize,
    pub visual_length: usize,
}

/// An editable text buffer with stable anchors and a single selection.
///
/// Offsets throughout the crate are byte offsets into the UTF-8 buffer and
/// are expected to lie on character boundaries.
pub struct Document {
    /// Rope holding the entire document (source of truth).
    buffer: Rope,
    /// Current selection as byte offsets; collapsed when start == end.
    selection: Range<usize>,
    /// Version counter incremented on each edit.
    version: u64,
    /// Every live anchor, updated in place on each edit.
    anchors: AnchorTable,
    /// Wrap width and scroll position supplied by the host view.
    view: ViewState,
    /// Host UI element wrapping this document.
    element: ElementHandle,
}

impl Document {
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
            version: 0,
            anchors: AnchorTable::new(),
            view: ViewState::default(),
            element: ElementHandle(0),
        }
    }

    /// Create a document from raw bytes, rejecting invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Convenience constructor for the common host pattern: a shared,
    /// internally mutable document that ranges can weakly reference.
    pub fn shared(text: &str) -> DocumentHandle {
        Rc::new(RefCell::new(Self::new(text)))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Slice the buffer, clamping the range to the document bounds.
    pub fn slice_to_cow(&self, range: Range<usize>) -> Cow<'_, str> {
        let len = self.buffer.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    // ---- character access ----

    /// The character starting at `offset`, or `None` at the buffer end.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.buffer.len() {
            return None;
        }
        let end = self.next_boundary(offset);
        self.buffer.slice_to_cow(offset..end).chars().next()
    }

    /// The character ending at `offset` together with its start offset.
    pub(crate) fn prev_char(&self, offset: usize) -> Option<(usize, char)> {
        if offset == 0 {
            return None;
        }
        let start = self.prev_boundary(offset);
        let ch = self.char_at(start)?;
        Some((start, ch))
    }

    /// Next character boundary strictly after `offset` (saturating at the
    /// buffer end).
    pub(crate) fn next_boundary(&self, offset: usize) -> usize {
        let len = self.buffer.len();
        if offset >= len {
            return len;
        }
        let mut cursor = Cursor::new(&self.buffer, offset);
        cursor.next::<BaseMetric>().unwrap_or(len)
    }

    /// Previous character boundary strictly before `offset` (saturating at 0).
    pub(crate) fn prev_boundary(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        let mut cursor = Cursor::new(&self.buffer, offset.min(self.buffer.len()));
        cursor.prev::<BaseMetric>().unwrap_or(0)
    }

    /// Round `offset` down to a character boundary.
    pub(crate) fn floor_boundary(&self, offset: usize) -> usize {
        let len = self.buffer.len();
        let offset = offset.min(len);
        let mut cursor = Cursor::new(&self.buffer, offset);
        if cursor.is_boundary::<BaseMetric>() {
            offset
        } else {
            cursor.prev::<BaseMetric>().unwrap_or(0)
        }
    }

    // ---- line lookup ----

    /// Index of the logical line containing `offset`.
    pub fn line_containing(&self, offset: usize) -> usize {
        self.buffer.line_of_offset(offset.min(self.buffer.len()))
    }

    /// The logical line containing `offset`. A delimiter byte belongs to
    /// the line it terminates; `offset == len` resolves to the last line.
    pub fn logical_line_at(&self, offset: usize) -> LineSpan {
        let len = self.buffer.len();
        let line = self.buffer.line_of_offset(offset.min(len));
        let start = self.buffer.offset_of_line(line);
        let next = self.buffer.offset_of_line(line + 1);

        // Lines before the last newline are guaranteed to end with '\n'.
        let has_newline = line < self.buffer.measure::<LinesMetric>();
        let mut delimiter_len = 0;
        if has_newline {
            delimiter_len = 1;
            if self.buffer.slice_to_cow(start..next).ends_with("\r\n") {
                delimiter_len = 2;
            }
        }
        LineSpan {
            start,
            end: next - delimiter_len,
            delimiter_len,
        }
    }

    /// The visual line containing `offset`.
    ///
    /// Without a wrap width this is the logical line minus its final `\n`
    /// (a `\r` before it counts as visual content). With a wrap width the
    /// line content is cut into fixed-width character segments and the
    /// segment containing `offset` is returned.
    pub fn visual_line_at(&self, offset: usize) -> VisualLine {
        let line = self.logical_line_at(offset);
        let content_end = line.end + line.delimiter_len.saturating_sub(1);

        let Some(width) = self.view.wrap_width.filter(|w| *w > 0) else {
            return VisualLine {
                start: line.start,
                visual_length: content_end - line.start,
            };
        };

        let content = self.buffer.slice_to_cow(line.start..content_end);
        let mut segments: Vec<(usize, usize)> = Vec::new();
        let mut seg_start = line.start;
        let mut seg_bytes = 0;
        let mut seg_chars = 0;
        for ch in content.chars() {
            if seg_chars == width {
                segments.push((seg_start, seg_bytes));
                seg_start += seg_bytes;
                seg_bytes = 0;
                seg_chars = 0;
            }
            seg_bytes += ch.len_utf8();
            seg_chars += 1;
        }
        let last = (seg_start, seg_bytes);
        let (start, visual_length) = segments
            .into_iter()
            .find(|&(s, l)| offset < s + l)
            .unwrap_or(last);
        VisualLine {
            start,
            visual_length,
        }
    }

    // ---- editing ----

    /// Apply a command: compile it to a delta, update the buffer, transform
    /// every anchor and the selection, and bump the version. The update is
    /// atomic as far as observers can tell; a `Patch` reports what changed.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let (at, removed, inserted) = commands::normalized_edit(self, &cmd);
        let delta = commands::compile_command(self, &cmd);
        self.buffer = delta.apply(&self.buffer);

        self.anchors.on_edit(at, removed, inserted);
        self.selection = map_offset_after_edit(self.selection.start, at, removed, inserted)
            ..map_offset_after_edit(self.selection.end, at, removed, inserted);
        self.version += 1;

        debug!(at, removed, inserted, version = self.version, "edit applied");
        Patch {
            changed: at..at + inserted,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    // ---- selection ----

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Replace the selection with `[start, end)`, clamped to the buffer.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.buffer.len();
        let start = start.min(len);
        let end = end.min(len).max(start);
        trace!(start, end, "selection set");
        self.selection = start..end;
    }

    /// This document supports exactly one selection range.
    pub fn supports_multiple_selections(&self) -> bool {
        false
    }

    // ---- anchors ----

    /// Register an anchor at `offset`. Fails when the offset lies outside
    /// `[0, len]`.
    pub fn create_anchor(
        &mut self,
        offset: usize,
        policy: MovementPolicy,
    ) -> Result<AnchorId, RangeError> {
        let len = self.buffer.len();
        if offset > len {
            return Err(RangeError::OutOfRange { offset, len });
        }
        Ok(self.anchors.insert(offset, policy))
    }

    pub fn release_anchor(&mut self, id: AnchorId) {
        self.anchors.release(id);
    }

    pub fn anchor_offset(&self, id: AnchorId) -> Option<usize> {
        self.anchors.offset(id)
    }

    pub(crate) fn set_anchor_offset(&mut self, id: AnchorId, offset: usize) {
        self.anchors.set_offset(id, offset);
    }

    /// Number of live anchors (registry growth check for hosts).
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    // ---- view ----

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Set the wrap width in characters; `None` disables wrapping.
    pub fn set_wrap_width(&mut self, width: Option<usize>) {
        self.view.wrap_width = width;
    }

    pub fn scroll_to_line(&mut self, line: usize) {
        self.view.top_line = line;
    }

    pub fn element(&self) -> ElementHandle {
        self.element
    }

    pub fn set_element(&mut self, element: ElementHandle) {
        self.element = element;
    }
}

/// Map an offset through an edit, keeping the caret after text inserted at
/// its position (the behavior a typist expects of the selection).
fn map_offset_after_edit(offset: usize, at: usize, removed: usize, inserted: usize) -> usize {
    if offset < at {
        offset
    } else if offset >= at + removed {
        offset - removed + inserted
    } else {
        at + inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Construction and round-trip ============

    #[test]
    fn test_from_bytes_valid_utf8() {
        let text = "Hello World\nSecond line.";
        let doc = Document::from_bytes(text.as_bytes()).expect("valid UTF-8");

        assert_eq!(doc.to_bytes(), text.as_bytes());
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.selection(), text.len()..text.len());
    }

    #[test]
    fn test_from_bytes_invalid_utf8() {
        let result = Document::from_bytes(&[0xFF, 0xFE, 0xFD]);
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_preserves_line_endings() {
        let text = "Unix line\nWindows line\r\nAnother Unix\n";
        let doc = Document::from_bytes(text.as_bytes()).expect("should load");
        assert_eq!(doc.to_bytes(), text.as_bytes());
    }

    // ============ Character access ============

    #[test]
    fn test_char_access() {
        let doc = Document::new("héllo");

        assert_eq!(doc.char_at(0), Some('h'));
        assert_eq!(doc.char_at(1), Some('é'));
        // 'é' is two bytes wide
        assert_eq!(doc.next_boundary(1), 3);
        assert_eq!(doc.char_at(3), Some('l'));
        assert_eq!(doc.char_at(doc.len()), None);
        assert_eq!(doc.prev_char(3), Some((1, 'é')));
        assert_eq!(doc.prev_char(0), None);
    }

    #[test]
    fn test_floor_boundary() {
        let doc = Document::new("héllo");
        assert_eq!(doc.floor_boundary(2), 1, "mid-character rounds down");
        assert_eq!(doc.floor_boundary(3), 3);
        assert_eq!(doc.floor_boundary(99), doc.len());
    }

    // ============ Line lookup ============

    #[test]
    fn test_logical_line_at_unix_and_windows_delimiters() {
        let doc = Document::new("aa\nbbb\r\nc");

        assert_eq!(
            doc.logical_line_at(0),
            LineSpan {
                start: 0,
                end: 2,
                delimiter_len: 1
            }
        );
        assert_eq!(
            doc.logical_line_at(4),
            LineSpan {
                start: 3,
                end: 6,
                delimiter_len: 2
            }
        );
        // The '\n' at offset 7 belongs to the line it terminates
        assert_eq!(doc.logical_line_at(7).start, 3);
        assert_eq!(
            doc.logical_line_at(8),
            LineSpan {
                start: 8,
                end: 9,
                delimiter_len: 0
            }
        );
        // Offset == len resolves to the last line
        assert_eq!(doc.logical_line_at(9).start, 8);
    }

    #[test]
    fn test_logical_line_at_trailing_newline_has_empty_last_line() {
        let doc = Document::new("ab\n");
        let last = doc.logical_line_at(3);
        assert_eq!(
            last,
            LineSpan {
                start: 3,
                end: 3,
                delimiter_len: 0
            }
        );
    }

    #[test]
    fn test_visual_line_without_wrap_counts_cr_as_content() {
        let doc = Document::new("ab\r\ncd");

        let first = doc.visual_line_at(0);
        assert_eq!(first.start, 0);
        assert_eq!(first.visual_length, 3, "content plus the carriage return");

        let second = doc.visual_line_at(5);
        assert_eq!(second.start, 4);
        assert_eq!(second.visual_length, 2);
    }

    #[test]
    fn test_visual_line_with_wrap_width() {
        let mut doc = Document::new("abcdefgh\nxy");
        doc.set_wrap_width(Some(3));

        assert_eq!(
            doc.visual_line_at(0),
            VisualLine {
                start: 0,
                visual_length: 3
            }
        );
        assert_eq!(
            doc.visual_line_at(4),
            VisualLine {
                start: 3,
                visual_length: 3
            }
        );
        assert_eq!(
            doc.visual_line_at(7),
            VisualLine {
                start: 6,
                visual_length: 2
            }
        );
        // Second logical line is unaffected by the first line's segments
        assert_eq!(
            doc.visual_line_at(9),
            VisualLine {
                start: 9,
                visual_length: 2
            }
        );
    }

    // ============ Editing ============

    #[test]
    fn test_apply_insert_updates_text_version_patch() {
        let mut doc = Document::new("Hello World");

        let patch = doc.apply(Cmd::InsertText {
            at: 5,
            text: " there".to_string(),
        });

        assert_eq!(doc.text(), "Hello there World");
        assert_eq!(doc.version(), 1);
        assert_eq!(patch.changed, 5..11);
        assert_eq!(patch.version, 1);
    }

    #[test]
    fn test_apply_delete_and_replace() {
        let mut doc = Document::new("Hello World");

        doc.apply(Cmd::DeleteRange { range: 5..11 });
        assert_eq!(doc.text(), "Hello");

        doc.apply(Cmd::ReplaceRange {
            range: 0..5,
            text: "Goodbye".to_string(),
        });
        assert_eq!(doc.text(), "Goodbye");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_selection_transforms_through_edits() {
        let mut doc = Document::new("Hello World");
        doc.select(6, 11);

        doc.apply(Cmd::InsertText {
            at: 0,
            text: ">> ".to_string(),
        });
        assert_eq!(doc.selection(), 9..14);

        doc.apply(Cmd::DeleteRange { range: 0..3 });
        assert_eq!(doc.selection(), 6..11);
    }

    #[test]
    fn test_caret_moves_after_text_typed_at_caret() {
        let mut doc = Document::new("ab");
        doc.select(1, 1);

        doc.apply(Cmd::InsertText {
            at: 1,
            text: "xyz".to_string(),
        });

        assert_eq!(doc.selection(), 4..4);
    }

    // ============ Anchors through the document ============

    #[test]
    fn test_create_anchor_rejects_out_of_range_offset() {
        let mut doc = Document::new("hello");

        let err = doc
            .create_anchor(6, MovementPolicy::StaysBeforeInsertion)
            .unwrap_err();
        assert_eq!(err, RangeError::OutOfRange { offset: 6, len: 5 });

        // The buffer end itself is a valid anchor position
        assert!(doc.create_anchor(5, MovementPolicy::StaysBeforeInsertion).is_ok());
    }

    #[test]
    fn test_anchors_follow_edits_applied_to_document() {
        let mut doc = Document::new("hello world");
        let id = doc
            .create_anchor(6, MovementPolicy::StaysBeforeInsertion)
            .unwrap();

        doc.apply(Cmd::InsertText {
            at: 0,
            text: "XX".to_string(),
        });

        assert_eq!(doc.anchor_offset(id), Some(8));
    }

    // ============ Offset mapping helper ============

    #[test]
    fn test_map_offset_after_edit() {
        // insert 3 at 5
        assert_eq!(map_offset_after_edit(4, 5, 0, 3), 4);
        assert_eq!(map_offset_after_edit(5, 5, 0, 3), 8);
        assert_eq!(map_offset_after_edit(7, 5, 0, 3), 10);
        // delete [2, 6)
        assert_eq!(map_offset_after_edit(1, 2, 4, 0), 1);
        assert_eq!(map_offset_after_edit(4, 2, 4, 0), 2);
        assert_eq!(map_offset_after_edit(8, 2, 4, 0), 4);
    }
}
