//! Text units and the unit boundary resolver.
//!
//! Given a unit kind and an offset, [`unit_bounds`] computes the
//! `[start, end)` interval of the unit containing that offset. The resolver
//! only ever reads characters through the document, never past the buffer:
//! at or beyond the last character it degenerates to the trailing unit
//! instead of failing.

use std::ops::Range;

use crate::editing::classify::{classify, CharacterClass};
use crate::editing::Document;

/// Granularity of navigation over a document.
///
/// `Format` behaves identically to `Character`: the buffer carries no
/// formatting runs. `Page` is an alias of `Document`: no page concept
/// exists in this model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUnit {
    Character,
    Format,
    Word,
    Line,
    Paragraph,
    Page,
    Document,
}

/// Direction of a boundary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalDirection {
    Forward,
    Backward,
}

/// Bounds of the unit containing `offset`.
pub fn unit_bounds(doc: &Document, unit: TextUnit, offset: usize) -> Range<usize> {
    let len = doc.len();
    match unit {
        TextUnit::Character | TextUnit::Format => {
            if offset >= len {
                len..len
            } else {
                offset..doc.next_boundary(offset)
            }
        }
        TextUnit::Word => word_bounds(doc, offset),
        TextUnit::Line => {
            let line = doc.visual_line_at(offset.min(len));
            // +1 covers the line's end-of-line marker when present
            line.start..(line.start + line.visual_length + 1).min(len)
        }
        TextUnit::Paragraph => {
            let line = doc.logical_line_at(offset.min(len));
            line.start..line.end + line.delimiter_len
        }
        TextUnit::Page | TextUnit::Document => 0..len,
    }
}

/// The word unit containing `offset`.
///
/// A whitespace character is a unit of its own (whitespace runs are never
/// merged); any other character extends to the surrounding run of its
/// class, stopping at class transitions or buffer edges.
fn word_bounds(doc: &Document, offset: usize) -> Range<usize> {
    let len = doc.len();
    if len == 0 {
        return 0..0;
    }
    let at = if offset >= len {
        doc.prev_boundary(len)
    } else {
        offset
    };
    let Some(ch) = doc.char_at(at) else {
        return len..len;
    };
    let class = classify(ch);
    if class == CharacterClass::Whitespace {
        return at..doc.next_boundary(at);
    }

    let mut start = at;
    while let Some((prev, prev_ch)) = doc.prev_char(start) {
        if classify(prev_ch) != class {
            break;
        }
        start = prev;
    }
    let mut end = doc.next_boundary(at);
    while let Some(next_ch) = doc.char_at(end) {
        if classify(next_ch) != class {
            break;
        }
        end = doc.next_boundary(end);
    }
    start..end
}

/// One navigation step from `pos`: the next unit's end going forward, the
/// previous unit's start going backward. Returns `pos` unchanged when the
/// buffer edge blocks the step.
pub(crate) fn step(doc: &Document, unit: TextUnit, pos: usize, dir: LogicalDirection) -> usize {
    match dir {
        LogicalDirection::Forward => unit_bounds(doc, unit, pos).end,
        LogicalDirection::Backward => {
            if pos == 0 {
                0
            } else {
                unit_bounds(doc, unit, doc.prev_boundary(pos)).start
            }
        }
    }
}
