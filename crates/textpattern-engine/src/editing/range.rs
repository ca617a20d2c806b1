//! Text ranges: the externally visible automation contract.
//!
//! A [`TextRange`] is a pair of anchors over a shared [`Document`]. The
//! anchors live in the document's anchor table and are updated there on
//! every edit, so a range stays logically correct across concurrent edits
//! without revalidating offsets. All navigation, comparison, search and
//! selection operations live on the [`TextRangeProvider`] trait; `TextRange`
//! is its only implementation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::editing::anchors::{AnchorId, MovementPolicy};
use crate::editing::document::{Document, DocumentHandle, ElementHandle};
use crate::editing::error::RangeError;
use crate::editing::units::{step, unit_bounds, LogicalDirection, TextUnit};
use crate::editing::search;

/// One of a range's two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Value of a text attribute. No attribute model is implemented, so every
/// query reports [`AttributeValue::NotSupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue {
    NotSupported,
}

/// The text range protocol exposed to the host accessibility layer.
///
/// Counts returned by the move operations are the number of units actually
/// traversed; movement saturates at the buffer bounds instead of erroring.
/// Every mutating operation re-establishes `start <= end` before returning,
/// and either fully succeeds or fails without touching the endpoints.
pub trait TextRangeProvider {
    /// New, independently disposable range over the same offsets.
    fn try_clone(&self) -> Result<TextRange, RangeError>;

    /// True iff both endpoint offsets are pairwise equal.
    fn equals(&self, other: &Self) -> Result<bool, RangeError>;

    /// Signed offset difference `self[which] - other[other_which]`.
    fn compare_endpoints(
        &self,
        which: Endpoint,
        other: &Self,
        other_which: Endpoint,
    ) -> Result<isize, RangeError>;

    /// Snap both endpoints to the bounds of the unit containing the start.
    fn expand_to_enclosing_unit(&mut self, unit: TextUnit) -> Result<(), RangeError>;

    /// Move the whole range by `count` units and re-expand to the unit at
    /// the final position. Returns the number of units actually moved.
    fn move_by(&mut self, unit: TextUnit, count: i32) -> Result<i32, RangeError>;

    /// Move a single endpoint by `count` units, reordering endpoints if the
    /// move inverted them. Returns the number of units actually moved.
    fn move_endpoint_by_unit(
        &mut self,
        which: Endpoint,
        unit: TextUnit,
        count: i32,
    ) -> Result<i32, RangeError>;

    /// Move `self[which]` onto `other[other_which]`, reordering endpoints
    /// if the move inverted them.
    fn move_endpoint_by_range(
        &mut self,
        which: Endpoint,
        other: &Self,
        other_which: Endpoint,
    ) -> Result<(), RangeError>;

    /// Make this range the document selection.
    fn select(&self) -> Result<(), RangeError>;

    /// Always fails: only one selection range is supported.
    fn add_to_selection(&self) -> Result<(), RangeError>;

    /// Always fails: only one selection range is supported.
    fn remove_from_selection(&self) -> Result<(), RangeError>;

    /// Find the first occurrence of `literal` within the range, scanning
    /// backward from the range end when `backward` is set.
    fn find_text(
        &self,
        literal: &str,
        backward: bool,
        ignore_case: bool,
    ) -> Result<Option<TextRange>, RangeError>;

    /// The range's text, truncated to `max_length` characters of storage;
    /// `-1` means the whole range.
    fn text(&self, max_length: isize) -> Result<String, RangeError>;

    /// Host element enclosing this range.
    fn enclosing_element(&self) -> Result<ElementHandle, RangeError>;

    /// Embedded child elements; none exist in this model.
    fn children(&self) -> Result<Vec<ElementHandle>, RangeError>;

    /// Bounding rectangles; no layout information is exposed.
    fn bounding_rectangles(&self) -> Result<Vec<f64>, RangeError>;

    /// Scroll the host view to the line containing the range start.
    fn scroll_into_view(&self, align_to_top: bool) -> Result<(), RangeError>;

    /// Attribute search; no attribute model is implemented.
    fn find_attribute(&self, attribute: u32, backward: bool)
        -> Result<Option<TextRange>, RangeError>;

    /// Attribute lookup; always reports not supported.
    fn attribute_value(&self, attribute: u32) -> Result<AttributeValue, RangeError>;
}

/// A pair of anchors over a shared document.
///
/// Dropping a range releases both anchors from the document's table.
pub struct TextRange {
    doc: Weak<RefCell<Document>>,
    start: AnchorId,
    end: AnchorId,
}

impl TextRange {
    /// Create a range over `[start, end)`. Inverted arguments are swapped;
    /// offsets past the buffer end are rejected with `OutOfRange`.
    ///
    /// The start anchor stays before text inserted at its offset and the
    /// end anchor moves after it, so the range absorbs edits at its edges.
    pub fn new(doc: &DocumentHandle, start: usize, end: usize) -> Result<Self, RangeError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let mut d = doc.borrow_mut();
        let len = d.len();
        if end > len {
            return Err(RangeError::OutOfRange { offset: end, len });
        }
        let start_id = d.create_anchor(start, MovementPolicy::StaysBeforeInsertion)?;
        let end_id = d.create_anchor(end, MovementPolicy::MovesAfterInsertion)?;
        drop(d);
        trace!(start, end, "text range created");
        Ok(TextRange {
            doc: Rc::downgrade(doc),
            start: start_id,
            end: end_id,
        })
    }

    /// Current endpoint offsets `(start, end)`.
    pub fn offsets(&self) -> Result<(usize, usize), RangeError> {
        let doc = self.upgrade()?;
        let d = doc.borrow();
        let start = d.anchor_offset(self.start).ok_or(RangeError::NoDocument)?;
        let end = d.anchor_offset(self.end).ok_or(RangeError::NoDocument)?;
        Ok((start, end))
    }

    /// True when the range spans no text.
    pub fn is_degenerate(&self) -> Result<bool, RangeError> {
        let (start, end) = self.offsets()?;
        Ok(start == end)
    }

    fn upgrade(&self) -> Result<DocumentHandle, RangeError> {
        self.doc.upgrade().ok_or(RangeError::NoDocument)
    }

    fn anchor(&self, which: Endpoint) -> AnchorId {
        match which {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    fn same_document(&self, other: &TextRange) -> bool {
        Weak::ptr_eq(&self.doc, &other.doc)
    }

    /// Reorder the endpoints if a move inverted them. The anchors are
    /// swapped wholesale, policies included.
    fn normalize(&mut self, doc: &Document) {
        let start = doc.anchor_offset(self.start);
        let end = doc.anchor_offset(self.end);
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                std::mem::swap(&mut self.start, &mut self.end);
            }
        }
    }
}

/// Step `count` units from `pos` after collapsing to the start of the
/// enclosing unit. A step that reaches the buffer edge moves the position
/// but is not counted, so saturated moves report the lesser count.
fn move_boundary(doc: &Document, unit: TextUnit, pos: usize, count: i32) -> (usize, i32) {
    let dir = if count < 0 {
        LogicalDirection::Backward
    } else {
        LogicalDirection::Forward
    };
    let mut pos = unit_bounds(doc, unit, pos).start;
    let mut moved = 0;
    let len = doc.len();
    for _ in 0..count.unsigned_abs() {
        let next = step(doc, unit, pos, dir);
        if next == pos {
            break;
        }
        pos = next;
        if pos == 0 || pos >= len {
            break;
        }
        moved += 1;
    }
    (pos, moved)
}

impl TextRangeProvider for TextRange {
    fn try_clone(&self) -> Result<TextRange, RangeError> {
        let doc = self.upgrade()?;
        let (start, end) = self.offsets()?;
        TextRange::new(&doc, start, end)
    }

    fn equals(&self, other: &Self) -> Result<bool, RangeError> {
        if !self.same_document(other) {
            return Err(RangeError::IncompatibleRange);
        }
        let (s1, e1) = self.offsets()?;
        let (s2, e2) = other.offsets()?;
        Ok(s1 == s2 && e1 == e2)
    }

    fn compare_endpoints(
        &self,
        which: Endpoint,
        other: &Self,
        other_which: Endpoint,
    ) -> Result<isize, RangeError> {
        if !self.same_document(other) {
            return Err(RangeError::IncompatibleRange);
        }
        let doc = self.upgrade()?;
        let d = doc.borrow();
        let own = d
            .anchor_offset(self.anchor(which))
            .ok_or(RangeError::NoDocument)?;
        let theirs = d
            .anchor_offset(other.anchor(other_which))
            .ok_or(RangeError::NoDocument)?;
        Ok(own as isize - theirs as isize)
    }

    fn expand_to_enclosing_unit(&mut self, unit: TextUnit) -> Result<(), RangeError> {
        let doc = self.upgrade()?;
        let mut d = doc.borrow_mut();
        let start = d.anchor_offset(self.start).ok_or(RangeError::NoDocument)?;
        let bounds = unit_bounds(&d, unit, start);
        d.set_anchor_offset(self.start, bounds.start);
        d.set_anchor_offset(self.end, bounds.end);
        Ok(())
    }

    fn move_by(&mut self, unit: TextUnit, count: i32) -> Result<i32, RangeError> {
        let doc = self.upgrade()?;
        let mut d = doc.borrow_mut();
        let start = d.anchor_offset(self.start).ok_or(RangeError::NoDocument)?;
        let (pos, moved) = move_boundary(&d, unit, start, count);
        let bounds = unit_bounds(&d, unit, pos);
        d.set_anchor_offset(self.start, bounds.start);
        d.set_anchor_offset(self.end, bounds.end);
        Ok(moved)
    }

    fn move_endpoint_by_unit(
        &mut self,
        which: Endpoint,
        unit: TextUnit,
        count: i32,
    ) -> Result<i32, RangeError> {
        if count == 0 {
            return Ok(0);
        }
        let doc = self.upgrade()?;
        let mut d = doc.borrow_mut();
        let id = self.anchor(which);
        let offset = d.anchor_offset(id).ok_or(RangeError::NoDocument)?;
        let (pos, moved) = move_boundary(&d, unit, offset, count);
        d.set_anchor_offset(id, pos);
        self.normalize(&d);
        Ok(moved)
    }

    fn move_endpoint_by_range(
        &mut self,
        which: Endpoint,
        other: &Self,
        other_which: Endpoint,
    ) -> Result<(), RangeError> {
        if !self.same_document(other) {
            return Err(RangeError::IncompatibleRange);
        }
        let doc = self.upgrade()?;
        let mut d = doc.borrow_mut();
        let target = d
            .anchor_offset(other.anchor(other_which))
            .ok_or(RangeError::NoDocument)?;
        d.set_anchor_offset(self.anchor(which), target);
        self.normalize(&d);
        Ok(())
    }

    fn select(&self) -> Result<(), RangeError> {
        let doc = self.upgrade()?;
        let (start, end) = self.offsets()?;
        doc.borrow_mut().select(start, end);
        Ok(())
    }

    fn add_to_selection(&self) -> Result<(), RangeError> {
        let doc = self.upgrade()?;
        if !doc.borrow().supports_multiple_selections() {
            return Err(RangeError::UnsupportedOperation);
        }
        Ok(())
    }

    fn remove_from_selection(&self) -> Result<(), RangeError> {
        let doc = self.upgrade()?;
        if !doc.borrow().supports_multiple_selections() {
            return Err(RangeError::UnsupportedOperation);
        }
        Ok(())
    }

    fn find_text(
        &self,
        literal: &str,
        backward: bool,
        ignore_case: bool,
    ) -> Result<Option<TextRange>, RangeError> {
        let doc = self.upgrade()?;
        let (start, end) = self.offsets()?;
        let hit = {
            let d = doc.borrow();
            search::find_in_region(&d, literal, start..end, ignore_case, backward)
        };
        match hit {
            Some(span) => Ok(Some(TextRange::new(&doc, span.start, span.end)?)),
            None => Ok(None),
        }
    }

    fn text(&self, max_length: isize) -> Result<String, RangeError> {
        if max_length < -1 {
            return Err(RangeError::InvalidArgument("max_length must be >= -1"));
        }
        let doc = self.upgrade()?;
        let (start, end) = self.offsets()?;
        let d = doc.borrow();
        let len = end - start;
        let take = if max_length < 0 {
            len
        } else {
            len.min(max_length as usize)
        };
        let end = if take == len {
            end
        } else {
            d.floor_boundary(start + take)
        };
        Ok(d.slice_to_cow(start..end).into_owned())
    }

    fn enclosing_element(&self) -> Result<ElementHandle, RangeError> {
        let doc = self.upgrade()?;
        let element = doc.borrow().element();
        Ok(element)
    }

    fn children(&self) -> Result<Vec<ElementHandle>, RangeError> {
        self.upgrade()?;
        Ok(Vec::new())
    }

    fn bounding_rectangles(&self) -> Result<Vec<f64>, RangeError> {
        self.upgrade()?;
        Ok(Vec::new())
    }

    fn scroll_into_view(&self, _align_to_top: bool) -> Result<(), RangeError> {
        let doc = self.upgrade()?;
        let (start, _) = self.offsets()?;
        let mut d = doc.borrow_mut();
        let line = d.line_containing(start);
        d.scroll_to_line(line);
        Ok(())
    }

    fn find_attribute(
        &self,
        _attribute: u32,
        _backward: bool,
    ) -> Result<Option<TextRange>, RangeError> {
        self.upgrade()?;
        Ok(None)
    }

    fn attribute_value(&self, _attribute: u32) -> Result<AttributeValue, RangeError> {
        self.upgrade()?;
        Ok(AttributeValue::NotSupported)
    }
}

impl Drop for TextRange {
    fn drop(&mut self) {
        if let Some(doc) = self.doc.upgrade() {
            match doc.try_borrow_mut() {
                Ok(mut d) => {
                    d.release_anchor(self.start);
                    d.release_anchor(self.end);
                }
                // Dropped from inside a document borrow: the anchors stay
                // in the table until the host recreates the document.
                Err(_) => trace!("range dropped while its document was borrowed; anchors leaked"),
            }
        }
    }
}

impl std::fmt::Debug for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offsets() {
            Ok((start, end)) => write!(f, "TextRange({start}..{end})"),
            Err(_) => write!(f, "TextRange(<detached>)"),
        }
    }
}
