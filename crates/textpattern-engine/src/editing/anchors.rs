//! Stable text positions that survive edits.
//!
//! The [`AnchorTable`] owns every anchor; the rest of the crate refers to
//! anchors only through [`AnchorId`], a generational index into the table.
//! On every buffer edit the table recomputes each live anchor's offset so
//! that text logically on one side of the anchor stays on that side. The
//! table is the sole writer of anchor offsets.

use tracing::trace;

/// Tie-break rule for an insertion that lands exactly on an anchor's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPolicy {
    /// The anchor keeps its pre-insertion offset; inserted text appears
    /// after it.
    StaysBeforeInsertion,
    /// The anchor advances by the inserted length; inserted text appears
    /// before it.
    MovesAfterInsertion,
}

/// Handle to an anchor owned by an [`AnchorTable`].
///
/// Ids are generational: once an anchor is released, its id goes stale and
/// a later anchor reusing the slot gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    offset: usize,
    policy: MovementPolicy,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    anchor: Option<Anchor>,
}

/// Arena of live anchors, updated in place on every edit.
#[derive(Debug, Clone, Default)]
pub struct AnchorTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live anchors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.anchor.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a new anchor. Offset validation against the buffer length is
    /// the document's job; the table accepts whatever it is given.
    pub(crate) fn insert(&mut self, offset: usize, policy: MovementPolicy) -> AnchorId {
        let anchor = Anchor { offset, policy };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.anchor = Some(anchor);
                AnchorId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    anchor: Some(anchor),
                });
                AnchorId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Current offset of an anchor, or `None` if the id is stale.
    pub fn offset(&self, id: AnchorId) -> Option<usize> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.anchor.as_ref().map(|a| a.offset)
    }

    /// Movement policy of an anchor, or `None` if the id is stale.
    pub fn policy(&self, id: AnchorId) -> Option<MovementPolicy> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.anchor.as_ref().map(|a| a.policy)
    }

    /// Move an anchor to a new offset. No-op on stale ids.
    pub(crate) fn set_offset(&mut self, id: AnchorId, offset: usize) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation {
                if let Some(anchor) = slot.anchor.as_mut() {
                    anchor.offset = offset;
                }
            }
        }
    }

    /// Drop the table's bookkeeping for an anchor. Idempotent: releasing an
    /// already-released id does nothing.
    pub fn release(&mut self, id: AnchorId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.anchor.is_some() {
                slot.anchor = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    /// Recompute every live anchor after a single edit, reported as
    /// `removed` bytes replaced by `inserted` bytes at `edit_offset`.
    ///
    /// An anchor strictly before the edit is untouched; one at or past the
    /// removed span shifts by the length difference; one inside the removed
    /// span is clamped to the edit offset and then resolved by its movement
    /// policy, as is a pure insertion landing exactly on the anchor.
    pub(crate) fn on_edit(&mut self, edit_offset: usize, removed: usize, inserted: usize) {
        for slot in &mut self.slots {
            let Some(anchor) = slot.anchor.as_mut() else {
                continue;
            };
            anchor.offset = if removed == 0 && anchor.offset == edit_offset {
                match anchor.policy {
                    MovementPolicy::StaysBeforeInsertion => anchor.offset,
                    MovementPolicy::MovesAfterInsertion => anchor.offset + inserted,
                }
            } else if anchor.offset <= edit_offset {
                anchor.offset
            } else if anchor.offset >= edit_offset + removed {
                anchor.offset - removed + inserted
            } else {
                // Anchor sat inside the removed span: clamp to the edit
                // offset, then let the policy place it relative to the
                // replacement text.
                match anchor.policy {
                    MovementPolicy::StaysBeforeInsertion => edit_offset,
                    MovementPolicy::MovesAfterInsertion => edit_offset + inserted,
                }
            };
        }
        trace!(edit_offset, removed, inserted, "anchors transformed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ Insertion tie-break tests ============

    #[test]
    fn test_insertion_at_anchor_stays_before() {
        // "hello world", anchor at 5, insert "XYZ" at 5
        let mut table = AnchorTable::new();
        let id = table.insert(5, MovementPolicy::StaysBeforeInsertion);

        table.on_edit(5, 0, 3);

        assert_eq!(table.offset(id), Some(5), "anchor should keep offset 5");
    }

    #[test]
    fn test_insertion_at_anchor_moves_after() {
        let mut table = AnchorTable::new();
        let id = table.insert(5, MovementPolicy::MovesAfterInsertion);

        table.on_edit(5, 0, 3);

        assert_eq!(table.offset(id), Some(8), "anchor should advance to 8");
    }

    // ============ Shift tests ============

    #[test]
    fn test_anchor_before_edit_is_unchanged() {
        let mut table = AnchorTable::new();
        let id = table.insert(2, MovementPolicy::MovesAfterInsertion);

        table.on_edit(5, 3, 10);

        assert_eq!(table.offset(id), Some(2));
    }

    #[test]
    fn test_anchor_after_edit_shifts_by_delta() {
        let mut table = AnchorTable::new();
        let grows = table.insert(10, MovementPolicy::StaysBeforeInsertion);

        // Replace 2 bytes at 4 with 6 bytes: net +4
        table.on_edit(4, 2, 6);
        assert_eq!(table.offset(grows), Some(14));

        // Delete 4 bytes at 0: net -4
        table.on_edit(0, 4, 0);
        assert_eq!(table.offset(grows), Some(10));
    }

    #[test]
    fn test_anchor_at_start_of_deleted_span_is_unchanged() {
        let mut table = AnchorTable::new();
        let id = table.insert(5, MovementPolicy::MovesAfterInsertion);

        // Deleting [5, 8) does not move an anchor sitting at 5
        table.on_edit(5, 3, 0);

        assert_eq!(table.offset(id), Some(5));
    }

    #[test]
    fn test_anchor_inside_deleted_span_clamps_by_policy() {
        let mut table = AnchorTable::new();
        let before = table.insert(6, MovementPolicy::StaysBeforeInsertion);
        let after = table.insert(7, MovementPolicy::MovesAfterInsertion);

        // Replace [4, 9) with 2 bytes
        table.on_edit(4, 5, 2);

        assert_eq!(
            table.offset(before),
            Some(4),
            "stays-before anchor clamps to the edit offset"
        );
        assert_eq!(
            table.offset(after),
            Some(6),
            "moves-after anchor lands past the replacement"
        );
    }

    // ============ Lifecycle tests ============

    #[test]
    fn test_release_is_idempotent() {
        let mut table = AnchorTable::new();
        let id = table.insert(3, MovementPolicy::StaysBeforeInsertion);

        table.release(id);
        table.release(id);

        assert_eq!(table.offset(id), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_stale_id_does_not_see_slot_reuse() {
        let mut table = AnchorTable::new();
        let old = table.insert(3, MovementPolicy::StaysBeforeInsertion);
        table.release(old);

        let new = table.insert(9, MovementPolicy::MovesAfterInsertion);

        assert_eq!(table.offset(old), None, "released id must stay dead");
        assert_eq!(table.offset(new), Some(9));
        assert_ne!(old, new);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_set_offset_ignores_stale_id() {
        let mut table = AnchorTable::new();
        let old = table.insert(3, MovementPolicy::StaysBeforeInsertion);
        table.release(old);
        let new = table.insert(4, MovementPolicy::StaysBeforeInsertion);

        table.set_offset(old, 99);

        assert_eq!(table.offset(new), Some(4));
    }

    #[test]
    fn test_policy_lookup() {
        let mut table = AnchorTable::new();
        let a = table.insert(0, MovementPolicy::StaysBeforeInsertion);
        let b = table.insert(0, MovementPolicy::MovesAfterInsertion);

        assert_eq!(table.policy(a), Some(MovementPolicy::StaysBeforeInsertion));
        assert_eq!(table.policy(b), Some(MovementPolicy::MovesAfterInsertion));
    }
}
