/*!
 * # Editing Core Module
 *
 * The model behind text-pattern automation queries: an editable buffer plus
 * anchored ranges that stay valid while the buffer changes underneath them.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The entire document is stored in a single **`xi_rope::Rope`** buffer
 * - Offsets everywhere in the crate are byte offsets on UTF-8 character
 *   boundaries
 * - Saving writes rope bytes verbatim, line endings included
 *
 * ### 2. Command-Based Editing
 * - All edits are represented as **Commands** (`Cmd` enum) that compile to
 *   rope **Deltas**
 * - Each applied command produces a `Patch` describing the changed span,
 *   the transformed selection, and the new document version
 *
 * ### 3. Stable Positions via Anchors
 * - **Anchors** are stable text positions that survive edits; the document's
 *   `AnchorTable` recomputes every live anchor on each edit
 * - A `MovementPolicy` decides which side of an insertion landing exactly on
 *   the anchor the anchor ends up on
 *
 * ### 4. Ranges as the Query Surface
 * - A **`TextRange`** is a pair of anchors plus a weak document reference;
 *   the `TextRangeProvider` trait carries navigation (`move_by`,
 *   `expand_to_enclosing_unit`), comparison, literal search, text
 *   extraction and selection
 * - Navigation is expressed in **`TextUnit`s** (character, word, line,
 *   paragraph, document); movement saturates at the buffer bounds instead
 *   of failing
 *
 * ## Module Structure
 *
 * - **`document`**: the `Document` type owning the rope, selection, view
 *   state and anchor table
 * - **`commands`**: `Cmd` enum and delta compilation for all edit operations
 * - **`anchors`**: the anchor table with per-edit offset transformation
 * - **`range`**: `TextRange` and the `TextRangeProvider` trait
 * - **`units`**: unit boundary resolution and stepping
 * - **`classify`**: character classification feeding the word unit
 * - **`search`**: literal search bounded to a document region
 * - **`patch`**: edit result metadata
 * - **`error`**: the `RangeError` failure taxonomy
 *
 * ## Usage Pattern
 *
 * ```rust
 * use textpattern_engine::editing::*;
 *
 * // 1. Create a shared document; ranges hold weak references to it
 * let doc = Document::shared("Say Hello World");
 *
 * // 2. Build a range and navigate it by unit
 * let mut range = TextRange::new(&doc, 4, 4).unwrap();
 * range.expand_to_enclosing_unit(TextUnit::Word).unwrap();
 * assert_eq!(range.text(-1).unwrap(), "Hello");
 *
 * // 3. Edit the document; the range follows the text it spans
 * doc.borrow_mut().apply(Cmd::InsertText { at: 0, text: ">> ".to_string() });
 * assert_eq!(range.text(-1).unwrap(), "Hello");
 * assert_eq!(range.offsets().unwrap(), (7, 12));
 *
 * // 4. Search inside the range and drive the selection
 * let len = doc.borrow().len();
 * let full = TextRange::new(&doc, 0, len).unwrap();
 * let hit = full.find_text("world", false, true).unwrap().unwrap();
 * hit.select().unwrap();
 * ```
 */

pub mod anchors;
pub mod classify;
pub mod commands;
pub mod document;
pub mod error;
pub mod patch;
pub mod range;
pub mod search;
pub mod units;

// Public API re-exports
pub use anchors::{AnchorId, MovementPolicy};
pub use commands::Cmd;
pub use document::{Document, DocumentHandle, ElementHandle, LineSpan, ViewState, VisualLine};
pub use error::RangeError;
pub use patch::Patch;
pub use range::{AttributeValue, Endpoint, TextRange, TextRangeProvider};
pub use units::{unit_bounds, TextUnit};
