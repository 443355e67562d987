//! Domain data structures
//!
//! Pure types for controls, snapshots and line rows. Nothing here knows
//! about a document or a browser.

pub mod control;
pub mod line;

pub use control::{
    Control, ControlId, ControlKind, ControlSnapshot, ControlTagger, SnapshotTable, TagAssignment,
};
pub use line::{InputKind, LineInput, LineRow, RowId};
