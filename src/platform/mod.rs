//! Document abstraction
//!
//! The guard and the line editor never touch a concrete document. They go
//! through the traits below, implemented by the in-memory [`memory::Page`]
//! and, with the `web` feature, by the browser DOM.

pub mod memory;
#[cfg(feature = "web")]
pub mod web;

use thiserror::Error;

use crate::domain::{ControlId, ControlKind, InputKind};
use crate::input::FormId;

/// A cosmetic change to the document that could not be applied
///
/// The guard catches every one of these; they never reach its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CosmeticMutationError {
    #[error("Control {0} is no longer in the document")]
    ControlNotFound(ControlId),

    #[error("Overlay element is not available")]
    OverlayUnavailable,

    #[error("Document rejected {what}: {reason}")]
    Rejected { what: &'static str, reason: String },
}

/// What the submission guard needs from a document
pub trait Document {
    /// Every interactive control currently in the document, in document order
    fn controls(&self) -> Vec<ControlId>;

    fn control_kind(&self, id: ControlId) -> Option<ControlKind>;

    /// Disabled flag of `id`, `None` when the control is gone
    fn is_disabled(&self, id: ControlId) -> Option<bool>;

    fn set_disabled(&mut self, id: ControlId, disabled: bool) -> Result<(), CosmeticMutationError>;

    /// Label content of a push-button or value of a submit input
    fn label(&self, id: ControlId) -> Option<String>;

    fn set_label(&mut self, id: ControlId, label: &str) -> Result<(), CosmeticMutationError>;

    fn attribute(&self, id: ControlId, name: &str) -> Option<String>;

    /// The focused element, if it is an interactive control
    fn focused_control(&self) -> Option<ControlId>;

    fn has_overlay(&self) -> bool;

    fn overlay_visible(&self) -> bool;

    /// Reveals the overlay with `message`; a missing message element only
    /// skips the text
    fn show_overlay(&mut self, message: &str) -> Result<(), CosmeticMutationError>;

    fn hide_overlay(&mut self) -> Result<(), CosmeticMutationError>;

    /// Runs the default action of an allowed submission
    ///
    /// A browser performs it on its own once the event finishes.
    fn native_submit(&mut self, _form: FormId) {}
}

/// What the line editor needs from a document
pub trait LineSurface {
    /// A detached row, ready to be inserted
    type Row;
    /// Handle to a row living in the container
    type RowKey;

    /// Number of rows in the container, `None` without a container
    fn row_count(&self) -> Option<usize>;

    /// Deep copy of the first row, not yet attached
    fn clone_first_row(&self) -> Option<Self::Row>;

    /// Sets every input of `row` to the value chosen for its kind
    fn reset_inputs(&self, row: &mut Self::Row, value_for: fn(&InputKind) -> &'static str);

    /// Appends `row` to the container
    fn append_row(&mut self, row: Self::Row) -> Option<Self::RowKey>;

    fn contains_row(&self, key: &Self::RowKey) -> bool;

    fn remove_row(&mut self, key: &Self::RowKey) -> bool;
}
