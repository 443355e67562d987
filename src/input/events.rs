//! Page events the guard and the line editor react to

use crate::domain::{ControlId, RowId};

/// Identifier of a form on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(pub u32);

/// A form submission on its way to the browser's default action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    pub form: FormId,
    /// Submitter reported by the platform, if any
    pub submitter: Option<ControlId>,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: FormId, submitter: Option<ControlId>) -> Self {
        Self {
            form,
            submitter,
            default_prevented: false,
        }
    }

    /// Cancels the native submission
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget<K = RowId> {
    /// The "add line" trigger
    AddLine,
    /// The "remove" trigger inside the given row
    RemoveLine(K),
    /// Anything else
    Other,
}

/// Outcome of delivering a submit event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The default action ran: the form was submitted
    Submitted(FormId),
    /// A listener prevented the default action
    Cancelled(FormId),
}

impl SubmitOutcome {
    pub fn was_submitted(self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}
