//! Page controller and coordination layer
//!
//! The controller wires the submission guard into a document: it owns the
//! document, registers the guard as the first capture-phase submit
//! listener, routes delegated clicks to the line editor and exposes the
//! programmatic `show_loading` / `hide_loading` pair.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::app::guard::SubmissionGuard;
use crate::app::lines::{self, LineEdit};
use crate::config::GuardConfig;
use crate::domain::ControlId;
use crate::input::{
    ClickTarget, FormId, Phase, SubmitDispatcher, SubmitEvent, SubmitListener, SubmitOutcome,
};
use crate::platform::{Document, LineSurface};

/// Main page controller
///
/// Single-threaded: the guard is shared with its capture listener through
/// `Rc<RefCell<_>>`, never across threads.
pub struct PageController<D: 'static> {
    document: D,
    guard: Rc<RefCell<SubmissionGuard>>,
    dispatcher: SubmitDispatcher<D>,
}

impl<D> PageController<D>
where
    D: Document + LineSurface + 'static,
{
    /// Creates a controller and installs the guard's capture listener
    pub fn new(document: D, config: GuardConfig) -> Self {
        let guard = Rc::new(RefCell::new(SubmissionGuard::new(config)));
        let mut dispatcher = SubmitDispatcher::new();

        let listener_guard = Rc::clone(&guard);
        dispatcher.add_listener(
            Phase::Capture,
            Box::new(move |doc: &mut D, event: &mut SubmitEvent| {
                match listener_guard.try_borrow_mut() {
                    Ok(mut guard) => {
                        guard.handle_submit(doc, event);
                    }
                    Err(_) => {
                        // A submit fired from inside a guard operation
                        warn!(form = event.form.0, "re-entrant submit cancelled");
                        event.prevent_default();
                    }
                }
            }),
        );

        Self {
            document,
            guard,
            dispatcher,
        }
    }

    /// Registers another submit handler of the page
    ///
    /// Handlers run after the guard's capture listener, so they already see
    /// a suppressed submission as cancelled.
    pub fn add_submit_listener(&mut self, phase: Phase, listener: SubmitListener<D>) {
        self.dispatcher.add_listener(phase, listener);
    }

    /// Fires a submit event for `form`
    ///
    /// The native submission runs only if no listener cancelled it.
    pub fn submit(&mut self, form: FormId, submitter: Option<ControlId>) -> SubmitOutcome {
        let outcome = self
            .dispatcher
            .dispatch(&mut self.document, SubmitEvent::new(form, submitter));
        if let SubmitOutcome::Submitted(form) = outcome {
            debug!(form = form.0, "submission proceeds");
            self.document.native_submit(form);
        }
        outcome
    }

    /// Delegated click handling for the line editor
    ///
    /// # Returns
    /// The line edit performed, or None when the click is not a line trigger
    pub fn click(&mut self, target: ClickTarget<D::RowKey>) -> Option<LineEdit<D::RowKey>> {
        match target {
            ClickTarget::AddLine => Some(lines::add_line(&mut self.document)),
            ClickTarget::RemoveLine(row) => Some(lines::remove_line(&mut self.document, &row)),
            ClickTarget::Other => None,
        }
    }

    /// Enters the busy state on behalf of an external caller
    pub fn show_loading(&mut self, message: Option<&str>, submitter: Option<ControlId>) {
        match self.guard.try_borrow_mut() {
            Ok(mut guard) => guard.enter_busy(&mut self.document, message, submitter),
            Err(_) => warn!("show_loading called during a guard operation; ignored"),
        }
    }

    /// Releases the busy state on behalf of an external caller
    pub fn hide_loading(&mut self) {
        match self.guard.try_borrow_mut() {
            Ok(mut guard) => guard.exit_busy(&mut self.document),
            Err(_) => warn!("hide_loading called during a guard operation; ignored"),
        }
    }

    /// Gives the guard a chance to release a cycle past its timeout
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.guard.try_borrow_mut() {
            Ok(mut guard) => guard.check_timeout(&mut self.document, now),
            Err(_) => false,
        }
    }

    pub fn guard(&self) -> Ref<'_, SubmissionGuard> {
        self.guard.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.borrow().is_busy()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }
}
