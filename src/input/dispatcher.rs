//! Phased delivery of submit events
//!
//! Capture listeners run first, in registration order, then bubble
//! listeners. Preventing the default action does not stop propagation, so
//! later listeners observe the cancellation instead of acting on a
//! submission that will never happen.

use tracing::trace;

use crate::input::events::{SubmitEvent, SubmitOutcome};

/// Listener phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

/// Callback receiving the document and the event being delivered
pub type SubmitListener<D> = Box<dyn FnMut(&mut D, &mut SubmitEvent)>;

/// Routes submit events to registered listeners
pub struct SubmitDispatcher<D: ?Sized> {
    capture: Vec<SubmitListener<D>>,
    bubble: Vec<SubmitListener<D>>,
}

impl<D: ?Sized> Default for SubmitDispatcher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> SubmitDispatcher<D> {
    pub fn new() -> Self {
        Self {
            capture: Vec::new(),
            bubble: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, phase: Phase, listener: SubmitListener<D>) {
        match phase {
            Phase::Capture => self.capture.push(listener),
            Phase::Bubble => self.bubble.push(listener),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.capture.len() + self.bubble.len()
    }

    /// Delivers `event` through both phases
    pub fn dispatch(&mut self, doc: &mut D, mut event: SubmitEvent) -> SubmitOutcome {
        for listener in self.capture.iter_mut() {
            listener(doc, &mut event);
        }
        for listener in self.bubble.iter_mut() {
            listener(doc, &mut event);
        }

        if event.default_prevented() {
            trace!(form = event.form.0, "submit cancelled by a listener");
            SubmitOutcome::Cancelled(event.form)
        } else {
            SubmitOutcome::Submitted(event.form)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::FormId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn capture_runs_before_bubble() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher: SubmitDispatcher<()> = SubmitDispatcher::new();

        let log = Rc::clone(&order);
        dispatcher.add_listener(
            Phase::Bubble,
            Box::new(move |_, _| log.borrow_mut().push("bubble")),
        );
        let log = Rc::clone(&order);
        dispatcher.add_listener(
            Phase::Capture,
            Box::new(move |_, _| log.borrow_mut().push("capture")),
        );

        let outcome = dispatcher.dispatch(&mut (), SubmitEvent::new(FormId(1), None));
        assert_eq!(outcome, SubmitOutcome::Submitted(FormId(1)));
        assert_eq!(*order.borrow(), vec!["capture", "bubble"]);
        assert_eq!(dispatcher.listener_count(), 2);
    }

    #[test]
    fn bubble_listener_sees_capture_cancellation() {
        let seen = Rc::new(RefCell::new(None));
        let mut dispatcher: SubmitDispatcher<()> = SubmitDispatcher::new();

        dispatcher.add_listener(Phase::Capture, Box::new(|_, event| event.prevent_default()));
        let observed = Rc::clone(&seen);
        dispatcher.add_listener(
            Phase::Bubble,
            Box::new(move |_, event| *observed.borrow_mut() = Some(event.default_prevented())),
        );

        let outcome = dispatcher.dispatch(&mut (), SubmitEvent::new(FormId(4), None));
        assert_eq!(outcome, SubmitOutcome::Cancelled(FormId(4)));
        assert_eq!(*seen.borrow(), Some(true));
    }

    #[test]
    fn listeners_get_document_access() {
        let mut dispatcher: SubmitDispatcher<Vec<u32>> = SubmitDispatcher::new();
        dispatcher.add_listener(
            Phase::Capture,
            Box::new(|doc, event| doc.push(event.form.0)),
        );
        let mut doc = Vec::new();
        dispatcher.dispatch(&mut doc, SubmitEvent::new(FormId(7), None));
        assert_eq!(doc, vec![7]);
    }

    #[test]
    fn no_listeners_submits() {
        let mut dispatcher: SubmitDispatcher<()> = SubmitDispatcher::default();
        assert!(
            dispatcher
                .dispatch(&mut (), SubmitEvent::new(FormId(0), None))
                .was_submitted()
        );
    }
}
