//! Submission guard
//!
//! Intercepts form submissions, lets the first one through and cancels
//! every other one until the busy state is released. While busy, the
//! overlay is shown, every interactive control is disabled and the
//! submitter carries a busy label. Releasing restores each control to
//! exactly what it was before the cycle started.
//!
//! Cosmetic failures on the document are logged and swallowed: they never
//! block a submission and never leave the guard stuck busy.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::app::state::{BusySession, GuardEvent, GuardState, StateMachine, Transition};
use crate::config::GuardConfig;
use crate::domain::{ControlId, ControlKind, ControlSnapshot, SnapshotTable};
use crate::input::SubmitEvent;
use crate::platform::{CosmeticMutationError, Document};
use crate::ui::render_busy_label;

/// Whether a submission may reach the browser's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    Allowed,
    Suppressed,
}

/// Busy state machine plus the snapshot table it owns
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    config: GuardConfig,
    state: GuardState,
    snapshots: SnapshotTable,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl SubmissionGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            state: GuardState::Idle,
            snapshots: SnapshotTable::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn snapshot_for(&self, id: ControlId) -> Option<&ControlSnapshot> {
        self.snapshots.get(id)
    }

    /// Number of controls waiting to be restored
    pub fn pending_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Capture-phase submit handling
    ///
    /// Cancels `event` when a submission is already in flight. Otherwise
    /// resolves the submitter (platform-reported first, focused control
    /// second), picks its declarative message and enters the busy state,
    /// leaving the default action alone.
    pub fn handle_submit<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        event: &mut SubmitEvent,
    ) -> SubmitDecision {
        if StateMachine::process_event(&self.state, GuardEvent::Submit) == Transition::Suppress {
            event.prevent_default();
            info!(form = event.form.0, "duplicate submission suppressed");
            return SubmitDecision::Suppressed;
        }

        let submitter = event.submitter.or_else(|| doc.focused_control());
        let message =
            submitter.and_then(|id| doc.attribute(id, &self.config.message_attribute));
        self.enter_busy(doc, message.as_deref(), submitter);
        SubmitDecision::Allowed
    }

    /// Shows the busy state
    ///
    /// From idle this starts a cycle. While already busy it covers controls
    /// added since, without touching snapshots captured earlier in the
    /// cycle; a new message replaces the shown one, an absent one keeps it.
    pub fn enter_busy<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        message: Option<&str>,
        submitter: Option<ControlId>,
    ) {
        let message = match StateMachine::process_event(&self.state, GuardEvent::ShowRequested) {
            Transition::EnterBusy => {
                let message = self.config.resolve_message(message);
                debug!(%message, submitter = ?submitter, "entering busy state");
                let started = self.config.busy_timeout().map(|_| Instant::now());
                self.state =
                    GuardState::Busy(BusySession::new(message.clone(), submitter, started));
                message
            }
            Transition::RefreshBusy => {
                let GuardState::Busy(session) = &mut self.state else {
                    return;
                };
                if let Some(text) = message.filter(|text| !text.is_empty()) {
                    session.message = text.to_string();
                }
                if session.submitter.is_none() {
                    session.submitter = submitter;
                }
                debug!(message = %session.message, "refreshing busy state");
                session.message.clone()
            }
            _ => return,
        };

        self.apply_busy(doc, &message, submitter);
    }

    /// Releases the busy state and restores every snapshotted control
    ///
    /// Idempotent: with nothing outstanding it changes nothing.
    pub fn exit_busy<D: Document + ?Sized>(&mut self, doc: &mut D) {
        self.release(doc, GuardEvent::ReleaseRequested);
    }

    /// Releases a busy cycle that outlived the configured timeout
    ///
    /// # Returns
    /// true if a cycle was released
    pub fn check_timeout<D: Document + ?Sized>(&mut self, doc: &mut D, now: Instant) -> bool {
        let Some(timeout) = self.config.busy_timeout() else {
            return false;
        };
        let expired = self
            .state
            .session()
            .is_some_and(|session| session.is_timed_out(timeout, now));
        if !expired {
            return false;
        }

        warn!(
            timeout_ms = timeout.as_millis() as u64,
            "busy cycle was never released; releasing after timeout"
        );
        self.expire(doc)
    }

    /// Releases the current cycle because its time ran out
    ///
    /// For hosts that keep time themselves, such as a browser timer.
    ///
    /// # Returns
    /// true if a cycle was released
    pub fn expire<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        self.release(doc, GuardEvent::TimedOut)
    }

    fn apply_busy<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        message: &str,
        submitter: Option<ControlId>,
    ) {
        if doc.has_overlay() {
            swallow(doc.show_overlay(message), "showing overlay");
        } else {
            debug!("no overlay element; skipping busy display");
        }

        for id in doc.controls() {
            let Some(disabled) = doc.is_disabled(id) else {
                continue;
            };
            self.snapshots.capture_disabled(id, disabled);
            swallow(doc.set_disabled(id, true), "disabling control");
        }

        if let Some(id) = submitter {
            self.label_submitter(doc, id, message);
        }
    }

    fn label_submitter<D: Document + ?Sized>(&mut self, doc: &mut D, id: ControlId, message: &str) {
        if !doc.control_kind(id).is_some_and(ControlKind::is_labeled) {
            return;
        }
        if !self.snapshots.contains(id) {
            debug!(control = %id, "submitter is not a managed control; label left alone");
            return;
        }
        let Some(current) = doc.label(id) else {
            return;
        };

        let captured = self.snapshots.capture_label(id, current);
        let busy_label = render_busy_label(&self.config.busy_indicator, message);
        if let Err(err) = doc.set_label(id, &busy_label) {
            warn!(control = %id, error = %err, "busy label not applied; continuing");
            if captured {
                self.snapshots.discard_label(id);
            }
        }
    }

    fn release<D: Document + ?Sized>(&mut self, doc: &mut D, event: GuardEvent) -> bool {
        if StateMachine::process_event(&self.state, event) != Transition::ExitBusy {
            return false;
        }

        let was_busy = self.state.is_busy();
        self.state = GuardState::Idle;

        if doc.overlay_visible() {
            swallow(doc.hide_overlay(), "hiding overlay");
        }

        let snapshots = self.snapshots.drain();
        if was_busy {
            debug!(restored = snapshots.len(), "leaving busy state");
        }

        for (id, snapshot) in snapshots {
            if doc.is_disabled(id).is_none() {
                debug!(control = %id, "control left the document during the busy cycle");
                continue;
            }
            if let Some(label) = snapshot.original_label.as_deref() {
                swallow(doc.set_label(id, label), "restoring label");
            }
            if snapshot.should_enable_on_restore() {
                swallow(doc.set_disabled(id, false), "re-enabling control");
            }
        }

        was_busy
    }
}

fn swallow(result: Result<(), CosmeticMutationError>, action: &'static str) {
    if let Err(err) = result {
        warn!(error = %err, "{action} failed; continuing");
    }
}
