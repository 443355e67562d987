//! Guard state management
//!
//! Defines the two-state busy machine and the transitions between its
//! states. The machine only decides; applying a decision to the document is
//! the guard's job.

use std::time::{Duration, Instant};

use crate::domain::ControlId;

/// Guard state - either idle or guarding a submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GuardState {
    /// No submission in flight
    #[default]
    Idle,
    /// A submission is being guarded
    Busy(BusySession),
}

impl GuardState {
    pub fn is_busy(&self) -> bool {
        matches!(self, GuardState::Busy(_))
    }

    pub fn session(&self) -> Option<&BusySession> {
        match self {
            GuardState::Busy(session) => Some(session),
            GuardState::Idle => None,
        }
    }
}

/// Data carried while busy
///
/// Lives for exactly one busy cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusySession {
    /// Message shown on the overlay and the submitter's label
    pub message: String,
    /// Control that started the cycle, if it could be determined
    pub submitter: Option<ControlId>,
    /// Start time, recorded only when a busy timeout is configured
    pub started: Option<Instant>,
}

impl BusySession {
    pub fn new(message: String, submitter: Option<ControlId>, started: Option<Instant>) -> Self {
        Self {
            message,
            submitter,
            started,
        }
    }

    /// Whether this cycle has been busy for at least `timeout` at `now`
    pub fn is_timed_out(&self, timeout: Duration, now: Instant) -> bool {
        self.started
            .is_some_and(|started| now.saturating_duration_since(started) >= timeout)
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardEvent {
    /// A form submission reached the capture listener
    Submit,
    /// An external caller asked to show the busy state
    ShowRequested,
    /// An external caller asked to release the busy state
    ReleaseRequested,
    /// The configured busy timeout elapsed
    TimedOut,
}

/// What the guard must do in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Busy; the submission (if any) proceeds
    EnterBusy,
    /// Busy -> Busy; the submission is cancelled and nothing else happens
    Suppress,
    /// Busy -> Busy; refresh message and cover newly added controls
    RefreshBusy,
    /// Busy -> Idle; restore every snapshot
    ExitBusy,
    /// No state change
    Ignore,
}

/// State machine for guard transitions
pub struct StateMachine;

impl StateMachine {
    /// Decides the transition for `event` in `current_state`
    pub fn process_event(current_state: &GuardState, event: GuardEvent) -> Transition {
        match (current_state, event) {
            (GuardState::Idle, GuardEvent::Submit) => Transition::EnterBusy,
            (GuardState::Idle, GuardEvent::ShowRequested) => Transition::EnterBusy,

            // Release is idempotent; the guard still sweeps leftovers
            (GuardState::Idle, GuardEvent::ReleaseRequested) => Transition::ExitBusy,
            (GuardState::Idle, GuardEvent::TimedOut) => Transition::Ignore,

            (GuardState::Busy(_), GuardEvent::Submit) => Transition::Suppress,
            (GuardState::Busy(_), GuardEvent::ShowRequested) => Transition::RefreshBusy,
            (GuardState::Busy(_), GuardEvent::ReleaseRequested) => Transition::ExitBusy,
            (GuardState::Busy(_), GuardEvent::TimedOut) => Transition::ExitBusy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> GuardState {
        GuardState::Busy(BusySession::new("Loading…".into(), None, None))
    }

    #[test]
    fn default_state_is_idle() {
        let state = GuardState::default();
        assert!(!state.is_busy());
        assert!(state.session().is_none());
    }

    #[test]
    fn submit_from_idle_enters_busy() {
        assert_eq!(
            StateMachine::process_event(&GuardState::Idle, GuardEvent::Submit),
            Transition::EnterBusy
        );
    }

    #[test]
    fn submit_while_busy_is_suppressed() {
        assert_eq!(
            StateMachine::process_event(&busy(), GuardEvent::Submit),
            Transition::Suppress
        );
    }

    #[test]
    fn show_request_enters_or_refreshes() {
        assert_eq!(
            StateMachine::process_event(&GuardState::Idle, GuardEvent::ShowRequested),
            Transition::EnterBusy
        );
        assert_eq!(
            StateMachine::process_event(&busy(), GuardEvent::ShowRequested),
            Transition::RefreshBusy
        );
    }

    #[test]
    fn release_is_accepted_in_both_states() {
        assert_eq!(
            StateMachine::process_event(&busy(), GuardEvent::ReleaseRequested),
            Transition::ExitBusy
        );
        assert_eq!(
            StateMachine::process_event(&GuardState::Idle, GuardEvent::ReleaseRequested),
            Transition::ExitBusy
        );
    }

    #[test]
    fn timeout_only_matters_while_busy() {
        assert_eq!(
            StateMachine::process_event(&busy(), GuardEvent::TimedOut),
            Transition::ExitBusy
        );
        assert_eq!(
            StateMachine::process_event(&GuardState::Idle, GuardEvent::TimedOut),
            Transition::Ignore
        );
    }

    #[test]
    fn session_timeout_needs_start_time() {
        let now = Instant::now();
        let untimed = BusySession::new("x".into(), None, None);
        assert!(!untimed.is_timed_out(Duration::from_millis(1), now + Duration::from_secs(60)));

        let timed = BusySession::new("x".into(), None, Some(now));
        assert!(!timed.is_timed_out(Duration::from_secs(30), now + Duration::from_secs(29)));
        assert!(timed.is_timed_out(Duration::from_secs(30), now + Duration::from_secs(30)));
        assert!(!timed.is_timed_out(Duration::from_secs(1), now));
    }
}
