//! formguard: duplicate-submission guard and line editor for form pages
//!
//! The submission guard lets the first form submission through, cancels
//! every further one until released, and shows a blocking busy state while
//! doing so. The line editor adds and removes repeatable form rows.
//!
//! Both work against the [`platform::Document`] and
//! [`platform::LineSurface`] traits: an in-memory page ships with the crate,
//! and the `web` feature adds a browser DOM binding.

pub mod app;
pub mod config;
pub mod domain;
pub mod input;
pub mod platform;
pub mod ui;

pub use app::controller::PageController;
pub use app::guard::{SubmissionGuard, SubmitDecision};
pub use app::lines::{LineEdit, SkipReason, add_line, remove_line};
pub use app::state::{GuardState, StateMachine};
pub use config::{GuardConfig, GuardConfigError};
pub use platform::{CosmeticMutationError, Document, LineSurface};
