pub mod dispatcher;
pub mod events;

pub use dispatcher::{Phase, SubmitDispatcher, SubmitListener};
pub use events::{ClickTarget, FormId, SubmitEvent, SubmitOutcome};
