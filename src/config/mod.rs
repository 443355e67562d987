//! Configuration module for formguard
//!
//! Holds the guard's behaviour settings and the element selectors used by
//! the browser binding, loaded from TOML with environment overrides.

pub mod guard;

pub use guard::{DEFAULT_MESSAGE, GuardConfig, GuardConfigError, Selectors};
