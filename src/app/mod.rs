//! Application orchestration layer
//!
//! This module holds the guard's state machine, the guard itself, the line
//! editor operations and the controller that wires them into a document.

pub mod controller;
pub mod guard;
pub mod lines;
pub mod state;
