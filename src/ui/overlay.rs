//! Blocking loading overlay
//!
//! In-memory model of the page-level overlay element. The message
//! sub-element is optional; without it the overlay still shows, only the
//! text update is skipped.

/// Overlay element with an optional message slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOverlay {
    visible: bool,
    /// Text of the message sub-element, `None` when the element is missing
    message: Option<String>,
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingOverlay {
    /// Hidden overlay with an empty message element
    pub fn new() -> Self {
        Self {
            visible: false,
            message: Some(String::new()),
        }
    }

    /// Hidden overlay without a message sub-element
    pub fn without_message_element() -> Self {
        Self {
            visible: false,
            message: None,
        }
    }

    /// Shows the overlay and writes `message` into the message element
    pub fn show(&mut self, message: &str) {
        if let Some(slot) = self.message.as_mut() {
            slot.clear();
            slot.push_str(message);
        }
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn has_message_element(&self) -> bool {
        self.message.is_some()
    }
}
