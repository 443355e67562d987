//! Busy label rendering
//!
//! Produces the transient label content a submitter shows while its
//! submission is in flight.

/// Label content combining the busy indicator and the message
///
/// An empty indicator yields the bare message.
pub fn render_busy_label(indicator: &str, message: &str) -> String {
    if indicator.is_empty() {
        message.to_string()
    } else {
        format!("{indicator} {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::guard::DEFAULT_BUSY_INDICATOR;

    #[test]
    fn indicator_precedes_message() {
        let label = render_busy_label(DEFAULT_BUSY_INDICATOR, "Loading…");
        assert!(label.starts_with("<span class=\"spinner-border"));
        assert!(label.ends_with("</span> Loading…"));
    }

    #[test]
    fn empty_indicator_gives_message_only() {
        assert_eq!(render_busy_label("", "Saving"), "Saving");
    }
}
