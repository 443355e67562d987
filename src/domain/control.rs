//! Interactive controls and the snapshots kept for them
//!
//! Controls are the buttons and submit inputs the guard disables while a
//! submission is in flight. A snapshot records what a control looked like
//! before the guard touched it so it can be restored exactly.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable identifier of an interactive control within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u32);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two control shapes the guard manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// A push-button with label content that can be swapped out
    PushButton,
    /// A bare submit input; only its value is shown, never relabeled
    SubmitInput,
}

impl ControlKind {
    /// Whether the guard may replace this control's label while busy
    pub fn is_labeled(self) -> bool {
        matches!(self, ControlKind::PushButton)
    }
}

/// An interactive control as held by an in-memory document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    pub disabled: bool,
    /// Label content for push-buttons, value for submit inputs
    pub label: String,
    /// Declarative attributes such as `data-loading`
    pub attributes: BTreeMap<String, String>,
}

impl Control {
    /// Creates an enabled push-button with the given label content
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::PushButton,
            disabled: false,
            label: label.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates an enabled submit input showing `value`
    pub fn submit_input(value: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::SubmitInput,
            disabled: false,
            label: value.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Marks the control as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Adds a declarative attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// What to do with one element's id tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAssignment {
    /// The element's tag is its own; keep it
    Keep(ControlId),
    /// Untagged, or the tag is already held by an earlier element
    Retag(ControlId),
}

impl TagAssignment {
    pub fn id(self) -> ControlId {
        match self {
            TagAssignment::Keep(id) | TagAssignment::Retag(id) => id,
        }
    }
}

/// Hands out control ids for documents that store them on the elements
///
/// Tags travel with copied markup, so two elements can claim the same id.
/// The first one in document order keeps it; later claimants get a fresh id.
#[derive(Debug, Clone, Default)]
pub struct ControlTagger {
    next: u32,
}

impl ControlTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id
    pub fn fresh(&mut self) -> ControlId {
        let id = ControlId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Resolves the tags found on a document's controls, in document order
    pub fn assign(&mut self, tags: &[Option<u32>]) -> Vec<TagAssignment> {
        if let Some(highest) = tags.iter().flatten().max() {
            self.next = self.next.max(highest.saturating_add(1));
        }

        let mut claimed = BTreeSet::new();
        tags.iter()
            .map(|tag| match tag {
                Some(id) if claimed.insert(*id) => TagAssignment::Keep(ControlId(*id)),
                _ => {
                    let id = self.fresh();
                    claimed.insert(id.0);
                    TagAssignment::Retag(id)
                }
            })
            .collect()
    }
}

/// Pre-busy state of one control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    /// Whether the control was already disabled before the guard touched it
    pub original_disabled: bool,
    /// Original label content, present only while the label is replaced
    pub original_label: Option<String>,
}

impl ControlSnapshot {
    pub fn new(original_disabled: bool) -> Self {
        Self {
            original_disabled,
            original_label: None,
        }
    }

    /// Whether releasing this snapshot should re-enable the control
    pub fn should_enable_on_restore(&self) -> bool {
        !self.original_disabled
    }
}

/// Snapshots for every control touched during the current busy cycle
///
/// First capture wins: once a control has a snapshot, later captures in
/// the same cycle leave it alone so the true original state survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotTable {
    entries: BTreeMap<ControlId, ControlSnapshot>,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the disabled flag of `id` unless it is already recorded
    ///
    /// # Returns
    /// true if a new snapshot was created
    pub fn capture_disabled(&mut self, id: ControlId, disabled: bool) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, ControlSnapshot::new(disabled));
        true
    }

    /// Records the label of `id` unless a label is already recorded
    ///
    /// Only controls that already carry a disabled snapshot can record a
    /// label; anything else is not managed by this cycle.
    ///
    /// # Returns
    /// true if the label was recorded now
    pub fn capture_label(&mut self, id: ControlId, label: String) -> bool {
        match self.entries.get_mut(&id) {
            Some(snapshot) if snapshot.original_label.is_none() => {
                snapshot.original_label = Some(label);
                true
            }
            _ => false,
        }
    }

    /// Forgets a recorded label without touching the disabled snapshot
    pub fn discard_label(&mut self, id: ControlId) {
        if let Some(snapshot) = self.entries.get_mut(&id) {
            snapshot.original_label = None;
        }
    }

    pub fn get(&self, id: ControlId) -> Option<&ControlSnapshot> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every snapshot in control order
    pub fn drain(&mut self) -> Vec<(ControlId, ControlSnapshot)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_push_buttons_are_labeled() {
        assert!(ControlKind::PushButton.is_labeled());
        assert!(!ControlKind::SubmitInput.is_labeled());
    }

    #[test]
    fn control_builders() {
        let control = Control::button("Save")
            .disabled()
            .with_attribute("data-loading", "Saving…");
        assert_eq!(control.kind, ControlKind::PushButton);
        assert!(control.disabled);
        assert_eq!(control.attribute("data-loading"), Some("Saving…"));
        assert_eq!(control.attribute("data-other"), None);

        let input = Control::submit_input("Go");
        assert_eq!(input.kind, ControlKind::SubmitInput);
        assert!(!input.disabled);
    }

    #[test]
    fn first_disabled_capture_wins() {
        let mut table = SnapshotTable::new();
        assert!(table.capture_disabled(ControlId(1), false));
        // Second capture happens after the guard already disabled it
        assert!(!table.capture_disabled(ControlId(1), true));
        assert_eq!(table.get(ControlId(1)), Some(&ControlSnapshot::new(false)));
    }

    #[test]
    fn first_label_capture_wins() {
        let mut table = SnapshotTable::new();
        table.capture_disabled(ControlId(1), false);
        assert!(table.capture_label(ControlId(1), "<b>Save</b>".into()));
        assert!(!table.capture_label(ControlId(1), "spinner".into()));
        assert_eq!(
            table.get(ControlId(1)).and_then(|s| s.original_label.as_deref()),
            Some("<b>Save</b>")
        );
    }

    #[test]
    fn label_needs_existing_snapshot() {
        let mut table = SnapshotTable::new();
        assert!(!table.capture_label(ControlId(7), "Save".into()));
        assert!(table.is_empty());
    }

    #[test]
    fn discard_label_keeps_disabled_snapshot() {
        let mut table = SnapshotTable::new();
        table.capture_disabled(ControlId(2), true);
        table.capture_label(ControlId(2), "Save".into());
        table.discard_label(ControlId(2));
        let snapshot = table.get(ControlId(2)).unwrap();
        assert!(snapshot.original_disabled);
        assert!(snapshot.original_label.is_none());
    }

    #[test]
    fn drain_empties_table_in_order() {
        let mut table = SnapshotTable::new();
        table.capture_disabled(ControlId(3), false);
        table.capture_disabled(ControlId(1), true);
        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, ControlId(1));
        assert_eq!(drained[1].0, ControlId(3));
        assert!(table.is_empty());
        assert!(table.drain().is_empty());
    }

    #[test]
    fn untagged_controls_get_fresh_ids() {
        let mut tagger = ControlTagger::new();
        let assigned = tagger.assign(&[None, None]);
        assert_eq!(
            assigned,
            vec![
                TagAssignment::Retag(ControlId(0)),
                TagAssignment::Retag(ControlId(1))
            ]
        );
        assert_eq!(
            tagger.assign(&[Some(0), Some(1)]),
            vec![
                TagAssignment::Keep(ControlId(0)),
                TagAssignment::Keep(ControlId(1))
            ]
        );
    }

    #[test]
    fn copied_tag_is_reassigned() {
        let mut tagger = ControlTagger::new();
        tagger.assign(&[None, None, None, None]);

        // A cloned row carries the tag of the row it was copied from
        let assigned = tagger.assign(&[Some(0), Some(3), Some(1), Some(2), Some(3)]);

        assert_eq!(assigned[1], TagAssignment::Keep(ControlId(3)));
        assert_eq!(assigned[4], TagAssignment::Retag(ControlId(4)));
        let ids: BTreeSet<_> = assigned.iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), assigned.len());
    }

    #[test]
    fn fresh_ids_skip_tags_already_in_the_document() {
        let mut tagger = ControlTagger::new();
        let assigned = tagger.assign(&[None, Some(7)]);
        assert_eq!(assigned[0], TagAssignment::Retag(ControlId(8)));
        assert_eq!(assigned[1], TagAssignment::Keep(ControlId(7)));
        assert_eq!(tagger.fresh(), ControlId(9));
    }

    #[test]
    fn restore_policy_follows_original_flag() {
        assert!(ControlSnapshot::new(false).should_enable_on_restore());
        assert!(!ControlSnapshot::new(true).should_enable_on_restore());
    }
}
