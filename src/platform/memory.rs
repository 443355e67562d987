//! In-memory document
//!
//! A small page model holding an explicit control registry, an optional
//! overlay and an optional row container. Used by the demo binary and by
//! every test that exercises the guard without a browser.

use std::collections::BTreeMap;

use crate::domain::{Control, ControlId, ControlKind, InputKind, LineRow, RowId};
use crate::input::FormId;
use crate::platform::{CosmeticMutationError, Document, LineSurface};
use crate::ui::LoadingOverlay;

/// In-memory page
#[derive(Debug, Clone, Default)]
pub struct Page {
    controls: BTreeMap<ControlId, Control>,
    next_control: u32,
    focused: Option<ControlId>,
    overlay: Option<LoadingOverlay>,
    /// `None` when the page has no row container
    rows: Option<Vec<(RowId, LineRow)>>,
    next_row: u32,
    /// Forms whose native submission went through, in order
    submissions: Vec<FormId>,
}

impl Page {
    /// Empty page with no overlay and no row container
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hidden overlay with a message element
    pub fn with_overlay(mut self) -> Self {
        self.overlay = Some(LoadingOverlay::new());
        self
    }

    pub fn with_overlay_element(mut self, overlay: LoadingOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Adds a row container holding `rows`
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = LineRow>) -> Self {
        let mut container = Vec::new();
        for row in rows {
            let id = self.allocate_row();
            container.push((id, row));
        }
        self.rows = Some(container);
        self
    }

    /// Registers a control and returns its id
    pub fn add_control(&mut self, control: Control) -> ControlId {
        let id = ControlId(self.next_control);
        self.next_control += 1;
        self.controls.insert(id, control);
        id
    }

    pub fn remove_control(&mut self, id: ControlId) -> Option<Control> {
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.controls.remove(&id)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(&id)
    }

    pub fn focus(&mut self, id: Option<ControlId>) {
        self.focused = id.filter(|id| self.controls.contains_key(id));
    }

    pub fn overlay(&self) -> Option<&LoadingOverlay> {
        self.overlay.as_ref()
    }

    pub fn rows(&self) -> Option<&[(RowId, LineRow)]> {
        self.rows.as_deref()
    }

    pub fn row(&self, id: RowId) -> Option<&LineRow> {
        self.rows
            .as_ref()?
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, row)| row)
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows
            .as_ref()
            .map(|rows| rows.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    /// Mutable access to a row's inputs, as a user typing would have
    pub fn row_mut(&mut self, id: RowId) -> Option<&mut LineRow> {
        self.rows
            .as_mut()?
            .iter_mut()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, row)| row)
    }

    /// Records that the browser carried out the native submission of `form`
    pub fn perform_submit(&mut self, form: FormId) {
        self.submissions.push(form);
    }

    pub fn submissions(&self) -> &[FormId] {
        &self.submissions
    }

    fn allocate_row(&mut self) -> RowId {
        let id = RowId(self.next_row);
        self.next_row += 1;
        id
    }

    fn control_mut(&mut self, id: ControlId) -> Result<&mut Control, CosmeticMutationError> {
        self.controls
            .get_mut(&id)
            .ok_or(CosmeticMutationError::ControlNotFound(id))
    }
}

impl Document for Page {
    fn controls(&self) -> Vec<ControlId> {
        self.controls.keys().copied().collect()
    }

    fn control_kind(&self, id: ControlId) -> Option<ControlKind> {
        self.controls.get(&id).map(|control| control.kind)
    }

    fn is_disabled(&self, id: ControlId) -> Option<bool> {
        self.controls.get(&id).map(|control| control.disabled)
    }

    fn set_disabled(&mut self, id: ControlId, disabled: bool) -> Result<(), CosmeticMutationError> {
        self.control_mut(id)?.disabled = disabled;
        Ok(())
    }

    fn label(&self, id: ControlId) -> Option<String> {
        self.controls.get(&id).map(|control| control.label.clone())
    }

    fn set_label(&mut self, id: ControlId, label: &str) -> Result<(), CosmeticMutationError> {
        let control = self.control_mut(id)?;
        control.label.clear();
        control.label.push_str(label);
        Ok(())
    }

    fn attribute(&self, id: ControlId, name: &str) -> Option<String> {
        self.controls
            .get(&id)
            .and_then(|control| control.attribute(name))
            .map(str::to_string)
    }

    fn focused_control(&self) -> Option<ControlId> {
        self.focused
    }

    fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    fn overlay_visible(&self) -> bool {
        self.overlay.as_ref().is_some_and(LoadingOverlay::is_visible)
    }

    fn show_overlay(&mut self, message: &str) -> Result<(), CosmeticMutationError> {
        let overlay = self
            .overlay
            .as_mut()
            .ok_or(CosmeticMutationError::OverlayUnavailable)?;
        overlay.show(message);
        Ok(())
    }

    fn hide_overlay(&mut self) -> Result<(), CosmeticMutationError> {
        let overlay = self
            .overlay
            .as_mut()
            .ok_or(CosmeticMutationError::OverlayUnavailable)?;
        overlay.hide();
        Ok(())
    }

    fn native_submit(&mut self, form: FormId) {
        self.perform_submit(form);
    }
}

impl LineSurface for Page {
    type Row = LineRow;
    type RowKey = RowId;

    fn row_count(&self) -> Option<usize> {
        self.rows.as_ref().map(Vec::len)
    }

    fn clone_first_row(&self) -> Option<LineRow> {
        self.rows.as_ref()?.first().map(|(_, row)| row.clone())
    }

    fn reset_inputs(&self, row: &mut LineRow, value_for: fn(&InputKind) -> &'static str) {
        for input in &mut row.inputs {
            input.value = value_for(&input.kind).to_string();
        }
    }

    fn append_row(&mut self, row: LineRow) -> Option<RowId> {
        self.rows.as_ref()?;
        let id = self.allocate_row();
        self.rows.as_mut()?.push((id, row));
        Some(id)
    }

    fn contains_row(&self, key: &RowId) -> bool {
        self.row(*key).is_some()
    }

    fn remove_row(&mut self, key: &RowId) -> bool {
        let Some(rows) = self.rows.as_mut() else {
            return false;
        };
        let before = rows.len();
        rows.retain(|(id, _)| id != key);
        rows.len() != before
    }
}
