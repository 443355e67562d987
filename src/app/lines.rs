//! Line editor
//!
//! Adds rows by cloning the container's first row and removes rows as long
//! as at least one remains. Unmet preconditions are silent: the outcome says
//! what was skipped, nothing is raised.

use tracing::debug;

use crate::domain::InputKind;
use crate::platform::LineSurface;

/// Why a line edit did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page has no row container
    NoContainer,
    /// The container has no row to use as a template
    NoTemplate,
    /// Only one row is left
    LastRow,
    /// The row is not in the container
    UnknownRow,
}

/// Outcome of a line edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit<K> {
    Added(K),
    Removed,
    Skipped(SkipReason),
}

impl<K> LineEdit<K> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, LineEdit::Skipped(_))
    }
}

/// Appends a reset copy of the first row
pub fn add_line<S: LineSurface + ?Sized>(surface: &mut S) -> LineEdit<S::RowKey> {
    if surface.row_count().is_none() {
        debug!("add line skipped: no row container");
        return LineEdit::Skipped(SkipReason::NoContainer);
    }
    let Some(mut row) = surface.clone_first_row() else {
        debug!("add line skipped: no template row");
        return LineEdit::Skipped(SkipReason::NoTemplate);
    };

    surface.reset_inputs(&mut row, InputKind::reset_value);
    match surface.append_row(row) {
        Some(key) => LineEdit::Added(key),
        None => LineEdit::Skipped(SkipReason::NoContainer),
    }
}

/// Removes `row` unless it is the last one left
pub fn remove_line<S: LineSurface + ?Sized>(surface: &mut S, row: &S::RowKey) -> LineEdit<S::RowKey> {
    let Some(count) = surface.row_count() else {
        return LineEdit::Skipped(SkipReason::NoContainer);
    };
    if !surface.contains_row(row) {
        return LineEdit::Skipped(SkipReason::UnknownRow);
    }
    if count <= 1 {
        debug!("remove line skipped: last row stays");
        return LineEdit::Skipped(SkipReason::LastRow);
    }

    if surface.remove_row(row) {
        LineEdit::Removed
    } else {
        LineEdit::Skipped(SkipReason::UnknownRow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InputKind, LineInput, LineRow, RowId};
    use crate::platform::memory::Page;

    fn sale_line(team: &str, kit: &str, quantity: &str) -> LineRow {
        LineRow::new(vec![
            LineInput::text("team", team),
            LineInput::text("kit", kit),
            LineInput::new("size", InputKind::Other("hidden".into()), "XL"),
            LineInput::number("quantity", quantity),
        ])
    }

    #[test]
    fn add_line_resets_cloned_inputs() {
        let mut page = Page::new().with_rows([sale_line("Arsenal", "Home", "5")]);

        let LineEdit::Added(id) = add_line(&mut page) else {
            panic!("expected a new row");
        };

        let row = page.row(id).unwrap();
        assert_eq!(row.value_of("team"), Some(""));
        assert_eq!(row.value_of("kit"), Some(""));
        assert_eq!(row.value_of("size"), Some(""));
        assert_eq!(row.value_of("quantity"), Some("1"));
        // Template keeps its values
        assert_eq!(page.row(RowId(0)).unwrap().value_of("team"), Some("Arsenal"));
        assert_eq!(page.row_ids().last(), Some(&id));
    }

    #[test]
    fn add_line_always_clones_first_row() {
        let mut page = Page::new().with_rows([
            sale_line("Arsenal", "Home", "2"),
            LineRow::new(vec![LineInput::text("note", "odd row")]),
        ]);

        let LineEdit::Added(id) = add_line(&mut page) else {
            panic!("expected a new row");
        };

        assert_eq!(page.row(id).unwrap().inputs.len(), 4);
    }

    #[test]
    fn add_line_without_rows_is_silent() {
        let mut page = Page::new().with_rows(Vec::<LineRow>::new());
        assert_eq!(add_line(&mut page), LineEdit::Skipped(SkipReason::NoTemplate));
        assert_eq!(page.row_count(), Some(0));
    }

    #[test]
    fn add_line_without_container_is_silent() {
        let mut page = Page::new();
        assert_eq!(add_line(&mut page), LineEdit::Skipped(SkipReason::NoContainer));
    }

    #[test]
    fn remove_line_keeps_last_row() {
        let mut page = Page::new().with_rows([sale_line("A", "Home", "1")]);
        let only = page.row_ids()[0];

        for _ in 0..5 {
            assert_eq!(
                remove_line(&mut page, &only),
                LineEdit::Skipped(SkipReason::LastRow)
            );
        }
        assert_eq!(page.row_count(), Some(1));
    }

    #[test]
    fn removing_two_of_three_rows_leaves_one() {
        let mut page = Page::new().with_rows([
            sale_line("A", "Home", "1"),
            sale_line("B", "Away", "2"),
            sale_line("C", "Third", "3"),
        ]);
        let ids = page.row_ids();

        assert_eq!(remove_line(&mut page, &ids[0]), LineEdit::Removed);
        assert_eq!(remove_line(&mut page, &ids[1]), LineEdit::Removed);
        assert!(remove_line(&mut page, &ids[2]).is_skipped());

        assert_eq!(page.row_ids(), vec![ids[2]]);
    }

    #[test]
    fn row_count_never_drops_below_one() {
        let mut page = Page::new().with_rows([
            sale_line("A", "Home", "1"),
            sale_line("B", "Away", "2"),
        ]);
        for _ in 0..4 {
            for id in page.row_ids() {
                remove_line(&mut page, &id);
                assert!(page.row_count().unwrap() >= 1);
            }
        }
        assert_eq!(page.row_count(), Some(1));
    }

    #[test]
    fn removing_unknown_row_is_silent() {
        let mut page = Page::new().with_rows([
            sale_line("A", "Home", "1"),
            sale_line("B", "Away", "2"),
        ]);
        assert_eq!(
            remove_line(&mut page, &RowId(42)),
            LineEdit::Skipped(SkipReason::UnknownRow)
        );
        assert_eq!(page.row_count(), Some(2));
    }

    #[test]
    fn remove_without_container_is_silent() {
        let mut page = Page::new();
        assert_eq!(
            remove_line(&mut page, &RowId(0)),
            LineEdit::Skipped(SkipReason::NoContainer)
        );
    }

    #[test]
    fn added_rows_can_be_removed_again() {
        let mut page = Page::new().with_rows([sale_line("A", "Home", "1")]);
        let LineEdit::Added(id) = add_line(&mut page) else {
            panic!("expected a new row");
        };
        assert_eq!(remove_line(&mut page, &id), LineEdit::Removed);
        assert_eq!(page.row_count(), Some(1));
    }
}
