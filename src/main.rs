//! formguard demo: drives an in-memory sales page through a double submit
//! and a few line edits, logging what the guard does.
//!
//! Usage: `formguard-demo [config.toml]`

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use formguard::domain::{Control, LineInput, LineRow};
use formguard::input::{ClickTarget, FormId};
use formguard::platform::memory::Page;
use formguard::{Document, GuardConfig, LineSurface, PageController};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GuardConfig::load(&path)
            .with_context(|| format!("loading guard configuration from {path}"))?,
        None => GuardConfig::from_env().context("reading guard configuration from environment")?,
    };

    let mut page = Page::new().with_overlay().with_rows([LineRow::new(vec![
        LineInput::text("team", "Arsenal"),
        LineInput::text("kit", "Home"),
        LineInput::number("quantity", "2"),
    ])]);
    let record = page.add_control(
        Control::button("Record sale").with_attribute("data-loading", "Recording sale…"),
    );
    let add = page.add_control(Control::button("Add line"));
    let archived = page.add_control(Control::button("Archive").disabled());

    let mut controller = PageController::new(page, config);

    controller.click(ClickTarget::AddLine);
    controller.click(ClickTarget::AddLine);
    let rows = controller.document().row_ids();
    for row in rows.iter().skip(1) {
        controller.click(ClickTarget::RemoveLine(*row));
    }
    if let Some(first) = rows.first() {
        // Refused: the last row always stays
        controller.click(ClickTarget::RemoveLine(*first));
    }
    info!(rows = ?controller.document().row_count(), "line edits done");

    let first = controller.submit(FormId(1), Some(record));
    let second = controller.submit(FormId(1), Some(record));
    info!(?first, ?second, "submitted twice");

    {
        let page = controller.document();
        info!(
            overlay_visible = page.overlay_visible(),
            label = ?page.label(record),
            add_disabled = ?page.is_disabled(add),
            "busy state"
        );
    }

    controller.hide_loading();
    let page = controller.document();
    info!(
        overlay_visible = page.overlay_visible(),
        record_disabled = ?page.is_disabled(record),
        archived_disabled = ?page.is_disabled(archived),
        submissions = page.submissions().len(),
        "released"
    );

    Ok(())
}
