pub mod overlay;
pub mod renderer;

pub use overlay::LoadingOverlay;
pub use renderer::render_busy_label;
