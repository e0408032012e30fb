//! Font loading, discovery and rasterization

pub mod discovery;
pub mod renderer;

pub use discovery::list_fonts;
pub use renderer::FontdueRenderer;
