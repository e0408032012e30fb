//! Glyph build pipeline
//!
//! Runs one font build: render the requested glyphs, write them to the
//! output directory, report. Any stage failure ends the build with a single
//! fatal diagnostic; there are no retries and nothing is written after a
//! render failure.

pub mod diagnostics;

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::config::BuildOptions;
use crate::glyphs::GlyphSet;

pub use diagnostics::{DiagnosticsSink, TracingDiagnostics};

/// Turns build options into a fully populated glyph set.
///
/// Returns an error on any rendering problem; never a partial set.
pub trait GlyphRenderer {
    fn render(&self, options: &BuildOptions) -> Result<GlyphSet>;
}

/// Persists a glyph set.
///
/// On `Ok` every output artifact is present in `output_dir`.
pub trait GlyphWriter {
    fn write(&self, glyphs: &GlyphSet, output_dir: &Path) -> Result<()>;
}

impl<T: GlyphRenderer + ?Sized> GlyphRenderer for &T {
    fn render(&self, options: &BuildOptions) -> Result<GlyphSet> {
        (**self).render(options)
    }
}

impl<T: GlyphWriter + ?Sized> GlyphWriter for &T {
    fn write(&self, glyphs: &GlyphSet, output_dir: &Path) -> Result<()> {
        (**self).write(glyphs, output_dir)
    }
}

/// Stage that ended a failed build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFailure {
    Render,
    Write,
    /// The build panicked; only reported by batch runs, which contain it
    Panicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Succeeded,
    Failed(BuildFailure),
}

impl BuildResult {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl From<BuildResult> for bool {
    fn from(result: BuildResult) -> Self {
        result.is_success()
    }
}

/// Stateless build coordinator over a renderer, writer and diagnostics sink
pub struct GlyphBuildPipeline<R, W, D> {
    renderer: R,
    writer: W,
    diagnostics: D,
}

impl<R, W, D> GlyphBuildPipeline<R, W, D>
where
    R: GlyphRenderer,
    W: GlyphWriter,
    D: DiagnosticsSink,
{
    pub fn new(renderer: R, writer: W, diagnostics: D) -> Self {
        Self {
            renderer,
            writer,
            diagnostics,
        }
    }

    /// Build glyphs for one font.
    ///
    /// `options` are expected to have passed `BuildOptions::validate`.
    /// Nothing is logged on success; the writer reports what it wrote.
    pub fn build(&self, options: &BuildOptions) -> BuildResult {
        let glyphs = match self.renderer.render(options) {
            Ok(glyphs) => glyphs,
            Err(e) => {
                debug!(font = %options.font_name, error = ?e, "Renderer failed");
                self.diagnostics.fatal(&format!(
                    "Failed to render glyphs for font: {}",
                    options.font_name
                ));
                return BuildResult::Failed(BuildFailure::Render);
            }
        };

        if let Err(e) = self.writer.write(&glyphs, &options.output_directory_path) {
            debug!(
                font = %options.font_name,
                glyphs = glyphs.len(),
                output = %options.output_directory_path.display(),
                error = ?e,
                "Writer failed"
            );
            self.diagnostics.fatal(&format!(
                "Failed to save glyphs to directory: {}",
                options.output_directory_path.display()
            ));
            return BuildResult::Failed(BuildFailure::Write);
        }

        BuildResult::Succeeded
    }
}
