//! Glyph rendering with fontdue

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use tracing::{debug, warn};

use super::discovery::find_font_path;
use crate::common::types::{Dimensions, Position};
use crate::config::{BuildOptions, RenderSettings};
use crate::constants::render::ALIASED_COVERAGE_THRESHOLD;
use crate::glyphs::{Glyph, GlyphBitmap, GlyphMetrics, GlyphSet, LineMetrics};
use crate::pipeline::GlyphRenderer;

/// Renders TrueType/OpenType fonts through fontdue
#[derive(Debug, Default, Clone, Copy)]
pub struct FontdueRenderer;

impl FontdueRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Locate the font file: explicit path first, fontconfig otherwise
    fn font_path(options: &BuildOptions) -> Result<PathBuf> {
        match &options.font_path {
            Some(path) => Ok(path.clone()),
            None => find_font_path(&options.font_name).with_context(|| {
                format!(
                    "Failed to resolve font '{}'. Pass a font path or use 'list-fonts' \
                     to see installed fonts.",
                    options.font_name
                )
            }),
        }
    }

    fn load_font(path: &Path) -> Result<Font> {
        debug!(path = %path.display(), "Loading font");

        let font_data = fs::read(path).with_context(|| {
            format!(
                "Failed to read font file: {}. Check that the file exists and is readable.",
                path.display()
            )
        })?;

        Font::from_bytes(font_data, FontSettings::default()).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse font file '{}': {}. Font may be corrupt or in an unsupported format.",
                path.display(),
                e
            )
        })
    }
}

impl GlyphRenderer for FontdueRenderer {
    fn render(&self, options: &BuildOptions) -> Result<GlyphSet> {
        let path = Self::font_path(options)?;
        let font = Self::load_font(&path)?;
        render_glyph_set(&font, options)
    }
}

/// Rasterize every requested character and collect kerning between them
pub fn render_glyph_set(font: &Font, options: &BuildOptions) -> Result<GlyphSet> {
    let settings = &options.render;

    let line_metrics = font
        .horizontal_line_metrics(settings.size)
        .map(|m| LineMetrics {
            ascent: m.ascent,
            descent: m.descent,
            line_gap: m.line_gap,
        })
        .unwrap_or_default();

    let mut glyph_set = GlyphSet::new(&options.font_name, settings.size, line_metrics);
    let mut missing = Vec::new();

    for ch in options.characters.iter() {
        if font.lookup_glyph_index(ch) == 0 {
            missing.push(ch);
            continue;
        }
        glyph_set.glyphs.insert(ch, rasterize_glyph(font, ch, settings));
    }

    if glyph_set.is_empty() {
        return Err(anyhow::anyhow!(
            "Font '{}' has none of the {} requested characters",
            options.font_name,
            options.characters.len()
        ));
    }

    if !missing.is_empty() {
        let sample: String = missing.iter().take(16).collect();
        warn!(
            font = %options.font_name,
            missing = missing.len(),
            sample = %sample,
            "Font lacks some requested characters, skipping them"
        );
    }

    let rendered: Vec<char> = glyph_set.glyphs.keys().copied().collect();
    for &left in &rendered {
        for &right in &rendered {
            if let Some(adjustment) = font.horizontal_kern(left, right, settings.size) {
                glyph_set.kerning.insert(left, right, adjustment);
            }
        }
    }

    debug!(
        font = %options.font_name,
        glyphs = glyph_set.len(),
        kerning_pairs = glyph_set.kerning.len(),
        "Rendered glyph set"
    );
    Ok(glyph_set)
}

fn rasterize_glyph(font: &Font, ch: char, settings: &RenderSettings) -> Glyph {
    let (metrics, coverage) = font.rasterize(ch, settings.size);
    let bounds = Dimensions::new(metrics.width as u32, metrics.height as u32);

    let bitmap = if bounds.is_empty() {
        GlyphBitmap::empty()
    } else {
        GlyphBitmap::new(bounds, coverage_to_rgba(&coverage, settings))
    };

    Glyph {
        metrics: GlyphMetrics {
            advance: metrics.advance_width,
            bearing: Position::new(metrics.xmin, metrics.ymin + metrics.height as i32),
            bounds: bitmap.dimensions,
        },
        bitmap,
    }
}

/// Convert 8-bit coverage to tinted RGBA, thresholding when aliased
fn coverage_to_rgba(coverage: &[u8], settings: &RenderSettings) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(coverage.len() * 4);
    for &value in coverage {
        let value = if settings.antialias {
            value
        } else if value >= ALIASED_COVERAGE_THRESHOLD {
            255
        } else {
            0
        };
        pixels.extend_from_slice(&settings.color.tint(value));
    }
    pixels
}
