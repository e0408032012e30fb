//! JSON descriptor written next to the atlas image

use serde::{Deserialize, Serialize};

use crate::common::types::{Dimensions, Position, Rect};
use crate::constants::atlas::DESCRIPTOR_VERSION;
use crate::glyphs::GlyphSet;
use crate::writer::atlas::AtlasLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphEntry {
    /// The character as a one-char string
    pub character: String,
    pub code_point: u32,
    /// Location in the atlas, padding excluded
    pub rect: Rect,
    pub advance: f32,
    pub bearing: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KerningEntry {
    pub left: u32,
    pub right: u32,
    pub adjustment: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    pub version: u32,
    pub font_name: String,
    pub size: f32,
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub line_height: f32,
    /// File name of the atlas image, relative to the descriptor
    pub image: String,
    pub atlas: Dimensions,
    pub glyphs: Vec<GlyphEntry>,
    pub kerning: Vec<KerningEntry>,
}

impl AtlasDescriptor {
    pub fn new(glyphs: &GlyphSet, layout: &AtlasLayout, image: impl Into<String>) -> Self {
        let glyph_entries = glyphs
            .glyphs
            .iter()
            .map(|(&ch, glyph)| GlyphEntry {
                character: ch.to_string(),
                code_point: ch as u32,
                rect: layout.placements.get(&ch).copied().unwrap_or_default(),
                advance: glyph.metrics.advance,
                bearing: glyph.metrics.bearing,
            })
            .collect();

        let kerning = glyphs
            .kerning
            .iter()
            .map(|(left, right, adjustment)| KerningEntry {
                left: left as u32,
                right: right as u32,
                adjustment,
            })
            .collect();

        Self {
            version: DESCRIPTOR_VERSION,
            font_name: glyphs.font_name.clone(),
            size: glyphs.size,
            ascent: glyphs.line_metrics.ascent,
            descent: glyphs.line_metrics.descent,
            line_gap: glyphs.line_metrics.line_gap,
            line_height: glyphs.line_metrics.line_height(),
            image: image.into(),
            atlas: layout.dimensions,
            glyphs: glyph_entries,
            kerning,
        }
    }
}
