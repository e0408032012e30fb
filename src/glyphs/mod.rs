//! In-memory glyph set produced by a renderer
//!
//! A `GlyphSet` is created once per build, handed to the writer and then
//! dropped. Nothing here touches the filesystem.

use std::collections::BTreeMap;

use crate::common::types::{Dimensions, Position};

/// Placement metrics for one glyph, in pixels at the rendered size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Horizontal pen advance after drawing this glyph
    pub advance: f32,
    /// Offset from the pen position to the bitmap's top-left corner
    /// (x to the right, y upwards from the baseline)
    pub bearing: Position,
    /// Bitmap bounding box
    pub bounds: Dimensions,
}

/// RGBA8 pixels, row-major, `bounds.width * bounds.height * 4` bytes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphBitmap {
    pub dimensions: Dimensions,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(dimensions: Dimensions, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len() as u64, dimensions.area() * 4);
        Self { dimensions, pixels }
    }

    /// Bitmap for glyphs with no ink (e.g. space)
    pub fn empty() -> Self {
        Self::default()
    }

    /// One row of RGBA bytes
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.dimensions.width as usize * 4;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub metrics: GlyphMetrics,
    pub bitmap: GlyphBitmap,
}

/// Vertical font metrics shared by every glyph
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    pub ascent: f32,
    /// Negative below the baseline
    pub descent: f32,
    pub line_gap: f32,
}

impl LineMetrics {
    /// Distance between consecutive baselines
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

/// Horizontal adjustments for ordered character pairs.
///
/// Zero adjustments are never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KerningTable {
    pairs: BTreeMap<(char, char), f32>,
}

impl KerningTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an adjustment; zero values are dropped
    pub fn insert(&mut self, left: char, right: char, adjustment: f32) {
        if adjustment != 0.0 {
            self.pairs.insert((left, right), adjustment);
        } else {
            self.pairs.remove(&(left, right));
        }
    }

    /// Adjustment for a pair, 0.0 when the font defines none
    #[cfg(test)]
    pub fn get(&self, left: char, right: char) -> f32 {
        self.pairs.get(&(left, right)).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, char, f32)> + '_ {
        self.pairs.iter().map(|(&(l, r), &adj)| (l, r, adj))
    }
}

/// Rendered glyphs plus kerning for one font at one size
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSet {
    pub font_name: String,
    pub size: f32,
    pub line_metrics: LineMetrics,
    pub glyphs: BTreeMap<char, Glyph>,
    pub kerning: KerningTable,
}

impl GlyphSet {
    pub fn new(font_name: impl Into<String>, size: f32, line_metrics: LineMetrics) -> Self {
        Self {
            font_name: font_name.into(),
            size,
            line_metrics,
            glyphs: BTreeMap::new(),
            kerning: KerningTable::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kerning_table_drops_zero_adjustments() {
        let mut table = KerningTable::new();
        table.insert('A', 'V', -1.5);
        table.insert('A', 'A', 0.0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get('A', 'V'), -1.5);
        assert_eq!(table.get('V', 'A'), 0.0);

        // Overwriting with zero removes the pair
        table.insert('A', 'V', 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_kerning_iteration_is_ordered() {
        let mut table = KerningTable::new();
        table.insert('T', 'o', -2.0);
        table.insert('A', 'V', -1.0);
        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(pairs, vec![('A', 'V', -1.0), ('T', 'o', -2.0)]);
    }

    #[test]
    fn test_bitmap_rows() {
        let pixels: Vec<u8> = (0..16).collect();
        let bitmap = GlyphBitmap::new(Dimensions::new(2, 2), pixels);
        assert_eq!(bitmap.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_line_height() {
        let metrics = LineMetrics {
            ascent: 10.0,
            descent: -3.0,
            line_gap: 1.0,
        };
        assert_eq!(metrics.line_height(), 14.0);
    }
}
