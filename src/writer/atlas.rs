//! Glyph atlas layout and compositing
//!
//! Glyphs are placed left to right in rows (tallest first) inside a
//! power-of-two texture. Each glyph keeps `padding` transparent pixels on
//! every side so bilinear sampling never bleeds between neighbours.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;

use crate::common::types::{Dimensions, Rect};
use crate::constants::atlas::{MAX_SIZE, MIN_SIZE};
use crate::glyphs::GlyphSet;

/// Packed glyph positions and the final texture size
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasLayout {
    pub dimensions: Dimensions,
    /// Glyph rectangles excluding padding; glyphs without ink get a zero-size rect
    pub placements: BTreeMap<char, Rect>,
}

/// Row packer for a fixed texture width
struct ShelfPacker {
    width: u32,
    cursor_x: u32,
    shelf_y: u32,
    shelf_height: u32,
}

impl ShelfPacker {
    fn new(width: u32) -> Self {
        Self {
            width,
            cursor_x: 0,
            shelf_y: 0,
            shelf_height: 0,
        }
    }

    /// Place a padded cell, opening a new row when the current one is full
    fn place(&mut self, cell: Dimensions) -> Option<(u32, u32)> {
        if cell.width > self.width {
            return None;
        }
        if self.cursor_x.checked_add(cell.width)? > self.width {
            self.shelf_y = self.shelf_y.checked_add(self.shelf_height)?;
            self.cursor_x = 0;
            self.shelf_height = 0;
        }
        let origin = (self.cursor_x, self.shelf_y);
        self.cursor_x += cell.width;
        self.shelf_height = self.shelf_height.max(cell.height);
        Some(origin)
    }

    fn used_height(&self) -> Option<u32> {
        self.shelf_y.checked_add(self.shelf_height)
    }
}

impl AtlasLayout {
    /// Find the smallest square-bounded power-of-two layout holding every glyph
    pub fn pack(glyphs: &GlyphSet, padding: u32) -> Result<Self> {
        let mut order: Vec<(char, Dimensions)> = glyphs
            .glyphs
            .iter()
            .map(|(&ch, glyph)| (ch, glyph.bitmap.dimensions))
            .filter(|(_, dims)| !dims.is_empty())
            .collect();
        order.sort_by(|a, b| b.1.height.cmp(&a.1.height).then(a.0.cmp(&b.0)));

        let mut size = MIN_SIZE;
        while size <= MAX_SIZE {
            if let Some(layout) = Self::try_pack(glyphs, &order, padding, size) {
                debug!(
                    width = layout.dimensions.width,
                    height = layout.dimensions.height,
                    glyphs = order.len(),
                    "Packed glyph atlas"
                );
                return Ok(layout);
            }
            size *= 2;
        }

        Err(anyhow::anyhow!(
            "{} glyphs of '{}' do not fit in a {}x{} atlas",
            order.len(),
            glyphs.font_name,
            MAX_SIZE,
            MAX_SIZE
        ))
    }

    fn try_pack(
        glyphs: &GlyphSet,
        order: &[(char, Dimensions)],
        padding: u32,
        width: u32,
    ) -> Option<Self> {
        let mut packer = ShelfPacker::new(width);
        let mut placements = BTreeMap::new();

        let border = padding.checked_mul(2)?;
        for &(ch, dims) in order {
            let cell = Dimensions::new(
                dims.width.checked_add(border)?,
                dims.height.checked_add(border)?,
            );
            let (x, y) = packer.place(cell)?;
            placements.insert(
                ch,
                Rect::new(x.checked_add(padding)?, y.checked_add(padding)?, dims.width, dims.height),
            );
        }

        let height = packer.used_height()?.max(1).checked_next_power_of_two()?;
        if height > width {
            return None;
        }

        for &ch in glyphs.glyphs.keys() {
            placements.entry(ch).or_insert_with(Rect::default);
        }

        Some(Self {
            dimensions: Dimensions::new(width, height),
            placements,
        })
    }

    /// Copy every glyph bitmap into an RGBA8 texture
    pub fn composite(&self, glyphs: &GlyphSet) -> Vec<u8> {
        let stride = self.dimensions.width as usize * 4;
        let mut pixels = vec![0u8; stride * self.dimensions.height as usize];

        for (ch, rect) in &self.placements {
            let Some(glyph) = glyphs.glyphs.get(ch) else {
                continue;
            };
            if glyph.bitmap.dimensions.is_empty() {
                continue;
            }
            debug_assert!(
                rect.right() <= self.dimensions.width && rect.bottom() <= self.dimensions.height
            );
            let row_bytes = rect.width as usize * 4;
            for y in 0..rect.height {
                let dst = (rect.y + y) as usize * stride + rect.x as usize * 4;
                pixels[dst..dst + row_bytes].copy_from_slice(glyph.bitmap.row(y));
            }
        }

        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Position;
    use crate::glyphs::{Glyph, GlyphBitmap, GlyphMetrics, LineMetrics};

    fn solid_glyph(width: u32, height: u32, value: u8) -> Glyph {
        let dims = Dimensions::new(width, height);
        let bitmap = if dims.is_empty() {
            GlyphBitmap::empty()
        } else {
            GlyphBitmap::new(dims, vec![value; (dims.area() * 4) as usize])
        };
        Glyph {
            metrics: GlyphMetrics {
                advance: width as f32,
                bearing: Position::new(0, height as i32),
                bounds: dims,
            },
            bitmap,
        }
    }

    fn glyph_set(glyphs: &[(char, u32, u32)]) -> GlyphSet {
        let mut set = GlyphSet::new("Test", 16.0, LineMetrics::default());
        for &(ch, w, h) in glyphs {
            set.glyphs.insert(ch, solid_glyph(w, h, ch as u8));
        }
        set
    }

    #[test]
    fn test_small_set_uses_minimum_size() {
        let set = glyph_set(&[('a', 8, 10), ('b', 8, 12), (' ', 0, 0)]);
        let layout = AtlasLayout::pack(&set, 2).unwrap();

        assert_eq!(layout.dimensions.width, MIN_SIZE);
        assert!(layout.dimensions.height.is_power_of_two());
        assert_eq!(layout.placements.len(), 3);
        assert_eq!(layout.placements[&' '], Rect::default());
    }

    #[test]
    fn test_placements_respect_padding_and_do_not_overlap() {
        let chars: Vec<(char, u32, u32)> = ('A'..='Z')
            .map(|ch| (ch, 10 + (ch as u32 % 7), 12 + (ch as u32 % 5)))
            .collect();
        let set = glyph_set(&chars);
        let padding = 3;
        let layout = AtlasLayout::pack(&set, padding).unwrap();

        let padded: Vec<Rect> = layout
            .placements
            .values()
            .map(|r| {
                assert!(r.x >= padding && r.y >= padding);
                assert!(r.right() + padding <= layout.dimensions.width);
                assert!(r.bottom() + padding <= layout.dimensions.height);
                Rect::new(r.x - padding, r.y - padding, r.width + 2 * padding, r.height + 2 * padding)
            })
            .collect();

        for (i, a) in padded.iter().enumerate() {
            for b in &padded[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_grows_until_everything_fits() {
        let chars: Vec<(char, u32, u32)> = (0..64u32)
            .map(|i| (char::from_u32(0x100 + i).unwrap(), 30, 30))
            .collect();
        let layout = AtlasLayout::pack(&glyph_set(&chars), 1).unwrap();
        // 64 cells of 32x32 need at least 256x256
        assert_eq!(layout.dimensions.width, 256);
    }

    #[test]
    fn test_oversized_glyph_fails() {
        let set = glyph_set(&[('X', MAX_SIZE + 1, 10)]);
        let err = AtlasLayout::pack(&set, 0).unwrap_err();
        assert!(err.to_string().contains("do not fit"));
    }

    #[test]
    fn test_huge_padding_fails_instead_of_overflowing() {
        let set = glyph_set(&[('a', 2, 2), ('b', 3, 3)]);
        for padding in [MAX_SIZE / 2, u32::MAX / 2 + 1, u32::MAX] {
            let err = AtlasLayout::pack(&set, padding).unwrap_err();
            assert!(err.to_string().contains("do not fit"));
        }
    }

    #[test]
    fn test_composite_copies_pixels() {
        let set = glyph_set(&[('a', 2, 2)]);
        let layout = AtlasLayout::pack(&set, 1).unwrap();
        let pixels = layout.composite(&set);

        let stride = layout.dimensions.width as usize * 4;
        let rect = layout.placements[&'a'];
        assert_eq!(rect, Rect::new(1, 1, 2, 2));

        // Padding stays transparent, glyph pixels are copied
        assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);
        let inside = rect.y as usize * stride + rect.x as usize * 4;
        assert_eq!(&pixels[inside..inside + 8], &[b'a'; 8]);
    }
}
