//! Atlas output
//!
//! Writes `<font>.png` (RGBA8 atlas) and `<font>.json` (descriptor) into the
//! output directory. Both files are staged as temporary files in the same
//! directory and only renamed into place once both are complete.

pub mod atlas;
pub mod descriptor;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::constants::atlas::{DESCRIPTOR_EXTENSION, PNG_EXTENSION};
use crate::glyphs::GlyphSet;
use crate::pipeline::GlyphWriter;

pub use atlas::AtlasLayout;
pub use descriptor::AtlasDescriptor;

/// Packs glyphs into a PNG atlas plus JSON descriptor
#[derive(Debug, Clone, Copy)]
pub struct AtlasWriter {
    padding: u32,
}

impl AtlasWriter {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }
}

impl GlyphWriter for AtlasWriter {
    fn write(&self, glyphs: &GlyphSet, output_dir: &Path) -> Result<()> {
        let layout = AtlasLayout::pack(glyphs, self.padding)?;
        let pixels = layout.composite(glyphs);

        let (image_path, descriptor_path) = output_paths(&glyphs.font_name, output_dir);
        let image_name = format!("{}.{}", file_stem(&glyphs.font_name), PNG_EXTENSION);
        let descriptor = AtlasDescriptor::new(glyphs, &layout, image_name);

        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {:?}", output_dir)
        })?;

        let image_tmp = stage_png(output_dir, &layout, &pixels)?;
        let descriptor_tmp = stage_json(output_dir, &descriptor)?;

        image_tmp
            .persist(&image_path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move atlas into place at {:?}", image_path))?;

        if let Err(e) = descriptor_tmp.persist(&descriptor_path) {
            discard_outputs(&[image_path.as_path(), descriptor_path.as_path()]);
            return Err(e.error).with_context(|| {
                format!("Failed to move descriptor into place at {:?}", descriptor_path)
            });
        }

        info!(
            atlas = %image_path.display(),
            descriptor = %descriptor_path.display(),
            width = layout.dimensions.width,
            height = layout.dimensions.height,
            "Wrote glyph atlas"
        );
        Ok(())
    }
}

/// Remove a half-written pair so no stale descriptor outlives its atlas
fn discard_outputs(paths: &[&Path]) {
    for path in paths {
        if !path.is_file() {
            continue;
        }
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove partial output");
        }
    }
}

/// Output file stem: font name with anything outside [A-Za-z0-9_-] replaced
pub fn file_stem(font_name: &str) -> String {
    font_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn stage_png(dir: &Path, layout: &AtlasLayout, pixels: &[u8]) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary atlas file in {:?}", dir))?;

    {
        let mut encoder = png::Encoder::new(
            tmp.as_file_mut(),
            layout.dimensions.width,
            layout.dimensions.height,
        );
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut png_writer = encoder.write_header().context("Failed to write PNG header")?;
        png_writer
            .write_image_data(pixels)
            .context("Failed to encode atlas image")?;
        png_writer.finish().context("Failed to finish PNG stream")?;
    }

    tmp.as_file().sync_all().context("Failed to flush atlas image")?;
    debug!(path = %tmp.path().display(), "Staged atlas image");
    Ok(tmp)
}

fn stage_json(dir: &Path, descriptor: &AtlasDescriptor) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary descriptor file in {:?}", dir))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, descriptor)
            .context("Failed to serialize atlas descriptor")?;
        writer.flush().context("Failed to write atlas descriptor")?;
    }

    tmp.as_file().sync_all().context("Failed to flush atlas descriptor")?;
    debug!(path = %tmp.path().display(), "Staged atlas descriptor");
    Ok(tmp)
}

/// Paths the writer produces for a font in `output_dir`
pub fn output_paths(font_name: &str, output_dir: &Path) -> (PathBuf, PathBuf) {
    let stem = file_stem(font_name);
    (
        output_dir.join(format!("{}.{}", stem, PNG_EXTENSION)),
        output_dir.join(format!("{}.{}", stem, DESCRIPTOR_EXTENSION)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Dimensions, Position};
    use crate::constants::atlas::MAX_SIZE;
    use crate::glyphs::{Glyph, GlyphBitmap, GlyphMetrics, LineMetrics};
    use std::io::Cursor;

    fn sample_set(font_name: &str) -> GlyphSet {
        let mut set = GlyphSet::new(font_name, 16.0, LineMetrics::default());
        for (ch, w, h) in [('a', 6, 8), ('b', 7, 11), (' ', 0, 0)] {
            let dims = Dimensions::new(w, h);
            let bitmap = if dims.is_empty() {
                GlyphBitmap::empty()
            } else {
                GlyphBitmap::new(dims, vec![255; (dims.area() * 4) as usize])
            };
            set.glyphs.insert(
                ch,
                Glyph {
                    metrics: GlyphMetrics {
                        advance: w as f32 + 1.0,
                        bearing: Position::new(0, h as i32),
                        bounds: dims,
                    },
                    bitmap,
                },
            );
        }
        set.kerning.insert('a', 'b', -1.0);
        set
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("DejaVu Sans"), "DejaVu_Sans");
        assert_eq!(file_stem("Noto-Serif_Bold"), "Noto-Serif_Bold");
        assert_eq!(file_stem("../evil/name"), "___evil_name");
    }

    #[test]
    fn test_write_produces_atlas_and_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fonts/test");
        let set = sample_set("Test Font");

        AtlasWriter::new(2).write(&set, &out).unwrap();

        assert_eq!(dir_entries(&out), vec!["Test_Font.json", "Test_Font.png"]);
        let (image_path, descriptor_path) = output_paths("Test Font", &out);

        let descriptor: AtlasDescriptor =
            serde_json::from_str(&fs::read_to_string(&descriptor_path).unwrap()).unwrap();
        assert_eq!(descriptor.font_name, "Test Font");
        assert_eq!(descriptor.image, "Test_Font.png");
        assert_eq!(descriptor.glyphs.len(), 3);
        assert_eq!(descriptor.kerning.len(), 1);

        let decoder = png::Decoder::new(Cursor::new(fs::read(&image_path).unwrap()));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size().unwrap()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(info.width, descriptor.atlas.width);
        assert_eq!(info.height, descriptor.atlas.height);

        // First glyph pixel is opaque, padding corner is transparent
        let rect = descriptor.glyphs.iter().find(|g| g.character == "b").unwrap().rect;
        let idx = ((rect.y * info.width + rect.x) * 4) as usize;
        assert_eq!(buf[idx + 3], 255);
        assert_eq!(buf[3], 0);
    }

    #[test]
    fn test_rewrite_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AtlasWriter::new(1);
        let set = sample_set("Same");

        writer.write(&set, dir.path()).unwrap();
        writer.write(&set, dir.path()).unwrap();

        assert_eq!(dir_entries(dir.path()), vec!["Same.json", "Same.png"]);
    }

    #[test]
    fn test_descriptor_failure_leaves_no_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let (image_path, descriptor_path) = output_paths("Blocked", dir.path());
        fs::create_dir_all(descriptor_path.join("occupied")).unwrap();

        let err = AtlasWriter::new(1)
            .write(&sample_set("Blocked"), dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to move descriptor"));
        assert!(!image_path.exists());
        assert!(descriptor_path.is_dir());
    }

    #[test]
    fn test_discard_outputs_removes_stale_pair() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AtlasWriter::new(1);
        writer.write(&sample_set("Stale"), dir.path()).unwrap();
        let (image_path, descriptor_path) = output_paths("Stale", dir.path());

        discard_outputs(&[image_path.as_path(), descriptor_path.as_path()]);

        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();

        let err = AtlasWriter::new(1)
            .write(&sample_set("X"), &blocker.join("out"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create output directory"));
    }

    #[test]
    fn test_pack_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut set = sample_set("Huge");
        let dims = Dimensions::new(MAX_SIZE + 1, 1);
        set.glyphs.insert(
            'W',
            Glyph {
                metrics: GlyphMetrics {
                    bounds: dims,
                    ..Default::default()
                },
                bitmap: GlyphBitmap::new(dims, vec![0; (dims.area() * 4) as usize]),
            },
        );

        assert!(AtlasWriter::new(0).write(&set, &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_oversized_padding_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let err = AtlasWriter::new(u32::MAX / 2 + 1)
            .write(&sample_set("Padded"), &out)
            .unwrap_err();
        assert!(err.to_string().contains("do not fit"));
        assert!(!out.exists());
    }
}
