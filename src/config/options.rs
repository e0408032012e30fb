//! Build request values
//!
//! `BuildOptions` is the immutable description of one font build. Render
//! settings are layered: built-in constants, then the user defaults file,
//! then manifest defaults, then per-build values and CLI flags.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::HexColor;
use crate::config::charset::CharacterSet;
use crate::constants::atlas::MAX_PADDING;
use crate::constants::defaults;

/// Rasterization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Pixel size (em height)
    pub size: f32,
    /// Transparent border kept around each glyph in the atlas
    pub padding: u32,
    pub antialias: bool,
    pub color: HexColor,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            size: defaults::FONT_SIZE,
            padding: defaults::PADDING,
            antialias: defaults::ANTIALIAS,
            color: HexColor::parse(defaults::COLOR).unwrap_or_default(),
        }
    }
}

/// Optional values that override lower layers when present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<CharacterSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antialias: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
}

impl RenderOverrides {
    /// Fill unset fields from `lower`
    pub fn layered_over(self, lower: &RenderOverrides) -> RenderOverrides {
        RenderOverrides {
            characters: self.characters.or_else(|| lower.characters.clone()),
            size: self.size.or(lower.size),
            padding: self.padding.or(lower.padding),
            antialias: self.antialias.or(lower.antialias),
            color: self.color.or(lower.color),
        }
    }

    /// Write every set field into `options`
    pub fn apply_to(&self, options: &mut BuildOptions) {
        if let Some(characters) = &self.characters {
            options.characters = characters.clone();
        }
        if let Some(size) = self.size {
            options.render.size = size;
        }
        if let Some(padding) = self.padding {
            options.render.padding = padding;
        }
        if let Some(antialias) = self.antialias {
            options.render.antialias = antialias;
        }
        if let Some(color) = self.color {
            options.render.color = color;
        }
    }
}

/// One font build request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Used in diagnostics, output file names, and fontconfig lookup
    pub font_name: String,
    /// Font file; resolved from `font_name` via fontconfig when absent
    pub font_path: Option<PathBuf>,
    pub characters: CharacterSet,
    pub render: RenderSettings,
    pub output_directory_path: PathBuf,
}

impl BuildOptions {
    /// Options with built-in defaults for everything but name and output
    pub fn new(font_name: impl Into<String>, output_directory_path: impl Into<PathBuf>) -> Self {
        Self {
            font_name: font_name.into(),
            font_path: None,
            characters: CharacterSet::ascii(),
            render: RenderSettings::default(),
            output_directory_path: output_directory_path.into(),
        }
    }

    #[cfg(test)]
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    #[cfg(test)]
    pub fn with_characters(mut self, characters: CharacterSet) -> Self {
        self.characters = characters;
        self
    }

    /// Check the invariants a build relies on.
    ///
    /// Writability of the output directory is left to the writer.
    pub fn validate(&self) -> Result<()> {
        if self.font_name.trim().is_empty() {
            return Err(anyhow::anyhow!("Font name must not be empty"));
        }

        if !self.render.size.is_finite() || self.render.size <= 0.0 {
            return Err(anyhow::anyhow!(
                "Font size for '{}' must be a positive number, got {}",
                self.font_name,
                self.render.size
            ));
        }

        if self.render.padding > MAX_PADDING {
            return Err(anyhow::anyhow!(
                "Padding for '{}' must be at most {}, got {}",
                self.font_name,
                MAX_PADDING,
                self.render.padding
            ));
        }

        if self.characters.is_empty() {
            return Err(anyhow::anyhow!(
                "Character set for '{}' is empty",
                self.font_name
            ));
        }

        if self.output_directory_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!(
                "Output directory for '{}' must not be empty",
                self.font_name
            ));
        }

        if self.output_directory_path.exists() && !self.output_directory_path.is_dir() {
            return Err(anyhow::anyhow!(
                "Output path '{}' exists and is not a directory",
                self.output_directory_path.display()
            ));
        }

        if let Some(path) = &self.font_path
            && !path.is_file()
        {
            return Err(anyhow::anyhow!(
                "Font file '{}' does not exist",
                path.display()
            ));
        }

        Ok(())
    }
}
