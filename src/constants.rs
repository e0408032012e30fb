//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration file locations
pub mod config {
    /// Application directory name inside the user config dir
    pub const APP_DIR: &str = "glyph-builder";

    /// User-level render defaults file
    pub const DEFAULTS_FILENAME: &str = "defaults.json";

    /// Environment variable overriding the config directory
    pub const DIR_ENV_VAR: &str = "GLYPH_BUILDER_CONFIG_DIR";
}

/// Built-in render defaults, used when neither CLI nor defaults.json set a value
pub mod defaults {
    /// Glyph size in pixels (em height)
    pub const FONT_SIZE: f32 = 32.0;

    /// Transparent pixels kept around each glyph in the atlas
    pub const PADDING: u32 = 2;

    pub const ANTIALIAS: bool = true;

    /// Opaque white, tinted at runtime by the engine
    pub const COLOR: &str = "#FFFFFFFF";

    /// Concurrent builds in batch mode
    pub const BATCH_JOBS: usize = 4;
}

/// Rasterization constants
pub mod render {
    /// Coverage at or above which a pixel is opaque when antialiasing is off
    pub const ALIASED_COVERAGE_THRESHOLD: u8 = 128;
}

/// Atlas packing limits
pub mod atlas {
    /// First atlas edge length tried
    pub const MIN_SIZE: u32 = 64;

    /// Largest atlas edge length before the writer gives up
    pub const MAX_SIZE: u32 = 4096;

    /// Largest per-side padding; anything wider cannot hold a glyph cell
    pub const MAX_PADDING: u32 = MAX_SIZE / 2;

    pub const PNG_EXTENSION: &str = "png";

    pub const DESCRIPTOR_EXTENSION: &str = "json";

    /// Descriptor format version written to the JSON file
    pub const DESCRIPTOR_VERSION: u32 = 1;
}

/// Character-set presets
pub mod charset {
    /// Printable ASCII (space to tilde)
    pub const ASCII: (u32, u32) = (0x20, 0x7E);

    /// Latin-1 supplement printable range
    pub const LATIN1: (u32, u32) = (0xA0, 0xFF);
}
