//! Build configuration
//!
//! Build options and their validation, character-set syntax, the optional
//! user defaults file, and multi-font batch manifests.

pub mod charset;
pub mod defaults;
pub mod manifest;
pub mod options;

pub use charset::CharacterSet;
pub use defaults::UserDefaults;
pub use manifest::BuildManifest;
pub use options::{BuildOptions, RenderOverrides, RenderSettings};
