//! Batch build manifests
//!
//! A manifest lists several fonts to build in one run:
//!
//! ```json
//! {
//!   "defaults": { "size": 32, "characters": "ascii" },
//!   "builds": [
//!     { "font_name": "DejaVu Sans", "output_directory": "fonts/dejavu" },
//!     { "font_name": "Title", "font_path": "src/title.otf",
//!       "output_directory": "fonts/title", "size": 64 }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::options::{BuildOptions, RenderOverrides};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub font_name: String,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    pub output_directory: PathBuf,
    #[serde(flatten)]
    pub overrides: RenderOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub defaults: RenderOverrides,
    pub builds: Vec<ManifestEntry>,
}

impl BuildManifest {
    /// Load and parse a manifest, resolving relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {:?}", path))?;

        let mut manifest: BuildManifest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in &mut manifest.builds {
            entry.output_directory = resolve(base, &entry.output_directory);
            entry.font_path = entry.font_path.as_deref().map(|p| resolve(base, p));
        }

        info!(
            manifest = %path.display(),
            builds = manifest.builds.len(),
            "Loaded build manifest"
        );
        Ok(manifest)
    }

    /// Expand every entry into validated build options.
    ///
    /// Layers: `user` defaults, then manifest defaults, then the entry.
    /// Output directories must be distinct across entries.
    pub fn to_build_options(&self, user: &RenderOverrides) -> Result<Vec<BuildOptions>> {
        if self.builds.is_empty() {
            return Err(anyhow::anyhow!("Manifest contains no builds"));
        }

        let shared = self.defaults.clone().layered_over(user);
        let mut seen_outputs = HashSet::new();
        let mut all_options = Vec::with_capacity(self.builds.len());

        for entry in &self.builds {
            if !seen_outputs.insert(entry.output_directory.clone()) {
                return Err(anyhow::anyhow!(
                    "Output directory '{}' is used by more than one build",
                    entry.output_directory.display()
                ));
            }

            let mut options = BuildOptions::new(&entry.font_name, &entry.output_directory);
            options.font_path = entry.font_path.clone();
            entry.overrides.clone().layered_over(&shared).apply_to(&mut options);

            options
                .validate()
                .with_context(|| format!("Invalid manifest entry for font '{}'", entry.font_name))?;
            all_options.push(options);
        }

        Ok(all_options)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("fonts.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"builds": [{"font_name": "A", "output_directory": "out/a"},
                           {"font_name": "B", "output_directory": "/abs/b"}]}"#,
        );

        let manifest = BuildManifest::load(&path).unwrap();
        assert_eq!(manifest.builds[0].output_directory, dir.path().join("out/a"));
        assert_eq!(manifest.builds[1].output_directory, PathBuf::from("/abs/b"));
    }

    #[test]
    fn test_layering_into_build_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"defaults": {"size": 20, "padding": 3},
                "builds": [{"font_name": "A", "output_directory": "a", "size": 40},
                           {"font_name": "B", "output_directory": "b", "characters": "0-9"}]}"#,
        );

        let user = RenderOverrides {
            padding: Some(9),
            antialias: Some(false),
            ..Default::default()
        };

        let options = BuildManifest::load(&path)
            .unwrap()
            .to_build_options(&user)
            .unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].render.size, 40.0);
        assert_eq!(options[0].render.padding, 3);
        assert!(!options[0].render.antialias);
        assert_eq!(options[1].render.size, 20.0);
        assert_eq!(options[1].characters.len(), 10);
        assert_eq!(options[0].characters.len(), 95);
    }

    #[test]
    fn test_duplicate_output_directories_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"builds": [{"font_name": "A", "output_directory": "same"},
                           {"font_name": "B", "output_directory": "same"}]}"#,
        );

        let err = BuildManifest::load(&path)
            .unwrap()
            .to_build_options(&RenderOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("more than one build"));
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let manifest = BuildManifest::default();
        assert!(manifest.to_build_options(&RenderOverrides::default()).is_err());
    }

    #[test]
    fn test_invalid_entry_names_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            r#"{"builds": [{"font_name": "Broken", "output_directory": "x", "size": -1}]}"#,
        );

        let err = BuildManifest::load(&path)
            .unwrap()
            .to_build_options(&RenderOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }
}
