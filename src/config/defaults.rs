//! User-level render defaults
//!
//! Optional `defaults.json` in the user config directory, e.g.
//!
//! ```json
//! { "size": 24, "padding": 1, "characters": "ascii,latin1" }
//! ```
//!
//! Missing file means "no overrides"; the file is never created implicitly.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::options::RenderOverrides;
use crate::constants::config::{APP_DIR, DEFAULTS_FILENAME, DIR_ENV_VAR};

pub struct UserDefaults;

impl UserDefaults {
    /// Location of defaults.json, honoring the config-dir environment override
    pub fn path() -> PathBuf {
        if let Ok(dir) = std::env::var(DIR_ENV_VAR) {
            return PathBuf::from(dir).join(DEFAULTS_FILENAME);
        }

        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(DEFAULTS_FILENAME);
        path
    }

    /// Load overrides from the default location
    pub fn load() -> Result<RenderOverrides> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<RenderOverrides> {
        if !path.exists() {
            debug!(path = %path.display(), "No user defaults file, using built-in defaults");
            return Ok(RenderOverrides::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read defaults from {:?}", path))?;

        let overrides: RenderOverrides = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        info!(path = %path.display(), "Loaded user render defaults");
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_no_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = UserDefaults::load_from(&dir.path().join("defaults.json")).unwrap();
        assert_eq!(overrides, RenderOverrides::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.json");
        fs::write(&path, r#"{"size": 18.5, "antialias": false}"#).unwrap();

        let overrides = UserDefaults::load_from(&path).unwrap();
        assert_eq!(overrides.size, Some(18.5));
        assert_eq!(overrides.antialias, Some(false));
        assert_eq!(overrides.padding, None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.json");
        fs::write(&path, r#"{"size": "big"}"#).unwrap();

        let err = UserDefaults::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse JSON"));
    }

    #[test]
    fn test_path_ends_with_app_file() {
        let path = UserDefaults::path();
        assert!(path.ends_with(DEFAULTS_FILENAME));
    }
}
