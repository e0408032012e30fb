//! Font discovery via fontconfig
//!
//! Resolves a font name such as "Open Sans Condensed Bold" to a font file
//! and enumerates installed faces for `list-fonts`.

use std::collections::BTreeMap;
use std::ffi::CString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fontconfig::{Fontconfig, Pattern};
use tracing::{debug, info, warn};

/// Style suffixes recognised after a family name, longest first so that
/// "Condensed Bold" wins over "Bold".
const KNOWN_STYLES: &[&str] = &[
    "Condensed Bold Oblique",
    "Condensed Bold Italic",
    "Condensed Bold",
    "Condensed Oblique",
    "Condensed Italic",
    "Condensed",
    "ExtraBold Italic",
    "ExtraLight Italic",
    "SemiBold Italic",
    "Black Italic",
    "Medium Italic",
    "Light Italic",
    "Thin Italic",
    "Bold Oblique",
    "Bold Italic",
    "ExtraBold",
    "Black",
    "Bold",
    "SemiBold",
    "Medium",
    "Book",
    "Regular",
    "Light",
    "ExtraLight",
    "Thin",
    "Oblique",
    "Italic",
    "Expanded",
];

/// Family plus optional style parsed from a full font name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontQuery<'a> {
    pub family: &'a str,
    pub style: Option<&'a str>,
}

impl<'a> FontQuery<'a> {
    /// Split a trailing known style off the family name.
    ///
    /// "Open Sans Condensed Bold" -> family "Open Sans", style "Condensed Bold"
    pub fn parse(font_name: &'a str) -> Self {
        let font_name = font_name.trim();
        for style in KNOWN_STYLES {
            let Some(prefix) = font_name.strip_suffix(style) else {
                continue;
            };
            if prefix.ends_with(' ') {
                let family = prefix.trim();
                if !family.is_empty() {
                    return Self {
                        family,
                        style: Some(*style),
                    };
                }
            }
        }
        Self {
            family: font_name,
            style: None,
        }
    }
}

/// An installed font face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFont {
    /// "Family" or "Family Style" (Regular omitted)
    pub name: String,
    pub path: Option<PathBuf>,
}

/// List installed faces, sorted and de-duplicated by name
pub fn list_fonts() -> Result<Vec<InstalledFont>> {
    info!("Loading available fonts from fontconfig...");
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;
    let pattern = Pattern::new(&fc);
    let font_set = fontconfig::list_fonts(&pattern, None);

    let mut fonts = BTreeMap::new();
    for font_pattern in font_set.iter() {
        let family = font_pattern
            .get_string(fontconfig::FC_FAMILY)
            .unwrap_or("Unknown");

        let name = match font_pattern.get_string(fontconfig::FC_STYLE) {
            Some(style) if style != "Regular" => format!("{} {}", family, style),
            _ => family.to_string(),
        };

        let path = font_pattern.filename().map(PathBuf::from);
        fonts.entry(name).or_insert(path);
    }

    info!(count = fonts.len(), "Discovered fonts via fontconfig");
    Ok(fonts
        .into_iter()
        .map(|(name, path)| InstalledFont { name, path })
        .collect())
}

/// Resolve a family or full font name to an existing font file.
///
/// Fontconfig always returns its closest match; a different family is
/// treated as "not installed" rather than silently substituted.
pub fn find_font_path(font_name: &str) -> Result<PathBuf> {
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;
    let query = FontQuery::parse(font_name);

    debug!(
        font = font_name,
        family = query.family,
        style = ?query.style,
        "Resolving font via fontconfig"
    );

    let mut pattern = Pattern::new(&fc);
    let family_cstr = CString::new(query.family)
        .with_context(|| format!("Invalid family name: {}", query.family))?;
    pattern.add_string(fontconfig::FC_FAMILY, &family_cstr);

    if let Some(style) = query.style {
        let style_cstr =
            CString::new(style).with_context(|| format!("Invalid style name: {}", style))?;
        pattern.add_string(fontconfig::FC_STYLE, &style_cstr);
    }

    let matched = pattern.font_match();

    if let Some(matched_family) = matched.get_string(fontconfig::FC_FAMILY)
        && !matched_family.eq_ignore_ascii_case(query.family)
    {
        warn!(
            requested = font_name,
            matched_family = matched_family,
            "Fontconfig substituted a different family"
        );
        return Err(anyhow::anyhow!(
            "Font '{}' not found - fontconfig returned family '{}' instead",
            font_name,
            matched_family
        ));
    }

    let path = matched
        .filename()
        .map(PathBuf::from)
        .with_context(|| format!("No font file found for '{}'", font_name))?;

    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "Font file path '{}' does not exist",
            path.display()
        ));
    }

    debug!(font = font_name, path = %path.display(), "Resolved font file");
    Ok(path)
}
