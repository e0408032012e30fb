//! Character set selection
//!
//! Parses the comma-separated syntax accepted by `--chars` and manifests:
//!
//! - presets: `ascii`, `latin1`
//! - ranges: `A-Z`, `U+0400-U+04FF`
//! - single code points: `U+20AC`
//! - anything else is a literal run of characters (`\,` escapes a comma)

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::charset::{ASCII, LATIN1};

/// Ordered, de-duplicated set of characters to render
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharacterSet {
    chars: BTreeSet<char>,
    /// Source text, kept for diagnostics and re-serialization
    spec: String,
}

impl CharacterSet {
    pub fn parse(spec: &str) -> Result<Self> {
        let mut chars = BTreeSet::new();

        for item in split_items(spec) {
            parse_item(&item, &mut chars)
                .with_context(|| format!("Invalid character set item '{}'", item))?;
        }

        if chars.is_empty() {
            return Err(anyhow::anyhow!("Character set '{}' selects no characters", spec));
        }

        Ok(Self {
            chars,
            spec: spec.to_string(),
        })
    }

    /// Printable ASCII, the built-in default
    pub fn ascii() -> Self {
        Self {
            chars: (ASCII.0..=ASCII.1).filter_map(char::from_u32).collect(),
            spec: "ascii".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    pub fn as_spec(&self) -> &str {
        &self.spec
    }
}

impl FromStr for CharacterSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} chars)", self.spec, self.chars.len())
    }
}

impl Serialize for CharacterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_spec())
    }
}

impl<'de> Deserialize<'de> for CharacterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CharacterSet::parse(&raw).map_err(|e| serde::de::Error::custom(format!("{:#}", e)))
    }
}

/// Split on unescaped commas, dropping empty items
fn split_items(spec: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = spec.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    items.push(current);

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

fn parse_item(item: &str, chars: &mut BTreeSet<char>) -> Result<()> {
    let trimmed = item.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "ascii" => return insert_range(chars, ASCII.0, ASCII.1),
        "latin1" => return insert_range(chars, LATIN1.0, LATIN1.1),
        _ => {}
    }

    if let Some((start, end)) = split_code_point_range(trimmed) {
        let start = parse_code_point(start)?;
        let end = parse_code_point(end)?;
        return insert_range(chars, start, end);
    }

    if is_code_point(trimmed) {
        let value = parse_code_point(trimmed)?;
        let ch = char::from_u32(value)
            .with_context(|| format!("U+{:04X} is not a valid character", value))?;
        chars.insert(ch);
        return Ok(());
    }

    let literal: Vec<char> = trimmed.chars().collect();
    if literal.len() == 3 && literal[1] == '-' {
        return insert_range(chars, literal[0] as u32, literal[2] as u32);
    }

    // Literal run keeps surrounding whitespace so " " can select a space
    chars.extend(item.chars());
    Ok(())
}

fn is_code_point(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    upper
        .strip_prefix("U+")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn split_code_point_range(text: &str) -> Option<(&str, &str)> {
    let (start, end) = text.split_once('-')?;
    (is_code_point(start) && is_code_point(end)).then_some((start, end))
}

fn parse_code_point(text: &str) -> Result<u32> {
    let hex = &text[2..];
    u32::from_str_radix(hex, 16).with_context(|| format!("Invalid code point '{}'", text))
}

/// Insert an inclusive range, skipping surrogates and other non-chars
fn insert_range(chars: &mut BTreeSet<char>, start: u32, end: u32) -> Result<()> {
    if start > end {
        return Err(anyhow::anyhow!(
            "Range U+{:04X}-U+{:04X} is reversed",
            start,
            end
        ));
    }
    if end > char::MAX as u32 {
        return Err(anyhow::anyhow!("U+{:X} is beyond the Unicode range", end));
    }
    chars.extend((start..=end).filter_map(char::from_u32));
    Ok(())
}
