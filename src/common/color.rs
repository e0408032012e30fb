//! Color type conversions and utilities
//!
//! Provides type-safe color handling with conversions between:
//! - Hex strings (#AARRGGBB format)
//! - ARGB32 values (u32)
//! - RGBA8 pixels tinted by glyph coverage

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hex color in ARGB32 format (#AARRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(u32);

impl HexColor {
    /// Parse hex color string supporting multiple formats:
    /// - 6 digits: RRGGBB (full opacity assumed, becomes FFRRGGBB)
    /// - 8 digits: AARRGGBB (explicit alpha)
    /// - Optional '#' prefix supported but not required
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        let argb = if hex.len() == 6 {
            0xFF_00_00_00 | value
        } else {
            value
        };

        Some(Self(argb))
    }

    /// Create from ARGB32 value
    pub fn from_argb32(argb: u32) -> Self {
        Self(argb)
    }

    /// Get raw ARGB32 value
    pub fn argb32(self) -> u32 {
        self.0
    }

    /// Split into (r, g, b, a) channels
    pub fn channels(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
            ((self.0 >> 24) & 0xFF) as u8,
        )
    }

    /// Straight-alpha RGBA pixel for a coverage value (0 = empty, 255 = full)
    pub fn tint(self, coverage: u8) -> [u8; 4] {
        let (r, g, b, a) = self.channels();
        if coverage == 0 {
            return [0, 0, 0, 0];
        }
        // Integer math: alpha = a * coverage / 255
        let alpha = (a as u32 * coverage as u32) / 255;
        [r, g, b, alpha as u8]
    }

    /// Format as #AARRGGBB
    pub fn to_hex_string(self) -> String {
        format!("#{:08X}", self.0)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(0xFF_FF_FF_FF)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        HexColor::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{}'", raw)))
    }
}
