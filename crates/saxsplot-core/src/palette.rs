//! Colors and named palettes
//!
//! Curves that carry no explicit color are assigned one from a palette:
//! the owning group's palette when set, otherwise the session-wide one.
//! Palettes are ordered and indexed modulo their length, so assignment
//! is deterministic for a given arrangement.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// An RGBA color (components 0.0 to 1.0)
///
/// Serialized as a hex string (`#RRGGBB`, or `#RRGGBBAA` when the alpha
/// channel is not 1.0) to match the persisted session format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB (alpha = 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from a hex string (e.g. "#FF5733" or "FF5733AA")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
        let a = if hex.len() == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()? as f32 / 255.0
        } else {
            1.0
        };

        Some(Self { r, g, b, a })
    }

    /// Convert to a hex string
    pub fn to_hex(&self) -> String {
        let (r, g, b) = (
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        );
        if self.a < 1.0 {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, (self.a * 255.0).round() as u8)
        } else {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid color '{s}'")))
    }
}

/// An ordered, named sequence of colors
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Palette name
    pub name: String,

    /// Colors in assignment order
    pub colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from hex strings, dropping unparseable entries
    pub fn from_hex(name: impl Into<String>, hex: &[&str]) -> Self {
        Self {
            name: name.into(),
            colors: hex.iter().filter_map(|h| Color::from_hex(h)).collect(),
        }
    }

    /// Color for a rendering-context index (modulo palette length)
    pub fn color_for_index(&self, index: usize) -> Color {
        if self.colors.is_empty() {
            return Color::default();
        }
        self.colors[index % self.colors.len()]
    }

    /// Number of colors in the palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no colors
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Name of the palette that is always available
pub const DEFAULT_PALETTE: &str = "default";

/// The default categorical palette
pub fn default_palette() -> Palette {
    Palette::from_hex(
        DEFAULT_PALETTE,
        &[
            "#003A5D", // dark blue
            "#0088CC", // light blue
            "#D4AF37", // gold
            "#CC3333", // red
            "#339933", // green
            "#006666", // turquoise
            "#FF8800", // orange
            "#9966CC", // purple
            "#8C8C8C", // gray
            "#8B4513", // brown
        ],
    )
}

/// Colorblind-safe categorical palette
pub fn colorblind_safe() -> Palette {
    Palette::from_hex(
        "colorblind_safe",
        &[
            "#0173B2", "#DE8F05", "#029E73", "#CC78BC", "#CA9161", "#FBAFE4", "#949494",
            "#ECE133",
        ],
    )
}

/// High-saturation categorical palette
pub fn vibrant() -> Palette {
    Palette::from_hex(
        "vibrant",
        &[
            "#EE7733", "#0077BB", "#33BBEE", "#EE3377", "#CC3311", "#009988", "#BBBBBB",
        ],
    )
}

/// Sequential blue palette for many related curves
pub fn sequential_blue() -> Palette {
    Palette::from_hex(
        "sequential_blue",
        &[
            "#C6DBEF", "#9ECAE1", "#6BAED6", "#4292C6", "#2171B5", "#08519C", "#08306B",
        ],
    )
}

/// Names of all built-in palettes
pub fn builtin_palette_names() -> Vec<&'static str> {
    vec!["default", "colorblind_safe", "vibrant", "sequential_blue"]
}

/// The registry of palettes available for style resolution
///
/// Starts with the built-in palettes; callers may register their own.
/// Lookups for unknown names fall back to the default palette, so
/// resolution never fails.
#[derive(Clone, Debug)]
pub struct PaletteSet {
    palettes: HashMap<String, Palette>,
}

impl PaletteSet {
    /// Registry containing only the built-in palettes
    pub fn builtin() -> Self {
        let mut palettes = HashMap::new();
        for p in [
            default_palette(),
            colorblind_safe(),
            vibrant(),
            sequential_blue(),
        ] {
            palettes.insert(p.name.clone(), p);
        }
        Self { palettes }
    }

    /// Register or replace a palette
    pub fn insert(&mut self, palette: Palette) {
        self.palettes.insert(palette.name.clone(), palette);
    }

    /// Look up a palette by name
    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    /// Look up a palette, falling back to the default palette
    pub fn get_or_default(&self, name: &str) -> &Palette {
        self.palettes
            .get(name)
            .or_else(|| self.palettes.get(DEFAULT_PALETTE))
            .expect("default palette is always registered")
    }

    /// Registered palette names
    pub fn names(&self) -> Vec<&str> {
        self.palettes.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex("#0173B2").unwrap();
        assert_eq!(c.to_hex(), "#0173B2");
    }

    #[test]
    fn test_color_hex_with_alpha() {
        let c = Color::from_hex("#0173B280").unwrap();
        assert!(c.a < 1.0);
        assert_eq!(c.to_hex(), "#0173B280");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Color::from_hex("#123").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn test_color_serde_as_hex_string() {
        let c = Color::from_hex("#CC3333").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#CC3333\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_palette_wraps_around() {
        let p = default_palette();
        assert_eq!(p.color_for_index(0), p.color_for_index(p.len()));
    }

    #[test]
    fn test_palette_set_fallback() {
        let set = PaletteSet::builtin();
        let p = set.get_or_default("no_such_palette");
        assert_eq!(p.name, DEFAULT_PALETTE);
    }

    #[test]
    fn test_builtin_names_resolve() {
        let set = PaletteSet::builtin();
        for name in builtin_palette_names() {
            assert!(set.get(name).is_some(), "missing palette {name}");
        }
    }
}
