//! Per-curve style model and the style resolver
//!
//! A curve's effective rendering style is resolved through a short
//! precedence chain, each non-null field short-circuiting the rest:
//!
//! 1. the curve's own explicit field,
//! 2. a preset matched by keyword against the curve name (first rule wins),
//! 3. a palette-assigned color and hard engineering defaults.
//!
//! Resolution is pure: identical inputs always produce identical output,
//! with no hidden counters.

use crate::error::{CoreError, CoreResult};
use crate::palette::{Color, Palette, PaletteSet};
use serde::{Deserialize, Serialize};

/// Line style of a curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
    /// No connecting line (markers only)
    None,
}

/// Marker shape of a curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerStyle {
    Circle,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Plus,
    Cross,
    Star,
    Pentagon,
    Hexagon,
    Point,
}

impl MarkerStyle {
    /// All marker shapes in display order
    pub fn all() -> [MarkerStyle; 13] {
        use MarkerStyle::*;
        [
            Circle,
            Square,
            Diamond,
            TriangleUp,
            TriangleDown,
            TriangleLeft,
            TriangleRight,
            Plus,
            Cross,
            Star,
            Pentagon,
            Hexagon,
            Point,
        ]
    }
}

/// How measurement uncertainty is drawn
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ErrorBand {
    /// Translucent filled region around the curve
    FilledRegion { opacity: f32 },

    /// Classic error bars with end caps
    CappedBars { cap_size: f32, line_width: f32 },

    /// No uncertainty drawn
    None,
}

impl ErrorBand {
    /// Filled region at the conventional 30% opacity
    pub fn default_fill() -> Self {
        ErrorBand::FilledRegion { opacity: 0.3 }
    }

    /// Capped bars with conventional geometry
    pub fn default_bars() -> Self {
        ErrorBand::CappedBars {
            cap_size: 3.0,
            line_width: 1.0,
        }
    }
}

/// Hard engineering defaults used when nothing else applies
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
pub const DEFAULT_MARKER_SIZE: f32 = 4.0;

/// Visual overrides stored on a curve
///
/// `None` fields inherit from the rule table or palette; `Some` fields
/// are explicit and win outright.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveStyle {
    #[serde(default)]
    pub color: Option<Color>,

    #[serde(default)]
    pub line_style: Option<LineStyle>,

    #[serde(default)]
    pub marker: Option<MarkerStyle>,

    #[serde(default)]
    pub line_width: Option<f32>,

    #[serde(default)]
    pub marker_size: Option<f32>,

    #[serde(default)]
    pub error_band: Option<ErrorBand>,

    /// Master switch for drawing uncertainty at all
    #[serde(default = "default_true")]
    pub show_error_band: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            color: None,
            line_style: None,
            marker: None,
            line_width: None,
            marker_size: None,
            error_band: None,
            show_error_band: true,
        }
    }
}

/// The fully resolved style of one curve, ready for the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveStyle {
    pub color: Color,
    pub line_style: LineStyle,
    pub marker: Option<MarkerStyle>,
    pub line_width: f32,
    pub marker_size: f32,
    pub error_band: ErrorBand,
}

/// A named style preset applied by the auto-detection rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    pub name: String,
    pub line_style: LineStyle,
    pub marker: Option<MarkerStyle>,
    pub line_width: f32,
    pub marker_size: f32,
    /// Error band forced by this preset, when set
    #[serde(default)]
    pub error_band: Option<ErrorBand>,
}

/// One auto-detection rule: keyword substring -> preset name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoStyleRule {
    pub keyword: String,
    pub preset: String,
}

/// Ordered rule table for style auto-detection by curve name
///
/// The first rule whose keyword occurs in the lowercased curve name wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<AutoStyleRule>,
    pub presets: Vec<StylePreset>,

    /// Disable auto-detection entirely without discarding the table
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleTable {
    /// Rule table with the conventional presets for scattering work:
    /// fits as solid lines, measurements as markers with a filled error
    /// region, simulations dashed, theory dash-dotted.
    pub fn standard() -> Self {
        let presets = vec![
            StylePreset {
                name: "fit".to_string(),
                line_style: LineStyle::Solid,
                marker: None,
                line_width: 2.0,
                marker_size: 0.0,
                error_band: None,
            },
            StylePreset {
                name: "measurement".to_string(),
                line_style: LineStyle::None,
                marker: Some(MarkerStyle::Circle),
                line_width: 1.5,
                marker_size: 4.0,
                error_band: Some(ErrorBand::default_fill()),
            },
            StylePreset {
                name: "simulation".to_string(),
                line_style: LineStyle::Dashed,
                marker: None,
                line_width: 1.5,
                marker_size: 0.0,
                error_band: None,
            },
            StylePreset {
                name: "theory".to_string(),
                line_style: LineStyle::DashDot,
                marker: None,
                line_width: 1.5,
                marker_size: 0.0,
                error_band: None,
            },
        ];

        let rules = [
            ("fit", "fit"),
            ("fitted", "fit"),
            ("anpassung", "fit"),
            ("messung", "measurement"),
            ("measurement", "measurement"),
            ("measure", "measurement"),
            ("data", "measurement"),
            ("daten", "measurement"),
            ("sim", "simulation"),
            ("simulation", "simulation"),
            ("theo", "theory"),
            ("theory", "theory"),
            ("theorie", "theory"),
        ]
        .iter()
        .map(|(keyword, preset)| AutoStyleRule {
            keyword: keyword.to_string(),
            preset: preset.to_string(),
        })
        .collect();

        Self {
            rules,
            presets,
            enabled: true,
        }
    }

    /// Check the table for structural problems
    ///
    /// Empty keywords and rules naming unknown presets are rejected.
    pub fn validate(&self) -> CoreResult<()> {
        for rule in &self.rules {
            if rule.keyword.trim().is_empty() {
                return Err(CoreError::InvalidParameter(
                    "auto-style rule with empty keyword".to_string(),
                ));
            }
            if !self.presets.iter().any(|p| p.name == rule.preset) {
                return Err(CoreError::InvalidParameter(format!(
                    "auto-style rule '{}' names unknown preset '{}'",
                    rule.keyword, rule.preset
                )));
            }
        }
        Ok(())
    }

    /// Find the preset for a curve name, first matching rule wins
    pub fn match_name(&self, name: &str) -> Option<&StylePreset> {
        if !self.enabled {
            return None;
        }
        let lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lower.contains(&rule.keyword.to_lowercase()))
            .and_then(|rule| self.presets.iter().find(|p| p.name == rule.preset))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Resolve the effective style of one curve
///
/// `context_index` is the curve's position inside its rendering context
/// (its group's member order, or its index among the unassigned curves);
/// it selects the palette color when no explicit color is set.
pub fn resolve(
    curve_name: &str,
    style: &CurveStyle,
    context_index: usize,
    group_palette: Option<&str>,
    global_palette: &str,
    rules: &RuleTable,
    palettes: &PaletteSet,
) -> EffectiveStyle {
    let preset = rules.match_name(curve_name);

    let color = style
        .color
        .unwrap_or_else(|| palette_for(group_palette, global_palette, palettes).color_for_index(context_index));

    // Line and marker fall back together: a curve that resolved neither
    // is drawn as bare markers, which is the convention for raw data.
    let (line_style, marker) = match (style.line_style, style.marker, preset) {
        (Some(line), Some(marker), _) => (line, Some(marker)),
        (Some(line), None, preset) => (line, preset.and_then(|p| p.marker)),
        (None, Some(marker), preset) => {
            (preset.map(|p| p.line_style).unwrap_or(LineStyle::None), Some(marker))
        }
        (None, None, Some(preset)) => (preset.line_style, preset.marker),
        (None, None, None) => (LineStyle::None, Some(MarkerStyle::Circle)),
    };

    let line_width = style
        .line_width
        .or(preset.map(|p| p.line_width))
        .unwrap_or(DEFAULT_LINE_WIDTH);
    let marker_size = style
        .marker_size
        .or(preset.map(|p| p.marker_size))
        .unwrap_or(DEFAULT_MARKER_SIZE);

    let error_band = if style.show_error_band {
        style
            .error_band
            .or(preset.and_then(|p| p.error_band))
            .unwrap_or_else(ErrorBand::default_fill)
    } else {
        ErrorBand::None
    };

    EffectiveStyle {
        color,
        line_style,
        marker,
        line_width,
        marker_size,
        error_band,
    }
}

fn palette_for<'a>(
    group_palette: Option<&str>,
    global_palette: &str,
    palettes: &'a PaletteSet,
) -> &'a Palette {
    match group_palette {
        Some(name) => palettes.get_or_default(name),
        None => palettes.get_or_default(global_palette),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DEFAULT_PALETTE;

    fn resolve_simple(name: &str, style: &CurveStyle, index: usize) -> EffectiveStyle {
        resolve(
            name,
            style,
            index,
            None,
            DEFAULT_PALETTE,
            &RuleTable::standard(),
            &PaletteSet::builtin(),
        )
    }

    #[test]
    fn test_explicit_color_wins() {
        let explicit = Color::from_hex("#112233").unwrap();
        let style = CurveStyle {
            color: Some(explicit),
            ..Default::default()
        };
        // Regardless of context index or matching rules.
        for index in 0..5 {
            assert_eq!(resolve_simple("measurement_a", &style, index).color, explicit);
        }
    }

    #[test]
    fn test_fit_rule_gives_solid_line() {
        let s = resolve_simple("sample_fit", &CurveStyle::default(), 0);
        assert_eq!(s.line_style, LineStyle::Solid);
        assert_eq!(s.marker, None);
    }

    #[test]
    fn test_measurement_rule_gives_markers_and_fill_band() {
        let s = resolve_simple("messung_01", &CurveStyle::default(), 0);
        assert_eq!(s.line_style, LineStyle::None);
        assert_eq!(s.marker, Some(MarkerStyle::Circle));
        assert_eq!(s.error_band, ErrorBand::FilledRegion { opacity: 0.3 });
    }

    #[test]
    fn test_simulation_and_theory_rules() {
        assert_eq!(
            resolve_simple("sim_run3", &CurveStyle::default(), 0).line_style,
            LineStyle::Dashed
        );
        assert_eq!(
            resolve_simple("theo_model", &CurveStyle::default(), 0).line_style,
            LineStyle::DashDot
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut table = RuleTable::standard();
        // "fit_data" matches both "fit" and "data"; "fit" comes first.
        let preset = table.match_name("fit_data").unwrap();
        assert_eq!(preset.name, "fit");

        table.rules.reverse();
        let preset = table.match_name("fit_data").unwrap();
        assert_eq!(preset.name, "measurement");
    }

    #[test]
    fn test_unmatched_name_falls_back_to_markers() {
        let s = resolve_simple("lysozyme_01", &CurveStyle::default(), 0);
        assert_eq!(s.line_style, LineStyle::None);
        assert_eq!(s.marker, Some(MarkerStyle::Circle));
        assert_eq!(s.line_width, DEFAULT_LINE_WIDTH);
        assert_eq!(s.marker_size, DEFAULT_MARKER_SIZE);
    }

    #[test]
    fn test_palette_color_by_context_index() {
        let palettes = PaletteSet::builtin();
        let palette = palettes.get(DEFAULT_PALETTE).unwrap();
        for index in [0usize, 3, 17] {
            let s = resolve_simple("curve", &CurveStyle::default(), index);
            assert_eq!(s.color, palette.color_for_index(index));
        }
    }

    #[test]
    fn test_group_palette_preferred() {
        let palettes = PaletteSet::builtin();
        let s = resolve(
            "curve",
            &CurveStyle::default(),
            0,
            Some("vibrant"),
            DEFAULT_PALETTE,
            &RuleTable::standard(),
            &palettes,
        );
        assert_eq!(s.color, palettes.get("vibrant").unwrap().color_for_index(0));
    }

    #[test]
    fn test_show_error_band_off_forces_none() {
        let style = CurveStyle {
            show_error_band: false,
            error_band: Some(ErrorBand::default_bars()),
            ..Default::default()
        };
        assert_eq!(resolve_simple("messung", &style, 0).error_band, ErrorBand::None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let style = CurveStyle::default();
        let a = resolve_simple("data_a", &style, 2);
        let b = resolve_simple("data_a", &style, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rule_table_validation() {
        let mut table = RuleTable::standard();
        assert!(table.validate().is_ok());

        table.rules.push(AutoStyleRule {
            keyword: "xrd".to_string(),
            preset: "no_such_preset".to_string(),
        });
        assert!(matches!(
            table.validate(),
            Err(CoreError::InvalidParameter(_))
        ));

        table.rules.pop();
        table.rules.push(AutoStyleRule {
            keyword: "  ".to_string(),
            preset: "fit".to_string(),
        });
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_disabled_table_matches_nothing() {
        let mut table = RuleTable::standard();
        table.enabled = false;
        assert!(table.match_name("fit").is_none());
    }

    #[test]
    fn test_thirteen_marker_shapes() {
        assert_eq!(MarkerStyle::all().len(), 13);
    }
}
