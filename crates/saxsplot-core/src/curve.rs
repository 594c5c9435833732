//! A single loaded measurement curve
//!
//! A curve couples a raw (x, y[, err]) series with its visual overrides
//! and a source-file handle. Curves restored from a session whose file
//! is gone are kept as placeholders: name, style and group membership
//! survive, only the data is absent.

use crate::style::CurveStyle;
use saxsplot_io::SeriesData;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional per-curve axis clipping, applied before transformation
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeOverride {
    #[serde(default)]
    pub x_min: Option<f64>,
    #[serde(default)]
    pub x_max: Option<f64>,
    #[serde(default)]
    pub y_min: Option<f64>,
    #[serde(default)]
    pub y_max: Option<f64>,
}

impl RangeOverride {
    /// Whether any bound is set
    pub fn is_active(&self) -> bool {
        self.x_min.is_some() || self.x_max.is_some() || self.y_min.is_some() || self.y_max.is_some()
    }

    /// Whether a raw point passes all set bounds
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x_min.map_or(true, |m| x >= m)
            && self.x_max.map_or(true, |m| x <= m)
            && self.y_min.map_or(true, |m| y >= m)
            && self.y_max.map_or(true, |m| y <= m)
    }
}

/// One measurement series with its style information
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Stable identity, defaults to the source file stem
    pub name: String,

    /// Backing file, if known
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    /// Editable legend text, independent of identity
    pub display_label: String,

    /// Raw data; empty while `data_loaded` is false
    #[serde(skip)]
    pub data: SeriesData,

    /// Whether backing data is present
    ///
    /// Serialized for information only; recomputed whenever a session
    /// is decoded.
    #[serde(default)]
    pub data_loaded: bool,

    /// Visual overrides; unset fields resolve through rules and palettes
    #[serde(default)]
    pub style: CurveStyle,

    /// Per-curve axis clipping
    #[serde(default)]
    pub range: RangeOverride,

    /// Whether the curve is drawn at all
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Whether the curve gets a legend row
    #[serde(default = "default_true")]
    pub show_in_legend: bool,

    /// Legend text emphasis
    #[serde(default)]
    pub legend_bold: bool,
    #[serde(default)]
    pub legend_italic: bool,
}

fn default_true() -> bool {
    true
}

impl Curve {
    /// Create a curve from loaded data
    pub fn new(name: impl Into<String>, source_path: Option<PathBuf>, data: SeriesData) -> Self {
        let name = name.into();
        Self {
            display_label: name.clone(),
            name,
            source_path,
            data,
            data_loaded: true,
            style: CurveStyle::default(),
            range: RangeOverride::default(),
            visible: true,
            show_in_legend: true,
            legend_bold: false,
            legend_italic: false,
        }
    }

    /// Create a curve whose backing data is unavailable
    ///
    /// Placeholders keep their identity, style and membership but
    /// contribute nothing to rendering.
    pub fn placeholder(name: impl Into<String>, source_path: Option<PathBuf>) -> Self {
        let mut curve = Self::new(name, source_path, SeriesData::default());
        curve.data_loaded = false;
        curve
    }

    /// Create a curve named after a file's stem
    pub fn from_file_data(path: &Path, data: SeriesData) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, Some(path.to_path_buf()), data)
    }

    /// Attach freshly loaded backing data
    pub fn set_data(&mut self, data: SeriesData) {
        self.data = data;
        self.data_loaded = true;
    }

    /// Drop backing data, turning the curve into a placeholder
    pub fn clear_data(&mut self) {
        self.data = SeriesData::default();
        self.data_loaded = false;
    }

    /// Number of raw points
    pub fn point_count(&self) -> usize {
        self.data.len()
    }

    /// Raw data with the per-curve range override applied
    pub fn masked_data(&self) -> SeriesData {
        if !self.range.is_active() {
            return self.data.clone();
        }
        self.data.filtered(|x, y| self.range.contains(x, y))
    }
}
