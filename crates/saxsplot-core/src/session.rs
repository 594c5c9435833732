//! Session model and persistence codec
//!
//! A session is the full arrangement: groups, curves, styles, the active
//! plot type, palette selection, annotations and ordering flags. The
//! persisted form is versioned JSON. Curve data is never serialized;
//! it is re-loaded from the source files on decode, and curves whose
//! files cannot be located degrade to placeholders instead of failing
//! the whole load.

use crate::annotation::{Annotation, Orientation, ReferenceLine};
use crate::curve::Curve;
use crate::error::{CoreResult, SessionError, SessionResult};
use crate::order::Arrangement;
use crate::palette::DEFAULT_PALETTE;
use crate::transform::{convert_reference_value, PlotType, TransformParams, CU_K_ALPHA_NM};
use saxsplot_io::{LoadError, SeriesData};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version written by this codec
pub const SESSION_VERSION: u64 = 1;

/// Session-wide axis limits; unset bounds auto-scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    #[serde(default)]
    pub x_min: Option<f64>,
    #[serde(default)]
    pub x_max: Option<f64>,
    #[serde(default)]
    pub y_min: Option<f64>,
    #[serde(default)]
    pub y_max: Option<f64>,
    #[serde(default = "default_true")]
    pub auto: bool,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            auto: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_palette_name() -> String {
    DEFAULT_PALETTE.to_string()
}

fn default_wavelength() -> f64 {
    CU_K_ALPHA_NM
}

fn default_version() -> u64 {
    SESSION_VERSION
}

/// The full persisted arrangement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Format version tag
    #[serde(default = "default_version")]
    pub version: u64,

    /// Groups, curves and their ordering
    #[serde(flatten)]
    pub arrangement: Arrangement,

    /// Active analysis mode
    #[serde(default)]
    pub plot_type: PlotType,

    /// Whether group multipliers are applied at all
    #[serde(default = "default_true")]
    pub stacking_enabled: bool,

    /// Session-wide palette; groups may override it
    #[serde(default = "default_palette_name")]
    pub global_palette: String,

    /// Radiation wavelength in nm for the 2θ transform
    #[serde(default = "default_wavelength")]
    pub wavelength: f64,

    /// Session-wide axis limits
    #[serde(default)]
    pub axis_limits: AxisLimits,

    /// Axis label overrides; None uses the plot type's canonical labels
    #[serde(default)]
    pub custom_x_label: Option<String>,
    #[serde(default)]
    pub custom_y_label: Option<String>,

    /// Presentation blobs owned by the windowing layer, passed through
    /// untouched
    #[serde(default)]
    pub legend_settings: serde_json::Value,
    #[serde(default)]
    pub grid_settings: serde_json::Value,
    #[serde(default)]
    pub font_settings: serde_json::Value,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub reference_lines: Vec<ReferenceLine>,

    /// Reverse the legend sequence without touching the z-order
    #[serde(default)]
    pub legend_reverse_order: bool,

    /// RFC3339 timestamp of the last save
    #[serde(default)]
    pub saved_at: String,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            version: SESSION_VERSION,
            arrangement: Arrangement::default(),
            plot_type: PlotType::default(),
            stacking_enabled: true,
            global_palette: default_palette_name(),
            wavelength: CU_K_ALPHA_NM,
            axis_limits: AxisLimits::default(),
            custom_x_label: None,
            custom_y_label: None,
            legend_settings: serde_json::Value::Null,
            grid_settings: serde_json::Value::Null,
            font_settings: serde_json::Value::Null,
            annotations: Vec::new(),
            reference_lines: Vec::new(),
            legend_reverse_order: false,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Transform parameters derived from the session configuration
    pub fn transform_params(&self) -> TransformParams {
        TransformParams {
            wavelength: self.wavelength,
        }
    }

    /// Switch the analysis mode, keeping vertical reference lines on
    /// the same physical feature by converting their x positions
    pub fn set_plot_type(&mut self, plot_type: PlotType) {
        if plot_type == self.plot_type {
            return;
        }
        let params = self.transform_params();
        for line in &mut self.reference_lines {
            if line.orientation == Orientation::Vertical {
                line.position =
                    convert_reference_value(line.position, self.plot_type, plot_type, &params);
            }
        }
        self.plot_type = plot_type;
    }

    /// Update the save timestamp
    pub fn touch(&mut self) {
        self.saved_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The data-loading collaborator consumed during decode and import
pub trait DataSource {
    /// Load the parsed triples behind a source handle
    fn load(&self, path: &Path) -> Result<SeriesData, LoadError>;
}

/// Loads measurement files from disk
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDataSource;

impl DataSource for FileDataSource {
    fn load(&self, path: &Path) -> Result<SeriesData, LoadError> {
        saxsplot_io::load_series(path)
    }
}

/// A source with no data; every curve decodes as a placeholder
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDataSource;

impl DataSource for NullDataSource {
    fn load(&self, path: &Path) -> Result<SeriesData, LoadError> {
        Err(LoadError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Non-fatal findings collected while decoding a session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionWarning {
    /// A curve's backing data could not be located; the curve was kept
    /// as a placeholder
    DataUnavailable {
        name: String,
        path: Option<PathBuf>,
    },
}

impl std::fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionWarning::DataUnavailable { name, path } => match path {
                Some(p) => write!(f, "data for '{name}' unavailable: {}", p.display()),
                None => write!(f, "data for '{name}' unavailable: no source path"),
            },
        }
    }
}

/// Number of curves that decoded without backing data
pub fn missing_data_count(warnings: &[SessionWarning]) -> usize {
    warnings
        .iter()
        .filter(|w| matches!(w, SessionWarning::DataUnavailable { .. }))
        .count()
}

/// Import a new curve from a measurement file
pub fn import_curve(path: &Path, source: &dyn DataSource) -> CoreResult<Curve> {
    let data = source.load(path)?;
    Ok(Curve::from_file_data(path, data))
}

/// Serialize a session to its persisted form
pub fn encode(session: &Session) -> SessionResult<String> {
    let text = serde_json::to_string_pretty(session)?;
    debug!(
        groups = session.arrangement.groups.len(),
        unassigned = session.arrangement.unassigned.len(),
        "encoded session"
    );
    Ok(text)
}

/// Deserialize a session, re-loading curve data through `source`
///
/// Fails only on structurally invalid input. Curves whose backing data
/// cannot be located are kept with `data_loaded = false` and reported
/// in the returned warnings; one curve's failure never affects its
/// siblings.
pub fn decode(
    text: &str,
    source: &dyn DataSource,
) -> SessionResult<(Session, Vec<SessionWarning>)> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let version = match value.get("version") {
        None => return Err(SessionError::MissingVersion),
        Some(v) => v.as_u64().ok_or_else(|| {
            SessionError::Malformed(format!("version tag is not an integer: {v}"))
        })?,
    };
    if version > SESSION_VERSION {
        return Err(SessionError::UnsupportedVersion { found: version });
    }

    let mut session: Session = serde_json::from_value(value)?;
    session.version = SESSION_VERSION;

    let mut warnings = Vec::new();
    for group in &mut session.arrangement.groups {
        for curve in &mut group.curves {
            reload_curve(curve, source, &mut warnings);
        }
    }
    for curve in &mut session.arrangement.unassigned {
        reload_curve(curve, source, &mut warnings);
    }

    info!(
        curves = session.arrangement.curve_count(),
        missing = missing_data_count(&warnings),
        "decoded session"
    );
    Ok((session, warnings))
}

fn reload_curve(curve: &mut Curve, source: &dyn DataSource, warnings: &mut Vec<SessionWarning>) {
    let outcome = match &curve.source_path {
        Some(path) => source.load(path),
        None => Err(LoadError::NotFound {
            path: PathBuf::new(),
        }),
    };

    match outcome {
        Ok(data) => curve.set_data(data),
        Err(err) => {
            warn!(curve = %curve.name, error = %err, "backing data unavailable");
            curve.clear_data();
            warnings.push(SessionWarning::DataUnavailable {
                name: curve.name.clone(),
                path: curve.source_path.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::group::Group;
    use std::collections::HashMap;

    /// In-memory data source for codec tests
    #[derive(Default)]
    pub(crate) struct MapDataSource {
        pub entries: HashMap<PathBuf, SeriesData>,
    }

    impl MapDataSource {
        pub fn with(mut self, path: &str, data: SeriesData) -> Self {
            self.entries.insert(PathBuf::from(path), data);
            self
        }
    }

    impl DataSource for MapDataSource {
        fn load(&self, path: &Path) -> Result<SeriesData, LoadError> {
            self.entries.get(path).cloned().ok_or(LoadError::NotFound {
                path: path.to_path_buf(),
            })
        }
    }

    fn sample_data() -> SeriesData {
        SeriesData::new(vec![0.1, 0.2], vec![10.0, 20.0])
    }

    fn sample_session() -> Session {
        let mut session = Session::new();
        let mut group = Group::with_multiplier("series", 10.0);
        group.add_curve(Curve::new(
            "fit_a",
            Some("/data/fit_a.dat".into()),
            sample_data(),
        ));
        session.arrangement.add_group(group);
        session.arrangement.add_unassigned(Curve::new(
            "raw_b",
            Some("/data/raw_b.dat".into()),
            sample_data(),
        ));
        session.legend_reverse_order = true;
        session.annotations.push(Annotation::text("peak", 0.15, 12.0));
        session
            .reference_lines
            .push(ReferenceLine::vertical(0.2).with_label("(100)"));
        session
    }

    fn full_source() -> MapDataSource {
        MapDataSource::default()
            .with("/data/fit_a.dat", sample_data())
            .with("/data/raw_b.dat", sample_data())
    }

    #[test]
    fn test_round_trip_with_available_data() {
        let session = sample_session();
        let text = encode(&session).unwrap();
        let (decoded, warnings) = decode(&text, &full_source()).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_round_trip_degrades_missing_data() {
        let session = sample_session();
        let text = encode(&session).unwrap();

        let source = MapDataSource::default().with("/data/fit_a.dat", sample_data());
        let (decoded, warnings) = decode(&text, &source).unwrap();

        assert_eq!(missing_data_count(&warnings), 1);
        let raw_b = &decoded.arrangement.unassigned[0];
        assert!(!raw_b.data_loaded);
        assert_eq!(raw_b.name, "raw_b");
        // Everything else survives.
        assert_eq!(raw_b.display_label, "raw_b");
        assert!(decoded.arrangement.groups[0].curves[0].data_loaded);
    }

    #[test]
    fn test_scenario_three_curves_one_missing() {
        let mut session = Session::new();
        for name in ["a", "b", "c"] {
            session.arrangement.add_unassigned(Curve::new(
                name,
                Some(format!("/data/{name}.dat").into()),
                sample_data(),
            ));
        }
        let text = encode(&session).unwrap();

        let source = MapDataSource::default()
            .with("/data/a.dat", sample_data())
            .with("/data/c.dat", sample_data());
        let (decoded, warnings) = decode(&text, &source).unwrap();

        let loaded: Vec<bool> = decoded
            .arrangement
            .unassigned
            .iter()
            .map(|c| c.data_loaded)
            .collect();
        assert_eq!(loaded, vec![true, false, true]);
        assert_eq!(missing_data_count(&warnings), 1);
    }

    #[test]
    fn test_decode_rejects_missing_version() {
        let err = decode("{\"groups\": []}", &NullDataSource).unwrap_err();
        assert!(matches!(err, SessionError::MissingVersion));
    }

    #[test]
    fn test_decode_rejects_newer_version() {
        let err = decode("{\"version\": 99}", &NullDataSource).unwrap_err();
        assert!(matches!(
            err,
            SessionError::UnsupportedVersion { found: 99 }
        ));
    }

    #[test]
    fn test_decode_rejects_unparseable_container() {
        assert!(matches!(
            decode("not json at all", &NullDataSource),
            Err(SessionError::Json(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_integer_version() {
        let err = decode("{\"version\": \"one\"}", &NullDataSource).unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[test]
    fn test_opaque_settings_pass_through() {
        let mut session = sample_session();
        session.legend_settings = serde_json::json!({
            "position": "upper right",
            "frameon": true,
            "fontsize": 11
        });

        let text = encode(&session).unwrap();
        let (decoded, _) = decode(&text, &full_source()).unwrap();
        assert_eq!(decoded.legend_settings, session.legend_settings);
    }

    #[test]
    fn test_set_plot_type_converts_vertical_reference_lines() {
        let mut session = Session::new();
        session
            .reference_lines
            .push(ReferenceLine::vertical(2.0));
        session
            .reference_lines
            .push(ReferenceLine::horizontal(5.0));

        session.set_plot_type(PlotType::BraggSpacing);

        let d = 2.0 * std::f64::consts::PI / 2.0;
        assert!((session.reference_lines[0].position - d).abs() < 1e-12);
        // Horizontal lines live on the y axis and stay put.
        assert_eq!(session.reference_lines[1].position, 5.0);
    }

    #[test]
    fn test_import_curve() {
        let source = full_source();
        let curve = import_curve(Path::new("/data/fit_a.dat"), &source).unwrap();
        assert_eq!(curve.name, "fit_a");
        assert!(curve.data_loaded);

        let missing = import_curve(Path::new("/data/nope.dat"), &source);
        assert!(matches!(missing, Err(CoreError::Load(_))));
    }
}
