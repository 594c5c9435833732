//! Plot-type transform engine
//!
//! Maps a raw (q, I[, err]) series into plot space for the selected
//! analysis mode and supplies the canonical axis labels. Points whose
//! transformed value is undefined (non-positive intensity for the
//! Guinier logarithm, non-positive q for Bragg spacing, arcsine argument
//! above 1 for 2θ) are excluded from the output rather than zero-filled.

use crate::error::{CoreError, CoreResult};
use saxsplot_io::SeriesData;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Analysis mode selecting the (x, y) remapping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotType {
    LogLog,
    Porod,
    Kratky,
    Guinier,
    BraggSpacing,
    TwoTheta,
    Pddf,
}

/// Axis scale hint for the rendering collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisScale {
    Linear,
    Log,
}

impl PlotType {
    /// All plot types in menu order
    pub fn all() -> [PlotType; 7] {
        use PlotType::*;
        [LogLog, Porod, Kratky, Guinier, BraggSpacing, TwoTheta, Pddf]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            PlotType::LogLog => "Log-Log",
            PlotType::Porod => "Porod",
            PlotType::Kratky => "Kratky",
            PlotType::Guinier => "Guinier",
            PlotType::BraggSpacing => "Bragg Spacing",
            PlotType::TwoTheta => "2-Theta",
            PlotType::Pddf => "PDDF",
        }
    }

    /// Canonical axis labels (x, y)
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            PlotType::LogLog => ("q / nm⁻¹", "I / a.u."),
            PlotType::Porod => ("q / nm⁻¹", "I·q⁴ / a.u.·nm⁻⁴"),
            PlotType::Kratky => ("q / nm⁻¹", "I·q² / a.u.·nm⁻²"),
            PlotType::Guinier => ("q² / nm⁻²", "ln(I)"),
            PlotType::BraggSpacing => ("d / nm", "I / a.u."),
            PlotType::TwoTheta => ("2θ / °", "I / a.u."),
            PlotType::Pddf => ("q / nm⁻¹", "I / a.u."),
        }
    }

    /// Scale hints for both axes
    pub fn axis_scales(&self) -> (AxisScale, AxisScale) {
        match self {
            PlotType::LogLog | PlotType::Porod | PlotType::BraggSpacing | PlotType::Pddf => {
                (AxisScale::Log, AxisScale::Log)
            }
            PlotType::Kratky | PlotType::Guinier => (AxisScale::Linear, AxisScale::Linear),
            PlotType::TwoTheta => (AxisScale::Linear, AxisScale::Log),
        }
    }

    /// Whether the x axis is plain q (no remapping)
    pub fn is_q_axis(&self) -> bool {
        matches!(
            self,
            PlotType::LogLog | PlotType::Porod | PlotType::Kratky | PlotType::Pddf
        )
    }
}

impl Default for PlotType {
    fn default() -> Self {
        PlotType::LogLog
    }
}

/// Wavelength of Cu Kα radiation in nm, the conventional default
pub const CU_K_ALPHA_NM: f64 = 0.1524;

/// External configuration consumed by the transforms
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// Radiation wavelength in nm, used by the 2θ conversion
    pub wavelength: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            wavelength: CU_K_ALPHA_NM,
        }
    }
}

/// Number of r samples for the derived p(r) series
const PDDF_POINTS: usize = 101;

/// A series mapped into plot space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformedSeries {
    /// Primary plot-space series
    pub data: SeriesData,

    /// Derived (r, p(r)) series, present only in PDDF mode
    pub secondary: Option<SeriesData>,
}

/// Transform a raw series for the given plot type
///
/// Errors propagate consistently with the y transform: Porod and Kratky
/// scale them by q⁴ and q², Guinier maps them to relative errors, the
/// pass-through modes keep them unchanged.
pub fn transform(
    plot_type: PlotType,
    series: &SeriesData,
    params: &TransformParams,
) -> CoreResult<TransformedSeries> {
    let data = match plot_type {
        PlotType::LogLog => series.clone(),
        PlotType::Porod => scale_by_power(series, 4),
        PlotType::Kratky => scale_by_power(series, 2),
        PlotType::Guinier => guinier(series),
        PlotType::BraggSpacing => bragg(series),
        PlotType::TwoTheta => two_theta(series, params)?,
        PlotType::Pddf => series.clone(),
    };

    let secondary = match plot_type {
        PlotType::Pddf => Some(pddf(series)),
        _ => None,
    };

    Ok(TransformedSeries { data, secondary })
}

/// y' = I·qᵏ with errors scaled the same way
fn scale_by_power(series: &SeriesData, power: i32) -> SeriesData {
    let factors: Vec<f64> = series.x.iter().map(|&q| q.powi(power)).collect();
    SeriesData {
        x: series.x.clone(),
        y: series
            .y
            .iter()
            .zip(&factors)
            .map(|(&i, &f)| i * f)
            .collect(),
        y_err: series.y_err.as_ref().map(|errs| {
            errs.iter().zip(&factors).map(|(&e, &f)| e * f).collect()
        }),
    }
}

/// x' = q², y' = ln(I); points with I ≤ 0 are excluded
fn guinier(series: &SeriesData) -> SeriesData {
    let kept = series.filtered(|_, y| y > 0.0);
    SeriesData {
        x: kept.x.iter().map(|&q| q * q).collect(),
        y_err: kept.y_err.as_ref().map(|errs| {
            // d ln(I) = dI / I
            errs.iter().zip(&kept.y).map(|(&e, &i)| e / i).collect()
        }),
        y: kept.y.iter().map(|&i| i.ln()).collect(),
    }
}

/// x' = d = 2π/q; points with q ≤ 0 are excluded
fn bragg(series: &SeriesData) -> SeriesData {
    let kept = series.filtered(|x, _| x > 0.0);
    SeriesData {
        x: kept.x.iter().map(|&q| 2.0 * PI / q).collect(),
        y: kept.y,
        y_err: kept.y_err,
    }
}

/// x' = 2θ = 2·arcsin(λq / 4π) in degrees
///
/// Points outside the arcsine domain are excluded. Requires a positive
/// wavelength.
fn two_theta(series: &SeriesData, params: &TransformParams) -> CoreResult<SeriesData> {
    if params.wavelength <= 0.0 {
        return Err(CoreError::InvalidParameter(format!(
            "wavelength must be positive for the 2θ transform, got {}",
            params.wavelength
        )));
    }

    let lambda = params.wavelength;
    let kept = series.filtered(|q, _| q > 0.0 && lambda * q / (4.0 * PI) <= 1.0);
    Ok(SeriesData {
        x: kept
            .x
            .iter()
            .map(|&q| 2.0 * (lambda * q / (4.0 * PI)).asin().to_degrees())
            .collect(),
        y: kept.y,
        y_err: kept.y_err,
    })
}

/// Derived pair-distance distribution by direct sine-transform quadrature
///
/// p(r) = r/(2π²) ∫ I(q)·q·sin(qr) dq over the measured q range,
/// sampled on a uniform r grid up to d_max = π/q_min. The derived
/// series is independent of the primary q/I series and carries no
/// uncertainties.
fn pddf(series: &SeriesData) -> SeriesData {
    let kept = series.filtered(|q, _| q > 0.0);
    if kept.len() < 2 {
        return SeriesData::default();
    }

    let q_min = kept.x.iter().cloned().fold(f64::INFINITY, f64::min);
    let d_max = PI / q_min;

    let mut r_values = Vec::with_capacity(PDDF_POINTS);
    let mut p_values = Vec::with_capacity(PDDF_POINTS);

    for step in 0..PDDF_POINTS {
        let r = d_max * step as f64 / (PDDF_POINTS - 1) as f64;
        // Trapezoidal rule over the measured q grid.
        let mut integral = 0.0;
        for i in 1..kept.len() {
            let (q0, q1) = (kept.x[i - 1], kept.x[i]);
            let f0 = kept.y[i - 1] * q0 * (q0 * r).sin();
            let f1 = kept.y[i] * q1 * (q1 * r).sin();
            integral += 0.5 * (f0 + f1) * (q1 - q0);
        }
        r_values.push(r);
        p_values.push(r * integral / (2.0 * PI * PI));
    }

    SeriesData::new(r_values, p_values)
}

/// Convert a reference-line x value between plot types
///
/// The value is first mapped back to q, then into the target plot
/// space. Values that cannot be mapped (zero Bragg spacing, arcsine
/// argument above 1) are returned unchanged.
pub fn convert_reference_value(
    value: f64,
    from: PlotType,
    to: PlotType,
    params: &TransformParams,
) -> f64 {
    let q = if from.is_q_axis() {
        value
    } else {
        match from {
            PlotType::Guinier => {
                if value >= 0.0 {
                    value.sqrt()
                } else {
                    value
                }
            }
            PlotType::BraggSpacing => {
                if value != 0.0 {
                    2.0 * PI / value
                } else {
                    value
                }
            }
            PlotType::TwoTheta => {
                let theta_rad = value.to_radians() / 2.0;
                4.0 * PI * theta_rad.sin() / params.wavelength
            }
            _ => value,
        }
    };

    if to.is_q_axis() {
        return q;
    }
    match to {
        PlotType::Guinier => q * q,
        PlotType::BraggSpacing => {
            if q != 0.0 {
                2.0 * PI / q
            } else {
                q
            }
        }
        PlotType::TwoTheta => {
            let arg = params.wavelength * q / (4.0 * PI);
            if arg <= 1.0 {
                2.0 * arg.asin().to_degrees()
            } else {
                value
            }
        }
        _ => q,
    }
}
