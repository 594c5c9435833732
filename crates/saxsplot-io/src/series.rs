//! Columnar representation of a parsed measurement series

use serde::{Deserialize, Serialize};

/// A parsed (x, y[, y_err]) measurement series in columnar form
///
/// All columns have equal length; `y_err` is present only when the source
/// file carried a third column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    /// Scattering vector (or angle) values
    pub x: Vec<f64>,

    /// Intensity values
    pub y: Vec<f64>,

    /// Optional per-point intensity uncertainty
    pub y_err: Option<Vec<f64>>,
}

impl SeriesData {
    /// Create a series without uncertainties
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y, y_err: None }
    }

    /// Create a series with per-point uncertainties
    pub fn with_errors(x: Vec<f64>, y: Vec<f64>, y_err: Vec<f64>) -> Self {
        Self {
            x,
            y,
            y_err: Some(y_err),
        }
    }

    /// Number of points in the series
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the series contains no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Whether the series carries an uncertainty column
    pub fn has_errors(&self) -> bool {
        self.y_err.is_some()
    }

    /// Uncertainty for a single point, if present
    pub fn err_at(&self, index: usize) -> Option<f64> {
        self.y_err.as_ref().and_then(|e| e.get(index).copied())
    }

    /// Keep only the points for which `predicate(x, y)` returns true
    ///
    /// The uncertainty column, when present, is filtered in lockstep.
    pub fn filtered(&self, mut predicate: impl FnMut(f64, f64) -> bool) -> SeriesData {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut y_err = self.y_err.as_ref().map(|_| Vec::new());

        for i in 0..self.len() {
            if predicate(self.x[i], self.y[i]) {
                x.push(self.x[i]);
                y.push(self.y[i]);
                if let (Some(out), Some(src)) = (y_err.as_mut(), self.y_err.as_ref()) {
                    out.push(src[i]);
                }
            }
        }

        SeriesData { x, y, y_err }
    }
}
