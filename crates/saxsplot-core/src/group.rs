//! Ordered groups of curves sharing a scale multiplier
//!
//! The multiplier separates curves vertically on log plots. It is applied
//! directly to transformed intensities and is never cumulative: a group
//! with multiplier 100 is scaled by exactly 100 no matter what its
//! neighbors use.

use crate::curve::Curve;
use serde::{Deserialize, Serialize};

/// An ordered collection of curves with a shared scale multiplier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group name, used as the legend-header label
    pub name: String,

    /// Editable display text, defaults to the name
    pub display_label: String,

    /// Direct, non-cumulative y multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Whether the group's curves are drawn
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Dedicated palette; None defers to the session palette
    #[serde(default)]
    pub palette: Option<String>,

    /// Member curves in display order
    #[serde(default)]
    pub curves: Vec<Curve>,

    /// Tree-UI state, preserved across sessions
    #[serde(default)]
    pub collapsed: bool,

    /// Whether the group header appears in the legend
    #[serde(default = "default_true")]
    pub show_in_legend: bool,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Group {
    /// Create an empty group with multiplier 1.0
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_multiplier(name, 1.0)
    }

    /// Create an empty group with the given multiplier
    pub fn with_multiplier(name: impl Into<String>, multiplier: f64) -> Self {
        let name = name.into();
        Self {
            display_label: name.clone(),
            name,
            multiplier,
            visible: true,
            palette: None,
            curves: Vec::new(),
            collapsed: false,
            show_in_legend: true,
        }
    }

    /// Append a curve to the group
    pub fn add_curve(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    /// Insert a curve at a position (clamped to the member count)
    pub fn insert_curve(&mut self, index: usize, curve: Curve) {
        let index = index.min(self.curves.len());
        self.curves.insert(index, curve);
    }

    /// Remove and return a curve by position
    pub fn remove_curve(&mut self, index: usize) -> Option<Curve> {
        if index < self.curves.len() {
            Some(self.curves.remove(index))
        } else {
            None
        }
    }

    /// Number of member curves
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
