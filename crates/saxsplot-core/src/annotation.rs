//! Annotations and reference lines
//!
//! Free-floating text markers and axis-spanning guide lines. The core
//! only stores and transports these; drawing is the rendering
//! collaborator's job.

use crate::palette::Color;
use crate::style::LineStyle;
use serde::{Deserialize, Serialize};

/// Kind of a plot annotation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// Plain text at a data position
    Text,
    /// Text with an arrow pointing at the data position
    Arrow,
}

/// A text annotation anchored at a plot-space position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 {
    10.0
}

impl Annotation {
    /// Plain text annotation with default styling
    pub fn text(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: AnnotationKind::Text,
            text: text.into(),
            x,
            y,
            color: Color::default(),
            font_size: default_font_size(),
        }
    }
}

/// Orientation of a reference line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Spans the y axis at a fixed x position
    Vertical,
    /// Spans the x axis at a fixed y position
    Horizontal,
}

/// An axis-spanning guide line
///
/// Vertical line positions live on the current plot type's x axis and
/// are converted when the plot type changes, so a Bragg peak marker
/// stays on the peak.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub orientation: Orientation,
    pub position: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_line_style")]
    pub line_style: LineStyle,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_line_style() -> LineStyle {
    LineStyle::Dashed
}

fn default_line_width() -> f32 {
    1.0
}

impl ReferenceLine {
    /// Vertical guide line at an x position
    pub fn vertical(position: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            position,
            color: Color::default(),
            line_style: default_line_style(),
            line_width: default_line_width(),
            label: None,
        }
    }

    /// Horizontal guide line at a y position
    pub fn horizontal(position: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            position,
            ..Self::vertical(position)
        }
    }

    /// Attach a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_serde_uses_type_field() {
        let a = Annotation::text("Rg region", 0.1, 100.0);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["x"], 0.1);
    }

    #[test]
    fn test_reference_line_builders() {
        let line = ReferenceLine::vertical(2.5).with_label("(100)");
        assert_eq!(line.orientation, Orientation::Vertical);
        assert_eq!(line.label.as_deref(), Some("(100)"));

        let h = ReferenceLine::horizontal(1.0);
        assert_eq!(h.orientation, Orientation::Horizontal);
    }
}
