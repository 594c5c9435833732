//! The render pipeline
//!
//! Turns a session into a backend-agnostic draw description: the ordered
//! list of transformed, scaled, styled series plus the legend, axis
//! metadata, reference lines and annotations. Nothing here draws; a
//! windowing or export layer consumes the output.

use crate::error::CoreResult;
use crate::order::FlatEntry;
use crate::palette::PaletteSet;
use crate::session::Session;
use crate::style::{resolve, EffectiveStyle, RuleTable};
use crate::transform::{transform, AxisScale, TransformedSeries};
use saxsplot_io::SeriesData;
use tracing::debug;

/// One series ready to draw, in z-order
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSeries {
    /// Display label of the originating curve
    pub label: String,

    /// Transformed and scaled plot-space points
    pub data: SeriesData,

    /// Derived secondary series, drawn on its own axes when present
    pub secondary: Option<SeriesData>,

    /// Fully resolved visual style
    pub style: EffectiveStyle,
}

/// One legend row
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,

    /// Display label of the containing group, when the group wants a
    /// legend header
    pub group: Option<String>,

    pub bold: bool,
    pub italic: bool,
}

/// Axis labels and scale hints for the active plot type
#[derive(Clone, Debug, PartialEq)]
pub struct AxisInfo {
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
}

/// Everything a drawing backend needs for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    /// Series in z-order; later entries draw on top
    pub draw_list: Vec<DrawSeries>,

    /// Legend rows in legend order
    pub legend: Vec<LegendEntry>,

    pub axes: AxisInfo,

    pub reference_lines: Vec<crate::annotation::ReferenceLine>,
    pub annotations: Vec<crate::annotation::Annotation>,
}

/// Stateless orchestrator from session to draw description
///
/// Holds the style rule table and palette registry; everything else
/// comes from the session passed to [`build`].
///
/// [`build`]: RenderPipeline::build
#[derive(Clone, Debug, Default)]
pub struct RenderPipeline {
    pub rules: RuleTable,
    pub palettes: PaletteSet,
}

impl RenderPipeline {
    /// Pipeline with the standard rule table and builtin palettes
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the draw description for one frame
    ///
    /// Walks the arrangement in z-order. Hidden groups, hidden curves
    /// and placeholders without data are skipped but keep their slots
    /// in the arrangement.
    pub fn build(&self, session: &Session) -> CoreResult<RenderOutput> {
        let params = session.transform_params();
        let mut draw_list = Vec::new();

        for entry in session.arrangement.flatten() {
            if !Self::is_drawable(&entry) {
                continue;
            }

            let masked = entry.curve.masked_data();
            let mut transformed = transform(session.plot_type, &masked, &params)?;

            let multiplier = self.multiplier_for(session, &entry);
            if multiplier != 1.0 {
                scale_series(&mut transformed, multiplier);
            }

            let style = self.resolve_style(session, &entry);
            draw_list.push(DrawSeries {
                label: entry.curve.display_label.clone(),
                data: transformed.data,
                secondary: transformed.secondary,
                style,
            });
        }

        let legend = self.build_legend(session);
        let axes = Self::axes(session);

        debug!(
            plot_type = %session.plot_type.name(),
            series = draw_list.len(),
            legend_rows = legend.len(),
            "built render output"
        );

        Ok(RenderOutput {
            draw_list,
            legend,
            axes,
            reference_lines: session.reference_lines.clone(),
            annotations: session.annotations.clone(),
        })
    }

    fn is_drawable(entry: &FlatEntry<'_>) -> bool {
        if let Some(group) = entry.group {
            if !group.visible {
                return false;
            }
        }
        entry.curve.visible && entry.curve.data_loaded
    }

    fn multiplier_for(&self, session: &Session, entry: &FlatEntry<'_>) -> f64 {
        if !session.stacking_enabled {
            return 1.0;
        }
        entry.group.map_or(1.0, |g| g.multiplier)
    }

    fn resolve_style(&self, session: &Session, entry: &FlatEntry<'_>) -> EffectiveStyle {
        resolve(
            &entry.curve.name,
            &entry.curve.style,
            entry.context_index,
            entry.group.and_then(|g| g.palette.as_deref()),
            &session.global_palette,
            &self.rules,
            &self.palettes,
        )
    }

    /// Legend rows, derived from the same traversal as the draw list
    ///
    /// Reversal applies to the flattening as a whole, so the legend is
    /// always the exact z-order or its exact reverse.
    fn build_legend(&self, session: &Session) -> Vec<LegendEntry> {
        session
            .arrangement
            .legend_order(session.legend_reverse_order)
            .into_iter()
            .filter(|entry| Self::is_drawable(entry) && entry.curve.show_in_legend)
            .map(|entry| LegendEntry {
                label: entry.curve.display_label.clone(),
                group: entry
                    .group
                    .filter(|g| g.show_in_legend)
                    .map(|g| g.display_label.clone()),
                bold: entry.curve.legend_bold,
                italic: entry.curve.legend_italic,
            })
            .collect()
    }

    fn axes(session: &Session) -> AxisInfo {
        let (x_label, y_label) = session.plot_type.axis_labels();
        let (x_scale, y_scale) = session.plot_type.axis_scales();
        AxisInfo {
            x_label: session
                .custom_x_label
                .clone()
                .unwrap_or_else(|| x_label.to_string()),
            y_label: session
                .custom_y_label
                .clone()
                .unwrap_or_else(|| y_label.to_string()),
            x_scale,
            y_scale,
        }
    }
}

/// Apply a group multiplier to transformed intensities
///
/// Errors scale with the values; the derived secondary series scales
/// the same way so stacked curves stay separated in both panels.
fn scale_series(series: &mut TransformedSeries, multiplier: f64) {
    for y in &mut series.data.y {
        *y *= multiplier;
    }
    if let Some(err) = &mut series.data.y_err {
        for e in err.iter_mut() {
            *e *= multiplier;
        }
    }
    if let Some(secondary) = &mut series.secondary {
        for y in &mut secondary.y {
            *y *= multiplier;
        }
    }
}
