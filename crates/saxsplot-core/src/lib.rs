//! saxsplot-core - Plotting engine for small-angle scattering data
//!
//! This crate provides the backend-agnostic core of saxsplot, a
//! visualization tool for SAXS/SANS and diffraction curves.
//!
//! # Key Components
//!
//! - **Curve** / **Group**: Loaded measurement series, arranged in a
//!   two-level tree with per-group scale multipliers
//! - **Arrangement**: The tree plus its derived z-order and legend order
//! - **PlotType**: The analysis transforms (Log-Log, Porod, Kratky,
//!   Guinier, Bragg spacing, 2θ, PDDF)
//! - **Style resolution**: Explicit overrides, filename rules and
//!   palettes combined into one effective style per curve
//! - **Session**: Versioned JSON persistence with graceful degradation
//!   when data files have moved
//! - **RenderPipeline**: Turns a session into an ordered draw
//!   description for a windowing or export layer

pub mod annotation;
pub mod curve;
pub mod error;
pub mod group;
pub mod order;
pub mod palette;
pub mod render;
pub mod session;
pub mod style;
pub mod transform;

pub use annotation::{Annotation, AnnotationKind, Orientation, ReferenceLine};
pub use curve::{Curve, RangeOverride};
pub use error::{CoreError, CoreResult, SessionError, SessionResult};
pub use group::Group;
pub use order::{Arrangement, CurveSlot, FlatEntry};
pub use palette::{Color, Palette, PaletteSet, DEFAULT_PALETTE};
pub use render::{AxisInfo, DrawSeries, LegendEntry, RenderOutput, RenderPipeline};
pub use session::{
    decode, encode, import_curve, missing_data_count, AxisLimits, DataSource, FileDataSource,
    NullDataSource, Session, SessionWarning, SESSION_VERSION,
};
pub use style::{
    resolve, AutoStyleRule, CurveStyle, EffectiveStyle, ErrorBand, LineStyle, MarkerStyle,
    RuleTable, StylePreset,
};
pub use transform::{
    convert_reference_value, transform, AxisScale, PlotType, TransformParams, TransformedSeries,
    CU_K_ALPHA_NM,
};
