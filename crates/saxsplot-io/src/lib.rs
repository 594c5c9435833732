//! saxsplot-io - Measurement file I/O for scattering data
//!
//! This crate reads the ASCII column formats commonly produced by
//! SAXS/SANS/XRD reduction software:
//!
//! - Tab-, comma-, semicolon- and whitespace-separated columns
//! - Comment headers (`#` and `%`) and free-text preambles
//! - Two columns (q, I) or three columns (q, I, error)
//!
//! # Design
//!
//! Files are parsed eagerly into a columnar [`SeriesData`]. Delimiter and
//! header extent are auto-detected from the first lines of the file, so
//! callers never have to describe the format up front.

pub mod reader;
pub mod series;

pub use reader::*;
pub use series::*;
