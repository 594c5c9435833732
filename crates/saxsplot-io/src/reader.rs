//! ASCII measurement file reader
//!
//! Reduction software exports scattering curves in loosely standardized
//! ASCII layouts: an optional free-text or comment header followed by
//! 2-3 numeric columns. The reader auto-detects the delimiter and the
//! header extent instead of requiring a format description.

use crate::series::SeriesData;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a measurement file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no numeric data found in {path}")]
    Empty { path: PathBuf },
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Column delimiter of a measurement file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
    Semicolon,
    Whitespace,
}

impl Delimiter {
    /// Byte value for delimited formats, None for whitespace splitting
    fn as_byte(self) -> Option<u8> {
        match self {
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Comma => Some(b','),
            Delimiter::Semicolon => Some(b';'),
            Delimiter::Whitespace => None,
        }
    }
}

/// Number of leading lines inspected for delimiter detection
const DETECT_SAMPLE_LINES: usize = 10;

/// Load a scattering curve from an ASCII column file
///
/// Blank lines, `#`/`%` comments and leading non-numeric text are skipped.
/// Two columns are read as (x, y), three or more as (x, y, y_err).
pub fn load_series(path: impl AsRef<Path>) -> LoadResult<SeriesData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let series = parse_series(&content).map_err(|e| match e {
        // Attach the path to the empty case; line-level errors stand alone.
        LoadError::Empty { .. } => LoadError::Empty {
            path: path.to_path_buf(),
        },
        other => other,
    })?;

    debug!(
        path = %path.display(),
        points = series.len(),
        has_errors = series.has_errors(),
        "loaded measurement file"
    );
    Ok(series)
}

/// Parse a scattering curve from file content
pub fn parse_series(content: &str) -> LoadResult<SeriesData> {
    let delimiter = detect_delimiter(content);
    let data_lines = data_lines(content, delimiter);

    if data_lines.is_empty() {
        return Err(LoadError::Empty {
            path: PathBuf::new(),
        });
    }

    let rows = match delimiter.as_byte() {
        Some(byte) => parse_delimited(&data_lines, byte)?,
        None => parse_whitespace(&data_lines)?,
    };

    build_series(rows)
}

/// Collect the numeric data lines with their 1-based source line numbers
///
/// Lines before the first numeric row are treated as header text; blank
/// lines and comments are dropped everywhere.
fn data_lines(content: &str, delimiter: Delimiter) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut in_data = false;

    for (index, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        if !in_data {
            let first = first_field(trimmed, delimiter);
            if first.parse::<f64>().is_err() {
                continue;
            }
            in_data = true;
        }

        lines.push((index + 1, trimmed.to_string()));
    }

    lines
}

/// Parse delimited data lines with the csv reader
fn parse_delimited(lines: &[(usize, String)], delimiter: u8) -> LoadResult<Vec<(usize, Vec<f64>)>> {
    let joined = lines
        .iter()
        .map(|(_, l)| l.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(joined.as_bytes());

    let mut rows = Vec::with_capacity(lines.len());
    for (record, (line, _)) in reader.records().zip(lines.iter()) {
        let record = record.map_err(|e| LoadError::Parse {
            line: *line,
            message: e.to_string(),
        })?;
        let values = record
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| parse_field(f, *line))
            .collect::<LoadResult<Vec<f64>>>()?;
        rows.push((*line, values));
    }

    Ok(rows)
}

/// Parse whitespace-separated data lines
fn parse_whitespace(lines: &[(usize, String)]) -> LoadResult<Vec<(usize, Vec<f64>)>> {
    lines
        .iter()
        .map(|(line, text)| {
            let values = text
                .split_whitespace()
                .map(|f| parse_field(f, *line))
                .collect::<LoadResult<Vec<f64>>>()?;
            Ok((*line, values))
        })
        .collect()
}

/// Assemble columnar series data, enforcing a consistent column count
fn build_series(rows: Vec<(usize, Vec<f64>)>) -> LoadResult<SeriesData> {
    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    let mut y_err = Vec::new();
    let mut saw_error_column = false;

    for (line, values) in rows {
        if values.len() < 2 {
            return Err(LoadError::Parse {
                line,
                message: format!("expected at least 2 columns, found {}", values.len()),
            });
        }

        x.push(values[0]);
        y.push(values[1]);

        if values.len() > 2 {
            y_err.push(values[2]);
            saw_error_column = true;
        } else if saw_error_column {
            return Err(LoadError::Parse {
                line,
                message: "error column missing on this row".to_string(),
            });
        }
    }

    Ok(SeriesData {
        x,
        y,
        y_err: saw_error_column.then_some(y_err),
    })
}

/// Detect the column delimiter from the first non-comment lines
///
/// Tab, comma and semicolon counts are compared; whitespace is the
/// fallback when none of them dominates.
pub fn detect_delimiter(content: &str) -> Delimiter {
    let mut tabs = 0usize;
    let mut commas = 0usize;
    let mut semicolons = 0usize;
    let mut sampled = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        tabs += trimmed.matches('\t').count();
        commas += trimmed.matches(',').count();
        semicolons += trimmed.matches(';').count();
        sampled += 1;
        if sampled >= DETECT_SAMPLE_LINES {
            break;
        }
    }

    if tabs > commas && tabs > semicolons {
        Delimiter::Tab
    } else if commas > semicolons {
        Delimiter::Comma
    } else if semicolons > 0 {
        Delimiter::Semicolon
    } else {
        Delimiter::Whitespace
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with('%')
}

fn first_field(line: &str, delimiter: Delimiter) -> &str {
    let field = match delimiter.as_byte() {
        Some(b) => line.split(b as char).next().unwrap_or(line),
        None => line.split_whitespace().next().unwrap_or(line),
    };
    field.trim()
}

fn parse_field(field: &str, line: usize) -> LoadResult<f64> {
    field.parse::<f64>().map_err(|_| LoadError::Parse {
        line,
        message: format!("not a number: '{field}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_tab_delimiter() {
        assert_eq!(detect_delimiter("1\t2\t3\n4\t5\t6\n"), Delimiter::Tab);
    }

    #[test]
    fn test_detect_comma_delimiter() {
        assert_eq!(detect_delimiter("1,2\n3,4\n"), Delimiter::Comma);
    }

    #[test]
    fn test_detect_semicolon_delimiter() {
        assert_eq!(detect_delimiter("1;2\n3;4\n"), Delimiter::Semicolon);
    }

    #[test]
    fn test_detect_whitespace_fallback() {
        assert_eq!(detect_delimiter("1 2\n3 4\n"), Delimiter::Whitespace);
    }

    #[test]
    fn test_comments_ignored_for_detection() {
        let content = "# a, comment, with, commas\n1\t2\n3\t4\n";
        assert_eq!(detect_delimiter(content), Delimiter::Tab);
    }

    #[test]
    fn test_parse_two_columns() {
        let s = parse_series("0.1 10.0\n0.2 20.0\n").unwrap();
        assert_eq!(s.x, vec![0.1, 0.2]);
        assert_eq!(s.y, vec![10.0, 20.0]);
        assert!(!s.has_errors());
    }

    #[test]
    fn test_parse_three_columns_comma() {
        let s = parse_series("0.1,10.0,0.5\n0.2,20.0,0.6\n").unwrap();
        assert_eq!(s.y_err, Some(vec![0.5, 0.6]));
    }

    #[test]
    fn test_header_and_comments_skipped() {
        let content = "\
Sample: lysozyme
q I err
# reduced 2024-01-01
% instrument B21

0.1 10.0 0.5
0.2 20.0 0.6
";
        let s = parse_series(content).unwrap();
        assert_eq!(s.len(), 2);
        assert!(s.has_errors());
    }

    #[test]
    fn test_bad_row_reports_line_number() {
        let err = parse_series("0.1 10.0\n0.2 abc\n").unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inconsistent_error_column() {
        let err = parse_series("0.1 10.0 0.5\n0.2 20.0\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(matches!(
            parse_series("# only comments\n"),
            Err(LoadError::Empty { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_series("/nonexistent/curve.dat"),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# q I").unwrap();
        writeln!(file, "0.1\t10.0").unwrap();
        writeln!(file, "0.2\t20.0").unwrap();

        let s = load_series(file.path()).unwrap();
        assert_eq!(s.len(), 2);
    }
}
