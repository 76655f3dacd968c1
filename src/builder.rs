//! Type inference and dataset assembly.
//!
//! Consumes the raw header and rows produced by
//! [`CsvParser`](crate::csv_parser::CsvParser), decides per column whether
//! it is numeric or categorical, coerces cells into [`CellValue`]s and
//! computes per-column cardinality and missingness.
//!
//! # Inference rules
//!
//! - A trimmed cell is **missing** if it is empty or matches a null marker
//!   (case-insensitive; default `na`, `n/a`, `null`, `none`, `nan`, `#n/a`).
//! - A column is **numeric** when every non-missing cell is a finite numeric
//!   literal: optional sign, digits with an optional decimal point, optional
//!   exponent. A single non-numeric value makes the whole column categorical.
//! - A column with no non-missing cells is categorical.
//! - Categorical cells keep their trimmed text; case is preserved.
//!
//! # Example
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::dataset::ColumnType;
//!
//! let ds = parse_dataset("demo.csv", "a,b\n1,x\n2,x\n3,y\n").unwrap();
//! let a = ds.column("a").unwrap();
//! assert_eq!(a.column_type, ColumnType::Numeric);
//! assert_eq!(a.unique_values, 3);
//! assert_eq!(ds.column("b").unwrap().unique_values, 2);
//! ```

use crate::csv_parser::{CsvParser, ParsedCsv};
use crate::dataset::{CellValue, ColumnMeta, ColumnType, Dataset, Row};
use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Null markers recognized (case-insensitively) by default.
const DEFAULT_NULL_MARKERS: &[&str] = &["na", "n/a", "null", "none", "nan", "#n/a"];

/// Parses and builds a dataset with default settings.
///
/// Shorthand for [`CsvParser::new`] followed by [`DatasetBuilder::build_parsed`].
pub fn parse_dataset(name: &str, text: &str) -> Result<Dataset> {
    let parsed = CsvParser::new().parse(text)?;
    DatasetBuilder::new().build_parsed(name, &parsed)
}

/// Dataset builder configuration and entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetBuilder {
    null_markers: Vec<String>,
}

impl DatasetBuilder {
    /// Creates a builder with the default null markers.
    pub fn new() -> Self {
        Self {
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets custom null markers (replaces defaults). Empty cells are always missing.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Returns `true` if a raw cell counts as missing.
    pub fn is_missing(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty()
            || self
                .null_markers
                .iter()
                .any(|m| m.trim().eq_ignore_ascii_case(trimmed))
    }

    /// Builds a dataset from a [`ParsedCsv`].
    pub fn build_parsed(&self, name: &str, parsed: &ParsedCsv) -> Result<Dataset> {
        self.build(name, &parsed.header, &parsed.rows)
    }

    /// Infers column types and assembles an immutable [`Dataset`].
    ///
    /// # Errors
    ///
    /// - [`ProfileError::Parse`] if the header is empty or a row's width
    ///   differs from the header's
    /// - [`ProfileError::TypeInference`] if a cell classified as numeric
    ///   fails to convert
    pub fn build(&self, name: &str, header: &[String], raw_rows: &[Vec<String>]) -> Result<Dataset> {
        let n_cols = header.len();
        if n_cols == 0 {
            return Err(ProfileError::parse(1, "header has no columns"));
        }
        for (idx, row) in raw_rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(ProfileError::parse(
                    idx + 2,
                    format!("expected {n_cols} fields, got {}", row.len()),
                ));
            }
        }

        let keys = derive_keys(header);
        let n_rows = raw_rows.len();

        let mut columns = Vec::with_capacity(n_cols);
        let mut cells: Vec<std::vec::IntoIter<CellValue>> = Vec::with_capacity(n_cols);

        for (col_idx, key) in keys.into_iter().enumerate() {
            let trimmed: Vec<&str> = raw_rows.iter().map(|r| r[col_idx].trim()).collect();
            let missing: Vec<bool> = trimmed.iter().map(|s| self.is_missing(s)).collect();

            let column_type = infer_type(&trimmed, &missing);
            let values = match column_type {
                ColumnType::Numeric => coerce_numeric(&key, &trimmed, &missing)?,
                ColumnType::Categorical => trimmed
                    .iter()
                    .zip(&missing)
                    .map(|(&s, &is_missing)| {
                        if is_missing {
                            CellValue::Missing
                        } else {
                            CellValue::Text(s.to_string())
                        }
                    })
                    .collect(),
            };

            let (unique_values, missing_count) = cardinality(&values);
            log::debug!(
                "column '{key}' inferred as {column_type} ({unique_values} unique, {missing_count} missing)"
            );

            columns.push(ColumnMeta {
                key,
                label: header[col_idx].clone(),
                column_type,
                unique_values,
                missing_count,
            });
            cells.push(values.into_iter());
        }

        // Column-major → row-major
        let rows: Vec<Row> = (0..n_rows)
            .map(|_| {
                Row::new(
                    cells
                        .iter_mut()
                        .map(|col| col.next().unwrap_or(CellValue::Missing))
                        .collect(),
                )
            })
            .collect();

        Ok(Dataset::from_parts(name.to_string(), columns, rows))
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Keys ──────────────────────────────────────────────────────────────

/// Derives unique column keys from header cells.
///
/// Keys are the trimmed header text; blank headers become `column_{n}`
/// (1-based position) and repeated keys get an occurrence suffix
/// (`name`, `name_2`, `name_3`, ...), skipping suffixes already in use.
///
/// ```
/// use u_profile::builder::derive_keys;
///
/// let header: Vec<String> = ["id", " id ", "", "id"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(derive_keys(&header), vec!["id", "id_2", "column_3", "id_3"]);
/// ```
pub fn derive_keys(header: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(header.len());
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(header.len());

    for (idx, raw) in header.iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("column_{}", idx + 1),
            trimmed => trimmed.to_string(),
        };
        let seen = occurrences.entry(base.clone()).or_insert(0);
        *seen += 1;
        let mut key = if *seen == 1 {
            base.clone()
        } else {
            format!("{base}_{seen}")
        };
        while taken.contains(&key) {
            *seen += 1;
            key = format!("{base}_{seen}");
        }
        taken.insert(key.clone());
        keys.push(key);
    }

    keys
}

// ── Numeric literals ──────────────────────────────────────────────────

/// Checks the shape of a numeric literal: `[+-]? (d+ (. d*)? | . d+) ([eE] [+-]? d+)?`.
///
/// Words such as `inf` or `NaN`, hex and thousands separators are rejected.
pub fn is_numeric_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;

    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }

    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == b.len()
}

/// Parses a trimmed cell as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    if !is_numeric_literal(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Internal helpers ──────────────────────────────────────────────────

/// Numeric only if there is at least one value and every value is a finite number.
fn infer_type(values: &[&str], missing: &[bool]) -> ColumnType {
    let mut non_missing = values
        .iter()
        .zip(missing)
        .filter(|(_, &is_missing)| !is_missing)
        .map(|(&v, _)| v)
        .peekable();

    if non_missing.peek().is_none() {
        return ColumnType::Categorical;
    }
    if non_missing.all(|v| parse_number(v).is_some()) {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

fn coerce_numeric(column: &str, values: &[&str], missing: &[bool]) -> Result<Vec<CellValue>> {
    values
        .iter()
        .zip(missing)
        .enumerate()
        .map(|(row, (&raw, &is_missing))| {
            if is_missing {
                return Ok(CellValue::Missing);
            }
            parse_number(raw)
                .map(CellValue::Number)
                .ok_or_else(|| ProfileError::TypeInference {
                    column: column.to_string(),
                    row,
                    value: raw.to_string(),
                })
        })
        .collect()
}

/// Returns `(distinct non-missing values, missing count)` in one pass.
fn cardinality(values: &[CellValue]) -> (usize, usize) {
    let mut numbers: HashSet<u64> = HashSet::new();
    let mut texts: HashSet<&str> = HashSet::new();
    let mut missing = 0usize;

    for value in values {
        match value {
            // -0.0 and 0.0 are the same value
            CellValue::Number(v) => {
                numbers.insert((v + 0.0).to_bits());
            }
            CellValue::Text(s) => {
                texts.insert(s.as_str());
            }
            CellValue::Missing => missing += 1,
        }
    }

    (numbers.len() + texts.len(), missing)
}

// ── Tests ─────────────────────────────────────────────────────────────
