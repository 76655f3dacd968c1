//! Immutable row-oriented dataset produced by the builder.
//!
//! A [`Dataset`] holds ordered [`ColumnMeta`] descriptors and rows of
//! [`CellValue`]s. Every row has exactly one cell per column; absent data is
//! the explicit [`CellValue::Missing`] marker.
//!
//! # Column Types
//!
//! | Type | Cells | Analysis |
//! |------|-------|----------|
//! | [`Numeric`](ColumnType::Numeric) | `Number(f64)` or `Missing` | descriptive stats + histogram |
//! | [`Categorical`](ColumnType::Categorical) | `Text(String)` or `Missing` | frequency table |
//!
//! # Example
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::dataset::{CellValue, ColumnType};
//!
//! let ds = parse_dataset("people.csv", "name,age\nAda,36\nAlan,\n").unwrap();
//! assert_eq!(ds.row_count(), 2);
//! assert_eq!(ds.column("age").unwrap().column_type, ColumnType::Numeric);
//! assert_eq!(ds.value(0, "age"), Some(&CellValue::Number(36.0)));
//! assert_eq!(ds.value(1, "age"), Some(&CellValue::Missing));
//! ```

use serde::{Deserialize, Serialize};

// ── CellValue ─────────────────────────────────────────────────────────

/// A single typed cell.
///
/// Serializes untagged: numbers as JSON numbers, text as strings and the
/// missing marker as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Returns `true` for the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the number, or `None` if the cell is text or missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, or `None` if the cell is numeric or missing.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

// ── ColumnType ────────────────────────────────────────────────────────

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every non-missing cell is a finite number.
    Numeric,
    /// Free-form strings (also used for columns with no values at all).
    Categorical,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

// ── ColumnMeta ────────────────────────────────────────────────────────

/// Per-column metadata computed when the dataset is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    /// Stable, unique identifier derived from the header.
    pub key: String,
    /// Original header text.
    pub label: String,
    /// Inferred type.
    pub column_type: ColumnType,
    /// Number of distinct non-missing values.
    pub unique_values: usize,
    /// Number of rows where this column is missing.
    pub missing_count: usize,
}

impl ColumnMeta {
    /// Number of non-missing cells, given the dataset's row count.
    pub fn non_missing_count(&self, row_count: usize) -> usize {
        row_count - self.missing_count
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }
}

// ── Row ───────────────────────────────────────────────────────────────

/// One data row; cell `i` belongs to column `i` of the owning dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<CellValue>);

impl Row {
    pub(crate) fn new(cells: Vec<CellValue>) -> Self {
        Self(cells)
    }

    /// Returns the cell at column position `index`.
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.0.get(index)
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Dataset ───────────────────────────────────────────────────────────

/// Immutable tabular dataset.
///
/// Built once per successful parse by
/// [`DatasetBuilder`](crate::builder::DatasetBuilder); a new upload
/// produces a new `Dataset` rather than mutating an existing one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    columns: Vec<ColumnMeta>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Assembles a dataset from already-validated parts.
    pub(crate) fn from_parts(name: String, columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            name,
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column descriptors in declaration order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the column with the given key.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Returns the column with the given key.
    pub fn column(&self, key: &str) -> Option<&ColumnMeta> {
        self.column_index(key).map(|i| &self.columns[i])
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns the cell at (`row`, column `key`).
    pub fn value(&self, row: usize, key: &str) -> Option<&CellValue> {
        let col = self.column_index(key)?;
        self.rows.get(row)?.get(col)
    }

    /// Returns row `index` as `(key, cell)` pairs in column order.
    pub fn record(&self, index: usize) -> Option<Vec<(&str, &CellValue)>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|c| c.key.as_str())
                .zip(row.cells())
                .collect(),
        )
    }

    /// Iterates over every cell of the column at position `index`.
    pub(crate) fn cells_at(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |r| r.get(index))
    }

    /// Iterates over every cell of the column with the given key.
    pub fn column_values(&self, key: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        self.column_index(key).map(|i| self.cells_at(i))
    }

    /// Numeric columns in declaration order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| c.column_type == ColumnType::Numeric)
    }

    /// Categorical columns in declaration order.
    pub fn categorical_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Categorical)
    }

    /// Key of the first numeric column, the natural column to inspect first.
    pub fn default_column(&self) -> Option<&str> {
        self.numeric_columns().next().map(|c| c.key.as_str())
    }

    // ── Paging ───────────────────────────────────────────────────

    /// Returns page `index` of `size` rows (empty past the end or when `size == 0`).
    ///
    /// ```
    /// use u_profile::builder::parse_dataset;
    ///
    /// let ds = parse_dataset("n", "x\n1\n2\n3\n4\n5\n").unwrap();
    /// assert_eq!(ds.page_count(2), 3);
    /// assert_eq!(ds.page(2, 2).len(), 1);
    /// assert!(ds.page(3, 2).is_empty());
    /// ```
    pub fn page(&self, index: usize, size: usize) -> &[Row] {
        if size == 0 {
            return &[];
        }
        let start = index.saturating_mul(size).min(self.rows.len());
        let end = start.saturating_add(size).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Number of pages of `size` rows.
    pub fn page_count(&self, size: usize) -> usize {
        if size == 0 {
            0
        } else {
            self.rows.len().div_ceil(size)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
