//! Dataset-level summary.
//!
//! Gathers what a dataset dashboard shows before any column is inspected:
//! shape, type counts, structural heuristics and missingness.
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::overview::overview;
//!
//! let ds = parse_dataset("orders.csv", "id,placed,status\n1,2024-05-01,open\n2,,closed\n").unwrap();
//! let ov = overview(&ds);
//! assert_eq!(ov.row_count, 2);
//! assert_eq!(ov.numeric_columns, 1);
//! assert_eq!(ov.primary_keys, vec!["id", "status"]);
//! assert_eq!(ov.missing[0].key, "placed");
//! assert_eq!(ov.default_column.as_deref(), Some("id"));
//! ```

use crate::dataset::Dataset;
use crate::detect::{detect_date_columns_with, detect_primary_keys, DateDetection};
use serde::Serialize;

/// A column that has at least one missing cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingColumn {
    pub key: String,
    pub label: String,
    pub missing_count: usize,
}

/// Summary of an entire dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    /// Number of numeric columns.
    pub numeric_columns: usize,
    /// Number of categorical columns.
    pub categorical_columns: usize,
    pub primary_keys: Vec<String>,
    pub date_columns: Vec<String>,
    /// Columns with missing cells, in declaration order.
    pub missing: Vec<MissingColumn>,
    /// Missing cells across all columns.
    pub total_missing: usize,
    /// Share of all cells that are missing, 0–100.
    pub sparsity_pct: f64,
    /// First numeric column, if any.
    pub default_column: Option<String>,
}

impl DatasetOverview {
    /// Returns `true` when no cell is missing.
    pub fn is_complete(&self) -> bool {
        self.total_missing == 0
    }
}

/// Summarizes a dataset with default date detection.
pub fn overview(dataset: &Dataset) -> DatasetOverview {
    overview_with(dataset, &DateDetection::default())
}

/// Summarizes a dataset with explicit date-detection settings.
pub fn overview_with(dataset: &Dataset, dates: &DateDetection) -> DatasetOverview {
    let row_count = dataset.row_count();
    let column_count = dataset.column_count();

    let missing: Vec<MissingColumn> = dataset
        .columns()
        .iter()
        .filter(|c| c.missing_count > 0)
        .map(|c| MissingColumn {
            key: c.key.clone(),
            label: c.label.clone(),
            missing_count: c.missing_count,
        })
        .collect();
    let total_missing: usize = missing.iter().map(|m| m.missing_count).sum();

    let total_cells = row_count * column_count;
    let sparsity_pct = if total_cells > 0 {
        (total_missing as f64 / total_cells as f64) * 100.0
    } else {
        0.0
    };

    let numeric_columns = dataset.numeric_columns().count();

    DatasetOverview {
        name: dataset.name().to_string(),
        row_count,
        column_count,
        numeric_columns,
        categorical_columns: column_count - numeric_columns,
        primary_keys: detect_primary_keys(dataset),
        date_columns: detect_date_columns_with(dataset, dates),
        missing,
        total_missing,
        sparsity_pct,
        default_column: dataset.default_column().map(str::to_string),
    }
}
