//! Structural heuristics over a built [`Dataset`].
//!
//! - [`detect_primary_keys`] — columns whose values could identify a row
//! - [`detect_date_columns`] — categorical columns whose values look like dates
//!
//! Numeric columns are never reported as date columns: compact forms such as
//! `20240115` are indistinguishable from plain integers.
//!
//! # Example
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::detect::{detect_date_columns, detect_primary_keys};
//!
//! let csv = "id,day,city\n1,2024-01-15,Oslo\n2,2024-02-29,Oslo\n";
//! let ds = parse_dataset("visits.csv", csv).unwrap();
//! assert_eq!(detect_primary_keys(&ds), vec!["id", "day"]);
//! assert_eq!(detect_date_columns(&ds), vec!["day"]);
//! ```

use crate::dataset::{CellValue, ColumnType, Dataset};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ── Primary keys ──────────────────────────────────────────────────────

/// Returns the keys of all columns with no missing values and all values distinct.
///
/// Order follows column declaration. An empty dataset has no candidates.
pub fn detect_primary_keys(dataset: &Dataset) -> Vec<String> {
    let rows = dataset.row_count();
    if rows == 0 {
        return Vec::new();
    }
    dataset
        .columns()
        .iter()
        .filter(|c| c.missing_count == 0 && c.unique_values == rows)
        .map(|c| c.key.clone())
        .collect()
}

// ── Date columns ──────────────────────────────────────────────────────

/// Recognized date-like layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePattern {
    /// `YYYY-MM-DD`
    IsoDate,
    /// `YYYY-MM-DDTHH:MM[:SS[.fff]][Z|±HH:MM]` (a space may replace `T`)
    IsoDateTime,
    /// `M/D/YYYY` or `MM/DD/YYYY`
    UsDate,
    /// `YYYY/MM/DD`
    SlashedIso,
    /// `DD.MM.YYYY`
    DottedDate,
}

const PATTERNS: [DatePattern; 5] = [
    DatePattern::IsoDate,
    DatePattern::IsoDateTime,
    DatePattern::UsDate,
    DatePattern::SlashedIso,
    DatePattern::DottedDate,
];

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));
static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ](\d{2}:\d{2})(?::(\d{2})(?:\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid regex")
});
static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid regex"));
static SLASHED_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}/\d{2}/\d{2}$").expect("valid regex"));
static DOTTED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid regex"));

impl DatePattern {
    /// Returns `true` if `value` has this layout and names a real calendar date.
    pub fn matches(self, value: &str) -> bool {
        match self {
            Self::IsoDate => ISO_DATE.is_match(value) && valid_date(value, "%Y-%m-%d"),
            Self::IsoDateTime => ISO_DATETIME.captures(value).is_some_and(|caps| {
                valid_date(&caps[1], "%Y-%m-%d")
                    && NaiveTime::parse_from_str(&caps[2], "%H:%M").is_ok()
                    && caps.get(3).map_or(true, |sec| sec.as_str() < "60")
            }),
            Self::UsDate => US_DATE.is_match(value) && valid_date(value, "%m/%d/%Y"),
            Self::SlashedIso => SLASHED_ISO.is_match(value) && valid_date(value, "%Y/%m/%d"),
            Self::DottedDate => DOTTED_DATE.is_match(value) && valid_date(value, "%d.%m.%Y"),
        }
    }
}

fn valid_date(value: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(value, format).is_ok()
}

/// Returns the first pattern `value` matches, if any.
///
/// ```
/// use u_profile::detect::{classify_date, DatePattern};
///
/// assert_eq!(classify_date("2024-02-29"), Some(DatePattern::IsoDate));
/// assert_eq!(classify_date("2023-02-29"), None);
/// assert_eq!(classify_date("12/31/1999"), Some(DatePattern::UsDate));
/// ```
pub fn classify_date(value: &str) -> Option<DatePattern> {
    let value = value.trim();
    PATTERNS.into_iter().find(|p| p.matches(value))
}

/// Configuration for [`detect_date_columns_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateDetection {
    /// Number of leading non-missing values examined per column. Default: 200.
    pub sample_size: usize,
    /// Fraction of the sample that must match one pattern. Default: 1.0.
    pub threshold: f64,
}

impl Default for DateDetection {
    fn default() -> Self {
        Self {
            sample_size: 200,
            threshold: 1.0,
        }
    }
}

/// Returns the keys of categorical columns whose values all look like dates.
pub fn detect_date_columns(dataset: &Dataset) -> Vec<String> {
    detect_date_columns_with(dataset, &DateDetection::default())
}

/// Date detection with an explicit sample size and match threshold.
///
/// A column qualifies when the single best-matching [`DatePattern`] covers at
/// least `threshold` of its sampled non-missing values. Columns with no
/// values never qualify.
pub fn detect_date_columns_with(dataset: &Dataset, config: &DateDetection) -> Vec<String> {
    dataset
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.column_type == ColumnType::Categorical)
        .filter_map(|(index, column)| {
            let pattern = dominant_pattern(dataset, index, config)?;
            log::debug!("column '{}' looks like dates ({pattern:?})", column.key);
            Some(column.key.clone())
        })
        .collect()
}

/// Best pattern for a column if it reaches the threshold.
fn dominant_pattern(dataset: &Dataset, index: usize, config: &DateDetection) -> Option<DatePattern> {
    let sample: Vec<&str> = dataset
        .cells_at(index)
        .filter_map(CellValue::as_text)
        .take(config.sample_size.max(1))
        .collect();
    if sample.is_empty() {
        return None;
    }

    let mut hits = [0usize; PATTERNS.len()];
    for value in &sample {
        for (slot, pattern) in PATTERNS.iter().enumerate() {
            if pattern.matches(value) {
                hits[slot] += 1;
            }
        }
    }

    let (best, count) = hits
        .iter()
        .enumerate()
        .max_by_key(|&(slot, &count)| (count, std::cmp::Reverse(slot)))?;
    let ratio = *count as f64 / sample.len() as f64;
    (*count > 0 && ratio >= config.threshold).then_some(PATTERNS[best])
}

// ── Tests ─────────────────────────────────────────────────────────────
