//! Column statistics engine.
//!
//! Computes, on demand, a [`ColumnAnalysis`] for one column of a
//! [`Dataset`]: a [`NumericSummary`] with histogram for numeric columns, or
//! a [`CategoricalSummary`] frequency table for categorical ones. Results
//! are never cached; every call recomputes from the dataset.
//!
//! # Policies
//!
//! - Variance is the **population** variance (`n` denominator) unless
//!   [`VarianceKind::Sample`] is configured. Inputs near `f64::MAX` are
//!   rescaled so `mean` and `stdev` stay finite; `sum` and `variance` may
//!   still overflow to infinity.
//! - Quantiles use linear interpolation at position `f * (n - 1)` of the
//!   sorted values.
//! - Histograms use Sturges' rule `ceil(log2(n) + 1)` clamped to
//!   `1..=max_bins`; every bin is half-open except the last, which is closed.
//! - Categorical values are ordered by count descending, ties broken by
//!   first appearance; only the top `top_n` are reported.
//!
//! # Example
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::statistics::analyze_column;
//!
//! let ds = parse_dataset("demo.csv", "a,b\n1,x\n2,x\n3,y\n").unwrap();
//!
//! let a = analyze_column(&ds, "a").unwrap();
//! let num = a.numeric().unwrap();
//! assert_eq!((num.min, num.max, num.mean, num.count), (1.0, 3.0, 2.0, 3));
//!
//! let b = analyze_column(&ds, "b").unwrap();
//! let items = &b.categorical().unwrap().items;
//! assert_eq!(items[0].value, "x");
//! assert_eq!(items[0].count, 2);
//! ```

use crate::dataset::{CellValue, ColumnMeta, ColumnType, Dataset};
use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Configuration ─────────────────────────────────────────────────────

/// Denominator used for the variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceKind {
    /// Mean of squared deviations (`n`).
    #[default]
    Population,
    /// Bessel-corrected (`n - 1`); zero for a single observation.
    Sample,
}

/// Configuration for column analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of categorical values reported. Default: 10.
    pub top_n: usize,
    /// Upper bound on histogram bins. Default: 20.
    pub max_bins: usize,
    /// Variance denominator. Default: `Population`.
    pub variance: VarianceKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            max_bins: 20,
            variance: VarianceKind::Population,
        }
    }
}

// ── Result Types ──────────────────────────────────────────────────────

/// One histogram interval `[x0, x1)` (closed on the right for the last bin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Descriptive statistics for a numeric column (non-missing values only).
///
/// When `count == 0` every float field is `NaN` and `histogram` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    pub stdev: f64,
    pub variance: f64,
    pub sum: f64,
    /// Number of non-missing observations.
    pub count: usize,
    pub histogram: Vec<HistogramBin>,
}

impl NumericSummary {
    fn empty() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            median: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            stdev: f64::NAN,
            variance: f64::NAN,
            sum: f64::NAN,
            count: 0,
            histogram: Vec::new(),
        }
    }

    /// Returns `true` when there were no observations.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// One row of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummaryItem {
    pub value: String,
    pub count: usize,
    /// Share of the column's non-missing values, 0–100.
    pub percentage: f64,
}

/// Frequency summary for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    /// Number of non-missing values.
    pub total: usize,
    /// Number of distinct values (before truncation).
    pub distinct: usize,
    /// Top values by count; at most `top_n` entries.
    pub items: Vec<CategoricalSummaryItem>,
}

/// Type-specific part of a [`ColumnAnalysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Column metadata joined with exactly one summary, selected by column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAnalysis {
    pub column: ColumnMeta,
    pub summary: ColumnSummary,
}

impl ColumnAnalysis {
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.summary {
            ColumnSummary::Numeric(s) => Some(s),
            ColumnSummary::Categorical(_) => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.summary {
            ColumnSummary::Categorical(s) => Some(s),
            ColumnSummary::Numeric(_) => None,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────

/// Analyzes one column with the default [`AnalysisConfig`].
///
/// # Errors
///
/// [`ProfileError::UnknownColumn`] if `key` is not a column of `dataset`.
pub fn analyze_column(dataset: &Dataset, key: &str) -> Result<ColumnAnalysis> {
    analyze_column_with(dataset, key, &AnalysisConfig::default())
}

/// Analyzes one column with an explicit configuration.
pub fn analyze_column_with(
    dataset: &Dataset,
    key: &str,
    config: &AnalysisConfig,
) -> Result<ColumnAnalysis> {
    let index = column_index(dataset, key)?;
    Ok(analyze_index(dataset, index, config))
}

/// Analyzes every column, in declaration order.
pub fn analyze_dataset(dataset: &Dataset, config: &AnalysisConfig) -> Vec<ColumnAnalysis> {
    (0..dataset.column_count())
        .map(|i| analyze_index(dataset, i, config))
        .collect()
}

/// Full frequency table of a column: every distinct non-missing value.
///
/// Numeric cells are keyed by their display form. Sorted by count
/// descending, ties by first appearance.
pub fn frequency_table(dataset: &Dataset, key: &str) -> Result<Vec<CategoricalSummaryItem>> {
    let index = column_index(dataset, key)?;
    Ok(frequencies(dataset.cells_at(index)).1)
}

/// Computes a [`NumericSummary`] from raw observations.
///
/// Non-finite values are ignored.
///
/// ```
/// use u_profile::statistics::{numeric_summary, AnalysisConfig};
///
/// let s = numeric_summary(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], &AnalysisConfig::default());
/// assert_eq!(s.mean, 5.0);
/// assert_eq!(s.variance, 4.0);
/// assert_eq!(s.stdev, 2.0);
/// assert_eq!(s.histogram.iter().map(|b| b.count).sum::<usize>(), 8);
/// ```
pub fn numeric_summary(values: &[f64], config: &AnalysisConfig) -> NumericSummary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return NumericSummary::empty();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let (min, max) = (sorted[0], sorted[count - 1]);
    let sum: f64 = sorted.iter().sum();
    let denom = match config.variance {
        VarianceKind::Population => count as f64,
        VarianceKind::Sample if count > 1 => (count - 1) as f64,
        VarianceKind::Sample => f64::INFINITY,
    };

    let (mean, variance, stdev) = match moments(&sorted, 1.0, denom) {
        Some((mean, variance)) => (mean, variance, variance.sqrt()),
        None => {
            // Magnitudes near f64::MAX: work on values scaled into [-1, 1]
            let scale = min.abs().max(max.abs());
            let (mean, variance) = moments(&sorted, scale, denom).unwrap_or((0.0, 0.0));
            (mean * scale, variance * scale * scale, variance.sqrt() * scale)
        }
    };

    NumericSummary {
        min,
        max,
        mean: mean.clamp(min, max),
        median: quantile_sorted(&sorted, 0.5),
        q1: quantile_sorted(&sorted, 0.25),
        q3: quantile_sorted(&sorted, 0.75),
        stdev,
        variance,
        sum,
        count,
        histogram: histogram(&sorted, config.max_bins),
    }
}

/// Linear-interpolation quantile of ascending `sorted` data at fraction `f`.
///
/// Returns `NaN` for empty input. `f` is clamped to `[0, 1]`.
///
/// ```
/// use u_profile::statistics::quantile_sorted;
///
/// let data = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile_sorted(&data, 0.25), 1.75);
/// assert_eq!(quantile_sorted(&data, 0.5), 2.5);
/// ```
pub fn quantile_sorted(sorted: &[f64], f: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = f.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (pos.ceil() as usize).min(sorted.len() - 1);
    let (a, b) = (sorted[lo], sorted[hi]);
    if lo == hi {
        return a;
    }
    (a + (b - a) * (pos - lo as f64)).clamp(a, b)
}

/// Sturges' bin count `ceil(log2(n) + 1)`, clamped to `1..=max_bins`.
///
/// Zero observations give zero bins.
pub fn bin_count(n: usize, max_bins: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let k = ((n as f64).log2() + 1.0).ceil() as usize;
    k.clamp(1, max_bins.max(1))
}

/// Builds a histogram over ascending `sorted` (finite) data.
///
/// Bins are contiguous from `min` to `max`; the last bin's upper edge is
/// exactly `max` and includes it. A zero-width range yields one bin
/// centred on the value, at least `0.5` wide on each side. A range too wide
/// to split into finite bins collapses to the single bin `[min, max]`.
pub fn histogram(sorted: &[f64], max_bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    if min == max {
        let half = 0.5_f64.max(min.abs() * f64::EPSILON * 4.0);
        return vec![HistogramBin {
            x0: min - half,
            x1: max + half,
            count: sorted.len(),
        }];
    }

    let k = bin_count(sorted.len(), max_bins);
    let width = (max - min) / k as f64;
    let mut edges: Vec<f64> = (0..k).map(|i| min + width * i as f64).collect();
    edges.push(max);

    let well_formed = width.is_finite() && edges.windows(2).all(|w| w[0] < w[1]);
    if !well_formed {
        return vec![HistogramBin {
            x0: min,
            x1: max,
            count: sorted.len(),
        }];
    }

    let mut counts = vec![0usize; k];
    for &x in sorted {
        let idx = ((x - min) / width).floor() as usize;
        counts[idx.min(k - 1)] += 1;
    }

    edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| HistogramBin {
            x0: w[0],
            x1: w[1],
            count,
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────

/// Mean and variance of `values / scale`; `None` if an intermediate overflows.
fn moments(values: &[f64], scale: f64, denom: f64) -> Option<(f64, f64)> {
    let n = values.len() as f64;
    let sum: f64 = values.iter().map(|x| x / scale).sum();
    let mean = sum / n;
    let squared: f64 = values
        .iter()
        .map(|x| {
            let d = x / scale - mean;
            d * d
        })
        .sum();
    (mean.is_finite() && squared.is_finite()).then(|| (mean, squared / denom))
}

fn column_index(dataset: &Dataset, key: &str) -> Result<usize> {
    dataset
        .column_index(key)
        .ok_or_else(|| ProfileError::UnknownColumn {
            key: key.to_string(),
        })
}

fn analyze_index(dataset: &Dataset, index: usize, config: &AnalysisConfig) -> ColumnAnalysis {
    let column = dataset.columns()[index].clone();
    let summary = match column.column_type {
        ColumnType::Numeric => {
            let values: Vec<f64> = dataset
                .cells_at(index)
                .filter_map(CellValue::as_number)
                .collect();
            ColumnSummary::Numeric(numeric_summary(&values, config))
        }
        ColumnType::Categorical => {
            let (total, mut items) = frequencies(dataset.cells_at(index));
            let distinct = items.len();
            items.truncate(config.top_n);
            ColumnSummary::Categorical(CategoricalSummary {
                total,
                distinct,
                items,
            })
        }
    };
    log::trace!("analyzed column '{}' ({})", column.key, column.column_type);
    ColumnAnalysis { column, summary }
}

/// Counts non-missing values; returns `(total, items sorted by count desc)`.
fn frequencies<'a>(
    cells: impl Iterator<Item = &'a CellValue>,
) -> (usize, Vec<CategoricalSummaryItem>) {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counted: Vec<(String, usize)> = Vec::new();
    let mut total = 0usize;

    for cell in cells {
        let value = match cell {
            CellValue::Missing => continue,
            CellValue::Text(s) => s.clone(),
            CellValue::Number(v) => v.to_string(),
        };
        total += 1;
        match slots.get(&value) {
            Some(&slot) => counted[slot].1 += 1,
            None => {
                slots.insert(value.clone(), counted.len());
                counted.push((value, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counted.sort_by(|a, b| b.1.cmp(&a.1));

    let items = counted
        .into_iter()
        .map(|(value, count)| CategoricalSummaryItem {
            value,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();

    (total, items)
}

// ── Tests ─────────────────────────────────────────────────────────────
