//! # u-profile
//!
//! Dataset profiling engine for CSV data.
//!
//! u-profile turns raw CSV text into an immutable, typed dataset and
//! derives on-demand column analyses from it. Every stage after text
//! acquisition is a pure, synchronous function over immutable inputs.
//!
//! - **Parsing** — RFC 4180 tokenizer with explicit ragged-row policy
//! - **Inference** — numeric vs categorical columns, missingness, cardinality
//! - **Statistics** — descriptive stats, quantiles and histograms; frequency tables
//! - **Heuristics** — primary-key candidates and date-like columns
//!
//! ## Modules
//!
//! - [`csv_parser`] — CSV text → header + raw rows
//! - [`builder`] — Type inference and dataset assembly
//! - [`dataset`] — Data model (Dataset, ColumnMeta, CellValue, Row)
//! - [`statistics`] — Numeric and categorical column summaries
//! - [`detect`] — Primary-key and date-column detectors
//! - [`overview`] — Dataset-level summary
//! - [`source`] — Size-bounded file/reader acquisition
//! - [`config`] — Aggregate, serde-loadable configuration
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_profile::builder::parse_dataset;
//! use u_profile::dataset::ColumnType;
//! use u_profile::detect::detect_primary_keys;
//! use u_profile::statistics::analyze_column;
//!
//! let csv = "a,b\n1,x\n2,x\n3,y\n";
//! let ds = parse_dataset("demo.csv", csv).unwrap();
//!
//! assert_eq!(ds.row_count(), 3);
//! assert_eq!(ds.column("a").unwrap().column_type, ColumnType::Numeric);
//! assert_eq!(ds.column("b").unwrap().column_type, ColumnType::Categorical);
//!
//! let a = analyze_column(&ds, "a").unwrap();
//! assert_eq!(a.numeric().unwrap().mean, 2.0);
//! assert_eq!(detect_primary_keys(&ds), vec!["a"]);
//! ```

pub mod builder;
pub mod config;
pub mod csv_parser;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod overview;
pub mod source;
pub mod statistics;

pub use builder::{parse_dataset, DatasetBuilder};
pub use config::ProfileConfig;
pub use csv_parser::{CsvParser, ParsedCsv, RaggedRows};
pub use dataset::{CellValue, ColumnMeta, ColumnType, Dataset, Row};
pub use detect::{detect_date_columns, detect_primary_keys};
pub use error::{ProfileError, Result};
pub use statistics::{analyze_column, ColumnAnalysis, ColumnSummary};
