//! Aggregate configuration.
//!
//! [`ProfileConfig`] bundles every tunable of the engine so a host can load
//! it from a settings file. Missing fields fall back to their defaults.
//!
//! ```
//! use u_profile::config::ProfileConfig;
//!
//! let mut config = ProfileConfig::default();
//! config.parser = config.parser.delimiter(b';');
//! let ds = config.dataset("inline", "a;b\n1;x\n").unwrap();
//! assert_eq!(ds.column_count(), 2);
//! ```

use crate::builder::DatasetBuilder;
use crate::csv_parser::CsvParser;
use crate::dataset::Dataset;
use crate::detect::DateDetection;
use crate::error::Result;
use crate::source::DEFAULT_MAX_BYTES;
use crate::statistics::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// Every engine setting in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Tokenizer settings.
    pub parser: CsvParser,
    /// Null markers used during type inference.
    pub builder: DatasetBuilder,
    /// Statistics settings.
    pub analysis: AnalysisConfig,
    /// Date-column heuristic settings.
    pub dates: DateDetection,
    /// Largest accepted source, in bytes. Default: 5 MiB.
    pub max_bytes: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            parser: CsvParser::new(),
            builder: DatasetBuilder::new(),
            analysis: AnalysisConfig::default(),
            dates: DateDetection::default(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl ProfileConfig {
    /// Parses `text` and builds a dataset with these settings.
    pub fn dataset(&self, name: &str, text: &str) -> Result<Dataset> {
        let parsed = self.parser.parse(text)?;
        self.builder.build_parsed(name, &parsed)
    }
}
