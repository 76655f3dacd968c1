//! Error types for u-profile.

use thiserror::Error;

/// All errors produced by u-profile operations.
///
/// Parsing and dataset building fail fast with one of these; the statistics
/// engine and the detectors only fail on an unknown column key.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Malformed CSV structure (empty input, unterminated quote, ragged row).
    #[error("CSV parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// A cell classified as numeric failed numeric coercion.
    #[error("column '{column}' row {row}: value '{value}' was classified numeric but failed to convert")]
    TypeInference {
        column: String,
        row: usize,
        value: String,
    },
    /// Analysis requested for a column key that does not exist.
    #[error("column '{key}' not found")]
    UnknownColumn { key: String },
    /// Input exceeds the configured size limit.
    #[error("input exceeds the {limit}-byte limit")]
    TooLarge { limit: usize },
    /// Input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Encoding(String),
    /// I/O error while reading a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProfileError>;

impl ProfileError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns `true` for structural CSV failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = ProfileError::parse(3, "unterminated quote");
        assert_eq!(e.to_string(), "CSV parse error at line 3: unterminated quote");
        assert!(e.is_parse());

        let e = ProfileError::UnknownColumn { key: "age".into() };
        assert_eq!(e.to_string(), "column 'age' not found");
        assert!(!e.is_parse());
    }

    #[test]
    fn io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: ProfileError = io.into();
        assert!(matches!(e, ProfileError::Io(_)));
    }
}
