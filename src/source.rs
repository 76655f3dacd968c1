//! Bounded acquisition of CSV text.
//!
//! The profiling core works on in-memory text. This module is the thin
//! boundary that reads bytes from a file or reader, enforces a size limit
//! and decodes UTF-8 before handing text to the parser.

use crate::config::ProfileConfig;
use crate::dataset::Dataset;
use crate::error::{ProfileError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default source size limit: 5 MiB.
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Reads at most `max_bytes` from `reader` and decodes them as UTF-8.
///
/// # Errors
///
/// - [`ProfileError::TooLarge`] if the reader yields more than `max_bytes`
/// - [`ProfileError::Encoding`] if the bytes are not valid UTF-8
/// - [`ProfileError::Io`] on read failure
pub fn read_text<R: Read>(reader: R, max_bytes: usize) -> Result<String> {
    let mut buf = Vec::new();
    reader
        .take((max_bytes as u64).saturating_add(1))
        .read_to_end(&mut buf)?;
    if buf.len() > max_bytes {
        return Err(ProfileError::TooLarge { limit: max_bytes });
    }
    String::from_utf8(buf).map_err(|e| ProfileError::Encoding(e.to_string()))
}

/// Loads a CSV file into a [`Dataset`] named after the file.
pub fn load_path(path: impl AsRef<Path>, config: &ProfileConfig) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if file.metadata()?.len() > config.max_bytes as u64 {
        return Err(ProfileError::TooLarge {
            limit: config.max_bytes,
        });
    }

    let text = read_text(file, config.max_bytes)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::debug!("loaded '{name}' ({} bytes)", text.len());

    config.dataset(&name, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_within_limit() {
        let text = read_text("a,b\n1,2\n".as_bytes(), 64).unwrap();
        assert_eq!(text, "a,b\n1,2\n");
    }

    #[test]
    fn read_exactly_at_limit() {
        assert!(read_text(&b"abcd"[..], 4).is_ok());
    }

    #[test]
    fn read_over_limit() {
        let err = read_text(&b"abcde"[..], 4).unwrap_err();
        assert!(matches!(err, ProfileError::TooLarge { limit: 4 }));
    }

    #[test]
    fn invalid_utf8() {
        let err = read_text(&[b'a', 0xff, 0xfe][..], 64).unwrap_err();
        assert!(matches!(err, ProfileError::Encoding(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_path("/definitely/not/here.csv", &ProfileConfig::default()).unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}
