//! CSV tokenizer.
//!
//! Turns raw CSV text into a header row plus an ordered sequence of raw
//! string rows. No type coercion happens here; see
//! [`DatasetBuilder`](crate::builder::DatasetBuilder) for inference.
//!
//! # Features
//!
//! - RFC 4180 quoting (escaped `""` quotes, delimiters and newlines inside quotes)
//! - `\n`, `\r\n` and lone `\r` row terminators
//! - Leading UTF-8 BOM stripped, trailing blank lines dropped
//! - Interior blank lines skipped when the header has several columns; with a
//!   single column they are rows holding one empty (missing) field
//! - A quoted empty field (`""`) is data, never a blank line
//! - Configurable delimiter, quote character and ragged-row policy
//!
//! # Example
//!
//! ```
//! use u_profile::csv_parser::CsvParser;
//!
//! let csv = "name,note\nAlice,\"hello, world\"\nBob,plain\n";
//! let parsed = CsvParser::new().parse(csv).unwrap();
//! assert_eq!(parsed.header, vec!["name", "note"]);
//! assert_eq!(parsed.rows.len(), 2);
//! assert_eq!(parsed.rows[0][1], "hello, world");
//! ```

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};

/// What to do with a data row whose field count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaggedRows {
    /// Any width mismatch is a parse error.
    #[default]
    Reject,
    /// Short rows are padded with empty (missing) fields; long rows are rejected.
    PadShort,
}

/// Header plus raw data rows produced by [`CsvParser::parse`].
///
/// Every row has exactly `header.len()` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedCsv {
    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// CSV parser configuration and entry point.
///
/// ```
/// use u_profile::csv_parser::{CsvParser, RaggedRows};
///
/// let parser = CsvParser::new()
///     .delimiter(b';')
///     .ragged_rows(RaggedRows::PadShort);
/// let parsed = parser.parse("a;b\n1\n2;3\n").unwrap();
/// assert_eq!(parsed.rows[0], vec!["1", ""]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvParser {
    delimiter: u8,
    quote: u8,
    ragged_rows: RaggedRows,
}

/// A tokenized row and the line it starts on.
struct RawRow {
    line: usize,
    fields: Vec<String>,
    /// Any field of the row was quoted.
    quoted: bool,
}

impl RawRow {
    fn is_blank(&self) -> bool {
        !self.quoted && self.fields.len() == 1 && self.fields[0].is_empty()
    }
}

impl CsvParser {
    /// Creates a parser with default settings (comma delimiter, double-quote, reject ragged rows).
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            ragged_rows: RaggedRows::Reject,
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets the quote character (default: `"`).
    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the ragged-row policy (default: [`RaggedRows::Reject`]).
    pub fn ragged_rows(mut self, policy: RaggedRows) -> Self {
        self.ragged_rows = policy;
        self
    }

    /// Parses CSV text into a header and raw data rows.
    ///
    /// # Errors
    ///
    /// [`ProfileError::Parse`] if the input is empty, holds only a header,
    /// ends inside a quoted field, or has a row whose width the ragged-row
    /// policy does not accept.
    pub fn parse(&self, input: &str) -> Result<ParsedCsv> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let mut raw_rows = self.tokenize(input)?.into_iter();
        let header = raw_rows
            .next()
            .ok_or_else(|| ProfileError::parse(1, "input is empty"))?;
        let width = header.fields.len();

        let mut rows = Vec::new();
        for raw in raw_rows {
            if width > 1 && raw.is_blank() {
                log::trace!("skipping blank line {}", raw.line);
                continue;
            }
            let RawRow {
                line, mut fields, ..
            } = raw;
            if fields.len() != width {
                match self.ragged_rows {
                    RaggedRows::PadShort if fields.len() < width => {
                        fields.resize(width, String::new());
                    }
                    _ => {
                        return Err(ProfileError::parse(
                            line,
                            format!("expected {width} fields, got {}", fields.len()),
                        ));
                    }
                }
            }
            rows.push(fields);
        }

        if rows.is_empty() {
            return Err(ProfileError::parse(
                header.line,
                "input contains a header but no data rows",
            ));
        }

        log::debug!("parsed CSV: {width} columns, {} data rows", rows.len());
        Ok(ParsedCsv {
            header: header.fields,
            rows,
        })
    }

    // ── Internal tokenizing ──────────────────────────────────────

    /// Splits text into rows of raw fields, tracking line numbers.
    fn tokenize(&self, input: &str) -> Result<Vec<RawRow>> {
        let delim = self.delimiter as char;
        let quote = self.quote as char;

        let mut rows: Vec<RawRow> = Vec::new();
        let mut current_row: Vec<String> = Vec::new();
        let mut current_field = String::new();
        let mut in_quotes = false;
        let mut field_quoted = false;
        let mut row_quoted = false;
        let mut line: usize = 1;
        let mut row_line: usize = 1;
        let mut quote_line: usize = 1;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                if c == quote {
                    if chars.peek() == Some(&quote) {
                        // Escaped quote ""
                        chars.next();
                        current_field.push(quote);
                    } else {
                        in_quotes = false;
                    }
                } else {
                    if c == '\n' || (c == '\r' && chars.peek() != Some(&'\n')) {
                        line += 1;
                    }
                    current_field.push(c);
                }
            } else if c == quote && current_field.is_empty() && !field_quoted {
                in_quotes = true;
                field_quoted = true;
                quote_line = line;
            } else if c == delim {
                current_row.push(std::mem::take(&mut current_field));
                row_quoted |= field_quoted;
                field_quoted = false;
            } else if c == '\n' || c == '\r' {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                current_row.push(std::mem::take(&mut current_field));
                let row = RawRow {
                    line: row_line,
                    fields: std::mem::take(&mut current_row),
                    quoted: row_quoted || field_quoted,
                };
                field_quoted = false;
                row_quoted = false;
                // Leading blank lines before the header are skipped
                if !(rows.is_empty() && row.is_blank()) {
                    rows.push(row);
                }
                line += 1;
                row_line = line;
            } else {
                current_field.push(c);
            }
        }

        if in_quotes {
            return Err(ProfileError::parse(quote_line, "unterminated quoted field"));
        }

        // Last row without a trailing newline
        if !current_field.is_empty() || !current_row.is_empty() || field_quoted {
            current_row.push(current_field);
            rows.push(RawRow {
                line: row_line,
                fields: current_row,
                quoted: row_quoted || field_quoted,
            });
        }

        while rows.last().is_some_and(RawRow::is_blank) {
            rows.pop();
        }

        Ok(rows)
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> ParsedCsv {
        CsvParser::new().parse(csv).expect("valid csv")
    }

    fn parse_err_line(csv: &str) -> usize {
        match CsvParser::new().parse(csv) {
            Err(ProfileError::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // ── Basic parsing ────────────────────────────────────────────

    #[test]
    fn parse_simple_csv() {
        let parsed = parse("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(parsed.header, vec!["a", "b", "c"]);
        assert_eq!(parsed.row_count(), 2);
        assert_eq!(parsed.rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn fields_are_not_trimmed_or_coerced() {
        let parsed = parse("x,y\n  1.5 , NA\n");
        assert_eq!(parsed.rows[0], vec!["  1.5 ", " NA"]);
    }

    #[test]
    fn parse_no_trailing_newline() {
        let parsed = parse("x\n1\n2\n3");
        assert_eq!(parsed.row_count(), 3);
    }

    #[test]
    fn parse_crlf_line_endings() {
        let parsed = parse("a,b\r\n1,2\r\n3,4\r\n");
        assert_eq!(parsed.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn parse_lone_cr_line_endings() {
        let parsed = parse("a,b\r1,2\r3,4\r");
        assert_eq!(parsed.row_count(), 2);
        assert_eq!(parsed.rows[1], vec!["3", "4"]);
    }

    #[test]
    fn parse_bom() {
        let parsed = parse("\u{feff}x,y\n1,2\n");
        assert_eq!(parsed.header, vec!["x", "y"]);
    }

    #[test]
    fn trailing_blank_lines_dropped() {
        let parsed = parse("a,b\n1,2\n\n\n\r\n");
        assert_eq!(parsed.row_count(), 1);
    }

    #[test]
    fn leading_blank_lines_skipped() {
        let parsed = parse("\n\na\n1\n");
        assert_eq!(parsed.header, vec!["a"]);
        assert_eq!(parsed.row_count(), 1);
    }

    #[test]
    fn interior_blank_line_is_single_empty_field() {
        let parsed = parse("x\n1\n\n3\n");
        assert_eq!(parsed.rows, vec![vec!["1"], vec![""], vec!["3"]]);
    }

    #[test]
    fn interior_blank_line_skipped_for_wide_rows() {
        let parsed = parse("a,b\n1,2\n\n3,4\n");
        assert_eq!(parsed.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn quoted_empty_row_is_data() {
        let parsed = parse("a\n1\n\"\"\n");
        assert_eq!(parsed.rows, vec![vec!["1"], vec![""]]);

        let parsed = parse("a\n\"\"\n");
        assert_eq!(parsed.rows, vec![vec![""]]);
    }

    #[test]
    fn quoted_empty_row_before_header_is_header() {
        let parsed = parse("\"\"\nx\n");
        assert_eq!(parsed.header, vec![""]);
        assert_eq!(parsed.rows, vec![vec!["x"]]);
    }

    #[test]
    fn empty_trailing_field_kept() {
        let parsed = parse("a,b\n1,\n");
        assert_eq!(parsed.rows[0], vec!["1", ""]);
    }

    // ── Quoted fields ────────────────────────────────────────────

    #[test]
    fn parse_quoted_fields() {
        let parsed = parse("name,desc\nAlice,\"hello, world\"\nBob,\"she said \"\"hi\"\"\"\n");
        assert_eq!(parsed.rows[0][1], "hello, world");
        assert_eq!(parsed.rows[1][1], "she said \"hi\"");
    }

    #[test]
    fn parse_quoted_newlines() {
        let parsed = parse("a,b\n1,\"x,y\nz\"\n");
        assert_eq!(parsed.row_count(), 1);
        assert_eq!(parsed.rows[0][1], "x,y\nz");
    }

    #[test]
    fn quoted_crlf_preserved() {
        let parsed = parse("a\n\"one\r\ntwo\"\n");
        assert_eq!(parsed.rows[0][0], "one\r\ntwo");
    }

    #[test]
    fn empty_quoted_field_on_last_line() {
        let parsed = parse("a,b\n1,\"\"");
        assert_eq!(parsed.rows[0], vec!["1", ""]);
    }

    #[test]
    fn mid_field_quote_is_literal() {
        let parsed = parse("a\n5\"10\n");
        assert_eq!(parsed.rows[0][0], "5\"10");
    }

    #[test]
    fn custom_quote_character() {
        let parsed = CsvParser::new()
            .quote(b'\'')
            .parse("a,b\n'x,y',2\n")
            .unwrap();
        assert_eq!(parsed.rows[0], vec!["x,y", "2"]);
    }

    // ── Delimiters ───────────────────────────────────────────────

    #[test]
    fn parse_tab_delimiter() {
        let parsed = CsvParser::new().delimiter(b'\t').parse("a\tb\n1\t2\n").unwrap();
        assert_eq!(parsed.header, vec!["a", "b"]);
        assert_eq!(parsed.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn parse_semicolon_delimiter() {
        let parsed = CsvParser::new().delimiter(b';').parse("a;b\n1,5;2\n").unwrap();
        assert_eq!(parsed.rows[0], vec!["1,5", "2"]);
    }

    // ── Errors ───────────────────────────────────────────────────

    #[test]
    fn empty_input_is_error() {
        assert_eq!(parse_err_line(""), 1);
        assert!(CsvParser::new().parse("\n\n").is_err());
        assert!(CsvParser::new().parse("\u{feff}").is_err());
    }

    #[test]
    fn header_only_is_error() {
        assert!(CsvParser::new().parse("a,b,c\n").is_err());
        assert!(CsvParser::new().parse("a,b,c").is_err());
        assert!(CsvParser::new().parse("a,b,c\n\n\n").is_err());
    }

    #[test]
    fn unterminated_quote_reports_opening_line() {
        assert_eq!(parse_err_line("a,b\n1,2\n3,\"never\nclosed\n"), 3);
    }

    #[test]
    fn column_count_mismatch_reports_line() {
        assert_eq!(parse_err_line("a,b\n1,2\n3\n"), 3);
        assert_eq!(parse_err_line("a,b\n1,2,3\n"), 2);
    }

    #[test]
    fn line_numbers_account_for_quoted_newlines() {
        assert_eq!(parse_err_line("a,b\n1,\"x\ny\"\n3\n"), 4);
    }

    // ── Ragged-row policy ────────────────────────────────────────

    #[test]
    fn pad_short_rows() {
        let parsed = CsvParser::new()
            .ragged_rows(RaggedRows::PadShort)
            .parse("a,b,c\n1\n1,2,3\n")
            .unwrap();
        assert_eq!(parsed.rows[0], vec!["1", "", ""]);
        assert_eq!(parsed.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn pad_short_still_rejects_long_rows() {
        let result = CsvParser::new()
            .ragged_rows(RaggedRows::PadShort)
            .parse("a,b\n1,2,3\n");
        assert!(result.is_err());
    }

    #[test]
    fn parser_config_deserializes_with_defaults() {
        let parser: CsvParser =
            serde_json::from_str(r#"{"delimiter": 59, "ragged_rows": "pad_short"}"#).unwrap();
        assert_eq!(
            parser,
            CsvParser::new().delimiter(b';').ragged_rows(RaggedRows::PadShort)
        );
    }
}
