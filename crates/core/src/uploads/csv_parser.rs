//! CSV parsing for earnings exports.
//!
//! Platform exports are loosely formatted: some use `;` or tabs, some carry a
//! UTF-8 BOM, and rows are frequently ragged. Parsing is permissive and
//! reports recoverable problems as warnings instead of failing.

use csv::{ReaderBuilder, Terminator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Error, ValidationError};
use crate::Result;

/// Options for CSV parsing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Delimiter character: ",", ";", "\t", or "auto" (default: "auto")
    pub delimiter: Option<String>,
    /// Whether to skip empty rows (default: true)
    pub skip_empty_rows: Option<bool>,
}

impl ParseOptions {
    fn effective_delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or("auto")
    }

    fn skip_empty(&self) -> bool {
        self.skip_empty_rows.unwrap_or(true)
    }
}

/// A parsed CSV file: one header row plus data rows of the same width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// The delimiter actually used
    pub delimiter: String,
    /// Recoverable problems found while parsing
    pub warnings: Vec<CsvWarning>,
}

impl CsvTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns a row as a `column -> value` map.
    ///
    /// Duplicate header names keep the last value, like a JSON object would.
    pub fn row_map(&self, index: usize) -> Option<BTreeMap<String, String>> {
        self.rows.get(index).map(|row| {
            self.headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
    }
}

/// Problem encountered during CSV parsing that did not abort the parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CsvWarning {
    /// Row index where the problem occurred (if applicable)
    pub row_index: Option<usize>,
    pub message: String,
    /// "parse", "encoding" or "structure"
    pub kind: String,
}

impl CsvWarning {
    fn parse(row: usize, message: impl Into<String>) -> Self {
        Self {
            row_index: Some(row),
            message: message.into(),
            kind: "parse".to_string(),
        }
    }

    fn encoding(message: impl Into<String>) -> Self {
        Self {
            row_index: None,
            message: message.into(),
            kind: "encoding".to_string(),
        }
    }

    fn structure(row: usize, message: impl Into<String>) -> Self {
        Self {
            row_index: Some(row),
            message: message.into(),
            kind: "structure".to_string(),
        }
    }
}

/// Parses CSV content. The first non-empty record is the header row.
///
/// Fails with a validation error when the content holds no records or the
/// header row is blank.
pub fn parse_csv(content: &[u8], options: &ParseOptions) -> Result<CsvTable> {
    let mut warnings = Vec::new();

    let text = decode_content(content, &mut warnings);
    let delimiter = detect_delimiter(&text, options);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(
                record
                    .iter()
                    .map(|cell| cell.trim_end_matches('\r').to_string())
                    .collect(),
            ),
            Err(e) => warnings.push(CsvWarning::parse(
                idx,
                format!("Failed to parse row {}: {}", idx + 1, e),
            )),
        }
    }

    if options.skip_empty() {
        records.retain(|row| !row.iter().all(|cell| cell.trim().is_empty()));
    }

    let mut records = records.into_iter();
    let headers: Vec<String> = match records.next() {
        Some(row) if row.iter().any(|h| !h.trim().is_empty()) => {
            row.iter().map(|h| h.trim().to_string()).collect()
        }
        Some(_) => {
            return Err(Error::Validation(ValidationError::CsvParse(
                "Header row is empty".to_string(),
            )))
        }
        None => {
            return Err(Error::Validation(ValidationError::CsvParse(
                "CSV file is empty or contains no valid records".to_string(),
            )))
        }
    };

    let width = headers.len();
    let rows: Vec<Vec<String>> = records
        .enumerate()
        .map(|(idx, mut row)| {
            if row.len() < width {
                warnings.push(CsvWarning::structure(
                    idx,
                    format!(
                        "Row {} has {} columns, expected {}. Missing columns left empty.",
                        idx + 1,
                        row.len(),
                        width
                    ),
                ));
                row.resize(width, String::new());
            } else if row.len() > width {
                warnings.push(CsvWarning::structure(
                    idx,
                    format!(
                        "Row {} has {} columns, expected {}. Extra columns ignored.",
                        idx + 1,
                        row.len(),
                        width
                    ),
                ));
                row.truncate(width);
            }
            row
        })
        .collect();

    Ok(CsvTable {
        headers,
        rows,
        delimiter: delimiter.to_string(),
        warnings,
    })
}

/// Decodes content bytes to a UTF-8 string, stripping a BOM if present.
fn decode_content(content: &[u8], warnings: &mut Vec<CsvWarning>) -> String {
    let content = content.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(content);

    match std::str::from_utf8(content) {
        Ok(s) => s.to_string(),
        Err(e) => {
            warnings.push(CsvWarning::encoding(format!(
                "Invalid UTF-8 encoding at byte {}: {}. Some characters may be replaced.",
                e.valid_up_to(),
                e
            )));
            String::from_utf8_lossy(content).into_owned()
        }
    }
}

fn detect_delimiter(content: &str, options: &ParseOptions) -> char {
    match options.effective_delimiter() {
        "auto" | "" => {}
        "\\t" | "\t" => return '\t',
        other => return other.chars().next().unwrap_or(','),
    }

    // Pick the candidate with the most columns that is consistent across lines
    [',', ';', '\t']
        .into_iter()
        .map(|delim| (delim, score_delimiter(content, delim)))
        .fold((',', 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
}

fn score_delimiter(content: &str, delimiter: char) -> usize {
    let counts: Vec<usize> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .map(|line| line.matches(delimiter).count())
        .collect();

    match counts.first() {
        None | Some(0) => 0,
        Some(&first) => first * counts.iter().filter(|&&c| c == first).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = b"order_id,amount,date\nA1,500,2024-01-05\nA2,300,2024-01-20";

        let table = parse_csv(content, &ParseOptions::default()).unwrap();

        assert_eq!(table.headers, vec!["order_id", "amount", "date"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["A2", "300", "2024-01-20"]);
        assert_eq!(table.delimiter, ",");
    }

    #[test]
    fn test_semicolon_and_tab_detection() {
        let semi = parse_csv(b"a;b;c\n1;2;3", &ParseOptions::default()).unwrap();
        assert_eq!(semi.delimiter, ";");
        assert_eq!(semi.headers, vec!["a", "b", "c"]);

        let tab = parse_csv(b"a\tb\n1\t2", &ParseOptions::default()).unwrap();
        assert_eq!(tab.delimiter, "\t");
        assert_eq!(tab.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_explicit_delimiter_wins() {
        let options = ParseOptions {
            delimiter: Some(";".to_string()),
            ..Default::default()
        };
        let table = parse_csv(b"a;b\n\"1,5\";2", &options).unwrap();
        assert_eq!(table.rows[0], vec!["1,5", "2"]);
    }

    #[test]
    fn test_bom_crlf_and_empty_rows() {
        let content = b"\xEF\xBB\xBFname,amount\r\nRavi,100\r\n\r\n,\r\nAsha,200\r\n";

        let table = parse_csv(content, &ParseOptions::default()).unwrap();

        assert_eq!(table.headers, vec!["name", "amount"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["Asha", "200"]);
    }

    #[test]
    fn test_quoted_amount_with_thousands_separator() {
        let content = "date,amount\n2024-02-01,\"₹12,500\"".as_bytes();
        let table = parse_csv(content, &ParseOptions::default()).unwrap();
        assert_eq!(table.rows[0][1], "₹12,500");
    }

    #[test]
    fn test_ragged_rows_are_normalized() {
        let table = parse_csv(b"a,b,c\n1,2\n3,4,5,6", &ParseOptions::default()).unwrap();

        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["3", "4", "5"]);
        let structure_rows: Vec<Option<usize>> = table
            .warnings
            .iter()
            .filter(|w| w.kind == "structure")
            .map(|w| w.row_index)
            .collect();
        assert_eq!(structure_rows, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_short_row_alone_is_reported() {
        let table = parse_csv(b"a,b,c
1,2,3
4", &ParseOptions::default()).unwrap();

        assert_eq!(table.rows[1], vec!["4", "", ""]);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].kind, "structure");
        assert_eq!(table.warnings[0].row_index, Some(1));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let table = parse_csv(b"order_id,amount\n", &ParseOptions::default()).unwrap();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(parse_csv(b"", &ParseOptions::default()).is_err());
        assert!(parse_csv(b"\n\n", &ParseOptions::default()).is_err());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let content = b"name,amount\nR\xFFvi,10";
        let table = parse_csv(content, &ParseOptions::default()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.warnings.iter().any(|w| w.kind == "encoding"));
    }

    #[test]
    fn test_row_map_pairs_headers_with_values() {
        let table = parse_csv(b"trip_id,fare\nT9,250", &ParseOptions::default()).unwrap();
        let row = table.row_map(0).unwrap();
        assert_eq!(row.get("trip_id").map(String::as_str), Some("T9"));
        assert_eq!(row.get("fare").map(String::as_str), Some("250"));
        assert!(table.row_map(1).is_none());
    }
}
