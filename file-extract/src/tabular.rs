//! Tabular (CSV) extraction and direct-answer detection.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, instrument};

use crate::{errors::Result, model::TabularContent};

/// Header name that marks the column holding a pre-computed answer.
pub const ANSWER_HEADER: &str = "answer";

/// Reads the whole stream, decodes it lossily and parses it as CSV.
///
/// `raw` is left empty; archive callers attach the decoded text themselves.
#[instrument(level = "debug", skip_all)]
pub fn extract_tabular<R: Read>(mut reader: R) -> Result<TabularContent> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);
    parse_tabular(&text)
}

/// Parses already-decoded CSV text into headers, rows and a direct answer.
///
/// The first record is the header. Records may have any width; quoting
/// follows the usual double-quote rules, so delimiters and newlines inside
/// quoted fields are kept. A blank line is a record with no fields, so it
/// counts as the header or as a data row like any other line.
pub fn parse_tabular(text: &str) -> Result<TabularContent> {
    let mut records = Vec::new();
    for line in split_records(text) {
        records.push(parse_record(line)?);
    }

    let mut records = records.into_iter();
    let headers = records.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = records.collect();

    let answer_column = find_answer_column(&headers);
    let direct_answer = answer_column.and_then(|idx| first_row_cell(&rows, idx));

    debug!(
        headers = headers.len(),
        rows = rows.len(),
        answer_column = ?answer_column,
        has_direct_answer = direct_answer.is_some(),
        "parsed tabular content"
    );

    Ok(TabularContent {
        headers,
        rows,
        answer_column,
        direct_answer,
        raw: None,
    })
}

/// Splits text into raw records on line breaks outside quoted fields.
///
/// `\n`, `\r\n` and a lone `\r` all end a record. A quote only opens a
/// quoted field at the start of a field; `""` inside it is an escaped quote.
/// A final line break does not produce a trailing empty record.
fn split_records(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
            field_start = false;
        } else {
            match b {
                b'"' if field_start => {
                    in_quotes = true;
                    field_start = false;
                }
                b',' => field_start = true,
                b'\n' | b'\r' => {
                    out.push(&text[start..i]);
                    if b == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    start = i + 1;
                    field_start = true;
                }
                _ => field_start = false,
            }
        }
        i += 1;
    }

    if start < bytes.len() {
        out.push(&text[start..]);
    }
    out
}

/// Parses one raw record; an empty line yields no fields.
fn parse_record(line: &str) -> Result<Vec<String>> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    if rdr.read_record(&mut record)? {
        Ok(record.iter().map(str::to_string).collect())
    } else {
        Ok(Vec::new())
    }
}

/// Case-sensitive exact match against [`ANSWER_HEADER`].
pub fn find_answer_column(headers: &[String]) -> Option<usize> {
    headers.iter().position(|h| h == ANSWER_HEADER)
}

/// Cell `idx` of the first data row; `None` when there is no row or it is short.
fn first_row_cell(rows: &[Vec<String>], idx: usize) -> Option<String> {
    rows.first().and_then(|row| row.get(idx)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_answer_from_first_row() {
        let t = parse_tabular("id,answer\n1,42\n2,43\n").unwrap();
        assert_eq!(t.headers, ["id", "answer"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.answer_column, Some(1));
        assert_eq!(t.direct_answer.as_deref(), Some("42"));
    }

    #[test]
    fn no_answer_header_means_no_direct_answer() {
        let t = parse_tabular("id,value\n1,42\n").unwrap();
        assert_eq!(t.answer_column, None);
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let t = parse_tabular("id,Answer, answer\n1,42,43\n").unwrap();
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn short_first_row_does_not_panic() {
        let t = parse_tabular("a,b,answer\n1\n2,3,4\n").unwrap();
        assert_eq!(t.answer_column, Some(2));
        assert_eq!(t.direct_answer, None);
        assert_eq!(t.rows[0], ["1"]);
    }

    #[test]
    fn header_only_has_no_answer() {
        let t = parse_tabular("answer\n").unwrap();
        assert_eq!(t.answer_column, Some(0));
        assert!(t.rows.is_empty());
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn empty_input_yields_empty_content() {
        let t = parse_tabular("").unwrap();
        assert!(t.headers.is_empty());
        assert!(t.rows.is_empty());
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let t = parse_tabular("name,answer\n\"Doe, Jane\",\"line1\nline2\"\n").unwrap();
        assert_eq!(t.rows, [["Doe, Jane", "line1\nline2"]]);
        assert_eq!(t.direct_answer.as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let bytes: &[u8] = b"answer\nok\xff\n";
        let t = extract_tabular(bytes).unwrap();
        assert_eq!(t.direct_answer.as_deref(), Some("ok\u{fffd}"));
    }

    #[test]
    fn blank_line_is_an_empty_first_row() {
        let t = parse_tabular("answer\n\n42\n").unwrap();
        assert_eq!(t.headers, ["answer"]);
        assert_eq!(t.rows, [Vec::<String>::new(), vec!["42".to_string()]]);
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn leading_blank_line_is_an_empty_header() {
        let t = parse_tabular("\nid,answer\n1,42\n").unwrap();
        assert!(t.headers.is_empty());
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0], ["id", "answer"]);
        assert_eq!(t.answer_column, None);
        assert_eq!(t.direct_answer, None);
    }

    #[test]
    fn blank_line_inside_quotes_is_not_a_record() {
        let t = parse_tabular("answer\n\"a\n\nb\"\n").unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.direct_answer.as_deref(), Some("a\n\nb"));
    }

    #[test]
    fn crlf_line_endings() {
        let t = parse_tabular("answer\r\n7\r\n8\r\n").unwrap();
        assert_eq!(t.rows, [["7"], ["8"]]);
        assert_eq!(t.direct_answer.as_deref(), Some("7"));
    }

    #[test]
    fn first_answer_header_wins_on_duplicates() {
        let t = parse_tabular("answer,answer\nx,y\n").unwrap();
        assert_eq!(t.direct_answer.as_deref(), Some("x"));
    }
}
