// src/process/mod.rs
use anyhow::{anyhow, Result};
use std::str;
use tracing::{debug, info, warn};

use crate::record::{Record, Value};

pub mod tokenize;
pub mod utils;

pub use tokenize::{tokenize_row, DEFAULT_DELIMITER};

const BOM: &str = "\u{feff}";

/// Output of [`parse_records`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    /// Field names from the header row, in column order (blank ones included).
    pub headers: Vec<String>,
    /// One record per non-blank data line that decoded, in input order.
    pub records: Vec<Record>,
    /// Data lines that could not be decoded and were skipped.
    pub errors: usize,
}

impl ParsedTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split on `\n`, `\r\n` and lone `\r`. A trailing terminator leaves a final
/// empty line, same as splitting the normalised text on `\n`.
fn split_lines(input: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'\n' => {
                lines.push(&input[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&input[start..i]);
                if input.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&input[start..]);
    lines
}

fn is_blank(line: &[u8]) -> bool {
    match str::from_utf8(line) {
        Ok(s) => s.trim().is_empty(),
        Err(_) => line.iter().all(u8::is_ascii_whitespace),
    }
}

/// Decode and tokenize one data line.
fn parse_line(line: &[u8], delimiter: char) -> Result<Vec<String>> {
    let text = str::from_utf8(line)
        .map_err(|e| anyhow!("invalid UTF-8 at byte {}", e.valid_up_to()))?;
    Ok(tokenize_row(text, delimiter))
}

/// Zip tokens onto headers by position. Short rows are padded with `""`,
/// extra tokens are dropped and blank headers never become fields.
fn zip_record(headers: &[String], values: Vec<String>) -> Record {
    let mut values = values.into_iter();
    let mut rec = Record::new();
    for header in headers {
        let value = values.next().unwrap_or_default();
        if !header.is_empty() {
            rec.insert(header.as_str(), Value::Text(value));
        }
    }
    rec
}

/// Parse comma-delimited text (header line + data lines) into records.
pub fn parse_records(input: impl AsRef<[u8]>) -> ParsedTable {
    parse_records_with(input, DEFAULT_DELIMITER)
}

/// Parse delimited text into records, keeping every non-blank data line.
///
/// Rows with fewer fields than the header still yield a full record; a line
/// that fails to decode is counted in [`ParsedTable::errors`] and skipped
/// without affecting the rest of the input.
pub fn parse_records_with(input: impl AsRef<[u8]>, delimiter: char) -> ParsedTable {
    let lines = split_lines(input.as_ref());
    if lines.len() < 2 {
        warn!(lines = lines.len(), "delimited text has no data lines");
        return ParsedTable::default();
    }

    let header_line = match str::from_utf8(lines[0]) {
        Ok(h) => h.strip_prefix(BOM).unwrap_or(h),
        Err(e) => {
            warn!(error = %e, "header line is not valid UTF-8, nothing parsed");
            return ParsedTable::default();
        }
    };
    let headers = tokenize_row(header_line, delimiter);
    debug!(columns = headers.len(), ?headers, "parsed header");

    let mut records = Vec::with_capacity(lines.len() - 1);
    let mut errors = 0;
    for (idx, line) in lines[1..].iter().enumerate() {
        if is_blank(line) {
            continue;
        }
        match parse_line(line, delimiter) {
            Ok(values) => records.push(zip_record(&headers, values)),
            Err(e) => {
                errors += 1;
                // +2: 1-based and the header line
                warn!(line = idx + 2, error = %e, "skipping unparseable row");
            }
        }
    }

    info!(rows = records.len(), errors, "parsed delimited text");
    ParsedTable {
        headers,
        records,
        errors,
    }
}
