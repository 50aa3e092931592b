//! CSV text to [`Dataset`].
//!
//! Tokenizing goes through the `csv` crate with double-quote escaping, so
//! commas inside quoted spans stay in one field and `""` unescapes to `"`.
//! Header names are standardized with [`standardize_column_name`].
//!
//! Two headers that standardize to the same name share one column. The field
//! furthest to the right wins, the same way repeated keys overwrite each other
//! in a record map. Collisions are not renamed.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::{
    data::{Cell, Dataset},
    error::{AnalysisError, Result},
};

/// Tokens read as missing values, compared case-insensitively.
const PLACEHOLDER_TOKENS: &[&str] = &[
    "na", "n/a", "nan", "null", "none", "#n/a", "<na>", "-nan", "#na",
];

fn non_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid non-word pattern"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Lower-cases and trims `name`, drops characters that are neither word nor
/// whitespace characters, and joins the remaining words with `_`.
///
/// A dropped character separates words, so `"b,c"` becomes `b_c`. An empty
/// result is replaced by `column_<position>`.
pub fn standardize_column_name(name: &str, position: usize) -> String {
    let lowered = name.to_lowercase();
    let spaced = non_word_pattern().replace_all(lowered.trim(), " ");
    let joined = whitespace_pattern().replace_all(spaced.trim(), "_");
    if joined.is_empty() {
        format!("column_{position}")
    } else {
        joined.into_owned()
    }
}

pub fn is_placeholder_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || PLACEHOLDER_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

fn raw_cell(field: Option<&str>) -> Cell {
    match field {
        Some(value) if !is_placeholder_token(value) => Cell::Text(value.to_string()),
        _ => Cell::Absent,
    }
}

/// Parses CSV text whose first row is the header.
///
/// Rows with fewer fields than the header get [`Cell::Absent`] for the
/// missing trailing fields; surplus fields are ignored.
pub fn parse_csv(text: &str) -> Result<Dataset> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .double_quote(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|err| AnalysisError::InvalidRecord {
            line: 1,
            message: err.to_string(),
        })?,
        None => return Err(AnalysisError::EmptyInput),
    };

    let mut columns: Vec<String> = Vec::with_capacity(header.len());
    let mut slots = Vec::with_capacity(header.len());
    for (position, raw_name) in header.iter().enumerate() {
        let name = standardize_column_name(raw_name, position);
        let slot = match columns.iter().position(|existing| *existing == name) {
            Some(existing) => {
                debug!("Header '{raw_name}' collides with column '{name}'; later field wins");
                existing
            }
            None => {
                columns.push(name);
                columns.len() - 1
            }
        };
        slots.push(slot);
    }

    let mut rows = Vec::new();
    for (row_idx, record) in records.enumerate() {
        let record = record.map_err(|err| AnalysisError::InvalidRecord {
            line: row_idx + 2,
            message: err.to_string(),
        })?;
        let mut cells = vec![Cell::Absent; columns.len()];
        for (position, slot) in slots.iter().enumerate() {
            cells[*slot] = raw_cell(record.get(position));
        }
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(AnalysisError::MalformedRow);
    }
    debug!(
        "Parsed {} row(s) across {} column(s)",
        rows.len(),
        columns.len()
    );
    Ok(Dataset::new(columns, rows))
}
