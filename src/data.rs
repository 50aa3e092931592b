//! Cell values and the in-memory [`Dataset`].
//!
//! A [`Cell`] distinguishes three states: a present typed value, a value that
//! was present but failed to parse under its column type ([`Cell::Null`]), and
//! a value that was never present in the source ([`Cell::Absent`]). Imputation
//! relies on that distinction being explicit rather than on falsy defaults.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing in the source: empty field, placeholder token, or short row.
    Absent,
    /// Present in the source but unparsable under the column's type.
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Absent | Cell::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Absent | Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Date(d) => format_date(d),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Absent | Cell::Null => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Date(d) => serializer.serialize_str(&format_date(d)),
        }
    }
}

/// Ordered rows sharing one set of column names.
///
/// Every row holds exactly one cell per column; constructors pad short rows
/// with [`Cell::Absent`] and drop surplus cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Absent);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Non-missing numeric values of a column, in row order.
    pub fn numbers(&self, index: usize) -> Vec<f64> {
        self.column(index).filter_map(Cell::as_number).collect()
    }

    pub(crate) fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Option<Cell>,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index)
                && let Some(replacement) = f(cell)
            {
                *cell = replacement;
            }
        }
    }
}

struct RowRef<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for RowRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

impl Serialize for Dataset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rows = self
            .rows
            .iter()
            .map(|cells| RowRef {
                columns: &self.columns,
                cells,
            })
            .collect::<Vec<_>>();
        let mut state = serializer.serialize_struct("Dataset", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// Parses a finite real number; surrounding whitespace is ignored.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Parses the date shapes the classifier recognises into a timestamp.
///
/// Numeric dates are read month-first before day-first, so `03/04/2024` is
/// March 4th. A trailing two-digit year (`01/05/24`) is read as `%y`.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    const YEAR_FIRST_DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    const YEAR_LAST_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
    const SHORT_YEAR_DATETIME_FORMATS: &[&str] = &["%m/%d/%y %H:%M:%S", "%m/%d/%y %H:%M"];
    const YEAR_FIRST_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    const YEAR_LAST_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y"];
    const SHORT_YEAR_DATE_FORMATS: &[&str] = &["%m/%d/%y", "%d/%m/%y", "%m-%d-%y", "%d-%m-%y"];
    const NAMED_MONTH_FORMATS: &[&str] = &["%b %d, %Y", "%b %d %Y", "%d %b %Y", "%d %b, %Y"];

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(compact) = parse_compact_date(trimmed) {
        return compact.and_hms_opt(0, 0, 0);
    }

    // chrono's %Y takes any digit count, so the year width picks the format family
    let (datetime_formats, date_formats) = if starts_with_full_year(trimmed) {
        (YEAR_FIRST_DATETIME_FORMATS, YEAR_FIRST_DATE_FORMATS)
    } else if ends_with_short_year(trimmed) {
        (SHORT_YEAR_DATETIME_FORMATS, SHORT_YEAR_DATE_FORMATS)
    } else {
        (YEAR_LAST_DATETIME_FORMATS, YEAR_LAST_DATE_FORMATS)
    };

    for fmt in datetime_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for fmt in date_formats.iter().chain(NAMED_MONTH_FORMATS) {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// `2024-...` or `2024/...`.
fn starts_with_full_year(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && matches!(bytes[4], b'-' | b'/')
}

/// Date part ends in a two-digit year component, as in `1/5/24` or `01-05-24 10:30`.
fn ends_with_short_year(value: &str) -> bool {
    let date_part = value.split(' ').next().unwrap_or(value);
    let mut components = date_part.split(['/', '-']);
    let Some(last) = components.next_back() else {
        return false;
    };
    components.next().is_some() && last.len() == 2 && last.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYYMMDD` integers.
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_date(value: &NaiveDateTime) -> String {
    if value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Largest magnitude below which every integer is exact in an `f64` (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rounds to `places` decimals; non-finite input collapses to `0.0`.
///
/// Values already too large to carry `places` decimals come back unchanged,
/// and a negative result that rounds to zero comes back as positive zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    if value.abs() * factor > MAX_EXACT_INTEGER {
        return value;
    }
    // adding zero turns -0.0 into 0.0
    (value * factor).round() / factor + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parse_date_supports_multiple_formats() {
        let expected = ymd(2024, 3, 4);
        assert_eq!(parse_date("2024-03-04"), Some(expected));
        assert_eq!(parse_date("03/04/2024"), Some(expected));
        assert_eq!(parse_date("2024/03/04"), Some(expected));
        assert_eq!(parse_date("20240304"), Some(expected));
        assert_eq!(parse_date("Mar 4, 2024"), Some(expected));
        assert_eq!(parse_date("4 Mar 2024"), Some(expected));
    }

    #[test]
    fn parse_date_falls_back_to_day_first() {
        assert_eq!(parse_date("25/12/2023"), Some(ymd(2023, 12, 25)));
    }

    #[test]
    fn parse_date_reads_two_digit_years() {
        assert_eq!(parse_date("01/05/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("1/5/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01-05-24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("25/12/23"), Some(ymd(2023, 12, 25)));
        assert_eq!(parse_date("1/5/2024"), Some(ymd(2024, 1, 5)));
        let parsed = parse_date("01/05/24 13:30").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(parsed.hour(), 13);
    }

    #[test]
    fn parse_date_keeps_time_of_day() {
        let parsed = parse_date("2024-01-02T06:00:00").unwrap();
        assert_eq!(format_date(&parsed), "2024-01-02 06:00:00");
        assert_eq!(format_date(&ymd(2024, 1, 2)), "2024-01-02");
    }

    #[test]
    fn parse_date_rejects_non_dates() {
        assert_eq!(parse_date("hello"), None);
        assert_eq!(parse_date("20241340"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_number_requires_finite_values() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3e2"), Some(-300.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12a"), None);
    }

    #[test]
    fn round_to_handles_non_finite() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
        assert_eq!(round_to(f64::INFINITY, 4), 0.0);
    }

    #[test]
    fn round_to_leaves_large_magnitudes_alone() {
        assert_eq!(round_to(3e25, 2), 3e25);
        assert_eq!(round_to(-1.5e300, 4), -1.5e300);
        assert_eq!(round_to(123_456.789, 2), 123_456.79);
    }

    #[test]
    fn round_to_never_returns_negative_zero() {
        let rounded = round_to(-0.00001, 4);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
        assert_eq!(format_number(rounded), "0");
    }

    #[test]
    fn dataset_pads_short_rows() {
        let dataset = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Number(1.0)]],
        );
        assert_eq!(dataset.rows()[0], vec![Cell::Number(1.0), Cell::Absent]);
    }

    #[test]
    fn dataset_serializes_rows_as_maps() {
        let dataset = Dataset::new(
            vec!["d".into(), "v".into()],
            vec![vec![Cell::Date(ymd(2024, 1, 1)), Cell::Null]],
        );
        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(
            json,
            r#"{"columns":["d","v"],"rows":[{"d":"2024-01-01","v":null}]}"#
        );
    }
}
