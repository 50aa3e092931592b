//! Column type classification.
//!
//! Each column is sampled (up to [`SAMPLE_SIZE`] leading non-absent values)
//! and assigned one of three [`ColumnType`]s. Date detection runs before
//! numeric detection, so an 8-digit `YYYYMMDD` column resolves to a date when
//! it crosses the date threshold even though it also parses as a number.

use std::{fmt, str::FromStr, sync::OnceLock};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::{Cell, Dataset, parse_number};

pub const SAMPLE_SIZE: usize = 20;
/// Date ratio required when the column name suggests a date.
pub const NAMED_DATE_THRESHOLD: f64 = 0.3;
/// Date ratio required regardless of the column name.
pub const DATE_THRESHOLD: f64 = 0.5;
pub const NUMERIC_THRESHOLD: f64 = 0.8;

const DATE_KEYWORDS: &[&str] = &[
    "date",
    "time",
    "timestamp",
    "created",
    "updated",
    "day",
    "month",
    "year",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Date,
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" => Ok(ColumnType::Numeric),
            "date" | "datetime" => Ok(ColumnType::Date),
            "categorical" | "category" | "string" => Ok(ColumnType::Categorical),
            other => Err(format!("Unknown column type '{other}'")),
        }
    }
}

/// Column names bucketed by type, each bucket in dataset column order.
///
/// A name is held by at most one bucket; [`ColumnTypeSet::insert`] refuses a
/// second assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeSet {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub date: Vec<String>,
}

impl ColumnTypeSet {
    /// Returns `false` without changing anything when `name` is already
    /// assigned.
    pub fn insert(&mut self, name: &str, datatype: ColumnType) -> bool {
        if self.type_of(name).is_some() {
            return false;
        }
        let bucket = match datatype {
            ColumnType::Numeric => &mut self.numeric,
            ColumnType::Date => &mut self.date,
            ColumnType::Categorical => &mut self.categorical,
        };
        bucket.push(name.to_string());
        true
    }

    pub fn type_of(&self, name: &str) -> Option<ColumnType> {
        if self.numeric.iter().any(|c| c == name) {
            Some(ColumnType::Numeric)
        } else if self.date.iter().any(|c| c == name) {
            Some(ColumnType::Date)
        } else if self.categorical.iter().any(|c| c == name) {
            Some(ColumnType::Categorical)
        } else {
            None
        }
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.type_of(name) == Some(ColumnType::Numeric)
    }

    pub fn is_date(&self, name: &str) -> bool {
        self.type_of(name) == Some(ColumnType::Date)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.type_of(name) == Some(ColumnType::Categorical)
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
        self.numeric
            .iter()
            .map(|c| (c.as_str(), ColumnType::Numeric))
            .chain(self.date.iter().map(|c| (c.as_str(), ColumnType::Date)))
            .chain(
                self.categorical
                    .iter()
                    .map(|c| (c.as_str(), ColumnType::Categorical)),
            )
    }
}

fn date_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // ISO, optionally followed by a time of day
            r"^\d{4}-\d{1,2}-\d{1,2}(?:[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
            r"^\d{1,4}/\d{1,2}/\d{1,4}(?: \d{1,2}:\d{2}(?::\d{2})?)?$",
            r"^\d{1,2}-\d{1,2}-\d{2,4}$",
            r"^(?:19|20)\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])$",
            r"(?i)^[a-z]{3,9}\.? \d{1,2},? \d{4}$",
            r"(?i)^\d{1,2} [a-z]{3,9}\.?,? \d{4}$",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid date pattern"))
        .collect()
    })
}

pub fn looks_like_date(value: &str) -> bool {
    let trimmed = value.trim();
    date_patterns().iter().any(|re| re.is_match(trimmed))
}

pub fn has_date_keyword(name: &str) -> bool {
    let lowered = name.to_lowercase();
    DATE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

#[derive(Debug, Clone, Default)]
struct TypeCandidate {
    sampled: usize,
    date_matches: usize,
    numeric_matches: usize,
}

impl TypeCandidate {
    fn update(&mut self, value: &str) {
        self.sampled += 1;
        if looks_like_date(value) {
            self.date_matches += 1;
        }
        if parse_number(value).is_some() {
            self.numeric_matches += 1;
        }
    }

    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.sampled as f64
    }

    fn decide(&self, name: &str) -> ColumnType {
        if self.sampled == 0 {
            return ColumnType::Categorical;
        }
        let date_ratio = self.ratio(self.date_matches);
        if (has_date_keyword(name) && date_ratio > NAMED_DATE_THRESHOLD)
            || date_ratio > DATE_THRESHOLD
        {
            ColumnType::Date
        } else if self.ratio(self.numeric_matches) > NUMERIC_THRESHOLD {
            ColumnType::Numeric
        } else {
            ColumnType::Categorical
        }
    }
}

fn sample_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Absent | Cell::Null => None,
        other => Some(other.as_display()),
    }
}

/// Classifies one column from its cells in row order.
pub fn classify_column<'a, I>(name: &str, cells: I) -> ColumnType
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut candidate = TypeCandidate::default();
    for value in cells.into_iter().filter_map(sample_text).take(SAMPLE_SIZE) {
        candidate.update(&value);
    }
    let decided = candidate.decide(name);
    debug!(
        "Column '{name}': sampled {} value(s), {} date-shaped, {} numeric -> {decided}",
        candidate.sampled, candidate.date_matches, candidate.numeric_matches
    );
    decided
}

pub fn infer_column_types(dataset: &Dataset) -> ColumnTypeSet {
    let mut types = ColumnTypeSet::default();
    for (index, name) in dataset.columns().iter().enumerate() {
        let datatype = classify_column(name, dataset.column(index));
        types.insert(name, datatype);
    }
    types
}
