//! Type conversion and missing-value imputation.
//!
//! Conversion coerces raw text per the column's [`ColumnType`]; a value that
//! fails to parse becomes [`Cell::Null`]. Imputation then fills numeric gaps
//! with the column median and categorical gaps with the column mode. Date
//! columns are never imputed: a fabricated date would corrupt time ordering,
//! so rows with a missing date are left out of date-dependent work instead.

use log::debug;

use crate::{
    data::{Cell, Dataset, parse_date, parse_number},
    frequency::FrequencyCounter,
    schema::{ColumnType, ColumnTypeSet},
    stats::median,
};

/// Fill value for categorical columns with no present values.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

fn convert_cell(cell: &Cell, datatype: ColumnType) -> Option<Cell> {
    match (datatype, cell) {
        (ColumnType::Numeric, Cell::Text(raw)) => {
            Some(parse_number(raw).map_or(Cell::Null, Cell::Number))
        }
        (ColumnType::Numeric, Cell::Date(_)) => Some(Cell::Null),
        (ColumnType::Date, Cell::Text(raw)) => {
            Some(parse_date(raw).map_or(Cell::Null, Cell::Date))
        }
        (ColumnType::Date, Cell::Number(_)) => Some(Cell::Null),
        (ColumnType::Categorical, Cell::Number(_) | Cell::Date(_)) => {
            Some(Cell::Text(cell.as_display()))
        }
        _ => None,
    }
}

/// Coerces every classified column; unclassified columns are left as is.
pub fn convert_types(dataset: &Dataset, types: &ColumnTypeSet) -> Dataset {
    let mut converted = dataset.clone();
    for (index, name) in dataset.columns().iter().enumerate() {
        if let Some(datatype) = types.type_of(name) {
            converted.map_column(index, |cell| convert_cell(cell, datatype));
        }
    }
    converted
}

/// Fills missing numeric and categorical values, one column at a time.
pub fn impute_missing(dataset: &Dataset, types: &ColumnTypeSet) -> Dataset {
    let mut imputed = dataset.clone();
    for (index, name) in dataset.columns().iter().enumerate() {
        let fill = match types.type_of(name) {
            Some(ColumnType::Numeric) => {
                let values = dataset.numbers(index);
                Cell::Number(median(&values).unwrap_or(0.0))
            }
            Some(ColumnType::Categorical) => {
                let counter: FrequencyCounter =
                    dataset.column(index).filter_map(Cell::as_text).collect();
                let mode = counter
                    .most_common()
                    .map_or(UNKNOWN_CATEGORY, |(value, _)| value);
                Cell::Text(mode.to_string())
            }
            Some(ColumnType::Date) | None => continue,
        };
        let missing = dataset.column(index).filter(|c| c.is_missing()).count();
        if missing > 0 {
            debug!("Imputing {missing} missing value(s) in '{name}' with {fill}");
            imputed.map_column(index, |cell| cell.is_missing().then(|| fill.clone()));
        }
    }
    imputed
}

/// Conversion followed by imputation.
pub fn prepare_dataset(dataset: &Dataset, types: &ColumnTypeSet) -> Dataset {
    impute_missing(&convert_types(dataset, types), types)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(numeric: &[&str], categorical: &[&str], date: &[&str]) -> ColumnTypeSet {
        let mut set = ColumnTypeSet::default();
        for name in numeric {
            set.insert(name, ColumnType::Numeric);
        }
        for name in categorical {
            set.insert(name, ColumnType::Categorical);
        }
        for name in date {
            set.insert(name, ColumnType::Date);
        }
        set
    }

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn unparsable_numbers_become_null() {
        let dataset = Dataset::new(
            vec!["v".into()],
            vec![vec![text("4")], vec![text("four")]],
        );
        let converted = convert_types(&dataset, &types(&["v"], &[], &[]));
        assert_eq!(converted.rows()[0][0], Cell::Number(4.0));
        assert_eq!(converted.rows()[1][0], Cell::Null);
    }

    #[test]
    fn numeric_gaps_take_the_median() {
        let dataset = Dataset::new(
            vec!["v".into()],
            vec![vec![text("1")], vec![Cell::Absent], vec![text("3")]],
        );
        let prepared = prepare_dataset(&dataset, &types(&["v"], &[], &[]));
        assert_eq!(prepared.numbers(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn all_missing_numeric_column_fills_with_zero() {
        let dataset = Dataset::new(
            vec!["v".into()],
            vec![vec![Cell::Absent], vec![text("x")]],
        );
        let prepared = prepare_dataset(&dataset, &types(&["v"], &[], &[]));
        assert_eq!(prepared.numbers(0), vec![0.0, 0.0]);
    }

    #[test]
    fn categorical_gaps_take_the_first_mode() {
        let dataset = Dataset::new(
            vec!["c".into()],
            vec![
                vec![text("east")],
                vec![text("west")],
                vec![Cell::Absent],
                vec![text("west")],
                vec![text("east")],
            ],
        );
        let prepared = prepare_dataset(&dataset, &types(&[], &["c"], &[]));
        assert_eq!(prepared.rows()[2][0], text("east"));
    }

    #[test]
    fn empty_categorical_column_fills_with_unknown() {
        let dataset = Dataset::new(vec!["c".into()], vec![vec![Cell::Absent]]);
        let prepared = prepare_dataset(&dataset, &types(&[], &["c"], &[]));
        assert_eq!(prepared.rows()[0][0], text(UNKNOWN_CATEGORY));
    }

    #[test]
    fn dates_are_never_imputed() {
        let dataset = Dataset::new(
            vec!["d".into()],
            vec![vec![text("2024-01-01")], vec![Cell::Absent], vec![text("soon")]],
        );
        let prepared = prepare_dataset(&dataset, &types(&[], &[], &["d"]));
        assert!(matches!(prepared.rows()[0][0], Cell::Date(_)));
        assert_eq!(prepared.rows()[1][0], Cell::Absent);
        assert_eq!(prepared.rows()[2][0], Cell::Null);
    }
}
