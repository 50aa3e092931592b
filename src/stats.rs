//! Statistics engine.
//!
//! [`compute_summary`] derives every figure the insight layer and the
//! renderer consume: an overview, per-column numeric and categorical
//! summaries, best/worst periods keyed by the first date column, and a
//! pairwise Pearson correlation matrix. Nothing here fails; empty inputs give
//! empty sections and degenerate arithmetic resolves to `0`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use log::info;
use serde::Serialize;

use crate::{
    data::{Cell, Dataset, format_date, round_to},
    frequency::FrequencyCounter,
    identifier::{is_id_column, is_identifier_name},
    schema::ColumnTypeSet,
};

/// Unique-to-total ratio above which a categorical column is left out.
pub const UNIQUENESS_THRESHOLD: f64 = 0.95;
pub const TOP_VALUES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub date_columns: usize,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub column: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub sum: f64,
    pub is_id_column: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalStats {
    pub column: String,
    pub unique_count: usize,
    pub most_common: Option<String>,
    pub most_common_count: usize,
    pub top_values: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    /// `YYYY-MM`
    pub month: String,
    pub avg_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAnalysis {
    pub column: String,
    pub date_column: String,
    pub best_period: PeriodPoint,
    pub worst_period: PeriodPoint,
    pub best_month: Option<MonthPoint>,
    pub worst_month: Option<MonthPoint>,
}

/// Symmetric matrix indexed by numeric column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let row = self.columns.iter().position(|c| c == left)?;
        let col = self.columns.iter().position(|c| c == right)?;
        Some(self.values[row][col])
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overview: Overview,
    pub column_types: ColumnTypeSet,
    pub numeric_stats: Vec<NumericStats>,
    pub categorical_stats: Vec<CategoricalStats>,
    pub period_analysis: Vec<PeriodAnalysis>,
    pub correlations: CorrelationMatrix,
}

impl Summary {
    pub fn numeric(&self, column: &str) -> Option<&NumericStats> {
        self.numeric_stats.iter().find(|s| s.column == column)
    }

    pub fn categorical(&self, column: &str) -> Option<&CategoricalStats> {
        self.categorical_stats.iter().find(|s| s.column == column)
    }

    pub fn period(&self, column: &str) -> Option<&PeriodAnalysis> {
        self.period_analysis.iter().find(|p| p.column == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Shape of a dataset: sizes, types, and missing cells per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub column_types: ColumnTypeSet,
    pub missing_values: Vec<MissingCount>,
}

pub fn describe_dataset(dataset: &Dataset, types: &ColumnTypeSet) -> DatasetInfo {
    let missing_values = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| MissingCount {
            column: name.clone(),
            missing: dataset.column(index).filter(|c| c.is_missing()).count(),
        })
        .collect();
    DatasetInfo {
        row_count: dataset.row_count(),
        column_count: dataset.column_count(),
        columns: dataset.columns().to_vec(),
        column_types: types.clone(),
        missing_values,
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation; `0` for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let squares = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>();
    (squares / (values.len() as f64 - 1.0)).sqrt()
}

/// Pearson coefficient over already-aligned pairs; `0` when either side has
/// no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (Some(x_mean), Some(y_mean)) = (mean(xs), mean(ys)) else {
        return 0.0;
    };
    let mut covariance = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        covariance += dx * dy;
        x_var += dx * dx;
        y_var += dy * dy;
    }
    if x_var == 0.0 || y_var == 0.0 {
        return 0.0;
    }
    (covariance / (x_var * y_var).sqrt()).clamp(-1.0, 1.0)
}

pub fn compute_numeric_stats(dataset: &Dataset, types: &ColumnTypeSet) -> Vec<NumericStats> {
    types
        .numeric
        .iter()
        .filter_map(|name| {
            let index = dataset.column_index(name)?;
            let values = dataset.numbers(index);
            let avg = mean(&values)?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(NumericStats {
                column: name.clone(),
                mean: round_to(avg, 2),
                median: round_to(median(&values).unwrap_or(0.0), 2),
                std: round_to(std_dev(&values), 2),
                min: round_to(min, 2),
                max: round_to(max, 2),
                count: values.len(),
                sum: round_to(values.iter().sum(), 2),
                is_id_column: is_id_column(name, &values),
            })
        })
        .collect()
}

pub fn compute_categorical_stats(
    dataset: &Dataset,
    types: &ColumnTypeSet,
) -> Vec<CategoricalStats> {
    types
        .categorical
        .iter()
        .filter(|name| !is_identifier_name(name))
        .filter_map(|name| {
            let index = dataset.column_index(name)?;
            let counter: FrequencyCounter =
                dataset.column(index).filter_map(Cell::as_text).collect();
            if counter.is_empty() {
                return None;
            }
            let uniqueness = counter.unique() as f64 / counter.total() as f64;
            if uniqueness > UNIQUENESS_THRESHOLD {
                return None;
            }
            let (most_common, most_common_count) = counter
                .most_common()
                .map_or((None, 0), |(value, count)| (Some(value.to_string()), count));
            Some(CategoricalStats {
                column: name.clone(),
                unique_count: counter.unique(),
                most_common,
                most_common_count,
                top_values: counter
                    .top(TOP_VALUES)
                    .into_iter()
                    .map(|(value, count)| ValueCount { value, count })
                    .collect(),
            })
        })
        .collect()
}

fn dated_values(
    dataset: &Dataset,
    date_index: usize,
    value_index: usize,
) -> Vec<(NaiveDateTime, f64)> {
    dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let date = row.get(date_index)?.as_date()?;
            let value = row.get(value_index)?.as_number()?;
            Some((date, value))
        })
        .collect()
}

fn monthly_extremes(
    points: &[(NaiveDateTime, f64)],
) -> (Option<MonthPoint>, Option<MonthPoint>) {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for (date, value) in points {
        let entry = months.entry((date.year(), date.month())).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    let averages = months
        .into_iter()
        .map(|((year, month), (sum, count))| {
            (format!("{year:04}-{month:02}"), sum / count as f64)
        })
        .collect::<Vec<_>>();

    let mut best: Option<&(String, f64)> = None;
    let mut worst: Option<&(String, f64)> = None;
    for entry in &averages {
        if best.is_none_or(|current| entry.1 > current.1) {
            best = Some(entry);
        }
        if worst.is_none_or(|current| entry.1 < current.1) {
            worst = Some(entry);
        }
    }
    let to_point = |(month, avg): &(String, f64)| MonthPoint {
        month: month.clone(),
        avg_value: round_to(*avg, 2),
    };
    (best.map(to_point), worst.map(to_point))
}

/// Best and worst rows of every numeric column against the first date
/// column. Ties keep the earliest row in dataset order.
pub fn analyze_date_periods(dataset: &Dataset, types: &ColumnTypeSet) -> Vec<PeriodAnalysis> {
    let Some(date_column) = types.date.first() else {
        return Vec::new();
    };
    let Some(date_index) = dataset.column_index(date_column) else {
        return Vec::new();
    };

    let mut analysis = Vec::new();
    for name in &types.numeric {
        let Some(value_index) = dataset.column_index(name) else {
            continue;
        };
        let points = dated_values(dataset, date_index, value_index);
        let Some(first) = points.first() else {
            continue;
        };
        let mut best = first;
        let mut worst = first;
        for point in &points[1..] {
            if point.1 > best.1 {
                best = point;
            }
            if point.1 < worst.1 {
                worst = point;
            }
        }
        let (best_month, worst_month) = monthly_extremes(&points);
        analysis.push(PeriodAnalysis {
            column: name.clone(),
            date_column: date_column.clone(),
            best_period: PeriodPoint {
                date: format_date(&best.0),
                value: round_to(best.1, 2),
            },
            worst_period: PeriodPoint {
                date: format_date(&worst.0),
                value: round_to(worst.1, 2),
            },
            best_month,
            worst_month,
        });
    }
    analysis
}

/// Pairwise correlations, aligned per pair on rows where both values are
/// present. Empty when fewer than two numeric columns exist.
pub fn compute_correlations(dataset: &Dataset, types: &ColumnTypeSet) -> CorrelationMatrix {
    let columns = types
        .numeric
        .iter()
        .filter_map(|name| dataset.column_index(name).map(|index| (name.clone(), index)))
        .collect::<Vec<_>>();
    if columns.len() < 2 {
        return CorrelationMatrix::default();
    }

    let size = columns.len();
    let mut values = vec![vec![0.0; size]; size];
    for i in 0..size {
        for j in i..size {
            let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
                .rows()
                .iter()
                .filter_map(|row| {
                    let x = row.get(columns[i].1)?.as_number()?;
                    let y = row.get(columns[j].1)?.as_number()?;
                    Some((x, y))
                })
                .unzip();
            let r = round_to(pearson(&xs, &ys), 3);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        columns: columns.into_iter().map(|(name, _)| name).collect(),
        values,
    }
}

pub fn compute_summary(dataset: &Dataset, types: &ColumnTypeSet) -> Summary {
    let overview = Overview {
        total_rows: dataset.row_count(),
        total_columns: dataset.column_count(),
        numeric_columns: types.numeric.len(),
        categorical_columns: types.categorical.len(),
        date_columns: types.date.len(),
        column_names: dataset.columns().to_vec(),
    };
    let summary = Summary {
        overview,
        column_types: types.clone(),
        numeric_stats: compute_numeric_stats(dataset, types),
        categorical_stats: compute_categorical_stats(dataset, types),
        period_analysis: analyze_date_periods(dataset, types),
        correlations: compute_correlations(dataset, types),
    };
    info!(
        "Summarized {} row(s): {} numeric, {} categorical, {} period column(s)",
        summary.overview.total_rows,
        summary.numeric_stats.len(),
        summary.categorical_stats.len(),
        summary.period_analysis.len()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn std_dev_is_sample_based() {
        let value = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((value - 2.138).abs() < 1e-3);
        assert_eq!(std_dev(&[5.0]), 0.0);
    }

    #[test]
    fn pearson_is_zero_without_variance() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
        assert!((pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn monthly_extremes_prefer_the_earliest_month_on_ties() {
        let day = |m: u32, d: u32| {
            chrono::NaiveDate::from_ymd_opt(2024, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let points = vec![
            (day(1, 1), 10.0),
            (day(1, 15), 20.0),
            (day(2, 1), 15.0),
            (day(3, 1), 5.0),
        ];
        let (best, worst) = monthly_extremes(&points);
        let best = best.unwrap();
        assert_eq!(best.month, "2024-01");
        assert_eq!(best.avg_value, 15.0);
        assert_eq!(worst.unwrap().month, "2024-03");
    }
}
