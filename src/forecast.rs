//! Linear-trend forecasting over a date-indexed numeric series.
//!
//! Retained rows (date and value both present) are sorted by date and each
//! date becomes an elapsed-day offset from the earliest one, fractional days
//! included. An ordinary least-squares line is fitted to value against
//! offset and projected forward at the average historical spacing.
//!
//! Every call is a pure function of its inputs.

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::{Dataset, format_date, round_to},
    error::{AnalysisError, Result},
    schema::ColumnTypeSet,
};

pub const DEFAULT_PERIODS: usize = 5;
pub const MIN_PERIODS: usize = 1;
pub const MAX_PERIODS: usize = 30;
/// Historical points echoed back alongside the projection.
pub const HISTORY_WINDOW: usize = 20;
const MIN_POINTS: usize = 2;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub periods: usize,
    pub date_column: Option<String>,
    pub value_column: Option<String>,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            periods: DEFAULT_PERIODS,
            date_column: None,
            value_column: None,
        }
    }
}

impl ForecastRequest {
    pub fn with_periods(periods: usize) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }
}

pub fn clamp_periods(periods: usize) -> usize {
    periods.clamp(MIN_PERIODS, MAX_PERIODS)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastModel {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: String,
    pub actual: f64,
    pub fitted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period: usize,
    pub date: String,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub date_column: String,
    pub value_column: String,
    pub model: ForecastModel,
    /// All retained points, of which `historical` holds the most recent.
    pub historical_count: usize,
    pub historical: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    Fitted {
        r_squared: f64,
        trend: Trend,
        forecast: Vec<ForecastPoint>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTrend {
    pub value_column: String,
    #[serde(flatten)]
    pub outcome: TrendOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub date_column: String,
    pub columns: Vec<ColumnTrend>,
}

impl TrendReport {
    pub fn any_fitted(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c.outcome, TrendOutcome::Fitted { .. }))
    }
}

/// Least-squares `(slope, intercept)` of `ys` on `xs`.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < MIN_POINTS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_POINTS,
            actual: n,
        });
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;
    let y_mean = ys[..n].iter().sum::<f64>() / n as f64;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }
    if denominator == 0.0 {
        return Err(AnalysisError::DegenerateRegression);
    }
    let slope = numerator / denominator;
    Ok((slope, y_mean - slope * x_mean))
}

/// Coefficient of determination; `0` when the target is constant.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let avg = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>();
    let ss_tot = actual.iter().map(|a| (a - avg).powi(2)).sum::<f64>();
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

struct Series {
    dates: Vec<NaiveDateTime>,
    offsets: Vec<f64>,
    values: Vec<f64>,
}

fn collect_series(dataset: &Dataset, date_index: usize, value_index: usize) -> Result<Series> {
    let mut points = dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let date = row.get(date_index)?.as_date()?;
            let value = row.get(value_index)?.as_number()?;
            Some((date, value))
        })
        .collect::<Vec<_>>();
    if points.len() < MIN_POINTS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_POINTS,
            actual: points.len(),
        });
    }
    points.sort_by_key(|(date, _)| *date);

    let start = points[0].0;
    let offsets = points
        .iter()
        .map(|(date, _)| (*date - start).num_milliseconds() as f64 / MILLIS_PER_DAY)
        .collect();
    let (dates, values) = points.into_iter().unzip();
    Ok(Series {
        dates,
        offsets,
        values,
    })
}

struct Fit {
    slope: f64,
    intercept: f64,
    r_squared: f64,
    fitted: Vec<f64>,
    projection: Vec<ForecastPoint>,
}

fn fit_series(series: &Series, periods: usize) -> Result<Fit> {
    let (slope, intercept) = linear_regression(&series.offsets, &series.values)?;
    let fitted = series
        .offsets
        .iter()
        .map(|x| slope * x + intercept)
        .collect::<Vec<_>>();
    let r_squared = r_squared(&series.values, &fitted);

    let count = series.offsets.len();
    let first_offset = series.offsets[0];
    let last_offset = series.offsets[count - 1];
    let last_date = series.dates[count - 1];
    let spacing = if count > 1 {
        (last_offset - first_offset) / (count - 1) as f64
    } else {
        1.0
    };

    let projection = (1..=periods)
        .map(|period| {
            let step = spacing * period as f64;
            let delta = Duration::milliseconds((step * MILLIS_PER_DAY).round() as i64);
            let date = last_date.checked_add_signed(delta).unwrap_or(last_date);
            ForecastPoint {
                period,
                date: format_date(&date),
                predicted: round_to(slope * (last_offset + step) + intercept, 2),
            }
        })
        .collect();

    Ok(Fit {
        slope,
        intercept,
        r_squared,
        fitted,
        projection,
    })
}

fn resolve_column(
    dataset: &Dataset,
    requested: Option<&str>,
    candidates: &[String],
    accepts: impl Fn(&str) -> bool,
    wrong_type: fn(String) -> AnalysisError,
) -> Result<(String, usize)> {
    let name = match requested {
        Some(name) => {
            if dataset.column_index(name).is_none() {
                return Err(AnalysisError::ColumnNotFound(name.to_string()));
            }
            if !accepts(name) {
                return Err(wrong_type(name.to_string()));
            }
            name.to_string()
        }
        None => candidates
            .iter()
            .find(|c| dataset.column_index(c).is_some())
            .cloned()
            .ok_or_else(|| AnalysisError::ColumnNotFound(candidates.join(", ")))?,
    };
    let index = dataset
        .column_index(&name)
        .ok_or_else(|| AnalysisError::ColumnNotFound(name.clone()))?;
    Ok((name, index))
}

/// Fits and projects one value column against one date column.
///
/// Preconditions are checked in order: a date column exists, a numeric
/// column exists, and at least two rows carry both a date and a value.
pub fn forecast(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    request: &ForecastRequest,
) -> Result<ForecastResult> {
    if types.date.is_empty() {
        return Err(AnalysisError::NoDateColumn);
    }
    if types.numeric.is_empty() {
        return Err(AnalysisError::NoNumericColumn);
    }
    let (date_column, date_index) = resolve_column(
        dataset,
        request.date_column.as_deref(),
        &types.date,
        |name| types.is_date(name),
        AnalysisError::ColumnNotDate,
    )?;
    let (value_column, value_index) = resolve_column(
        dataset,
        request.value_column.as_deref(),
        &types.numeric,
        |name| types.is_numeric(name),
        AnalysisError::ColumnNotNumeric,
    )?;

    let periods = clamp_periods(request.periods);
    let series = collect_series(dataset, date_index, value_index)?;
    let fit = fit_series(&series, periods)?;

    let slope = round_to(fit.slope, 4);
    let model = ForecastModel {
        slope,
        intercept: round_to(fit.intercept, 4),
        r_squared: round_to(fit.r_squared, 4),
        interpretation: format!("For each day, {value_column} changes by {slope}"),
    };

    let historical_count = series.dates.len();
    let window_start = historical_count.saturating_sub(HISTORY_WINDOW);
    let historical = (window_start..historical_count)
        .map(|i| HistoricalPoint {
            date: format_date(&series.dates[i]),
            actual: round_to(series.values[i], 2),
            fitted: round_to(fit.fitted[i], 2),
        })
        .collect();

    info!(
        "Forecast '{value_column}' over '{date_column}': {historical_count} point(s), slope {}, R² {}",
        model.slope, model.r_squared
    );
    Ok(ForecastResult {
        date_column,
        value_column,
        model,
        historical_count,
        historical,
        forecast: fit.projection,
    })
}

/// Fits every numeric column against the first date column.
///
/// A column that cannot be fitted is reported as failed rather than failing
/// the whole report.
pub fn forecast_all(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    periods: usize,
) -> Result<TrendReport> {
    let date_column = types.date.first().ok_or(AnalysisError::NoDateColumn)?;
    let date_index = dataset
        .column_index(date_column)
        .ok_or_else(|| AnalysisError::ColumnNotFound(date_column.clone()))?;
    let periods = clamp_periods(periods);

    let columns = types
        .numeric
        .iter()
        .map(|value_column| {
            let outcome = dataset
                .column_index(value_column)
                .ok_or_else(|| AnalysisError::ColumnNotFound(value_column.clone()))
                .and_then(|value_index| collect_series(dataset, date_index, value_index))
                .and_then(|series| fit_series(&series, periods));
            let outcome = match outcome {
                Ok(fit) => TrendOutcome::Fitted {
                    r_squared: round_to(fit.r_squared, 4),
                    trend: if fit.slope > 0.0 {
                        Trend::Increasing
                    } else {
                        Trend::Decreasing
                    },
                    forecast: fit.projection,
                },
                Err(err) => {
                    debug!("Skipping trend for '{value_column}': {err}");
                    TrendOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            ColumnTrend {
                value_column: value_column.clone(),
                outcome,
            }
        })
        .collect();

    Ok(TrendReport {
        date_column: date_column.clone(),
        columns,
    })
}
