//! Plain-text tables for `--format table`.
//!
//! Each result type implements [`TableView`] to lay itself out as one or
//! more titled sections; [`render_sections`] aligns and joins them.

use std::borrow::Cow;
use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    chart::{ChartData, ChartSeries},
    data::format_number,
    forecast::{ForecastResult, TrendOutcome, TrendReport},
    stats::{DatasetInfo, Summary},
};

const COLUMN_GAP: &str = "  ";

/// A titled block of rows sharing one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSection {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

pub trait TableView {
    fn sections(&self) -> Vec<TableSection>;
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn render_sections(sections: &[TableSection]) -> String {
    sections
        .iter()
        .map(|section| {
            format!(
                "{}\n{}",
                section.title,
                render_table(&section.headers, &section.rows)
            )
        })
        .join("\n")
}

pub fn print_view(view: &dyn TableView) {
    print!("{}", render_sections(&view.sections()));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

impl TableView for DatasetInfo {
    fn sections(&self) -> Vec<TableSection> {
        let mut columns = TableSection::new(
            &format!("{} rows, {} columns", self.row_count, self.column_count),
            &["column", "type", "missing"],
        );
        for missing in &self.missing_values {
            let datatype = self
                .column_types
                .type_of(&missing.column)
                .map(|t| t.as_str())
                .unwrap_or("-");
            columns.push([
                missing.column.clone(),
                datatype.to_string(),
                missing.missing.to_string(),
            ]);
        }
        vec![columns]
    }
}

impl TableView for Summary {
    fn sections(&self) -> Vec<TableSection> {
        let mut sections = Vec::new();

        let mut overview = TableSection::new("Overview", &["metric", "value"]);
        overview.push(["rows".to_string(), self.overview.total_rows.to_string()]);
        overview.push(["columns".to_string(), self.overview.total_columns.to_string()]);
        overview.push(["numeric".to_string(), self.overview.numeric_columns.to_string()]);
        overview.push([
            "categorical".to_string(),
            self.overview.categorical_columns.to_string(),
        ]);
        overview.push(["date".to_string(), self.overview.date_columns.to_string()]);
        sections.push(overview);

        if !self.numeric_stats.is_empty() {
            let mut numeric = TableSection::new(
                "Numeric columns",
                &["column", "count", "mean", "median", "std", "min", "max", "sum", "id"],
            );
            for stats in &self.numeric_stats {
                numeric.push([
                    stats.column.clone(),
                    stats.count.to_string(),
                    format_number(stats.mean),
                    format_number(stats.median),
                    format_number(stats.std),
                    format_number(stats.min),
                    format_number(stats.max),
                    format_number(stats.sum),
                    if stats.is_id_column { "yes" } else { "" }.to_string(),
                ]);
            }
            sections.push(numeric);
        }

        if !self.categorical_stats.is_empty() {
            let mut categorical = TableSection::new(
                "Categorical columns",
                &["column", "unique", "most common", "count", "top values"],
            );
            for stats in &self.categorical_stats {
                categorical.push([
                    stats.column.clone(),
                    stats.unique_count.to_string(),
                    stats.most_common.clone().unwrap_or_default(),
                    stats.most_common_count.to_string(),
                    stats
                        .top_values
                        .iter()
                        .map(|v| format!("{} ({})", v.value, v.count))
                        .join(", "),
                ]);
            }
            sections.push(categorical);
        }

        if !self.period_analysis.is_empty() {
            let mut periods = TableSection::new(
                "Periods",
                &["column", "best", "worst", "best month", "worst month"],
            );
            for period in &self.period_analysis {
                let month = |point: &Option<crate::stats::MonthPoint>| {
                    point
                        .as_ref()
                        .map(|m| format!("{} ({})", m.month, format_number(m.avg_value)))
                        .unwrap_or_default()
                };
                periods.push([
                    period.column.clone(),
                    format!(
                        "{} on {}",
                        format_number(period.best_period.value),
                        period.best_period.date
                    ),
                    format!(
                        "{} on {}",
                        format_number(period.worst_period.value),
                        period.worst_period.date
                    ),
                    month(&period.best_month),
                    month(&period.worst_month),
                ]);
            }
            sections.push(periods);
        }

        if !self.correlations.is_empty() {
            let mut headers = vec![String::new()];
            headers.extend(self.correlations.columns.iter().cloned());
            let mut correlations = TableSection {
                title: "Correlations".to_string(),
                headers,
                rows: Vec::new(),
            };
            for (name, values) in self.correlations.columns.iter().zip(&self.correlations.values) {
                let mut row = vec![name.clone()];
                row.extend(values.iter().map(|v| format_number(*v)));
                correlations.rows.push(row);
            }
            sections.push(correlations);
        }

        sections
    }
}

impl TableView for ForecastResult {
    fn sections(&self) -> Vec<TableSection> {
        let mut model = TableSection::new(
            &format!("{} by {}", self.value_column, self.date_column),
            &["slope", "intercept", "r_squared", "points"],
        );
        model.push([
            format_number(self.model.slope),
            format_number(self.model.intercept),
            format_number(self.model.r_squared),
            self.historical_count.to_string(),
        ]);

        let mut historical = TableSection::new("Historical", &["date", "actual", "fitted"]);
        for point in &self.historical {
            historical.push([
                point.date.clone(),
                format_number(point.actual),
                format_number(point.fitted),
            ]);
        }

        let mut forecast = TableSection::new("Forecast", &["period", "date", "predicted"]);
        for point in &self.forecast {
            forecast.push([
                point.period.to_string(),
                point.date.clone(),
                format_number(point.predicted),
            ]);
        }
        vec![model, historical, forecast]
    }
}

impl TableView for TrendReport {
    fn sections(&self) -> Vec<TableSection> {
        let mut trends = TableSection::new(
            &format!("Trends by {}", self.date_column),
            &["column", "status", "r_squared", "trend", "next"],
        );
        for column in &self.columns {
            match &column.outcome {
                TrendOutcome::Fitted {
                    r_squared,
                    trend,
                    forecast,
                } => trends.push([
                    column.value_column.clone(),
                    "fitted".to_string(),
                    format_number(*r_squared),
                    format!("{trend:?}").to_lowercase(),
                    forecast
                        .first()
                        .map(|p| format!("{} on {}", format_number(p.predicted), p.date))
                        .unwrap_or_default(),
                ]),
                TrendOutcome::Failed { error } => trends.push([
                    column.value_column.clone(),
                    "failed".to_string(),
                    String::new(),
                    String::new(),
                    error.clone(),
                ]),
            }
        }
        vec![trends]
    }
}

impl TableView for ChartData {
    fn sections(&self) -> Vec<TableSection> {
        let title = format!("{} ({})", self.title, self.kind);
        match &self.series {
            ChartSeries::Points { x, y } => {
                let mut section = TableSection {
                    title,
                    headers: vec![self.x_title.clone(), self.y_title.clone()],
                    rows: Vec::new(),
                };
                for (x, y) in x.iter().zip(y) {
                    let x = serde_json::to_value(x)
                        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                        .unwrap_or_default();
                    section.push([x, format_number(*y)]);
                }
                vec![section]
            }
            ChartSeries::Histogram { values, bins } => {
                let mut section = TableSection {
                    title: format!("{title}, {bins} bins"),
                    headers: vec![self.x_title.clone()],
                    rows: Vec::new(),
                };
                for value in values {
                    section.push([format_number(*value)]);
                }
                vec![section]
            }
            ChartSeries::Scatter { x, y, color } => {
                let mut headers = vec![self.x_title.clone(), self.y_title.clone()];
                if let Some(name) = &self.color_column {
                    headers.push(name.clone());
                }
                let mut section = TableSection {
                    title,
                    headers,
                    rows: Vec::new(),
                };
                for (idx, (x, y)) in x.iter().zip(y).enumerate() {
                    let mut row = vec![format_number(*x), format_number(*y)];
                    if let Some(label) = color.as_ref().and_then(|c| c.get(idx)) {
                        row.push(label.clone());
                    }
                    section.rows.push(row);
                }
                vec![section]
            }
        }
    }
}
