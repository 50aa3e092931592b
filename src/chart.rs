//! Chart-ready data for the rendering layer.
//!
//! Selects axis columns, aggregates where a chart kind calls for it, and
//! hands back plain sequences. Drawing is left to the renderer.

use std::{collections::HashMap, fmt, str::FromStr};

use heck::ToTitleCase;
use serde::Serialize;

use crate::{
    data::{Cell, Dataset, format_date},
    error::{AnalysisError, Result},
    frequency::FrequencyCounter,
    schema::ColumnTypeSet,
};

pub const HISTOGRAM_BINS: usize = 30;
pub const MAX_BAR_CATEGORIES: usize = 30;
pub const MAX_COLOR_GROUPS: usize = 10;
const INDEX_AXIS: &str = "index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
        }
    }

    fn default_title(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Histogram => "Histogram",
            ChartKind::Scatter => "Scatter Plot",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = AnalysisError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "histogram" => Ok(ChartKind::Histogram),
            "scatter" => Ok(ChartKind::Scatter),
            _ => Err(AnalysisError::UnknownChartType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartAvailability {
    pub line: bool,
    pub bar: bool,
    pub histogram: bool,
    pub scatter: bool,
}

impl ChartAvailability {
    pub fn supports(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Line => self.line,
            ChartKind::Bar => self.bar,
            ChartKind::Histogram => self.histogram,
            ChartKind::Scatter => self.scatter,
        }
    }
}

pub fn available_charts(types: &ColumnTypeSet) -> ChartAvailability {
    let numeric = types.numeric.len();
    ChartAvailability {
        line: numeric >= 1,
        bar: numeric >= 1,
        histogram: numeric >= 1,
        scatter: numeric >= 2,
    }
}

/// One x-axis position: a row number, a number, a date, or a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Index(usize),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartSeries {
    Points {
        x: Vec<AxisValue>,
        y: Vec<f64>,
    },
    Histogram {
        values: Vec<f64>,
        bins: usize,
    },
    Scatter {
        x: Vec<f64>,
        y: Vec<f64>,
        color: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub x_column: String,
    pub y_column: Option<String>,
    pub color_column: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub series: ChartSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartRequest {
    pub x_column: Option<String>,
    pub y_column: Option<String>,
}

fn axis_title(column: &str) -> String {
    column.to_title_case()
}

fn axis_value(cell: &Cell) -> Option<AxisValue> {
    match cell {
        Cell::Absent | Cell::Null => None,
        Cell::Number(n) => Some(AxisValue::Number(*n)),
        Cell::Date(d) => Some(AxisValue::Text(format_date(d))),
        Cell::Text(s) => Some(AxisValue::Text(s.clone())),
    }
}

fn require_column(dataset: &Dataset, name: &str) -> Result<usize> {
    dataset
        .column_index(name)
        .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
}

fn value_column(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    requested: Option<&str>,
    missing: &str,
) -> Result<(String, usize)> {
    let name = match requested {
        Some(name) => {
            require_column(dataset, name)?;
            if !types.is_numeric(name) {
                return Err(AnalysisError::ColumnNotNumeric(name.to_string()));
            }
            name.to_string()
        }
        None => types
            .numeric
            .first()
            .cloned()
            .ok_or_else(|| AnalysisError::ChartUnavailable(missing.to_string()))?,
    };
    let index = require_column(dataset, &name)?;
    Ok((name, index))
}

/// `(x, y)` pairs for rows where y is numeric; `None` for x means the row
/// number is the x position.
fn paired_points(
    dataset: &Dataset,
    x_index: Option<usize>,
    y_index: usize,
) -> (Vec<AxisValue>, Vec<f64>) {
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(row, cells)| {
            let y = cells.get(y_index)?.as_number()?;
            let x = match x_index {
                Some(index) => axis_value(cells.get(index)?)?,
                None => AxisValue::Index(row),
            };
            Some((x, y))
        })
        .unzip()
}

fn line_chart(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    request: &ChartRequest,
) -> Result<ChartData> {
    let x_column = match &request.x_column {
        Some(name) => Some(name.clone()),
        None => types.date.first().cloned(),
    };
    let x_index = x_column
        .as_deref()
        .map(|name| require_column(dataset, name))
        .transpose()?;
    let (y_column, y_index) = value_column(
        dataset,
        types,
        request.y_column.as_deref(),
        "No numeric column available for Y axis",
    )?;
    let (x, y) = paired_points(dataset, x_index, y_index);
    let x_column = x_column.unwrap_or_else(|| INDEX_AXIS.to_string());
    Ok(ChartData {
        kind: ChartKind::Line,
        title: ChartKind::Line.default_title().to_string(),
        x_title: axis_title(&x_column),
        y_title: axis_title(&y_column),
        x_column,
        y_column: Some(y_column),
        color_column: None,
        series: ChartSeries::Points { x, y },
    })
}

fn bar_chart(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    request: &ChartRequest,
) -> Result<ChartData> {
    let x_column = match &request.x_column {
        Some(name) => Some(name.clone()),
        None => types
            .categorical
            .first()
            .or_else(|| types.date.first())
            .cloned(),
    };
    let x_index = x_column
        .as_deref()
        .map(|name| require_column(dataset, name))
        .transpose()?;
    let (y_column, y_index) = value_column(
        dataset,
        types,
        request.y_column.as_deref(),
        "No numeric column available for Y axis",
    )?;

    let series = match (x_column.as_deref(), x_index) {
        (Some(name), Some(index)) if types.is_categorical(name) => {
            let mut positions: HashMap<&str, usize> = HashMap::new();
            let mut groups: Vec<(String, f64)> = Vec::new();
            for row in dataset.rows() {
                let (Some(label), Some(value)) = (
                    row.get(index).and_then(Cell::as_text),
                    row.get(y_index).and_then(Cell::as_number),
                ) else {
                    continue;
                };
                let position = *positions.entry(label).or_insert_with(|| {
                    groups.push((label.to_string(), 0.0));
                    groups.len() - 1
                });
                groups[position].1 += value;
            }
            if groups.len() > MAX_BAR_CATEGORIES {
                groups.sort_by(|a, b| b.1.total_cmp(&a.1));
                groups.truncate(MAX_BAR_CATEGORIES);
            }
            let (x, y) = groups
                .into_iter()
                .map(|(label, total)| (AxisValue::Text(label), total))
                .unzip();
            ChartSeries::Points { x, y }
        }
        _ => {
            let (x, y) = paired_points(dataset, x_index, y_index);
            ChartSeries::Points { x, y }
        }
    };

    let x_column = x_column.unwrap_or_else(|| INDEX_AXIS.to_string());
    Ok(ChartData {
        kind: ChartKind::Bar,
        title: ChartKind::Bar.default_title().to_string(),
        x_title: axis_title(&x_column),
        y_title: axis_title(&y_column),
        x_column,
        y_column: Some(y_column),
        color_column: None,
        series,
    })
}

fn histogram(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    request: &ChartRequest,
) -> Result<ChartData> {
    let (column, index) = value_column(
        dataset,
        types,
        request.x_column.as_deref(),
        "No numeric column available for histogram",
    )?;
    Ok(ChartData {
        kind: ChartKind::Histogram,
        title: ChartKind::Histogram.default_title().to_string(),
        x_title: axis_title(&column),
        y_title: "Frequency".to_string(),
        x_column: column,
        y_column: None,
        color_column: None,
        series: ChartSeries::Histogram {
            values: dataset.numbers(index),
            bins: HISTOGRAM_BINS,
        },
    })
}

fn scatter_plot(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    request: &ChartRequest,
) -> Result<ChartData> {
    if types.numeric.len() < 2 {
        return Err(AnalysisError::ChartUnavailable(
            "Scatter plot requires at least 2 numeric columns".to_string(),
        ));
    }
    let x_name = request.x_column.as_deref().unwrap_or(types.numeric[0].as_str());
    let y_name = request.y_column.as_deref().unwrap_or(types.numeric[1].as_str());
    let (x_column, x_index) = value_column(dataset, types, Some(x_name), "")?;
    let (y_column, y_index) = value_column(dataset, types, Some(y_name), "")?;

    let color = types.categorical.first().and_then(|name| {
        let index = dataset.column_index(name)?;
        let counter: FrequencyCounter = dataset.column(index).filter_map(Cell::as_text).collect();
        (counter.unique() <= MAX_COLOR_GROUPS).then(|| (name.clone(), index))
    });

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut labels = Vec::new();
    for row in dataset.rows() {
        let (Some(x), Some(y)) = (
            row.get(x_index).and_then(Cell::as_number),
            row.get(y_index).and_then(Cell::as_number),
        ) else {
            continue;
        };
        xs.push(x);
        ys.push(y);
        if let Some((_, index)) = &color {
            labels.push(row.get(*index).map(Cell::as_display).unwrap_or_default());
        }
    }

    Ok(ChartData {
        kind: ChartKind::Scatter,
        title: ChartKind::Scatter.default_title().to_string(),
        x_title: axis_title(&x_column),
        y_title: axis_title(&y_column),
        x_column,
        y_column: Some(y_column),
        color_column: color.as_ref().map(|(name, _)| name.clone()),
        series: ChartSeries::Scatter {
            x: xs,
            y: ys,
            color: color.map(|_| labels),
        },
    })
}

/// Builds the data for one chart, picking axis columns the request leaves
/// open.
pub fn chart_data(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    kind: ChartKind,
    request: &ChartRequest,
) -> Result<ChartData> {
    match kind {
        ChartKind::Line => line_chart(dataset, types, request),
        ChartKind::Bar => bar_chart(dataset, types, request),
        ChartKind::Histogram => histogram(dataset, types, request),
        ChartKind::Scatter => scatter_plot(dataset, types, request),
    }
}
