pub mod chart;
pub mod cli;
pub mod convert;
pub mod data;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod identifier;
pub mod insights;
pub mod io_utils;
pub mod parser;
pub mod schema;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    chart::{ChartKind, ChartRequest},
    cli::{Cli, Commands, InputArgs, OutputFormat},
    table::TableView,
};

pub use crate::{
    data::{Cell, Dataset},
    error::AnalysisError,
    forecast::{ForecastRequest, ForecastResult},
    insights::get_quick_insights,
    schema::{ColumnType, ColumnTypeSet},
    stats::{Summary, compute_summary},
};

/// Parses raw CSV text, classifies its columns, and returns the dataset
/// converted to those types with gaps imputed.
///
/// The untouched parse is available through [`parser::parse_csv`].
pub fn parse_and_classify(text: &str) -> error::Result<(Dataset, ColumnTypeSet)> {
    let raw = parser::parse_csv(text)?;
    let types = schema::infer_column_types(&raw);
    let prepared = convert::prepare_dataset(&raw, &types);
    Ok((prepared, types))
}

/// Fits a linear trend for one value column and projects `periods` steps.
pub fn forecast(
    dataset: &Dataset,
    types: &ColumnTypeSet,
    periods: usize,
    date_column: Option<&str>,
    value_column: Option<&str>,
) -> error::Result<ForecastResult> {
    let request = ForecastRequest {
        periods,
        date_column: date_column.map(str::to_string),
        value_column: value_column.map(str::to_string),
    };
    forecast::forecast(dataset, types, &request)
}

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => handle_columns(&args),
        Commands::Summary(args) => handle_summary(&args),
        Commands::Forecast(args) => handle_forecast(&args),
        Commands::ForecastAll(args) => handle_forecast_all(&args),
        Commands::Chart(args) => handle_chart(&args),
    }
}

fn load(input: &InputArgs) -> Result<(Dataset, ColumnTypeSet)> {
    info!("Reading '{}'", input.input.display());
    let text = io_utils::read_input_text(&input.input, input.input_encoding.as_deref())?;
    let (dataset, types) = parse_and_classify(&text)?;
    debug!(
        "Loaded {} row(s) x {} column(s)",
        dataset.row_count(),
        dataset.column_count()
    );
    Ok((dataset, types))
}

fn emit<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + TableView,
{
    match format {
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(value).context("Serializing output as JSON")?;
            println!("{rendered}");
        }
        OutputFormat::Yaml => {
            let rendered = serde_yaml::to_string(value).context("Serializing output as YAML")?;
            print!("{rendered}");
        }
        OutputFormat::Table => table::print_view(value),
    }
    Ok(())
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let (dataset, types) = load(&args.input)?;
    let described = stats::describe_dataset(&dataset, &types);
    emit(&described, args.input.format)
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    #[serde(flatten)]
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<Vec<String>>,
}

impl TableView for SummaryReport {
    fn sections(&self) -> Vec<table::TableSection> {
        let mut sections = self.summary.sections();
        if let Some(insights) = &self.insights {
            sections.push(table::TableSection {
                title: "Insights".to_string(),
                headers: vec!["insight".to_string()],
                rows: insights.iter().map(|line| vec![line.clone()]).collect(),
            });
        }
        sections
    }
}

fn handle_summary(args: &cli::SummaryArgs) -> Result<()> {
    let (dataset, types) = load(&args.input)?;
    let summary = compute_summary(&dataset, &types);
    let insights = (!args.no_insights).then(|| get_quick_insights(&summary));
    emit(&SummaryReport { summary, insights }, args.input.format)
}

fn handle_forecast(args: &cli::ForecastArgs) -> Result<()> {
    let (dataset, types) = load(&args.input)?;
    let result = forecast(
        &dataset,
        &types,
        args.periods,
        args.date_column.as_deref(),
        args.value_column.as_deref(),
    )?;
    emit(&result, args.input.format)
}

fn handle_forecast_all(args: &cli::ForecastAllArgs) -> Result<()> {
    let (dataset, types) = load(&args.input)?;
    let report = forecast::forecast_all(&dataset, &types, args.periods)?;
    emit(&report, args.input.format)?;
    if !report.any_fitted() {
        anyhow::bail!(
            "No numeric column could be fitted against '{}'",
            report.date_column
        );
    }
    Ok(())
}

fn handle_chart(args: &cli::ChartArgs) -> Result<()> {
    let kind = args.kind.parse::<ChartKind>()?;
    let (dataset, types) = load(&args.input)?;
    if !chart::available_charts(&types).supports(kind) {
        return Err(AnalysisError::ChartUnavailable(format!(
            "{kind} chart is not available for this dataset"
        ))
        .into());
    }
    let request = ChartRequest {
        x_column: args.x_column.clone(),
        y_column: args.y_column.clone(),
    };
    let data = chart::chart_data(&dataset, &types, kind, &request)?;
    emit(&data, args.input.format)
}
