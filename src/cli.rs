use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::forecast::DEFAULT_PERIODS;

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarise, explain, and forecast CSV data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show row and column counts, inferred column types, and missing values
    Columns(ColumnsArgs),
    /// Compute summary statistics and plain-language insights
    Summary(SummaryArgs),
    /// Fit a linear trend to one numeric column and project it forward
    Forecast(ForecastArgs),
    /// Fit a linear trend to every numeric column against the first date column
    ForecastAll(ForecastAllArgs),
    /// Produce chart-ready data for a line, bar, histogram, or scatter chart
    Chart(ChartArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Omit the plain-language insights
    #[arg(long = "no-insights")]
    pub no_insights: bool,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of periods to project (clamped to 1..=30)
    #[arg(short = 'p', long = "periods", default_value_t = DEFAULT_PERIODS)]
    pub periods: usize,
    /// Date column to fit against (defaults to the first date column)
    #[arg(long = "date-column")]
    pub date_column: Option<String>,
    /// Numeric column to forecast (defaults to the first numeric column)
    #[arg(long = "value-column")]
    pub value_column: Option<String>,
}

#[derive(Debug, Args)]
pub struct ForecastAllArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of periods to project (clamped to 1..=30)
    #[arg(short = 'p', long = "periods", default_value_t = DEFAULT_PERIODS)]
    pub periods: usize,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Chart kind: line, bar, histogram, or scatter
    #[arg(short = 'k', long = "kind")]
    pub kind: String,
    /// Column for the x axis
    #[arg(short = 'x', long = "x-column")]
    pub x_column: Option<String>,
    /// Column for the y axis
    #[arg(short = 'y', long = "y-column")]
    pub y_column: Option<String>,
}
