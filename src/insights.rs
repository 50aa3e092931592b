//! Plain-language observations drawn from a [`Summary`].
//!
//! Sentences restate figures already present in the summary and never
//! compute new ones. Output is capped at [`MAX_INSIGHTS`] in priority order:
//! one overview sentence, up to three range sentences, up to two peak
//! sentences. Identifier columns are skipped throughout.

use num_format::{Locale, ToFormattedString};

use crate::{identifier::is_identifier_name, stats::Summary};

pub const MAX_INSIGHTS: usize = 6;
const MAX_RANGE_INSIGHTS: usize = 3;
const MAX_PEAK_INSIGHTS: usize = 2;

/// Formats a figure with thousands separators and at most the decimals it
/// already carries, e.g. `1234.5` as `1,234.5`.
pub fn format_figure(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs();
    let whole = magnitude.trunc();
    let mut fraction = format!("{:.2}", magnitude - whole);
    // "0.995" rounds up into the next whole number
    let whole = if fraction.starts_with('1') {
        fraction = "0.00".to_string();
        whole + 1.0
    } else {
        whole
    };
    let digits = fraction.trim_end_matches('0').trim_end_matches('.');
    let sign = if value < 0.0 && (whole > 0.0 || digits != "0") {
        "-"
    } else {
        ""
    };
    let grouped = group_whole(whole);
    match digits.strip_prefix('0') {
        Some(decimals) if !decimals.is_empty() => format!("{sign}{grouped}{decimals}"),
        _ => format!("{sign}{grouped}"),
    }
}

/// Groups the shortest decimal form of a non-negative whole `f64`. Values past
/// `u128` keep their plain digits.
fn group_whole(whole: f64) -> String {
    let digits = format!("{whole}");
    digits
        .parse::<u128>()
        .map(|parsed| parsed.to_formatted_string(&Locale::en))
        .unwrap_or(digits)
}

pub fn get_quick_insights(summary: &Summary) -> Vec<String> {
    let mut insights = Vec::with_capacity(MAX_INSIGHTS);
    insights.push(format!(
        "Dataset contains {} rows and {} columns",
        summary.overview.total_rows.to_formatted_string(&Locale::en),
        summary.overview.total_columns
    ));

    insights.extend(
        summary
            .numeric_stats
            .iter()
            .filter(|stats| !stats.is_id_column)
            .take(MAX_RANGE_INSIGHTS)
            .map(|stats| {
                format!(
                    "{}: ranges from {} to {} (avg: {})",
                    stats.column,
                    format_figure(stats.min),
                    format_figure(stats.max),
                    format_figure(stats.mean)
                )
            }),
    );

    insights.extend(
        summary
            .period_analysis
            .iter()
            .filter(|period| {
                !is_identifier_name(&period.column)
                    && !summary
                        .numeric(&period.column)
                        .is_some_and(|stats| stats.is_id_column)
            })
            .take(MAX_PEAK_INSIGHTS)
            .map(|period| {
                format!(
                    "Best {}: {} on {}",
                    period.column,
                    format_figure(period.best_period.value),
                    period.best_period.date
                )
            }),
    );

    insights.truncate(MAX_INSIGHTS);
    insights
}
