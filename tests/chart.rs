mod common;

use csv_insight::{
    AnalysisError,
    chart::{
        AxisValue, ChartKind, ChartRequest, ChartSeries, HISTOGRAM_BINS, MAX_BAR_CATEGORIES,
        available_charts, chart_data,
    },
};

fn auto() -> ChartRequest {
    ChartRequest::default()
}

#[test]
fn availability_follows_numeric_column_count() {
    let (_, types) = common::load(common::NO_DATE_CSV);
    let charts = available_charts(&types);
    assert!(charts.line && charts.bar && charts.histogram);
    assert!(!charts.scatter);

    let (_, types) = common::load(common::SALES_CSV);
    assert!(available_charts(&types).scatter);

    let (_, types) = common::load("word\nalpha\nbeta\n");
    let charts = available_charts(&types);
    assert!(!charts.line && !charts.bar && !charts.histogram && !charts.scatter);
}

#[test]
fn line_chart_uses_first_date_and_first_numeric() {
    let (dataset, types) = common::load(common::LINEAR_CSV);
    let chart = chart_data(&dataset, &types, ChartKind::Line, &auto()).expect("line");
    assert_eq!(chart.x_column, "d");
    assert_eq!(chart.y_column.as_deref(), Some("v"));
    let ChartSeries::Points { x, y } = chart.series else {
        panic!("expected points");
    };
    assert_eq!(x[0], AxisValue::Text("2024-01-01".to_string()));
    assert_eq!(y, [10.0, 20.0, 30.0]);
}

#[test]
fn line_chart_without_dates_uses_row_index() {
    let (dataset, types) = common::load(common::NO_DATE_CSV);
    let chart = chart_data(&dataset, &types, ChartKind::Line, &auto()).expect("line");
    assert_eq!(chart.x_column, "index");
    let ChartSeries::Points { x, .. } = chart.series else {
        panic!("expected points");
    };
    assert_eq!(x, [AxisValue::Index(0), AxisValue::Index(1), AxisValue::Index(2)]);
}

#[test]
fn bar_chart_sums_by_category_in_first_seen_order() {
    let (dataset, types) = common::load(common::SALES_CSV);
    let request = ChartRequest {
        x_column: None,
        y_column: Some("units".to_string()),
    };
    let chart = chart_data(&dataset, &types, ChartKind::Bar, &request).expect("bar");
    assert_eq!(chart.x_column, "region");
    assert_eq!(chart.x_title, "Region");
    let ChartSeries::Points { x, y } = chart.series else {
        panic!("expected points");
    };
    assert_eq!(
        x,
        [
            AxisValue::Text("North".to_string()),
            AxisValue::Text("South".to_string()),
            AxisValue::Text("East".to_string()),
        ]
    );
    assert_eq!(y, [51.0, 23.0, 35.0]);
}

#[test]
fn bar_chart_keeps_the_largest_categories() {
    let mut text = String::from("label,amount\n");
    for i in 0..40 {
        text.push_str(&format!("item{i},{}\n", i + 1));
        text.push_str(&format!("item{i},{}\n", i + 1));
    }
    let (dataset, types) = common::load(&text);
    assert!(types.is_categorical("label"));
    let chart = chart_data(&dataset, &types, ChartKind::Bar, &auto()).expect("bar");
    let ChartSeries::Points { x, y } = chart.series else {
        panic!("expected points");
    };
    assert_eq!(x.len(), MAX_BAR_CATEGORIES);
    assert_eq!(x[0], AxisValue::Text("item39".to_string()));
    assert_eq!(y[0], 80.0);
}

#[test]
fn histogram_takes_first_numeric_values() {
    let (dataset, types) = common::load(common::SALES_CSV);
    let request = ChartRequest {
        x_column: Some("revenue".to_string()),
        y_column: None,
    };
    let chart = chart_data(&dataset, &types, ChartKind::Histogram, &request).expect("histogram");
    assert_eq!(chart.y_title, "Frequency");
    let ChartSeries::Histogram { values, bins } = chart.series else {
        panic!("expected histogram");
    };
    assert_eq!(bins, HISTOGRAM_BINS);
    assert_eq!(values.len(), 8);
}

#[test]
fn scatter_colours_by_small_categorical() {
    let (dataset, types) = common::load(common::SALES_CSV);
    let request = ChartRequest {
        x_column: Some("units".to_string()),
        y_column: Some("revenue".to_string()),
    };
    let chart = chart_data(&dataset, &types, ChartKind::Scatter, &request).expect("scatter");
    assert_eq!(chart.color_column.as_deref(), Some("region"));
    assert_eq!(chart.x_title, "Units");
    let ChartSeries::Scatter { x, y, color } = chart.series else {
        panic!("expected scatter");
    };
    assert_eq!(x.len(), 8);
    assert_eq!(y[0], 100.5);
    assert_eq!(color.expect("colours")[0], "North");
}

#[test]
fn scatter_needs_two_numeric_columns() {
    let (dataset, types) = common::load(common::NO_DATE_CSV);
    assert!(matches!(
        chart_data(&dataset, &types, ChartKind::Scatter, &auto()),
        Err(AnalysisError::ChartUnavailable(_))
    ));
}

#[test]
fn overrides_are_validated() {
    let (dataset, types) = common::load(common::SALES_CSV);
    let request = ChartRequest {
        x_column: None,
        y_column: Some("region".to_string()),
    };
    assert_eq!(
        chart_data(&dataset, &types, ChartKind::Line, &request),
        Err(AnalysisError::ColumnNotNumeric("region".to_string()))
    );
    let request = ChartRequest {
        x_column: Some("nope".to_string()),
        y_column: None,
    };
    assert_eq!(
        chart_data(&dataset, &types, ChartKind::Bar, &request),
        Err(AnalysisError::ColumnNotFound("nope".to_string()))
    );
}

#[test]
fn unknown_kind_is_rejected() {
    assert_eq!(
        "pie".parse::<ChartKind>(),
        Err(AnalysisError::UnknownChartType("pie".to_string()))
    );
}

#[test]
fn chart_data_serializes_with_shape_tag() {
    let (dataset, types) = common::load(common::LINEAR_CSV);
    let chart = chart_data(&dataset, &types, ChartKind::Line, &auto()).expect("line");
    let json = serde_json::to_value(&chart).expect("serialize");
    assert_eq!(json["kind"], "line");
    assert_eq!(json["series"]["shape"], "points");
    assert_eq!(json["series"]["x"][1], "2024-01-02");
    assert_eq!(json["series"]["y"][2], 30.0);
}
