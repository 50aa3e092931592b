mod common;

use csv_insight::{
    AnalysisError, Cell,
    parser::{is_placeholder_token, parse_csv, standardize_column_name},
};

#[test]
fn quoted_comma_stays_in_one_field() {
    let dataset = parse_csv("a,\"b,c\",d\n1,2,3").expect("parse");
    assert_eq!(dataset.columns(), ["a", "b_c", "d"]);
    assert_eq!(dataset.row_count(), 1);
    assert_eq!(dataset.cell(0, "a"), Some(&Cell::Text("1".to_string())));
    assert_eq!(dataset.cell(0, "b_c"), Some(&Cell::Text("2".to_string())));
    assert_eq!(dataset.cell(0, "d"), Some(&Cell::Text("3".to_string())));
}

#[test]
fn doubled_quotes_unescape() {
    let dataset = parse_csv("name,quote\nx,\"say \"\"hi\"\"\"\n").expect("parse");
    assert_eq!(
        dataset.cell(0, "quote"),
        Some(&Cell::Text("say \"hi\"".to_string()))
    );
}

#[test]
fn header_names_are_standardized() {
    let dataset = parse_csv("  Order Date ,Price ($),Units Sold\n2024-01-01,3,4\n").expect("parse");
    assert_eq!(dataset.columns(), ["order_date", "price", "units_sold"]);
    assert_eq!(standardize_column_name("%%%", 4), "column_4");
    assert_eq!(standardize_column_name("Total-Revenue", 0), "total_revenue");
}

#[test]
fn blank_and_whitespace_input_is_empty() {
    assert_eq!(parse_csv(""), Err(AnalysisError::EmptyInput));
    assert_eq!(parse_csv("  \n\t\n"), Err(AnalysisError::EmptyInput));
}

#[test]
fn header_without_rows_is_malformed() {
    assert_eq!(parse_csv("a,b,c\n"), Err(AnalysisError::MalformedRow));
}

#[test]
fn short_rows_pad_with_absent_and_long_rows_are_cut() {
    let dataset = parse_csv("a,b,c\n1\n4,5,6,7\n").expect("parse");
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.cell(0, "b"), Some(&Cell::Absent));
    assert_eq!(dataset.cell(0, "c"), Some(&Cell::Absent));
    assert_eq!(dataset.rows()[1].len(), 3);
    assert_eq!(dataset.cell(1, "c"), Some(&Cell::Text("6".to_string())));
}

#[test]
fn placeholder_tokens_parse_as_absent() {
    let dataset = parse_csv("a,b,c,d\nNA,n/a,,null\n").expect("parse");
    assert!(dataset.rows()[0].iter().all(|cell| *cell == Cell::Absent));
    for token in ["NaN", "None", "#N/A", "<NA>", "  "] {
        assert!(is_placeholder_token(token), "{token:?} should be missing");
    }
    assert!(!is_placeholder_token("nana"));
}

#[test]
fn colliding_headers_share_one_column() {
    let dataset = parse_csv("Value,value\n1,2\n").expect("parse");
    assert_eq!(dataset.columns(), ["value"]);
    assert_eq!(dataset.cell(0, "value"), Some(&Cell::Text("2".to_string())));
}

#[test]
fn sales_fixture_parses_every_row() {
    let dataset = parse_csv(common::SALES_CSV).expect("parse");
    assert_eq!(dataset.row_count(), 8);
    assert_eq!(
        dataset.columns(),
        ["order_id", "order_date", "region", "units", "revenue"]
    );
}
