mod common;

use std::collections::HashSet;

use csv_insight::{
    ColumnType,
    parser::parse_csv,
    schema::{ColumnTypeSet, infer_column_types},
};
use proptest::prelude::*;

#[test]
fn sales_fixture_columns_land_in_expected_buckets() {
    let (_, types) = common::load(common::SALES_CSV);
    assert_eq!(types.numeric, ["order_id", "units", "revenue"]);
    assert_eq!(types.date, ["order_date"]);
    assert_eq!(types.categorical, ["region"]);
}

#[test]
fn id_named_numbers_are_still_numeric() {
    let (_, types) = common::load("user_id,score\n1,5\n2,7\n3,9\n4,1\n5,2\n");
    assert_eq!(types.type_of("user_id"), Some(ColumnType::Numeric));
}

#[test]
fn mostly_text_column_is_categorical() {
    let (_, types) = common::load("code,amount\nA1,1\nB2,2\n3,3\nC4,4\n");
    assert!(types.is_categorical("code"));
    assert!(types.is_numeric("amount"));
}

#[test]
fn unnamed_column_needs_a_date_majority() {
    let text = "when,label\n2024-01-01,a\n2024-01-02,b\nsoon,c\nlater,d\n";
    let dataset = parse_csv(text).expect("parse");
    let types = infer_column_types(&dataset);
    assert!(types.is_categorical("when"));

    let text = "when,label\n2024-01-01,a\n2024-01-02,b\n2024-01-03,c\nlater,d\n";
    let dataset = parse_csv(text).expect("parse");
    assert!(infer_column_types(&dataset).is_date("when"));
}

#[test]
fn type_set_serializes_as_three_lists() {
    let (_, types) = common::load(common::LINEAR_CSV);
    let json = serde_json::to_value(&types).expect("serialize");
    assert_eq!(json["date"], serde_json::json!(["d"]));
    assert_eq!(json["numeric"], serde_json::json!(["v"]));
    assert_eq!(json["categorical"], serde_json::json!([]));
}

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..10_000).prop_map(|n| n.to_string()),
        (-500.0f64..500.0).prop_map(|f| format!("{f:.2}")),
        (1u32..=28, 1u32..=12).prop_map(|(d, m)| format!("2024-{m:02}-{d:02}")),
        "[a-z]{1,8}",
        Just(String::new()),
        Just("NA".to_string()),
    ]
}

fn csv_strategy() -> impl Strategy<Value = String> {
    (1usize..6, 1usize..25).prop_flat_map(|(width, height)| {
        (
            proptest::collection::vec("[A-Za-z_ ]{1,10}", width),
            proptest::collection::vec(proptest::collection::vec(cell_strategy(), width), height),
        )
            .prop_map(|(headers, rows)| {
                let mut text = headers.join(",");
                text.push('\n');
                for row in rows {
                    text.push_str(&row.join(","));
                    text.push('\n');
                }
                text
            })
    })
}

fn bucket_names(types: &ColumnTypeSet) -> Vec<&String> {
    types
        .numeric
        .iter()
        .chain(&types.categorical)
        .chain(&types.date)
        .collect()
}

proptest! {
    #[test]
    fn buckets_are_disjoint_and_drawn_from_columns(text in csv_strategy()) {
        let Ok(dataset) = parse_csv(&text) else {
            return Ok(());
        };
        let types = infer_column_types(&dataset);
        let names = bucket_names(&types);
        let unique = names.iter().collect::<HashSet<_>>();
        prop_assert_eq!(unique.len(), names.len());
        let columns = dataset.columns().iter().collect::<HashSet<_>>();
        for name in &names {
            prop_assert!(columns.contains(name));
        }
        prop_assert_eq!(names.len(), dataset.column_count());
    }
}
