//! Identifier-column detection.
//!
//! Two rules are checked in order and the first match is reported:
//!
//! 1. [`IdentifierRule::Name`]: the lower-cased name is `id`, `index`, `idx`,
//!    `key`, `row`, `row_number` or `rownumber`, starts with `id_`, or ends
//!    with `id` (covering `_id`), `_key` or `_idx`.
//! 2. [`IdentifierRule::SequentialIntegers`]: at least two values, all
//!    integral, which sorted form a run of consecutive integers starting at
//!    0 or 1.
//!
//! The name rule also matches ordinary words that end in `id` (`paid`,
//! `valid`). Statistics for such columns are still reported, only flagged.

use serde::Serialize;

const EXACT_NAMES: &[&str] = &["id", "index", "idx", "key", "row", "row_number", "rownumber"];
const SUFFIXES: &[&str] = &["id", "_key", "_idx"];
const PREFIXES: &[&str] = &["id_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRule {
    Name,
    SequentialIntegers,
}

pub fn is_identifier_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    EXACT_NAMES.contains(&lowered.as_str())
        || SUFFIXES.iter().any(|suffix| lowered.ends_with(suffix))
        || PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
}

pub fn is_sequential_integers(values: &[f64]) -> bool {
    if values.len() < 2 || values.iter().any(|v| !v.is_finite() || v.fract() != 0.0) {
        return false;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let starts_at_zero_or_one = sorted[0] == 0.0 || sorted[0] == 1.0;
    starts_at_zero_or_one && sorted.windows(2).all(|pair| pair[1] - pair[0] == 1.0)
}

pub fn identifier_rule(name: &str, values: &[f64]) -> Option<IdentifierRule> {
    if is_identifier_name(name) {
        Some(IdentifierRule::Name)
    } else if is_sequential_integers(values) {
        Some(IdentifierRule::SequentialIntegers)
    } else {
        None
    }
}

pub fn is_id_column(name: &str, values: &[f64]) -> bool {
    identifier_rule(name, values).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rule_matches_common_identifier_names() {
        for name in [
            "id", "ID", "user_id", "id_code", "customerid", "index", "idx", "key", "row",
            "row_number", "sku_key", "line_idx",
        ] {
            assert!(is_identifier_name(name), "{name} should be an identifier");
        }
        for name in ["sales", "width", "identity", "monkey", "rows"] {
            assert!(!is_identifier_name(name), "{name} should not be an identifier");
        }
    }

    #[test]
    fn sequential_rule_requires_consecutive_run_from_zero_or_one() {
        assert!(is_sequential_integers(&[3.0, 1.0, 2.0]));
        assert!(is_sequential_integers(&[0.0, 1.0]));
        assert!(!is_sequential_integers(&[2.0, 3.0, 4.0]));
        assert!(!is_sequential_integers(&[1.0, 2.0, 2.0]));
        assert!(!is_sequential_integers(&[1.0, 2.5]));
        assert!(!is_sequential_integers(&[1.0]));
    }

    #[test]
    fn name_rule_is_reported_first() {
        assert_eq!(
            identifier_rule("user_id", &[1.0, 2.0, 3.0]),
            Some(IdentifierRule::Name)
        );
        assert_eq!(
            identifier_rule("rank", &[1.0, 2.0, 3.0]),
            Some(IdentifierRule::SequentialIntegers)
        );
        assert_eq!(identifier_rule("amount", &[10.0, 20.0]), None);
    }
}
