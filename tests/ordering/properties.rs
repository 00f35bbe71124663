//! Property tests for the ordering strategies.

use std::cmp::Ordering;

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use shelf_state::ordering::{natural_cmp, order, SortMode};

fn file_name() -> impl Strategy<Value = String> {
    "[a-zA-Z]{0,3}[0-9]{0,4}(\\.[a-z]{1,3})?"
}

/// Drop leading zeros from every digit run, keeping one marker per run.
fn strip_leading_zeros(s: &str) -> String {
    let mut out = String::new();
    let mut digits = String::new();
    for c in s.chars().chain(std::iter::once('\0')) {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if !digits.is_empty() {
            out.push('#');
            out.push_str(digits.trim_start_matches('0'));
            digits.clear();
        }
        if c != '\0' {
            out.push(c);
        }
    }
    out
}

proptest! {
    #[test]
    fn natural_cmp_is_antisymmetric(a in file_name(), b in file_name()) {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
    }

    #[test]
    fn natural_cmp_ties_only_on_leading_zeros(a in file_name(), b in file_name()) {
        prop_assert_eq!(
            natural_cmp(&a, &b) == Ordering::Equal,
            strip_leading_zeros(&a) == strip_leading_zeros(&b)
        );
    }

    #[test]
    fn natural_mode_keeps_ties_in_input_order(digits in "[0-9]{1,3}", zeros in 1usize..4) {
        let plain = format!("page{digits}");
        let padded = format!("page{}{digits}", "0".repeat(zeros));
        let forward = order(vec![plain.clone(), padded.clone()], SortMode::Natural, &Value::Null);
        let backward = order(vec![padded.clone(), plain.clone()], SortMode::Natural, &Value::Null);
        prop_assert_eq!(forward, vec![plain.clone(), padded.clone()]);
        prop_assert_eq!(backward, vec![padded, plain]);
    }

    #[test]
    fn numeric_suffixes_sort_by_value(prefix in "[a-z]{1,4}", x in 0u32..100_000, y in 0u32..100_000) {
        let a = format!("{prefix}{x}");
        let b = format!("{prefix}{y}");
        prop_assert_eq!(natural_cmp(&a, &b), x.cmp(&y));
    }

    #[test]
    fn natural_mode_is_a_permutation(items in prop::collection::vec(file_name(), 0..20)) {
        let mut sorted = order(items.clone(), SortMode::Natural, &Value::Null);
        let mut original = items;
        sorted.sort();
        original.sort();
        prop_assert_eq!(sorted, original);
    }

    #[test]
    fn metadata_mode_is_stable(ranks in prop::collection::vec(prop::option::of(0i64..4), 0..20)) {
        // Item i carries rank ranks[i] (or none); names encode the original index.
        let items: Vec<String> = (0..ranks.len()).map(|i| format!("item{i}")).collect();
        let mut cache = Map::new();
        for (i, rank) in ranks.iter().enumerate() {
            if let Some(r) = rank {
                cache.insert(format!("item{i}"), json!({ "_fields": { "base": { "Number": r } } }));
            }
        }
        let default_rank = ranks.len() as i64 + 1;

        let out = order(items, SortMode::MetadataRank, &Value::Object(cache));

        let keyed: Vec<(i64, usize)> = out
            .iter()
            .map(|name| {
                let idx: usize = name["item".len()..].parse().unwrap();
                (ranks[idx].unwrap_or(default_rank), idx)
            })
            .collect();
        let mut expected = keyed.clone();
        expected.sort();
        prop_assert_eq!(keyed, expected);
    }
}
