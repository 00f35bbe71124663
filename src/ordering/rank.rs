//! Metadata rank resolution.
//!
//! An item's rank lives at `cache[item]["_fields"]["base"]["Number"]`.
//! Any missing segment, or a value that is not int-like, resolves to the
//! caller's default rank instead of failing.

use serde_json::Value;

/// Path below the item key that holds the rank.
pub const RANK_PATH: [&str; 3] = ["_fields", "base", "Number"];

/// Resolve `item`'s rank in `cache`, or `default_rank` if it has none.
pub fn resolve_rank(cache: &Value, item: &str, default_rank: i64) -> i64 {
    let mut node = cache.get(item);
    for segment in RANK_PATH {
        node = node.and_then(|n| n.get(segment));
    }
    let Some(value) = node else {
        return default_rank;
    };
    rank_from_value(value).unwrap_or_else(|| {
        tracing::debug!(item, value = %value, "malformed rank, using default");
        default_rank
    })
}

/// Interpret an int-like JSON value.
///
/// Integers are taken as-is, finite floats are truncated toward zero and
/// strings are parsed after trimming. Everything else is rejected.
/// Numbers outside `i64` saturate, so an oversized rank still sorts last
/// among ranked items rather than falling back to the default.
pub fn rank_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
