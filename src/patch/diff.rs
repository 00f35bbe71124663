use serde_json::{Number, Value};

use super::changeset::{create_changeset, Changeset};
use crate::types::Fields;

// ============================================================================
// Public API
// ============================================================================

/// Compute which keys of `patch` would change `current`.
///
/// A key is changed when it is absent from `current`, or when its new value is
/// not structurally equal to the old one. Keys whose value is identical are
/// left out, so an all-identical patch yields an empty changeset.
pub fn diff_fields(current: &Fields, patch: &Fields) -> Changeset {
    let mut changes = create_changeset();
    for (key, new_value) in patch {
        let changed = match current.get(key) {
            Some(old_value) => !values_equal(old_value, new_value),
            None => true,
        };
        if changed {
            changes.insert(key.clone());
        }
    }
    changes
}

/// Apply `patch` to `fields`, returning the set of keys that actually changed.
///
/// Unchanged keys are not rewritten.
pub fn apply_patch(fields: &mut Fields, patch: Fields) -> Changeset {
    let changes = diff_fields(fields, &patch);
    for (key, value) in patch {
        if changes.contains(&key) {
            fields.insert(key, value);
        }
    }
    changes
}

/// Structural equality between two field values.
///
/// Numbers compare by value, so `1` and `1.0` are equal; everything else
/// defers to `serde_json::Value` equality (object key order is irrelevant).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, xv)| ym.get(k).is_some_and(|yv| values_equal(xv, yv)))
        }
        _ => a == b,
    }
}

/// Integers compare exactly; a float equals an integer only when it is
/// integral and converts to exactly that integer.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    if x == y {
        return true;
    }
    match (integer(x), integer(y)) {
        (Some(_), Some(_)) => false,
        (Some(i), None) => float_is_integer(y.as_f64(), i),
        (None, Some(i)) => float_is_integer(x.as_f64(), i),
        (None, None) => x.as_f64() == y.as_f64(),
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float_is_integer(f: Option<f64>, i: i128) -> bool {
    // `as` saturates, but an in-range integral f64 converts exactly.
    f.is_some_and(|f| f.fract() == 0.0 && f as i128 == i)
}

// ============================================================================
// Tests
// ============================================================================
