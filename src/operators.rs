// The 11 comparison operators, operating on already-coerced values.
//
// Generalizes the teacher's `FieldComparison::compare` (which switched on a
// 9-variant `ComparisonOp` over raw `FieldValue`s) into a `Coerced`-typed
// comparison: by the time anything in this module runs, `coerce()` has
// already resolved the "is this a number/string/bool" question, so `compare`
// itself only has to implement comparison semantics, not type juggling.

use crate::coerce::Coerced;
use crate::payload::Payload;
use crate::types::Operator;
use std::cmp::Ordering;

/// Compares `left` against `right` for `op`.
///
/// `Exists` and `IsNull` are handled by the evaluator before coercion even
/// runs (spec §4.7) and should never reach this function in the hot path;
/// they're still given sane, total definitions here (rather than panicking)
/// so the function stays safe to call directly in tests.
pub fn compare(op: Operator, left: &Coerced, right: &Coerced) -> bool {
    match op {
        Operator::Exists => !matches!(left, Coerced::Null),
        Operator::IsNull => matches!(left, Coerced::Null),
        Operator::Eq => values_equal(left, right),
        Operator::Neq => !values_equal(left, right),
        Operator::Lt => matches!(numeric_cmp(left, right), Some(Ordering::Less)),
        Operator::Lte => matches!(numeric_cmp(left, right), Some(Ordering::Less | Ordering::Equal)),
        Operator::Gt => matches!(numeric_cmp(left, right), Some(Ordering::Greater)),
        Operator::Gte => matches!(numeric_cmp(left, right), Some(Ordering::Greater | Ordering::Equal)),
        Operator::Prefix => string_pair(left, right).map(|(l, r)| l.starts_with(r)).unwrap_or(false),
        Operator::Suffix => string_pair(left, right).map(|(l, r)| l.ends_with(r)).unwrap_or(false),
        Operator::In => {
            // `In` is evaluated against a list via `compare_in`; a lone
            // right-hand side falls back to plain equality.
            values_equal(left, right)
        }
    }
}

/// `In`: true iff `left` equals any element of `values` (each already
/// coerced into the condition's declared field type).
pub fn compare_in(left: &Coerced, values: &[Coerced]) -> bool {
    values.iter().any(|v| values_equal(left, v))
}

fn as_number(v: &Coerced) -> Option<f64> {
    match v {
        Coerced::Number(n) => Some(*n),
        Coerced::Any(Payload::Number(n)) => Some(*n),
        _ => None,
    }
}

/// `partial_cmp` on `f64` returns `None` for NaN, which we want: any
/// NaN-participating ordered comparison (`Lt`/`Lte`/`Gt`/`Gte`) is false.
fn numeric_cmp(left: &Coerced, right: &Coerced) -> Option<Ordering> {
    let (l, r) = (as_number(left)?, as_number(right)?);
    l.partial_cmp(&r)
}

fn string_pair<'a>(left: &'a Coerced, right: &'a Coerced) -> Option<(&'a str, &'a str)> {
    match (left, right) {
        (Coerced::Text(l), Coerced::Text(r)) => Some((l.as_str(), r.as_str())),
        _ => None,
    }
}

/// Structural equality with numeric promotion: two values that can both be
/// viewed as a number compare numerically even if one arrived via a
/// different coercion path (e.g. a literal parsed as `Number` against an
/// `Any`-typed field holding a JSON number). Everything else compares
/// exactly, type for type — booleans only equal booleans, strings only
/// equal strings.
fn values_equal(left: &Coerced, right: &Coerced) -> bool {
    match (left, right) {
        (Coerced::Null, Coerced::Null) => true,
        (Coerced::Bool(l), Coerced::Bool(r)) => l == r,
        (Coerced::Text(l), Coerced::Text(r)) => l == r,
        (Coerced::Number(l), Coerced::Number(r)) => l == r,
        (Coerced::Any(l), Coerced::Any(r)) => l == r,
        _ => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}
