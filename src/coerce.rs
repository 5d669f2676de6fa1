// Scalar-to-FieldType coercion.
//
// Generalizes the teacher's `FieldValue` comparison matrix (which only ever
// compared like-for-like variants) into an explicit coercion table that
// distinguishes "the value is genuinely absent" (`Null`) from "the value is
// present but doesn't fit the declared type" (`Failed`) — two outcomes the
// evaluator routes to different policies (`on_missing` vs
// `on_coercion_failure`).

use crate::payload::Payload;
use crate::types::FieldType;

/// A value that has passed coercion into some `FieldType`. `Any` carries the
/// identity-mapped scalar directly (`Bool`/`Number`/`Text`/`Null`); the
/// `Any(Payload)` catch-all only ever holds an `Array`/`Object`, since
/// scalars always take the dedicated variant instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Any(Payload),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoerceOutcome {
    Value(Coerced),
    Null,
    Failed,
}

impl CoerceOutcome {
    pub(crate) fn into_value(self) -> Option<Coerced> {
        match self {
            CoerceOutcome::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Converts a coerced value back into a `Payload` for diagnostics: spec.md
/// §4.7 step 6 reports the *coerced* left value (`L`), not the raw resolved
/// one, as `matched_value` — a `Numeric`-typed condition matched against the
/// string `"42"` should report the number `42`, not the string.
impl From<&Coerced> for Payload {
    fn from(coerced: &Coerced) -> Self {
        match coerced {
            Coerced::Null => Payload::Null,
            Coerced::Bool(b) => Payload::Bool(*b),
            Coerced::Number(n) => Payload::Number(*n),
            Coerced::Text(s) => Payload::String(s.clone()),
            Coerced::Any(p) => p.clone(),
        }
    }
}

/// Coerces `value` into `field_type`, per the table in spec §4.3.
pub fn coerce(value: &Payload, field_type: FieldType) -> CoerceOutcome {
    match field_type.normalized() {
        FieldType::Any => coerce_any(value),
        FieldType::Numeric => coerce_numeric(value),
        FieldType::Text => coerce_text(value),
        FieldType::Boolean => coerce_boolean(value),
        FieldType::Unspecified => unreachable!("normalized() maps Unspecified to Any"),
    }
}

fn coerce_any(value: &Payload) -> CoerceOutcome {
    match value {
        Payload::Null => CoerceOutcome::Null,
        Payload::Bool(b) => CoerceOutcome::Value(Coerced::Bool(*b)),
        Payload::Number(n) => CoerceOutcome::Value(Coerced::Number(*n)),
        Payload::String(s) => CoerceOutcome::Value(Coerced::Text(s.clone())),
        other => CoerceOutcome::Value(Coerced::Any(other.clone())),
    }
}

fn coerce_numeric(value: &Payload) -> CoerceOutcome {
    match value {
        Payload::Null => CoerceOutcome::Null,
        Payload::Number(n) => CoerceOutcome::Value(Coerced::Number(*n)),
        Payload::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return CoerceOutcome::Failed;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => CoerceOutcome::Value(Coerced::Number(n)),
                _ => CoerceOutcome::Failed,
            }
        }
        _ => CoerceOutcome::Failed,
    }
}

fn coerce_text(value: &Payload) -> CoerceOutcome {
    match value {
        Payload::Null => CoerceOutcome::Null,
        Payload::String(s) => CoerceOutcome::Value(Coerced::Text(s.clone())),
        Payload::Bool(b) => CoerceOutcome::Value(Coerced::Text(b.to_string())),
        Payload::Number(n) => CoerceOutcome::Value(Coerced::Text(format_number(*n))),
        _ => CoerceOutcome::Failed,
    }
}

fn coerce_boolean(value: &Payload) -> CoerceOutcome {
    match value {
        Payload::Null => CoerceOutcome::Null,
        Payload::Bool(b) => CoerceOutcome::Value(Coerced::Bool(*b)),
        _ => CoerceOutcome::Failed,
    }
}

/// Shortest round-trip decimal text for a number: whole values print without
/// a trailing `.0`-free fractional part stripped twice over (`"3"`, not
/// `"3.0"` or `"3.000000"`).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_input_is_null_regardless_of_field_type() {
        assert_eq!(coerce(&Payload::Null, FieldType::Numeric), CoerceOutcome::Null);
        assert_eq!(coerce(&Payload::Null, FieldType::Text), CoerceOutcome::Null);
        assert_eq!(coerce(&Payload::Null, FieldType::Boolean), CoerceOutcome::Null);
        assert_eq!(coerce(&Payload::Null, FieldType::Any), CoerceOutcome::Null);
    }

    #[test]
    fn numeric_parses_numeric_strings_and_rejects_the_rest() {
        assert_eq!(
            coerce(&Payload::from("42"), FieldType::Numeric),
            CoerceOutcome::Value(Coerced::Number(42.0))
        );
        assert_eq!(coerce(&Payload::from("abc"), FieldType::Numeric), CoerceOutcome::Failed);
        assert_eq!(coerce(&Payload::Bool(true), FieldType::Numeric), CoerceOutcome::Failed);
    }

    #[test]
    fn text_stringifies_bools_and_numbers() {
        assert_eq!(
            coerce(&Payload::Bool(true), FieldType::Text),
            CoerceOutcome::Value(Coerced::Text("true".to_string()))
        );
        assert_eq!(
            coerce(&Payload::from(200.0), FieldType::Text),
            CoerceOutcome::Value(Coerced::Text("200".to_string()))
        );
    }

    #[test]
    fn boolean_only_accepts_bool_or_null() {
        assert_eq!(
            coerce(&Payload::Bool(false), FieldType::Boolean),
            CoerceOutcome::Value(Coerced::Bool(false))
        );
        assert_eq!(coerce(&Payload::from("true"), FieldType::Boolean), CoerceOutcome::Failed);
        assert_eq!(coerce(&Payload::from(1.0), FieldType::Boolean), CoerceOutcome::Failed);
    }

    #[test]
    fn any_preserves_scalars_and_wraps_containers() {
        assert_eq!(
            coerce(&Payload::from(200.0), FieldType::Any),
            CoerceOutcome::Value(Coerced::Number(200.0))
        );
        let arr = Payload::array([Payload::from(1.0)]);
        assert_eq!(coerce(&arr, FieldType::Any), CoerceOutcome::Value(Coerced::Any(arr)));
    }

    #[test]
    fn non_scalar_fails_for_every_type_but_any() {
        let obj = Payload::object([]);
        assert_eq!(coerce(&obj, FieldType::Numeric), CoerceOutcome::Failed);
        assert_eq!(coerce(&obj, FieldType::Text), CoerceOutcome::Failed);
        assert_eq!(coerce(&obj, FieldType::Boolean), CoerceOutcome::Failed);
        assert!(matches!(coerce(&obj, FieldType::Any), CoerceOutcome::Value(_)));
    }
}
