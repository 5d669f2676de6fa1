// Public error taxonomy surfaced from `compile`.
//
// Grounded on `rule_bundle.rs`'s `ValidationError`/`ParseError`: one
// `thiserror`-derived enum, one variant per distinct failure, each carrying
// the data needed to format a precise message. Unlike those two, this enum
// also derives `PartialEq`/`Eq`/`Clone` — spec.md §4.1 requires sentinel
// errors to be distinguishable "by identity, not by string", and hosts that
// branch on `CompileError::PathTooDeep { .. }` need structural equality, not
// just a `Display` impl.

use thiserror::Error;

/// Errors `compile` can return. All six are user-facing: a wire adapter maps
/// these to API validation failures (spec.md §7, "400-like").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("rule expression is empty: no or-groups, or a group with no conditions")]
    EmptyExpression,

    #[error("field path has depth {actual}, exceeding the maximum of {max}")]
    PathTooDeep { max: usize, actual: usize },

    #[error("field path has {actual} wildcards, exceeding the maximum of {max}")]
    TooManyWildcards { max: usize, actual: usize },

    #[error("field_ref must not contain a wildcard segment")]
    WildcardInFieldRef,

    #[error("`in` operator has {actual} values, exceeding the maximum of {max}")]
    TooManyInValues { max: usize, actual: usize },

    #[error("operator is not valid for the condition's declared field type")]
    InvalidOperator,
}

// The internal evaluation sentinels from spec.md §4.1 (`FieldNotFound`,
// `CoercionFailed`) are never returned from `evaluate` — they dispatch to
// `on_missing`/`on_coercion_failure` policies. Rather than a parallel enum,
// this crate carries that distinction directly in `path::ResolveOutcome`
// and `coerce::CoerceOutcome`'s variants, the same way the teacher keeps
// `ConstraintViolationType` as plain data rather than a second error type.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_errors_compare_by_variant_identity_not_message() {
        let a = CompileError::PathTooDeep { max: 16, actual: 17 };
        let b = CompileError::PathTooDeep { max: 16, actual: 17 };
        assert_eq!(a, b);
        assert_ne!(a, CompileError::TooManyWildcards { max: 2, actual: 3 });
    }
}
