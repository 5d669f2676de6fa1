//! Rule evaluation core for a data-quality event inspection system.
//!
//! Sensors pass each event (an already-parsed [`Payload`]) through this
//! core; the core decides, per rule, whether the event matches and what
//! action to report. Rule authoring goes through [`compile`] once per
//! rule (rare — rule create/update); [`evaluate`] runs once per event per
//! rule (hot — the sub-millisecond path this crate is sized for).
//!
//! Everything outside rule compilation and evaluation — a persistent rule
//! store, a wire protocol, bytes-level JSON parsing, sensor buffering,
//! auth, configuration, a UI, a CLI, metrics reporting — is a
//! collaborator's job, not this crate's.

pub mod coerce;
pub mod compiler;
pub mod cost;
pub mod error;
pub mod evaluator;
pub mod operators;
pub mod path;
pub mod payload;
pub mod rule;
pub mod sampler;
pub mod types;

pub use compiler::compile;
pub use error::CompileError;
pub use evaluator::{evaluate, rule_priority};
pub use path::{FieldPath, PathSegment};
pub use payload::Payload;
pub use rule::{
    Condition, ConditionBuilder, CompiledCondition, CompiledOrGroup, CompiledRule,
    MatchedCondition, MatchResult, OrGroup, Rule, RuleAction, RuleBuilder,
};
pub use types::{
    FieldType, OnCoercionFailure, OnMissing, Operator, RuleId, Scalar, MAX_IN_VALUES,
    MAX_METADATA_KEY_LEN, MAX_METADATA_PAIRS, MAX_METADATA_TOTAL_SIZE, MAX_METADATA_VALUE_LEN,
    MAX_NESTED_WILDCARDS, MAX_PATH_DEPTH, MAX_PAYLOAD_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end scenario 1 from spec.md §8: a simple `Eq` rule matching a
    /// top-level field, exercised through the public API only.
    #[test]
    fn public_api_compiles_and_evaluates_a_simple_rule() {
        let condition = Condition::builder(FieldPath::builder().key("status").build(), Operator::Eq)
            .field_type(FieldType::Text)
            .value("active")
            .build();
        let rule = Rule::builder("status-active", RuleAction::Observe)
            .or_group(OrGroup::new(vec![condition]))
            .build();
        let compiled = compile(rule).expect("rule should compile");

        let payload = Payload::object([("status".to_string(), Payload::from("active"))]);
        let result = evaluate(&compiled, &payload);

        assert!(result.matched);
        assert_eq!(result.action, RuleAction::Observe);
        assert!(rule_priority(&compiled) > 0);
    }

    #[test]
    fn compile_surfaces_the_first_validation_error() {
        let empty = Rule::builder("empty", RuleAction::Drop).build();
        assert_eq!(compile(empty).unwrap_err(), CompileError::EmptyExpression);
    }
}
