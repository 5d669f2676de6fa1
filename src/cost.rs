// The cost model: per-operator base cost, per-type multiplier, per-segment
// lookup cost, and the wildcard fan-out multiplier, combined into a
// per-condition cost and an overall rule priority.
//
// Grounded on the constant-table style of `execution_constraints.rs`
// (`ExecutionConstraints::fast_rule`/`semantic_rule` picking fixed cost
// tiers) and the `priority` field the teacher threads through
// `rule_metadata.rs`/`rule_bundle.rs` for scheduling order. This is the
// "validate once, evaluate many" payoff: conditions within an `OrGroup` are
// stable-sorted by ascending cost at compile time so the hot path always
// tries the cheapest check first.

use crate::path::{FieldPath, PathSegment};
use crate::rule::{CompiledOrGroup, Condition};
use crate::types::{FieldType, Operator};

pub const BASE_PRIORITY: i64 = 1000;

/// Base cost for each operator, before type/path/wildcard scaling.
pub fn operator_base_cost(op: Operator) -> u32 {
    match op {
        Operator::Exists | Operator::IsNull => 1,
        Operator::Eq | Operator::Neq => 5,
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => 7,
        Operator::In => 8,
        Operator::Prefix | Operator::Suffix => 10,
    }
}

/// How much a condition's declared field type scales its base cost — text
/// comparisons are far more expensive than boolean ones, and `Any`/
/// `Unspecified` pay the most since they can't skip the coercion dispatch.
pub fn type_multiplier(field_type: FieldType) -> u32 {
    match field_type.normalized() {
        FieldType::Boolean => 1,
        FieldType::Numeric => 4,
        FieldType::Text => 48,
        FieldType::Any => 128,
        FieldType::Unspecified => unreachable!("normalized() maps Unspecified to Any"),
    }
}

/// Flat per-segment cost for each named key lookup on the path (index and
/// wildcard segments are effectively free — array indexing doesn't hash).
pub fn lookup_cost(path: &FieldPath) -> u32 {
    path.segments()
        .iter()
        .filter(|s| matches!(s, PathSegment::Key(_)))
        .count() as u32
        * 128
}

/// Wildcard segments fan out the resolver's work combinatorially; `8^w`
/// models that blowup directly in the cost so a double-wildcard condition
/// sorts behind a single-wildcard one even with the same operator/type.
pub fn wildcard_multiplier(path: &FieldPath) -> u64 {
    8u64.pow(path.wildcard_count() as u32)
}

pub fn condition_cost(condition: &Condition) -> u64 {
    let lookup = lookup_cost(&condition.field) as u64;
    let base = operator_base_cost(condition.operator) as u64;
    let multiplier = type_multiplier(condition.field_type) as u64;
    let wildcard = wildcard_multiplier(&condition.field);
    lookup + base * multiplier * wildcard
}

/// Overall scheduling priority for a compiled rule: a fixed base plus the
/// summed cost of every condition, a small per-group term (more alternatives
/// means more to check even with short-circuiting), and a term that nudges
/// low-sample-rate rules toward the front since they're cheaper to evaluate
/// on average.
pub fn rule_priority(or_groups: &[CompiledOrGroup], sample_rate: f64) -> i64 {
    let condition_total: i64 = or_groups
        .iter()
        .flat_map(|group| group.conditions.iter())
        .map(|c| c.cost as i64)
        .sum();
    let group_term = 10 * or_groups.len() as i64;
    let sample_term = ((1.0 - sample_rate.clamp(0.0, 1.0)) * 50.0).round() as i64;
    BASE_PRIORITY + condition_total + group_term + sample_term
}
