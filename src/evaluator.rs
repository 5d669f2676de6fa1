// The rule evaluator: sample gate, DNF short-circuit, policy dispatch,
// match diagnostics.
//
// Grounded on `match_clause.rs::MatchClause::evaluate`'s tiered
// short-circuit shape (stop at the first tier that fails) generalized from
// "three fixed tiers" to "an OR of ANDs over cost-ordered conditions", plus
// the resolve → coerce → compare pipeline spec.md §4.7 spells out
// end-to-end.

use crate::coerce::{coerce, CoerceOutcome, Coerced};
use crate::cost::rule_priority as compute_rule_priority;
use crate::operators::{compare, compare_in};
use crate::path::{resolve, resolve_matching, FieldPath, MatchOutcome, ResolveOutcome};
use crate::payload::Payload;
use crate::rule::{CompiledCondition, CompiledOrGroup, CompiledRule, Condition, MatchResult};
use crate::sampler::should_sample;
use crate::types::{OnCoercionFailure, OnMissing, Operator};

/// Evaluates `rule` against `payload`, per spec.md §4.7.
///
/// Never fails: any internal inconsistency a correctly-compiled rule
/// shouldn't be able to produce degrades to no-match rather than panicking
/// or propagating an error, since `evaluate` is an infallible hot path.
pub fn evaluate(rule: &CompiledRule, payload: &Payload) -> MatchResult {
    if !should_sample(rule.sample_rate) {
        return MatchResult::no_match(rule);
    }

    for (group_index, group) in rule.or_groups.iter().enumerate() {
        if let Some((field, value)) = evaluate_group(group, payload) {
            return MatchResult::matched(rule, group_index, field, value);
        }
    }

    MatchResult::no_match(rule)
}

/// Exposed for external schedulers (spec.md §6.3); purely a function of the
/// already-computed per-condition costs, so this just replays the same
/// arithmetic `compile` already did rather than storing a duplicate value.
pub fn rule_priority(rule: &CompiledRule) -> i64 {
    compute_rule_priority(&rule.or_groups, rule.sample_rate)
}

/// Evaluates one AND group. Short-circuits on the first non-matching
/// condition; returns the first *matched* condition's (field, value) pair
/// as the group's reporting anchor once every condition has matched.
fn evaluate_group(
    group: &CompiledOrGroup,
    payload: &Payload,
) -> Option<(Option<FieldPath>, Option<Payload>)> {
    let mut anchor: Option<(Option<FieldPath>, Option<Payload>)> = None;

    for compiled in &group.conditions {
        let (matched, field, value) = evaluate_condition(compiled, payload);
        if !matched {
            return None;
        }
        if anchor.is_none() {
            anchor = Some((field, value));
        }
    }

    Some(anchor.unwrap_or((None, None)))
}

/// Outcome of a single condition: whether it matched, and the (field, value)
/// to report if it's the group's reporting anchor.
///
/// A field path may contain wildcards, which resolve to more than one
/// candidate leaf. Spec.md §8 scenario 3 and the glossary's "ANY semantics"
/// both require the condition to be evaluated *per candidate*, taking the
/// first one (in the resolver's deterministic order) for which the whole
/// condition — not just the path — holds; a non-satisfying earlier element
/// must be skipped in favor of a later one, not short-circuit the condition
/// to false. `resolve_matching` is what makes that backtracking possible: it
/// threads a predicate built from this condition's own coerce/compare logic
/// into the wildcard walk, and separately reports whether *any* structural
/// candidate existed at all, so `on_missing` only fires for a genuinely
/// absent field rather than one that merely failed to satisfy the operator.
fn evaluate_condition(
    compiled: &CompiledCondition,
    payload: &Payload,
) -> (bool, Option<FieldPath>, Option<Payload>) {
    let condition = &compiled.condition;

    // `Exists` only cares about resolvability, never content, so the first
    // structurally-valid candidate always suffices — no predicate needed.
    if condition.operator == Operator::Exists {
        return match resolve(&condition.field, payload) {
            ResolveOutcome::Found { value, resolved_path } => (true, Some(resolved_path), Some(value.clone())),
            ResolveOutcome::NotFound => apply_missing(condition.on_missing, None, None),
        };
    }

    // `IsNull` bypasses coercion but is still content-sensitive: among a
    // wildcard's candidates, the first *null* one is what's being sought,
    // not merely the first one that resolves.
    if condition.operator == Operator::IsNull {
        return match resolve_matching(&condition.field, payload, &mut |raw| raw.is_null()) {
            MatchOutcome::Matched { value, resolved_path } => (true, Some(resolved_path), Some(value.clone())),
            MatchOutcome::Unmatched => (false, None, None),
            MatchOutcome::NotFound => apply_missing(condition.on_missing, None, None),
        };
    }

    match resolve_matching(&condition.field, payload, &mut |raw| condition_holds(condition, raw, payload)) {
        MatchOutcome::Matched { value, resolved_path } => evaluate_leaf(condition, value, resolved_path, payload),
        MatchOutcome::Unmatched => (false, None, None),
        MatchOutcome::NotFound => apply_missing(condition.on_missing, None, None),
    }
}

/// Predicate form of [`evaluate_leaf`]: does the condition's full
/// coerce -> policy -> compare pipeline hold for this one candidate leaf?
/// Used by the resolver's wildcard backtracking to pick the right
/// expansion; the resolved path isn't known yet at this point; the leaf
/// winning the search is re-evaluated through [`evaluate_leaf`] afterward to
/// produce the actual (field, value) diagnostics.
fn condition_holds(condition: &Condition, raw: &Payload, payload: &Payload) -> bool {
    evaluate_leaf(condition, raw, FieldPath::default(), payload).0
}

/// Runs the coerce -> policy -> compare pipeline for one already-resolved
/// candidate (`raw`, found at `rpath`). Shared by the non-wildcard path
/// (a single candidate) and the wildcard path (the candidate the resolver's
/// predicate-driven backtracking settled on).
fn evaluate_leaf(
    condition: &Condition,
    raw: &Payload,
    rpath: FieldPath,
    payload: &Payload,
) -> (bool, Option<FieldPath>, Option<Payload>) {
    let left = match coerce(raw, condition.field_type) {
        CoerceOutcome::Null => {
            return apply_missing(condition.on_missing, Some(rpath), Some(Payload::Null))
        }
        CoerceOutcome::Failed => {
            return apply_coercion_failure(condition.on_coercion_failure, rpath, raw.clone())
        }
        CoerceOutcome::Value(v) => v,
    };

    let matched = if condition.operator == Operator::In {
        let coerced_values: Vec<Coerced> = condition
            .values
            .iter()
            .filter_map(|scalar| coerce(&Payload::from(scalar.clone()), condition.field_type).into_value())
            .collect();
        compare_in(&left, &coerced_values)
    } else if let Some(field_ref) = &condition.field_ref {
        match resolve_right_hand_side(field_ref, payload, condition.field_type, condition.on_missing) {
            RightHandSide::Value(right) => compare(condition.operator, &left, &right),
            RightHandSide::PolicyMatch => true,
            RightHandSide::PolicyNoMatch => false,
        }
    } else {
        let right = coerce(&Payload::from(condition.value.clone()), condition.field_type)
            .into_value()
            .unwrap_or(Coerced::Null);
        compare(condition.operator, &left, &right)
    };

    // Spec.md §4.7 step 6 reports the coerced left value, not the raw one.
    (matched, Some(rpath), Some(Payload::from(&left)))
}

enum RightHandSide {
    Value(Coerced),
    PolicyMatch,
    PolicyNoMatch,
}

/// Resolves and coerces `field_ref` for a cross-field comparison. Missing,
/// null, or coercion-failed outcomes route through the *left* condition's
/// policies exactly as the primary field does (spec.md §4.7 step 5).
fn resolve_right_hand_side(
    field_ref: &FieldPath,
    payload: &Payload,
    field_type: crate::types::FieldType,
    on_missing: OnMissing,
) -> RightHandSide {
    let raw = match resolve(field_ref, payload) {
        ResolveOutcome::Found { value, .. } => value,
        ResolveOutcome::NotFound => {
            return match on_missing {
                OnMissing::Match => RightHandSide::PolicyMatch,
                OnMissing::Skip | OnMissing::Fail => RightHandSide::PolicyNoMatch,
            }
        }
    };

    match coerce(raw, field_type) {
        // Spec.md §4.7 step 5: a field_ref that is missing, null, *or*
        // fails coercion all route through the primary condition's
        // `on_missing` policy — unlike the primary field, there is no
        // separate `on_coercion_failure` path for the comparand.
        CoerceOutcome::Null | CoerceOutcome::Failed => match on_missing {
            OnMissing::Match => RightHandSide::PolicyMatch,
            OnMissing::Skip | OnMissing::Fail => RightHandSide::PolicyNoMatch,
        },
        CoerceOutcome::Value(v) => RightHandSide::Value(v),
    }
}

fn apply_missing(
    policy: OnMissing,
    field: Option<FieldPath>,
    value: Option<Payload>,
) -> (bool, Option<FieldPath>, Option<Payload>) {
    match policy {
        OnMissing::Skip | OnMissing::Fail => (false, None, None),
        OnMissing::Match => (true, field, value),
    }
}

fn apply_coercion_failure(
    policy: OnCoercionFailure,
    rpath: FieldPath,
    raw: Payload,
) -> (bool, Option<FieldPath>, Option<Payload>) {
    match policy {
        OnCoercionFailure::Skip | OnCoercionFailure::Error => (false, None, None),
        OnCoercionFailure::Match => (true, Some(rpath), Some(raw)),
    }
}
