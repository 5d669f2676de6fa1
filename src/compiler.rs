// The rule compiler: validate once, so `evaluate` never has to.
//
// Grounded on `rule_bundle.rs`'s `BundleValidator` → `BundleCompiler` shape
// (a validation pass that collects/aborts on error, followed by a pass that
// produces the immutable compiled form) narrowed from "validate a bundle of
// rules with metadata/constraints/signatures" down to the one DNF expression
// spec.md §4.6 describes. Unlike the teacher's validator, which accumulates
// every error and every warning into a `ValidationResult`, this compiler
// aborts on the *first* encountered error (spec.md: "abort with first
// encountered error") — there's no partial-rule concept to report warnings
// about once that happens.

use crate::cost::{condition_cost, rule_priority};
use crate::error::CompileError;
use crate::rule::{CompiledCondition, CompiledOrGroup, CompiledRule, Condition, Rule};
use crate::types::{FieldType, Operator, MAX_IN_VALUES};

/// Compiles an author-provided `Rule` into an immutable `CompiledRule`.
///
/// Deterministic and pure: same input always produces the same cost
/// ordering and priority (spec.md §8, "compile idempotence").
pub fn compile(rule: Rule) -> Result<CompiledRule, CompileError> {
    if rule.or_groups.is_empty() || rule.or_groups.iter().any(|g| g.conditions.is_empty()) {
        return Err(CompileError::EmptyExpression);
    }

    for group in &rule.or_groups {
        for condition in &group.conditions {
            validate_condition(condition)?;
        }
    }

    let or_groups: Vec<CompiledOrGroup> = rule
        .or_groups
        .into_iter()
        .map(|group| {
            let mut conditions: Vec<CompiledCondition> = group
                .conditions
                .into_iter()
                .map(|condition| {
                    let cost = condition_cost(&condition);
                    CompiledCondition { condition, cost }
                })
                .collect();
            // Stable sort: equal-cost conditions keep author order, which is
            // what makes `matched_field` reporting deterministic across runs
            // (spec.md §4.6 step 4).
            conditions.sort_by_key(|c| c.cost);
            CompiledOrGroup { conditions }
        })
        .collect();

    let priority = rule_priority(&or_groups, rule.sample_rate);

    log::debug!(
        "compiled rule {} ({} conditions, priority {})",
        rule.rule_id,
        or_groups.iter().map(|g| g.conditions.len()).sum::<usize>(),
        priority,
    );

    Ok(CompiledRule {
        rule_id: rule.rule_id,
        name: rule.name,
        action: rule.action,
        sample_rate: rule.sample_rate,
        or_groups,
        priority,
    })
}

fn validate_condition(condition: &Condition) -> Result<(), CompileError> {
    let depth = condition.field.len();
    if depth > crate::types::MAX_PATH_DEPTH {
        return Err(CompileError::PathTooDeep {
            max: crate::types::MAX_PATH_DEPTH,
            actual: depth,
        });
    }
    let wildcards = condition.field.wildcard_count();
    if wildcards > crate::types::MAX_NESTED_WILDCARDS {
        return Err(CompileError::TooManyWildcards {
            max: crate::types::MAX_NESTED_WILDCARDS,
            actual: wildcards,
        });
    }

    if let Some(field_ref) = &condition.field_ref {
        let ref_depth = field_ref.len();
        if ref_depth > crate::types::MAX_PATH_DEPTH {
            return Err(CompileError::PathTooDeep {
                max: crate::types::MAX_PATH_DEPTH,
                actual: ref_depth,
            });
        }
        if field_ref.wildcard_count() > 0 {
            return Err(CompileError::WildcardInFieldRef);
        }
    }

    if !operator_type_compatible(condition.operator, condition.field_type) {
        return Err(CompileError::InvalidOperator);
    }

    if condition.operator == Operator::In && condition.values.len() > MAX_IN_VALUES {
        return Err(CompileError::TooManyInValues {
            max: MAX_IN_VALUES,
            actual: condition.values.len(),
        });
    }

    Ok(())
}

/// Operator × field-type compatibility table, spec.md §4.4.
fn operator_type_compatible(operator: Operator, field_type: FieldType) -> bool {
    match operator {
        Operator::Exists | Operator::IsNull | Operator::Eq | Operator::Neq | Operator::In => true,
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            matches!(field_type.normalized(), FieldType::Any | FieldType::Numeric)
        }
        Operator::Prefix | Operator::Suffix => {
            matches!(field_type.normalized(), FieldType::Any | FieldType::Text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldPath;
    use crate::rule::{OrGroup, RuleAction};

    fn path_of_depth(n: usize) -> FieldPath {
        let mut builder = FieldPath::builder();
        for i in 0..n {
            builder = builder.key(format!("k{i}"));
        }
        builder.build()
    }

    fn path_with_wildcards(n: usize) -> FieldPath {
        let mut builder = FieldPath::builder();
        for _ in 0..n {
            builder = builder.wildcard();
        }
        builder.build()
    }

    fn rule_with(group: OrGroup) -> Rule {
        Rule::builder("r", RuleAction::Observe).or_group(group).build()
    }

    #[test]
    fn empty_or_groups_is_rejected() {
        let rule = Rule::builder("empty", RuleAction::Observe).build();
        assert_eq!(compile(rule).unwrap_err(), CompileError::EmptyExpression);
    }

    #[test]
    fn group_with_no_conditions_is_rejected() {
        let rule = rule_with(OrGroup::new(vec![]));
        assert_eq!(compile(rule).unwrap_err(), CompileError::EmptyExpression);
    }

    #[test]
    fn path_of_depth_16_compiles_17_does_not() {
        let ok = Condition::builder(path_of_depth(16), Operator::Exists).build();
        assert!(compile(rule_with(OrGroup::new(vec![ok]))).is_ok());

        let bad = Condition::builder(path_of_depth(17), Operator::Exists).build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![bad]))).unwrap_err(),
            CompileError::PathTooDeep { max: 16, actual: 17 }
        );
    }

    #[test]
    fn two_wildcards_compile_three_do_not() {
        let ok = Condition::builder(path_with_wildcards(2), Operator::Exists).build();
        assert!(compile(rule_with(OrGroup::new(vec![ok]))).is_ok());

        let bad = Condition::builder(path_with_wildcards(3), Operator::Exists).build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![bad]))).unwrap_err(),
            CompileError::TooManyWildcards { max: 2, actual: 3 }
        );
    }

    #[test]
    fn wildcard_in_field_ref_is_rejected() {
        let cond = Condition::builder(FieldPath::builder().key("a").build(), Operator::Eq)
            .field_ref(FieldPath::builder().wildcard().build())
            .build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![cond]))).unwrap_err(),
            CompileError::WildcardInFieldRef
        );
    }

    #[test]
    fn ordered_comparison_rejects_text_field_type() {
        let cond = Condition::builder(FieldPath::builder().key("a").build(), Operator::Gt)
            .field_type(FieldType::Text)
            .build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![cond]))).unwrap_err(),
            CompileError::InvalidOperator
        );
    }

    #[test]
    fn prefix_rejects_boolean_field_type() {
        let cond = Condition::builder(FieldPath::builder().key("a").build(), Operator::Prefix)
            .field_type(FieldType::Boolean)
            .build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![cond]))).unwrap_err(),
            CompileError::InvalidOperator
        );
    }

    #[test]
    fn sixty_four_in_values_compile_sixty_five_do_not() {
        let values: Vec<crate::types::Scalar> = (0..64).map(|i| (i as f64).into()).collect();
        let ok = Condition::builder(FieldPath::builder().key("a").build(), Operator::In)
            .values(values)
            .build();
        assert!(compile(rule_with(OrGroup::new(vec![ok]))).is_ok());

        let too_many: Vec<crate::types::Scalar> = (0..65).map(|i| (i as f64).into()).collect();
        let bad = Condition::builder(FieldPath::builder().key("a").build(), Operator::In)
            .values(too_many)
            .build();
        assert_eq!(
            compile(rule_with(OrGroup::new(vec![bad]))).unwrap_err(),
            CompileError::TooManyInValues { max: 64, actual: 65 }
        );
    }

    #[test]
    fn conditions_within_a_group_are_stable_sorted_by_ascending_cost() {
        let prefix = Condition::builder(FieldPath::builder().key("name").build(), Operator::Prefix)
            .field_type(FieldType::Text)
            .value("test")
            .build();
        let exists = Condition::builder(FieldPath::builder().key("user").build(), Operator::Exists)
            .build();
        let rule = rule_with(OrGroup::new(vec![prefix, exists]));
        let compiled = compile(rule).unwrap();
        let group = &compiled.or_groups[0];
        assert_eq!(group.conditions[0].condition.operator, Operator::Exists);
        assert_eq!(group.conditions[1].condition.operator, Operator::Prefix);
    }

    #[test]
    fn recompiling_yields_the_same_priority() {
        let cond = Condition::builder(FieldPath::builder().key("a").build(), Operator::Eq)
            .field_type(FieldType::Numeric)
            .value(1.0)
            .build();
        let rule = rule_with(OrGroup::new(vec![cond]));
        let first = compile(rule.clone()).unwrap();
        let second = compile(rule).unwrap();
        assert_eq!(first.priority, second.priority);
    }
}
