// Condition / OrGroup / Rule / CompiledRule / MatchResult — the DNF data
// model — plus builders in the teacher's `RuleMetadataBuilder` idiom.
//
// `Rule` is what a host authors; `compile()` (in `compiler.rs`) turns it
// into a `CompiledRule`, attaching a per-condition cost and an overall
// priority. Grounded on `rule_bundle.rs::Rule`/`CompiledRule`, narrowed from
// "one rule in a bundle with metadata/constraints/action-side-effects" down
// to the DNF expression this core actually evaluates.

use crate::path::FieldPath;
use crate::payload::Payload;
use crate::types::{FieldType, OnCoercionFailure, OnMissing, Operator, RuleId, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a matching rule tells the caller to do. The teacher's
/// `ActionType` has eleven variants with side-effect parameters (rewrite,
/// redact, spawn-sidecar, ...); none of that belongs to a pure evaluation
/// core, so this is reduced to the three outcomes the core itself reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Observe,
    Drop,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: FieldPath,
    pub field_ref: Option<FieldPath>,
    pub operator: Operator,
    pub field_type: FieldType,
    pub value: Scalar,
    pub values: Vec<Scalar>,
    pub on_missing: OnMissing,
    pub on_coercion_failure: OnCoercionFailure,
}

impl Condition {
    pub fn builder(field: FieldPath, operator: Operator) -> ConditionBuilder {
        ConditionBuilder::new(field, operator)
    }
}

#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    field: FieldPath,
    field_ref: Option<FieldPath>,
    operator: Operator,
    field_type: FieldType,
    value: Scalar,
    values: Vec<Scalar>,
    on_missing: OnMissing,
    on_coercion_failure: OnCoercionFailure,
}

impl ConditionBuilder {
    pub fn new(field: FieldPath, operator: Operator) -> Self {
        ConditionBuilder {
            field,
            field_ref: None,
            operator,
            field_type: FieldType::Unspecified,
            value: Scalar::Null,
            values: Vec::new(),
            on_missing: OnMissing::default(),
            on_coercion_failure: OnCoercionFailure::default(),
        }
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn field_ref(mut self, field_ref: FieldPath) -> Self {
        self.field_ref = Some(field_ref);
        self
    }

    pub fn value(mut self, value: impl Into<Scalar>) -> Self {
        self.value = value.into();
        self
    }

    pub fn values(mut self, values: impl IntoIterator<Item = Scalar>) -> Self {
        self.values = values.into_iter().collect();
        self
    }

    pub fn on_missing(mut self, policy: OnMissing) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn on_coercion_failure(mut self, policy: OnCoercionFailure) -> Self {
        self.on_coercion_failure = policy;
        self
    }

    pub fn build(self) -> Condition {
        Condition {
            field: self.field,
            field_ref: self.field_ref,
            operator: self.operator,
            field_type: self.field_type,
            value: self.value,
            values: self.values,
            on_missing: self.on_missing,
            on_coercion_failure: self.on_coercion_failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrGroup {
    pub conditions: Vec<Condition>,
}

impl OrGroup {
    pub fn new(conditions: Vec<Condition>) -> Self {
        OrGroup { conditions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: RuleId,
    pub name: String,
    pub action: RuleAction,
    pub sample_rate: f64,
    pub or_groups: Vec<OrGroup>,
}

impl Rule {
    pub fn builder(name: impl Into<String>, action: RuleAction) -> RuleBuilder {
        RuleBuilder::new(name, action)
    }
}

#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule_id: RuleId,
    name: String,
    action: RuleAction,
    sample_rate: f64,
    or_groups: Vec<OrGroup>,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>, action: RuleAction) -> Self {
        RuleBuilder {
            rule_id: RuleId::new(),
            name: name.into(),
            action,
            sample_rate: 1.0,
            or_groups: Vec::new(),
        }
    }

    pub fn rule_id(mut self, rule_id: RuleId) -> Self {
        self.rule_id = rule_id;
        self
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn or_group(mut self, group: OrGroup) -> Self {
        self.or_groups.push(group);
        self
    }

    pub fn build(self) -> Rule {
        Rule {
            rule_id: self.rule_id,
            name: self.name,
            action: self.action,
            sample_rate: self.sample_rate,
            or_groups: self.or_groups,
        }
    }
}

/// A condition annotated with its compile-time cost, stable-sorted (cheapest
/// first) within its `CompiledOrGroup`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    pub condition: Condition,
    pub cost: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOrGroup {
    pub conditions: Vec<CompiledCondition>,
}

/// The output of `compile()`: immutable, cheaply `Clone`-able (behind an
/// `Arc` if a host wants shared ownership — this crate doesn't impose that
/// choice), safe to evaluate concurrently from many threads with no
/// interior mutability anywhere in the type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub rule_id: RuleId,
    pub name: String,
    pub action: RuleAction,
    pub sample_rate: f64,
    pub or_groups: Vec<CompiledOrGroup>,
    pub priority: i64,
}

/// Where, within a compiled rule's DNF, a match was found. The locator is
/// deliberately coarse — a group index — since an `OrGroup` only matches
/// when *all* of its conditions do, so there is no single "matching
/// condition" to point at beyond the group itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedCondition {
    pub group_index: usize,
}

impl fmt::Display for MatchedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[\"any\", {}, \"all\"]", self.group_index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub action: RuleAction,
    pub matched_field: Option<FieldPath>,
    pub matched_value: Option<Payload>,
    pub matched_condition: Option<MatchedCondition>,
}

impl MatchResult {
    pub(crate) fn no_match(rule: &CompiledRule) -> Self {
        MatchResult {
            matched: false,
            rule_id: rule.rule_id,
            rule_name: rule.name.clone(),
            action: rule.action,
            matched_field: None,
            matched_value: None,
            matched_condition: None,
        }
    }

    pub(crate) fn matched(
        rule: &CompiledRule,
        group_index: usize,
        field: Option<FieldPath>,
        value: Option<Payload>,
    ) -> Self {
        MatchResult {
            matched: true,
            rule_id: rule.rule_id,
            rule_name: rule.name.clone(),
            action: rule.action,
            matched_field: field,
            matched_value: value,
            matched_condition: Some(MatchedCondition { group_index }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operator;

    #[test]
    fn condition_builder_defaults_to_skip_policies() {
        let cond = Condition::builder(FieldPath::builder().key("status").build(), Operator::Eq)
            .value("active")
            .build();
        assert_eq!(cond.on_missing, OnMissing::Skip);
        assert_eq!(cond.on_coercion_failure, OnCoercionFailure::Skip);
        assert_eq!(cond.value, Scalar::String("active".to_string()));
    }

    #[test]
    fn matched_condition_display_matches_spec_locator_shape() {
        let locator = MatchedCondition { group_index: 2 };
        assert_eq!(locator.to_string(), "[\"any\", 2, \"all\"]");
    }

    #[test]
    fn rule_builder_defaults_sample_rate_to_always_sample() {
        let rule = Rule::builder("always-observe", RuleAction::Observe).build();
        assert_eq!(rule.sample_rate, 1.0);
        assert!(rule.or_groups.is_empty());
    }
}
