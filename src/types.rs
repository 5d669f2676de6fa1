// Shared tags and resource limits for the rule evaluation core.
//
// These are the vocabulary every other module in this crate speaks: the
// operator/field-type/policy enums, the rule identifier, and the canonical
// resource limits a bundle validator would otherwise hand-roll per field.
// Keeping them in one place means a limit change (say, MAX_PATH_DEPTH) is a
// one-line diff instead of a search-and-replace across the compiler and the
// resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// RESOURCE LIMITS
// ============================================================================

/// Metadata limits are enforced by collaborators outside this core (the
/// bundle/store layer); they're listed here purely for interop so a host can
/// reference the same constants this crate was sized against.
pub const MAX_METADATA_PAIRS: usize = 64;
pub const MAX_METADATA_KEY_LEN: usize = 128;
pub const MAX_METADATA_VALUE_LEN: usize = 1024;
pub const MAX_METADATA_TOTAL_SIZE: usize = 64 * 1024;
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Limits the core itself enforces at compile time.
pub const MAX_PATH_DEPTH: usize = 16;
pub const MAX_NESTED_WILDCARDS: usize = 2;
pub const MAX_IN_VALUES: usize = 64;

// ============================================================================
// RULE IDENTIFIER
// ============================================================================

/// Unique identifier for a rule.
///
/// UUID-backed so hosts get a typed identifier instead of a bare `String`;
/// the value itself is opaque to this crate (wire format is out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(Uuid);

impl RuleId {
    /// Creates a new random rule identifier.
    pub fn new() -> Self {
        RuleId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RuleId {
    fn from(uuid: Uuid) -> Self {
        RuleId(uuid)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// OPERATOR
// ============================================================================

/// Comparison operators a condition may use.
///
/// Closed set by design: adding an operator means updating the cost table
/// (`cost.rs`), the compatibility table (`compiler.rs`), and `compare()`
/// (`operators.rs`) — the compiler will point at all three call sites if one
/// is missed, since each does an exhaustive `match` on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Exists,
    IsNull,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Prefix,
    Suffix,
}

// ============================================================================
// FIELD TYPE
// ============================================================================

/// Declared type a condition coerces its resolved value into before
/// comparing. `Unspecified` is a wire-level convenience for "the author
/// didn't say" and is treated identically to `Any` everywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Numeric,
    Text,
    Boolean,
    Any,
    Unspecified,
}

impl FieldType {
    /// Normalizes `Unspecified` to `Any`; every other variant is unchanged.
    pub fn normalized(self) -> FieldType {
        match self {
            FieldType::Unspecified => FieldType::Any,
            other => other,
        }
    }
}

// ============================================================================
// MISSING / COERCION-FAILURE POLICIES
// ============================================================================

/// Governs how a condition behaves when its field is absent *or* resolves to
/// JSON null. Kept as one policy per spec: null and missing share fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnMissing {
    Skip,
    Match,
    Fail,
}

impl Default for OnMissing {
    fn default() -> Self {
        OnMissing::Skip
    }
}

/// Governs how a condition behaves when coercion can neither parse nor
/// preserve the resolved value (e.g. `"abc"` coerced to `Numeric`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCoercionFailure {
    Skip,
    Match,
    Error,
}

impl Default for OnCoercionFailure {
    fn default() -> Self {
        OnCoercionFailure::Skip
    }
}

// ============================================================================
// SCALAR — AUTHORED LITERAL VALUES
// ============================================================================

/// A literal comparand as authored in a rule (`Condition::value` /
/// `Condition::values`). Deliberately narrower than `Payload`: a literal can
/// never be an array or object, only a JSON leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_round_trips_through_display() {
        let id = RuleId::new();
        let shown = id.to_string();
        assert_eq!(shown.len(), 36); // canonical UUID textual length
    }

    #[test]
    fn unspecified_normalizes_to_any() {
        assert_eq!(FieldType::Unspecified.normalized(), FieldType::Any);
        assert_eq!(FieldType::Numeric.normalized(), FieldType::Numeric);
    }

    #[test]
    fn default_policies_are_skip() {
        assert_eq!(OnMissing::default(), OnMissing::Skip);
        assert_eq!(OnCoercionFailure::default(), OnCoercionFailure::Skip);
    }

    #[test]
    fn scalar_from_conversions() {
        assert_eq!(Scalar::from("x"), Scalar::String("x".to_string()));
        assert_eq!(Scalar::from(5i64), Scalar::Number(5.0));
        assert_eq!(Scalar::from(true), Scalar::Bool(true));
    }
}
