// Field-path segments and the resolver that walks them against a `Payload`.
//
// The teacher's `FieldComparison` looked fields up by splitting a flat dotted
// string (`"user.profile.name"`) against a header/payload pair. This module
// generalizes that into a real segment-based walk that also supports a
// wildcard segment with deterministic "first match" semantics, since the
// dotted-string approach has no way to express "any array element" or
// "any object key" at all.
//
// Wildcard backtracking is predicate-driven: a wildcard tries each element in
// order and accepts the first one whose *remaining path* resolves *and*
// whose leaf value satisfies a caller-supplied predicate. Plain structural
// resolution (`resolve`) is the special case where the predicate accepts
// anything; condition evaluation (coerce -> policy -> compare) supplies a
// real predicate so a wildcard expansion that resolves but doesn't satisfy
// the condition is skipped in favor of the next one, per the "first
// expansion for which the condition holds" ANY semantics.

use crate::types::{MAX_NESTED_WILDCARDS, MAX_PATH_DEPTH};
use crate::payload::Payload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A field path: an ordered list of segments from the payload root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn wildcard_count(&self) -> usize {
        self.0
            .iter()
            .filter(|s| matches!(s, PathSegment::Wildcard))
            .count()
    }

    pub fn builder() -> FieldPathBuilder {
        FieldPathBuilder::default()
    }

    /// Checks the two compile-time resource limits that apply to any path:
    /// depth and nested-wildcard count. Does not check the "no wildcard in
    /// field_ref" rule, which is contextual and lives in the compiler.
    pub(crate) fn validate_limits(&self) -> Result<(), LimitViolation> {
        if self.0.len() > MAX_PATH_DEPTH {
            return Err(LimitViolation::PathTooDeep {
                max: MAX_PATH_DEPTH,
                actual: self.0.len(),
            });
        }
        let wildcards = self.wildcard_count();
        if wildcards > MAX_NESTED_WILDCARDS {
            return Err(LimitViolation::TooManyWildcards {
                max: MAX_NESTED_WILDCARDS,
                actual: wildcards,
            });
        }
        Ok(())
    }
}

pub(crate) enum LimitViolation {
    PathTooDeep { max: usize, actual: usize },
    TooManyWildcards { max: usize, actual: usize },
}

/// Fluent builder, mirroring the teacher's `*Builder` idiom for types that
/// are otherwise annoying to construct one field at a time.
#[derive(Debug, Default)]
pub struct FieldPathBuilder(Vec<PathSegment>);

impl FieldPathBuilder {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn wildcard(mut self) -> Self {
        self.0.push(PathSegment::Wildcard);
        self
    }

    pub fn build(self) -> FieldPath {
        FieldPath(self.0)
    }
}

/// Outcome of resolving a `FieldPath` against a `Payload`. Borrows from the
/// payload rather than cloning it — a condition that never matches shouldn't
/// pay for copying a subtree it's about to discard.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome<'a> {
    Found {
        value: &'a Payload,
        resolved_path: FieldPath,
    },
    NotFound,
}

/// Outcome of [`resolve_matching`], which distinguishes two different kinds
/// of "no result" that `ResolveOutcome` alone can't express: a path that
/// never structurally resolved to anything (`NotFound` — the `on_missing`
/// case) versus a path that resolved to one or more leaves, none of which
/// satisfied the predicate (`Unmatched` — an ordinary non-match, no policy
/// involved).
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    Matched {
        value: &'a Payload,
        resolved_path: FieldPath,
    },
    Unmatched,
    NotFound,
}

/// Walks `path` against `payload`, expanding wildcard segments to the first
/// array index / object key (in lexicographic order, via `Payload`'s
/// `BTreeMap`-backed objects) whose remaining path resolves successfully.
/// Content-blind: any structurally valid leaf is accepted, regardless of
/// value. Built on [`resolve_matching`] with an always-accept predicate.
pub fn resolve<'a>(path: &FieldPath, payload: &'a Payload) -> ResolveOutcome<'a> {
    match resolve_matching(path, payload, &mut |_| true) {
        MatchOutcome::Matched { value, resolved_path } => ResolveOutcome::Found { value, resolved_path },
        MatchOutcome::Unmatched | MatchOutcome::NotFound => ResolveOutcome::NotFound,
    }
}

/// Walks `path` against `payload`, accepting only a leaf for which
/// `predicate` returns true. A wildcard segment tries each element in
/// deterministic order and backtracks past any element whose continuation
/// either fails to resolve or resolves but fails the predicate — so the
/// chosen leaf is "the first expansion for which the condition holds", not
/// merely "the first expansion that exists".
///
/// Any out-of-limit path is treated as `NotFound` rather than panicking —
/// `compile` already rejects such paths, so this is defense in depth, not a
/// path a correctly-compiled rule should ever take.
pub fn resolve_matching<'a>(
    path: &FieldPath,
    payload: &'a Payload,
    predicate: &mut dyn FnMut(&Payload) -> bool,
) -> MatchOutcome<'a> {
    if path.validate_limits().is_err() {
        return MatchOutcome::NotFound;
    }

    let mut resolved = Vec::with_capacity(path.len());
    let mut saw_any = false;
    match walk(path.segments(), payload, &mut resolved, predicate, &mut saw_any) {
        Some(value) => MatchOutcome::Matched {
            value,
            resolved_path: FieldPath::new(resolved),
        },
        None if saw_any => MatchOutcome::Unmatched,
        None => MatchOutcome::NotFound,
    }
}

/// `saw_any` is set the moment any structurally valid leaf is reached,
/// whether or not it passes `predicate` — it's how `resolve_matching` tells
/// "nothing there" apart from "something there, but it didn't hold".
fn walk<'a>(
    segments: &[PathSegment],
    node: &'a Payload,
    resolved: &mut Vec<PathSegment>,
    predicate: &mut dyn FnMut(&Payload) -> bool,
    saw_any: &mut bool,
) -> Option<&'a Payload> {
    let (first, rest) = match segments.split_first() {
        Some(parts) => parts,
        None => {
            *saw_any = true;
            return if predicate(node) { Some(node) } else { None };
        }
    };

    match (first, node) {
        (PathSegment::Key(key), Payload::Object(map)) => {
            let child = map.get(key)?;
            resolved.push(PathSegment::Key(key.clone()));
            walk(rest, child, resolved, predicate, saw_any)
        }
        (PathSegment::Index(index), Payload::Array(items)) => {
            let child = items.get(*index)?;
            resolved.push(PathSegment::Index(*index));
            walk(rest, child, resolved, predicate, saw_any)
        }
        (PathSegment::Wildcard, Payload::Array(items)) => {
            for (index, child) in items.iter().enumerate() {
                let mut attempt = resolved.clone();
                attempt.push(PathSegment::Index(index));
                if let Some(found) = walk(rest, child, &mut attempt, predicate, saw_any) {
                    *resolved = attempt;
                    return Some(found);
                }
            }
            None
        }
        (PathSegment::Wildcard, Payload::Object(map)) => {
            // `BTreeMap` iterates in key order already — no explicit sort.
            for (key, child) in map.iter() {
                let mut attempt = resolved.clone();
                attempt.push(PathSegment::Key(key.clone()));
                if let Some(found) = walk(rest, child, &mut attempt, predicate, saw_any) {
                    *resolved = attempt;
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> FieldPathBuilder {
        FieldPath::builder()
    }

    #[test]
    fn resolves_a_simple_key_path() {
        let payload = Payload::object([("status".to_string(), Payload::from("active"))]);
        let p = path().key("status").build();
        match resolve(&p, &payload) {
            ResolveOutcome::Found { value, resolved_path } => {
                assert_eq!(value.as_str(), Some("active"));
                assert_eq!(resolved_path, p);
            }
            ResolveOutcome::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn missing_key_is_not_found() {
        let payload = Payload::object([]);
        let p = path().key("missing").build();
        assert_eq!(resolve(&p, &payload), ResolveOutcome::NotFound);
    }

    #[test]
    fn wildcard_over_array_picks_first_predicate_satisfying_index() {
        // Structurally, `*.ok` resolves at index 0 already (the key `ok` is
        // present there too) — but a predicate of "value is `true`" must
        // skip that non-satisfying element and backtrack to index 1, the
        // first element for which the condition (not just the path) holds.
        let payload = Payload::array([
            Payload::object([("ok".to_string(), Payload::from(false))]),
            Payload::object([("ok".to_string(), Payload::from(true))]),
            Payload::object([("ok".to_string(), Payload::from(true))]),
        ]);
        let p = path().wildcard().key("ok").build();
        match resolve_matching(&p, &payload, &mut |v| v.as_bool() == Some(true)) {
            MatchOutcome::Matched { value, resolved_path } => {
                assert_eq!(value.as_bool(), Some(true));
                assert_eq!(
                    resolved_path.segments(),
                    &[PathSegment::Index(1), PathSegment::Key("ok".to_string())]
                );
            }
            other => panic!("expected a predicate match, got {other:?}"),
        }
    }

    #[test]
    fn resolve_matching_distinguishes_unmatched_from_not_found() {
        let payload = Payload::array([
            Payload::object([("ok".to_string(), Payload::from(false))]),
            Payload::object([("ok".to_string(), Payload::from(false))]),
        ]);
        let p = path().wildcard().key("ok").build();
        // Every element exists and resolves, but none satisfies the
        // predicate: this is an ordinary non-match, not a missing field.
        assert_eq!(
            resolve_matching(&p, &payload, &mut |v| v.as_bool() == Some(true)),
            MatchOutcome::Unmatched
        );

        let empty = Payload::array(Vec::<Payload>::new());
        // No element at all: this is a genuinely missing field.
        assert_eq!(
            resolve_matching(&p, &empty, &mut |v| v.as_bool() == Some(true)),
            MatchOutcome::NotFound
        );
    }

    #[test]
    fn wildcard_over_object_picks_lexicographically_first_matching_key() {
        let payload = Payload::object([
            ("zebra".to_string(), Payload::from(1.0)),
            ("apple".to_string(), Payload::from(2.0)),
        ]);
        let p = path().wildcard().build();
        match resolve(&p, &payload) {
            ResolveOutcome::Found { resolved_path, .. } => {
                assert_eq!(resolved_path.segments(), &[PathSegment::Key("apple".to_string())]);
            }
            ResolveOutcome::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn empty_array_under_wildcard_is_not_found() {
        let payload = Payload::array(Vec::<Payload>::new());
        let p = path().wildcard().build();
        assert_eq!(resolve(&p, &payload), ResolveOutcome::NotFound);
    }

    #[test]
    fn null_mid_path_is_not_found() {
        let payload = Payload::object([("user".to_string(), Payload::Null)]);
        let p = path().key("user").key("name").build();
        assert_eq!(resolve(&p, &payload), ResolveOutcome::NotFound);
    }

    #[test]
    fn nested_wildcards_backtrack_to_first_overall_match() {
        let payload = Payload::array([
            Payload::array([Payload::from(1.0), Payload::from(2.0)]),
            Payload::array([Payload::from(3.0), Payload::from(4.0)]),
        ]);
        let p = path().wildcard().wildcard().build();
        match resolve(&p, &payload) {
            ResolveOutcome::Found { value, resolved_path } => {
                assert_eq!(value.as_f64(), Some(1.0));
                assert_eq!(
                    resolved_path.segments(),
                    &[PathSegment::Index(0), PathSegment::Index(0)]
                );
            }
            ResolveOutcome::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn nested_wildcards_backtrack_past_predicate_failures_to_the_first_holding_pair() {
        let payload = Payload::array([
            Payload::array([Payload::from(1.0), Payload::from(2.0)]),
            Payload::array([Payload::from(3.0), Payload::from(4.0)]),
        ]);
        let p = path().wildcard().wildcard().build();
        match resolve_matching(&p, &payload, &mut |v| v.as_f64() == Some(3.0)) {
            MatchOutcome::Matched { value, resolved_path } => {
                assert_eq!(value.as_f64(), Some(3.0));
                assert_eq!(
                    resolved_path.segments(),
                    &[PathSegment::Index(1), PathSegment::Index(0)]
                );
            }
            other => panic!("expected a predicate match, got {other:?}"),
        }
    }
}
