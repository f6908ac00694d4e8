//! Ordered access-control rules and their per-reference resolution.
//!
//! Rules arrive as an ordered list of `(ref_pattern, path_pattern, allow)`
//! triples. For one hook invocation they are filtered down to the rules that
//! apply to the reference being updated; path checks then evaluate the
//! filtered list in order, where the first matching rule wins and a path
//! matching no rule is denied.

use std::collections::HashMap;

use serde::Deserialize;

use crate::pattern::{self, Pattern};

/// Upper bound on memoized path verdicts held within one invocation.
const MAX_CACHED_PATHS: usize = 10_000;

/// One access-control rule. Order within the rule list is significant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRule")]
pub struct AclRule {
    /// Glob matched against the full reference name, e.g. `refs/heads/*`.
    pub ref_pattern: String,
    /// Glob matched against changed repository paths.
    pub path_pattern: String,
    /// Whether a path matching `path_pattern` may be modified.
    pub allow: bool,
}

/// Wire shape of a rule: a 3-element array with a bool-or-integer flag.
///
/// The producing layer historically serialized the allow flag as `0`/`1`.
#[derive(Deserialize)]
struct RawRule(String, String, Flag);

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<RawRule> for AclRule {
    fn from(raw: RawRule) -> Self {
        AclRule {
            ref_pattern: raw.0,
            path_pattern: raw.1,
            allow: match raw.2 {
                Flag::Bool(b) => b,
                Flag::Int(i) => i != 0,
            },
        }
    }
}

/// The requester's standing on the reference being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// No rule applies to this reference at all.
    None,
    /// Per-path rules apply; every changed path must be checked.
    Restricted,
    /// A catch-all allow precedes any denial; no further checks are needed.
    Unrestricted,
}

#[derive(Debug)]
struct Entry {
    pattern: Pattern,
    allow: bool,
}

/// The rules applicable to one reference, with an invocation-scoped verdict
/// cache.
///
/// The cache maps a changed path to its allow/deny verdict. It is sound only
/// because one `ResolvedAcl` sees exactly one rule list for its whole
/// lifetime; constructing it fresh per invocation is what keeps the
/// memoization honest. It must never outlive the rule list it was resolved
/// from.
#[derive(Debug)]
pub struct ResolvedAcl {
    entries: Vec<Entry>,
    cache: HashMap<String, bool>,
}

impl ResolvedAcl {
    /// Filter `rules` down to those whose `ref_pattern` matches `ref_name`,
    /// preserving order and compiling each path pattern once.
    pub fn resolve(rules: &[AclRule], ref_name: &str) -> Self {
        let entries: Vec<_> = rules
            .iter()
            .filter(|rule| pattern::matches(&rule.ref_pattern, ref_name))
            .map(|rule| Entry {
                pattern: Pattern::new(rule.path_pattern.as_str()),
                allow: rule.allow,
            })
            .collect();
        tracing::debug!(
            applicable = entries.len(),
            total = rules.len(),
            ref_name,
            "resolved access rules"
        );
        ResolvedAcl {
            entries,
            cache: HashMap::new(),
        }
    }

    /// Number of applicable rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no rule applies to the reference.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify the requester's standing on this reference.
    ///
    /// Scans rules in order and stops at the first explicit denial; a
    /// catch-all `"*"` allow found before that grants unrestricted access.
    pub fn privilege(&self) -> Privilege {
        if self.entries.is_empty() {
            return Privilege::None;
        }
        for entry in &self.entries {
            if !entry.allow {
                break;
            }
            if entry.pattern.is_match_all() {
                return Privilege::Unrestricted;
            }
        }
        Privilege::Restricted
    }

    /// Whether `path` may be modified: the allow flag of the first matching
    /// rule, deny if none matches.
    ///
    /// Verdicts are memoized per path for the lifetime of this value; a push
    /// touching the same path in many commits checks it once.
    pub fn check_access(&mut self, path: &str) -> bool {
        if let Some(&verdict) = self.cache.get(path) {
            return verdict;
        }
        let verdict = self
            .entries
            .iter()
            .find(|entry| entry.pattern.matches(path))
            .is_some_and(|entry| entry.allow);
        if self.cache.len() < MAX_CACHED_PATHS {
            self.cache.insert(path.to_owned(), verdict);
        }
        verdict
    }

    #[cfg(test)]
    fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}
