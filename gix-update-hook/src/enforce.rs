//! Access enforcement for a single reference update.
//!
//! Evaluation order, first outcome wins:
//! 1. no applicable rule → reject
//! 2. unrestricted access → accept, nothing else is checked
//! 3. reference creation or deletion → reject
//! 4. pairwise walk from the new tip: the first commit with a denied path
//!    rejects; running out of history before meeting the old tip rejects as
//!    a history rewrite; reaching the old tip violation-free accepts.

use gix::Repository;

use crate::acl::{AclRule, Privilege, ResolvedAcl};
use crate::refupdate::RefUpdate;
use crate::report::{Decision, Violation};
use crate::walk::{CommitPair, PairwiseWalk};
use crate::{diff, Error};

/// Default number of violation rows shown in a rejection report.
pub const DEFAULT_MAX_SHOW_VIOLATIONS: usize = 10;

/// Tunables for one enforcement run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum violation rows to collect for display; 0 means unlimited.
    ///
    /// This is a display cap, not a correctness cap: a commit with more
    /// violations than this still rejects, the report is just truncated.
    pub max_show_violations: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_show_violations: DEFAULT_MAX_SHOW_VIOLATIONS,
        }
    }
}

/// Decide whether `update` may be applied under `rules`.
///
/// Only repository/configuration failures are errors; every access outcome
/// is a [`Decision`].
pub fn evaluate(
    repo: &Repository,
    update: &RefUpdate,
    rules: &[AclRule],
    options: &Options,
) -> Result<Decision, Error> {
    let mut resolved = ResolvedAcl::resolve(rules, update.name());
    match resolved.privilege() {
        Privilege::None => return Ok(Decision::RejectedNoAcl),
        Privilege::Unrestricted => {
            tracing::debug!(ref_name = update.name(), "unrestricted access, accepting");
            return Ok(Decision::Accepted);
        }
        Privilege::Restricted => {}
    }

    let (old, new) = match update {
        RefUpdate::Create { .. } => return Ok(Decision::RejectedCreate),
        RefUpdate::Delete { .. } => return Ok(Decision::RejectedDelete),
        RefUpdate::Update { old, new, .. } => (*old, *new),
    };

    let mut walk = PairwiseWalk::new(repo, new, old);
    for pair in walk.by_ref() {
        let pair = pair?;
        let violations = scan_commit(repo, pair, &mut resolved, options.max_show_violations)?;
        if !violations.is_empty() {
            tracing::debug!(
                commit = %pair.child,
                count = violations.len(),
                "denied paths found, stopping the walk"
            );
            return Ok(Decision::RejectedViolations(violations));
        }
    }
    if walk.reached_base() {
        Ok(Decision::Accepted)
    } else {
        Ok(Decision::RejectedForcePush)
    }
}

/// Check every path the commit changed; denied paths become violations.
///
/// The whole diff of the offending commit is scanned so the report is
/// complete for that commit, except that with a non-zero cap scanning stops
/// once the cap is exceeded (one extra row marks the truncation).
fn scan_commit(
    repo: &Repository,
    pair: CommitPair,
    acl: &mut ResolvedAcl,
    cap: usize,
) -> Result<Vec<Violation>, Error> {
    let short_id = pair.child.to_hex_with_len(7).to_string();
    let mut violations = Vec::new();
    diff::for_each_change(repo, pair.parent, pair.child, &mut |kind, path| {
        if !acl.check_access(&path) {
            violations.push(Violation {
                commit: short_id.clone(),
                kind,
                path,
            });
            if cap > 0 && violations.len() > cap {
                return false;
            }
        }
        true
    })?;
    Ok(violations)
}
