//! Decision rendering and process-exit mapping.

use std::fmt::Write as _;

use crate::diff::ChangeKind;

/// A path a commit changed without permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Abbreviated id of the offending commit.
    pub commit: String,
    /// How the path changed.
    pub kind: ChangeKind,
    /// The denied path.
    pub path: String,
}

/// The terminal outcome of evaluating one reference update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The update may be applied.
    Accepted,
    /// No access rule applies to this reference for this user.
    RejectedNoAcl,
    /// Creating the reference requires unrestricted access.
    RejectedCreate,
    /// Deleting the reference requires unrestricted access.
    RejectedDelete,
    /// The pushed history does not contain the reference's old tip.
    RejectedForcePush,
    /// One or more commits changed paths the user may not modify.
    RejectedViolations(Vec<Violation>),
}

impl Decision {
    /// True if the update may be applied.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }

    /// Process exit status for git: 0 applies the update, anything else
    /// rejects it.
    pub fn exit_code(&self) -> i32 {
        if self.is_accepted() {
            0
        } else {
            1
        }
    }

    /// Render the user-facing message for this decision.
    ///
    /// Violation rows are truncated at `max_show` (0 = unlimited) with a
    /// trailing marker; every rejection names the user and the reference.
    pub fn render(&self, user: &str, ref_name: &str, max_show: usize) -> String {
        match self {
            Decision::Accepted => {
                format!("All changes by '{user}' are authorized, updating '{ref_name}'.")
            }
            Decision::RejectedNoAcl => {
                format!("User '{user}' has no access rules for '{ref_name}'; push rejected.")
            }
            Decision::RejectedCreate => {
                format!("User '{user}' is not allowed to create '{ref_name}'.")
            }
            Decision::RejectedDelete => {
                format!("User '{user}' is not allowed to delete '{ref_name}'.")
            }
            Decision::RejectedForcePush => {
                format!(
                    "User '{user}' tried to rewrite the history of '{ref_name}'. \
                     Fetch the current tip and rebase your changes onto it, \
                     then push again."
                )
            }
            Decision::RejectedViolations(violations) => {
                render_violations(user, ref_name, violations, max_show)
            }
        }
    }
}

fn render_violations(
    user: &str,
    ref_name: &str,
    violations: &[Violation],
    max_show: usize,
) -> String {
    let mut out = format!(
        "User '{user}' is not allowed to change the following paths on '{ref_name}':\n"
    );
    let shown = if max_show == 0 {
        violations.len()
    } else {
        violations.len().min(max_show)
    };
    for violation in &violations[..shown] {
        let _ = writeln!(
            out,
            "  {}  {:<8}  {}",
            violation.commit,
            violation.kind.label(),
            violation.path
        );
    }
    if violations.len() > shown {
        out.push_str("  ... and more!\n");
    }
    out
}
