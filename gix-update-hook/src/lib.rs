/*!
Path-based access control for server-side git reference updates.

This crate implements the decision core of an `update` hook: given the
reference update git is about to apply and a per-request, ordered list of
access-control rules, it walks the pushed commit range, diffs each commit
against its first parent and decides whether the pushing user touched only
paths they are allowed to modify. Non-fast-forward updates, reference
creations and deletions require unrestricted access to the reference.

The crate performs no repository writes and holds no state across
invocations; the calling transport is expected to run one hook process per
attempted reference update.

Design principles
- Access decisions are values ([`Decision`]), not errors; only malformed
  input or failing repository reads surface as [`Error`].
- All pattern/ACL evaluation is deterministic and scoped to one invocation.
*/

#![forbid(unsafe_code)]

pub mod acl;
pub mod auth;
pub mod diff;
pub mod enforce;
pub mod pattern;
pub mod refupdate;
pub mod report;
pub mod walk;

pub use acl::{AclRule, Privilege, ResolvedAcl};
pub use auth::Credential;
pub use diff::ChangeKind;
pub use enforce::{evaluate, Options};
pub use refupdate::RefUpdate;
pub use report::{Decision, Violation};
pub use walk::{CommitPair, PairwiseWalk};

/// Error type for operations provided by this crate.
///
/// Access-control outcomes are not errors; see [`report::Decision`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The hook was invoked with arguments it cannot interpret, e.g. malformed object ids.
    #[error("invalid invocation: {0}")]
    Invocation(String),
    /// The environment-carried credential token was missing or unparseable.
    #[error("invalid credential token: {0}")]
    Credential(String),
    /// Reading or decoding repository objects failed.
    #[error("repository error: {0}")]
    Repository(String),
    /// I/O errors from filesystem or OS interactions.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an [`Error::Invocation`] from a message.
    pub fn invocation(msg: impl Into<String>) -> Self {
        Error::Invocation(msg.into())
    }

    /// Create an [`Error::Credential`] from a message.
    pub fn credential(msg: impl Into<String>) -> Self {
        Error::Credential(msg.into())
    }

    /// Create an [`Error::Repository`] from a message.
    pub fn repository(msg: impl Into<String>) -> Self {
        Error::Repository(msg.into())
    }
}
