//! First-parent ancestry walk yielding (parent, child) commit pairs.
//!
//! The walk starts at the pushed tip and descends along first parents: pair
//! 0 is `(parent(tip), tip)`, pair 1 is `(grandparent, parent)`, and so on.
//! It ends successfully the moment a pair's parent equals the previously
//! recorded tip; it ends without reaching it when a parentless commit is
//! found first, which means the pushed history does not contain the old tip
//! (a history rewrite).

use gix::objs::{CommitRef, Kind};
use gix::{ObjectId, Repository};

use crate::Error;

/// A commit together with its first parent; the child's tree is what the
/// commit changed relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitPair {
    /// The first parent of `child`.
    pub parent: ObjectId,
    /// The commit whose changes are attributed to the pushing user.
    pub child: ObjectId,
}

/// Iterator over [`CommitPair`]s from a pushed tip back towards a base.
pub struct PairwiseWalk<'repo> {
    repo: &'repo Repository,
    cursor: ObjectId,
    base: ObjectId,
    reached_base: bool,
    done: bool,
}

impl<'repo> PairwiseWalk<'repo> {
    /// Walk from `tip` backwards until `base` is seen as a parent.
    pub fn new(repo: &'repo Repository, tip: ObjectId, base: ObjectId) -> Self {
        PairwiseWalk {
            repo,
            cursor: tip,
            base,
            reached_base: false,
            done: false,
        }
    }

    /// True once the walk ended by reaching the base commit.
    ///
    /// Meaningful only after the iterator returned `None`; a walk that ran
    /// out of history first leaves this `false`.
    pub fn reached_base(&self) -> bool {
        self.reached_base
    }

    fn first_parent(&self, id: ObjectId) -> Result<Option<ObjectId>, Error> {
        let object = self
            .repo
            .find_object(id)
            .map_err(|err| Error::repository(format!("failed to find commit {id}: {err}")))?;
        if object.kind != Kind::Commit {
            return Err(Error::repository(format!(
                "object {id} is a {}, expected a commit",
                object.kind
            )));
        }
        let commit = CommitRef::from_bytes(&object.data)
            .map_err(|err| Error::repository(format!("failed to parse commit {id}: {err}")))?;
        let first_parent = commit.parents().next();
        Ok(first_parent)
    }
}

impl Iterator for PairwiseWalk<'_> {
    type Item = Result<CommitPair, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let parent = match self.first_parent(self.cursor) {
            Ok(parent) => parent,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        match parent {
            // Root commit: history is exhausted without meeting the base.
            None => {
                self.done = true;
                None
            }
            Some(parent) => {
                let pair = CommitPair {
                    parent,
                    child: self.cursor,
                };
                if parent == self.base {
                    self.reached_base = true;
                    self.done = true;
                }
                self.cursor = parent;
                Some(Ok(pair))
            }
        }
    }
}
