//! Changed-path enumeration between the trees of two commits.
//!
//! This is a plain recursive merge of two trees: entries present on one side
//! only are reported (recursively, for whole added or removed directories),
//! entries present on both sides with differing content are reported as
//! modified, and an entry changing between directory and file is reported as
//! a deletion plus an addition. Renames are not detected; a rename shows up
//! as deleted + added.

use std::collections::BTreeMap;

use gix::objs::tree::EntryMode;
use gix::objs::{CommitRef, Kind, TreeRefIter};
use gix::{ObjectId, Repository};

use crate::Error;

/// How a path changed between a commit and its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The path exists only in the child commit.
    Added,
    /// The path exists only in the parent commit.
    Deleted,
    /// The path exists in both commits with different content or mode.
    Modified,
}

impl ChangeKind {
    /// Human-readable label used in violation reports.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        }
    }
}

/// A single changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The kind of change.
    pub kind: ChangeKind,
    /// The repository-relative path after the change; for deletions, the
    /// path the file had.
    pub path: String,
}

/// Invoke `visit` for every path that differs between the trees of the
/// `parent` and `child` commits, in depth-first lexicographic order.
///
/// `visit` returns whether enumeration should continue; returning `false`
/// stops the scan early.
pub fn for_each_change(
    repo: &Repository,
    parent: ObjectId,
    child: ObjectId,
    visit: &mut dyn FnMut(ChangeKind, String) -> bool,
) -> Result<(), Error> {
    let old_tree = commit_tree_id(repo, parent)?;
    let new_tree = commit_tree_id(repo, child)?;
    if old_tree != new_tree {
        diff_trees(repo, old_tree, new_tree, "", visit)?;
    }
    Ok(())
}

/// Collect every change between the trees of `parent` and `child`.
pub fn changed_paths(
    repo: &Repository,
    parent: ObjectId,
    child: ObjectId,
) -> Result<Vec<Change>, Error> {
    let mut changes = Vec::new();
    for_each_change(repo, parent, child, &mut |kind, path| {
        changes.push(Change { kind, path });
        true
    })?;
    Ok(changes)
}

fn commit_tree_id(repo: &Repository, id: ObjectId) -> Result<ObjectId, Error> {
    let object = repo
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
    Ok(commit.tree())
}

/// A tree flattened into (name → entry) order; git trees are sorted, the
/// map makes the two-sided merge below trivial.
fn tree_entries(repo: &Repository, id: ObjectId) -> Result<BTreeMap<String, TreeEntry>, Error> {
    let object = repo
        .find_object(id)
        .map_err(|err| Error::repository(format!("failed to find tree {id}: {err}")))?;
    if object.kind != Kind::Tree {
        return Err(Error::repository(format!(
            "object {id} is a {}, expected a tree",
            object.kind
        )));
    }
    let mut entries = BTreeMap::new();
    for entry in TreeRefIter::from_bytes(&object.data) {
        let entry =
            entry.map_err(|err| Error::repository(format!("failed to parse tree {id}: {err}")))?;
        entries.insert(
            entry.filename.to_string(),
            TreeEntry {
                id: entry.oid.to_owned(),
                mode: entry.mode,
            },
        );
    }
    Ok(entries)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreeEntry {
    id: ObjectId,
    mode: EntryMode,
}

/// Recursively diff two trees; returns whether enumeration should continue.
fn diff_trees(
    repo: &Repository,
    old: ObjectId,
    new: ObjectId,
    prefix: &str,
    visit: &mut dyn FnMut(ChangeKind, String) -> bool,
) -> Result<bool, Error> {
    let old_entries = tree_entries(repo, old)?;
    let new_entries = tree_entries(repo, new)?;

    let mut names: Vec<&String> = old_entries.keys().collect();
    for name in new_entries.keys() {
        if !old_entries.contains_key(name) {
            names.push(name);
        }
    }
    names.sort();

    for name in names {
        let path = format!("{prefix}{name}");
        let keep_going = match (old_entries.get(name), new_entries.get(name)) {
            (None, Some(added)) => emit_side(repo, added, &path, ChangeKind::Added, visit)?,
            (Some(removed), None) => emit_side(repo, removed, &path, ChangeKind::Deleted, visit)?,
            (Some(before), Some(after)) => {
                if before == after {
                    true
                } else if before.mode.is_tree() && after.mode.is_tree() {
                    diff_trees(repo, before.id, after.id, &format!("{path}/"), visit)?
                } else if before.mode.is_tree() || after.mode.is_tree() {
                    // Directory replaced by a file or vice versa.
                    emit_side(repo, before, &path, ChangeKind::Deleted, visit)?
                        && emit_side(repo, after, &path, ChangeKind::Added, visit)?
                } else {
                    visit(ChangeKind::Modified, path)
                }
            }
            (None, None) => unreachable!("name came from one of the two maps"),
        };
        if !keep_going {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Report an entry that exists on one side only: a leaf directly, a subtree
/// as every path below it.
fn emit_side(
    repo: &Repository,
    entry: &TreeEntry,
    path: &str,
    kind: ChangeKind,
    visit: &mut dyn FnMut(ChangeKind, String) -> bool,
) -> Result<bool, Error> {
    if !entry.mode.is_tree() {
        return Ok(visit(kind, path.to_owned()));
    }
    for (name, child) in tree_entries(repo, entry.id)? {
        let child_path = format!("{path}/{name}");
        if !emit_side(repo, &child, &child_path, kind, visit)? {
            return Ok(false);
        }
    }
    Ok(true)
}
