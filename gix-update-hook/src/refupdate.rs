//! Classification of the reference update the hook was invoked for.
//!
//! git invokes the update hook with `<ref-name> <old-rev> <new-rev>`, where
//! an all-zero object id stands for "the reference does not exist" (creation
//! when old, deletion when new). Both SHA-1 and SHA-256 null ids are
//! recognized.

use gix::ObjectId;

use crate::Error;

/// A single reference update as requested by the pushing client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefUpdate {
    /// Create a new reference pointing at `new`.
    Create { name: String, new: ObjectId },
    /// Move an existing reference from `old` to `new`.
    Update {
        name: String,
        old: ObjectId,
        new: ObjectId,
    },
    /// Delete an existing reference which pointed at `old`.
    Delete { name: String, old: ObjectId },
}

impl RefUpdate {
    /// Parse the hook's three positional arguments.
    ///
    /// Invariants enforced:
    /// - Create: old is zero, new is non-zero
    /// - Delete: new is zero, old is non-zero
    /// - Update: old and new are non-zero
    /// - Both zero → invalid
    pub fn parse(ref_name: &str, old_rev: &str, new_rev: &str) -> Result<Self, Error> {
        if ref_name.is_empty() {
            return Err(Error::invocation("empty reference name"));
        }

        let old_is_zero = is_all_zeros(old_rev);
        let new_is_zero = is_all_zeros(new_rev);
        if old_is_zero && new_is_zero {
            return Err(Error::invocation(
                "both old and new revisions are the null id",
            ));
        }

        let name = ref_name.to_owned();
        if old_is_zero {
            return Ok(RefUpdate::Create {
                name,
                new: parse_oid("new", new_rev)?,
            });
        }
        if new_is_zero {
            return Ok(RefUpdate::Delete {
                name,
                old: parse_oid("old", old_rev)?,
            });
        }
        Ok(RefUpdate::Update {
            name,
            old: parse_oid("old", old_rev)?,
            new: parse_oid("new", new_rev)?,
        })
    }

    /// The full name of the reference being updated.
    pub fn name(&self) -> &str {
        match self {
            RefUpdate::Create { name, .. } => name,
            RefUpdate::Update { name, .. } => name,
            RefUpdate::Delete { name, .. } => name,
        }
    }
}

fn parse_oid(role: &str, hex: &str) -> Result<ObjectId, Error> {
    ObjectId::from_hex(hex.as_bytes())
        .map_err(|err| Error::invocation(format!("invalid {role} revision '{hex}': {err}")))
}

/// True for the null id of any supported hash, i.e. a non-empty run of `0`.
fn is_all_zeros(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'0')
}
