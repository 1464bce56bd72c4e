//! Domain types for a single mirror pass.
//!
//! Relative paths inside a tree are always forward-slash `String`s; absolute
//! paths handed back to callers are `PathBuf`s.
//! Result and plan types are serializable via serde for `--json` output.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Path sets
// ---------------------------------------------------------------------------

/// Relative paths of every entry below a tree root, slash-normalized.
///
/// Ordered so that a parent directory is always visited before its children.
pub type PathSet = BTreeSet<String>;

/// Three-way split of two path sets.
///
/// `source_only`, `dest_only` and `common` are pairwise disjoint;
/// `source_only ∪ common` is the source set and `dest_only ∪ common` is the
/// destination set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub source_only: PathSet,
    pub dest_only: PathSet,
    pub common: PathSet,
    /// Some part of the source tree could not be read, so `dest_only` may
    /// list entries that still exist on the source side.
    #[serde(default)]
    pub source_incomplete: bool,
}

impl Partition {
    pub fn from_sets(src: PathSet, dst: PathSet) -> Self {
        let common: PathSet = src.intersection(&dst).cloned().collect();
        let source_only = src.difference(&common).cloned().collect();
        let dest_only = dst.difference(&common).cloned().collect();
        Self {
            source_only,
            dest_only,
            common,
            source_incomplete: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source_only.is_empty() && self.dest_only.is_empty() && self.common.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How a file present on both sides is judged unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Byte-for-byte comparison of file contents.
    #[default]
    Content,
    /// Modification times truncated to whole seconds.
    Timestamp,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::Content => write!(f, "content"),
            CompareMode::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// What happens when removing a destination-only entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Log the failure and keep going; the path is still reported as deleted.
    #[default]
    BestEffort,
    /// Abort the pass on the first removal failure.
    Strict,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletePolicy::BestEffort => write!(f, "best_effort"),
            DeletePolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Per-invocation knobs for a mirror pass. Nothing here outlives the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Remove destination entries that have no source counterpart.
    pub delete: bool,
    pub compare: CompareMode,
    pub delete_policy: DeletePolicy,
    /// Regular expressions matched from the start of each relative path.
    pub exclude: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delete: true,
            compare: CompareMode::default(),
            delete_policy: DeletePolicy::default(),
            exclude: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Destination entries actually touched by a pass, in the order applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub created: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

impl SyncResult {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }
}

/// Destination entries a pass *would* touch. Computing it mutates nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub create: Vec<PathBuf>,
    pub modify: Vec<PathBuf>,
    pub delete: Vec<PathBuf>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.modify.is_empty() && self.delete.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
