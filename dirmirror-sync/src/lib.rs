//! # dirmirror-sync
//!
//! One-way directory mirroring.
//!
//! Call [`sync`] (or [`sync_with`] for excludes, policies and a custom
//! [`Copier`]) to make a destination tree mirror a source tree, or [`plan`]
//! to preview the same pass without touching the filesystem.

pub mod compare;
pub mod copier;
pub mod differ;
pub mod error;
pub mod exclude;
pub mod fs_ops;
pub mod orchestrator;
pub mod pipeline;
pub mod plan;

pub use compare::{entries_equal, has_changed};
pub use copier::{Copier, DefaultCopier};
pub use differ::{compare_directories, scan_tree};
pub use error::SyncError;
pub use exclude::ExcludeSet;
pub use fs_ops::{
    copy_file, create_directory, delete_entry, replace_with_directory, try_delete_entry,
};
pub use orchestrator::{is_real_dir, needs_update, sync, sync_with};
pub use plan::plan;
