//! dirmirror core library: domain types, sync profiles, errors.
//!
//! Public API surface:
//! - [`types`]: path sets, partitions, results and sync options
//! - [`error`]: [`ConfigError`]
//! - [`profile`]: load / save sync profiles

pub mod error;
pub mod profile;
pub mod types;

pub use error::ConfigError;
pub use profile::SyncProfile;
pub use types::{
    CompareMode, DeletePolicy, Partition, PathSet, SyncOptions, SyncPlan, SyncResult,
};
