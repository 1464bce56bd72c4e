//! Sync profiles stored as YAML.
//!
//! # Storage layout
//!
//! ```text
//! ~/.dirmirror/
//!   profiles/
//!     <name>.yaml     (one file per profile, mode 0600)
//! ```
//!
//! A profile can also live anywhere on disk and be loaded by path with
//! [`load_profile_at`].
//!
//! # API pattern
//!
//! Named-profile functions come in two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CompareMode, DeletePolicy, SyncOptions};

/// A saved source/destination pair with the options to mirror it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProfile {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_delete")]
    pub delete: bool,
    #[serde(default)]
    pub compare: CompareMode,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

fn default_delete() -> bool {
    true
}

impl SyncProfile {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            exclude: Vec::new(),
            delete: default_delete(),
            compare: CompareMode::default(),
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            delete: self.delete,
            compare: self.compare,
            delete_policy: self.delete_policy,
            exclude: self.exclude.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.dirmirror/profiles/<name>.yaml`: pure, no I/O.
pub fn profile_path_at(home: &Path, name: &str) -> PathBuf {
    home.join(".dirmirror")
        .join("profiles")
        .join(format!("{name}.yaml"))
}

/// Names of every `*.yaml` under `<home>/.dirmirror/profiles/`, sorted.
pub fn list_profile_names_at(home: &Path) -> Result<Vec<String>, ConfigError> {
    let dir = home.join(".dirmirror").join("profiles");
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<String> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

/// `list_profile_names_at` convenience wrapper.
pub fn list_profile_names() -> Result<Vec<String>, ConfigError> {
    list_profile_names_at(&home()?)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a profile from an explicit file.
///
/// Returns `ConfigError::ProfileNotFound` if absent,
/// `ConfigError::Parse` (with path context) if malformed YAML.
pub fn load_profile_at(path: &Path) -> Result<SyncProfile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ProfileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the named profile from `<home>/.dirmirror/profiles/<name>.yaml`.
pub fn load_named_at(home: &Path, name: &str) -> Result<SyncProfile, ConfigError> {
    load_profile_at(&profile_path_at(home, name))
}

/// `load_named_at` convenience wrapper.
pub fn load_named(name: &str) -> Result<SyncProfile, ConfigError> {
    load_named_at(&home()?, name)
}

// ---------------------------------------------------------------------------
// 3. Save
// ---------------------------------------------------------------------------

/// Atomically save a profile to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// Creates the parent directory if needed.
pub fn save_profile_at(path: &Path, profile: &SyncProfile) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(profile)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Save under `<home>/.dirmirror/profiles/<name>.yaml`.
pub fn save_named_at(home: &Path, name: &str, profile: &SyncProfile) -> Result<(), ConfigError> {
    save_profile_at(&profile_path_at(home, name), profile)
}

/// `save_named_at` convenience wrapper.
pub fn save_named(name: &str, profile: &SyncProfile) -> Result<(), ConfigError> {
    save_named_at(&home()?, name, profile)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
