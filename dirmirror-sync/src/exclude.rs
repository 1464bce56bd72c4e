//! Exclude patterns applied to relative paths while scanning a tree.
//!
//! Each pattern is a regular expression anchored at the start of the
//! forward-slash relative path but not at its end, so `^\.git` and `\.git`
//! both exclude `.git/config`, while `cache` does not exclude `src/cache`.

use regex::Regex;

use crate::SyncError;

/// Compiled exclude patterns shared by both sides of a comparison.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    /// Compile `patterns`; the first invalid one is reported with its text.
    pub fn new<I, S>(patterns: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(&format!("^(?:{pattern})")).map_err(|source| SyncError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// `rel` must already be slash-normalized.
    pub fn is_excluded(&self, rel: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(rel))
    }
}
