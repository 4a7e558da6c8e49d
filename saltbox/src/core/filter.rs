//! Path-component copy filter.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Ordered set of names excluded from recursive copies.
///
/// A relative path is excluded when any one of its components equals any
/// pattern exactly (case-sensitive). Patterns are not globs and are never
/// matched against the whole path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopyFilter {
    patterns: Vec<String>,
}

impl CopyFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when `relative` has a component matching a pattern.
    pub fn excludes(&self, relative: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        relative.components().any(|component| match component {
            Component::Normal(name) => self
                .patterns
                .iter()
                .any(|pattern| name == pattern.as_str()),
            _ => false,
        })
    }
}
