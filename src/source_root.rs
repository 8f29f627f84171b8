//! Source root translation for deterministic reports
//!
//! Deterministic builds map local checkout roots to a stable prefix
//! (usually `/_/`), so reports do not leak machine-specific paths.

use std::collections::BTreeMap;

pub trait SourceRootTranslator: Send + Sync {
    /// Environment independent form of a local document path
    fn resolve_deterministic_path(&self, original: &str) -> String;
}

/// Returns every path unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl SourceRootTranslator for IdentityTranslator {
    fn resolve_deterministic_path(&self, original: &str) -> String {
        original.to_string()
    }
}

/// Prefix based mapping from local roots to deterministic roots
#[derive(Debug, Clone, Default)]
pub struct SourceRootMapping {
    roots: Vec<(String, String)>,
}

impl SourceRootMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, local: impl Into<String>, mapped: impl Into<String>) -> Self {
        self.roots.push((local.into(), mapped.into()));
        self
    }

    pub fn from_map(roots: &BTreeMap<String, String>) -> Self {
        roots
            .iter()
            .fold(Self::new(), |mapping, (local, mapped)| mapping.with_root(local, mapped))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl SourceRootTranslator for SourceRootMapping {
    fn resolve_deterministic_path(&self, original: &str) -> String {
        let best = self
            .roots
            .iter()
            .filter(|(local, _)| original.starts_with(local.as_str()))
            .max_by_key(|(local, _)| local.len());

        match best {
            Some((local, mapped)) => {
                let rest = original[local.len()..].replace('\\', "/");
                format!("{}{}", mapped, rest)
            }
            None => original.to_string(),
        }
    }
}
