//! Coverage data model
//!
//! The hierarchy handed over by the instrumentation/merge step:
//! module -> document -> class -> method -> {lines, branches}.
//!
//! Every level is an ordered map so that iteration (and therefore report
//! output) is stable across runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Line number (1-based) -> hit count
pub type Lines = BTreeMap<u32, u64>;

pub type Branches = Vec<BranchInfo>;

/// Method signature -> method
pub type Methods = BTreeMap<String, Method>;

/// Fully qualified class name -> methods
pub type Classes = BTreeMap<String, Methods>;

/// Source document path -> classes
pub type Documents = BTreeMap<String, Classes>;

/// Module identifier -> documents
pub type Modules = BTreeMap<String, Documents>;

/// One branch exit point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BranchInfo {
    pub line: u32,
    /// Offset of the branching instruction; all exits of one decision share it
    pub offset: u32,
    #[serde(default)]
    pub end_offset: u32,
    /// Outgoing edge, 0-based
    pub path: u32,
    pub ordinal: u32,
    pub hits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    #[serde(default)]
    pub lines: Lines,
    #[serde(default)]
    pub branches: Branches,
}

impl Method {
    pub fn new(lines: Lines, branches: Branches) -> Self {
        Self { lines, branches }
    }

    /// Branches recorded on the given source line
    pub fn branches_on_line(&self, line: u32) -> impl Iterator<Item = &BranchInfo> {
        self.branches.iter().filter(move |b| b.line == line)
    }

    pub fn is_branch_point(&self, line: u32) -> bool {
        self.branches.iter().any(|b| b.line == line)
    }
}

/// Run-wide switches resolved before reporting starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageParameters {
    /// Report must not contain machine-specific paths
    #[serde(default)]
    pub deterministic_report: bool,
    /// Document identity comes from source link, paths are kept verbatim
    #[serde(default)]
    pub use_source_link: bool,
}

/// Root of the coverage data handed to the reporters
#[derive(Debug, Clone, Default)]
pub struct CoverageResult {
    pub modules: Modules,
    pub parameters: CoverageParameters,
}

impl CoverageResult {
    pub fn new(modules: Modules, parameters: CoverageParameters) -> Self {
        Self {
            modules,
            parameters,
        }
    }

    /// Load the module tree from a JSON file in the instrumentation tool's layout
    pub fn load_modules(path: &std::path::Path) -> anyhow::Result<Modules> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read coverage file: {}", path.display()))?;
        let modules: Modules = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse coverage file: {}", path.display()))?;

        Ok(modules)
    }

    /// Every distinct document path across all modules, in order
    pub fn document_paths(&self) -> Vec<&str> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        self.modules
            .values()
            .flat_map(|documents| documents.keys())
            .map(String::as_str)
            .filter(|path| seen.insert(*path))
            .collect()
    }
}
