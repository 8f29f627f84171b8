//! Coverage statistics
//!
//! Line, branch and method coverage plus cyclomatic complexity. The leaf
//! functions work on a single method's data; everything above that folds
//! the per-method results through [`CoverageScope`].

use std::collections::BTreeSet;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::model::{
    BranchInfo, Classes, CoverageResult, Documents, Lines, Method, Methods, Modules,
};

/// Covered/total counts for one statistic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageDetails {
    pub covered: u64,
    pub total: u64,
}

impl CoverageDetails {
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    /// Ten-thousandths covered, floored; 10000 when nothing is trackable
    fn basis_points(&self) -> u64 {
        if self.total == 0 {
            return 10_000;
        }
        self.covered * 10_000 / self.total
    }

    /// Percentage floored to two decimals
    pub fn percent(&self) -> f64 {
        self.basis_points() as f64 / 100.0
    }

    /// Percentage as a 0..=1 fraction, divided once so `2/3` prints as `0.6666`
    pub fn rate(&self) -> f64 {
        self.basis_points() as f64 / 10_000.0
    }
}

impl Add for CoverageDetails {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            covered: self.covered + other.covered,
            total: self.total + other.total,
        }
    }
}

impl AddAssign for CoverageDetails {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for CoverageDetails {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Any level of the hierarchy that can enumerate the methods below it
pub trait CoverageScope {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a>;
}

impl CoverageScope for Method {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        Box::new(std::iter::once(self))
    }
}

impl CoverageScope for Methods {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        Box::new(self.values())
    }
}

impl CoverageScope for Classes {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        Box::new(self.values().flat_map(|methods| methods.values()))
    }
}

impl CoverageScope for Documents {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        Box::new(self.values().flat_map(|classes| classes.methods()))
    }
}

impl CoverageScope for Modules {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        Box::new(self.values().flat_map(|documents| documents.methods()))
    }
}

impl CoverageScope for CoverageResult {
    fn methods<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Method> + 'a> {
        self.modules.methods()
    }
}

pub fn line_coverage(lines: &Lines) -> CoverageDetails {
    CoverageDetails {
        covered: lines.values().filter(|&&hits| hits > 0).count() as u64,
        total: lines.len() as u64,
    }
}

/// Every record counts on its own, exits of one decision are not merged
pub fn branch_coverage<'a, I>(branches: I) -> CoverageDetails
where
    I: IntoIterator<Item = &'a BranchInfo>,
{
    branches
        .into_iter()
        .fold(CoverageDetails::default(), |mut details, branch| {
            details.total += 1;
            if branch.hits > 0 {
                details.covered += 1;
            }
            details
        })
}

/// A method without lines is neither covered nor missed
pub fn method_coverage(method: &Method) -> CoverageDetails {
    if method.lines.is_empty() {
        return CoverageDetails::default();
    }
    let covered = line_coverage(&method.lines).covered > 0;
    CoverageDetails::new(u64::from(covered), 1)
}

/// Number of distinct decision points, at least 1
pub fn cyclomatic_complexity<'a, I>(branches: I) -> u64
where
    I: IntoIterator<Item = &'a BranchInfo>,
{
    let decisions: BTreeSet<(u32, u32)> = branches
        .into_iter()
        .map(|branch| (branch.line, branch.offset))
        .collect();
    (decisions.len() as u64).max(1)
}

pub fn calculate_line_coverage<S: CoverageScope + ?Sized>(scope: &S) -> CoverageDetails {
    scope.methods().map(|method| line_coverage(&method.lines)).sum()
}

pub fn calculate_branch_coverage<S: CoverageScope + ?Sized>(scope: &S) -> CoverageDetails {
    scope.methods().map(|method| branch_coverage(&method.branches)).sum()
}

pub fn calculate_method_coverage<S: CoverageScope + ?Sized>(scope: &S) -> CoverageDetails {
    scope.methods().map(method_coverage).sum()
}

pub fn calculate_cyclomatic_complexity<S: CoverageScope + ?Sized>(scope: &S) -> u64 {
    scope
        .methods()
        .map(|method| cyclomatic_complexity(&method.branches))
        .sum()
}

/// Line, branch and method coverage of one module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSummary {
    pub name: String,
    pub line: CoverageDetails,
    pub branch: CoverageDetails,
    pub method: CoverageDetails,
}

impl ModuleSummary {
    pub fn of(name: &str, documents: &Documents) -> Self {
        Self {
            name: name.to_string(),
            line: calculate_line_coverage(documents),
            branch: calculate_branch_coverage(documents),
            method: calculate_method_coverage(documents),
        }
    }
}

/// Per-module summaries in module order
pub fn summarize_modules(result: &CoverageResult) -> Vec<ModuleSummary> {
    result
        .modules
        .iter()
        .map(|(name, documents)| ModuleSummary::of(name, documents))
        .collect()
}
