//! Coverage threshold validation

use colored::Colorize;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use super::summary::{summarize_modules, CoverageDetails, ModuleSummary};
use crate::model::CoverageResult;

/// Set of threshold categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThresholdTypeFlags(u8);

impl ThresholdTypeFlags {
    pub const NONE: Self = Self(0);
    pub const LINE: Self = Self(1);
    pub const BRANCH: Self = Self(1 << 1);
    pub const METHOD: Self = Self(1 << 2);
    pub const ALL: Self = Self(Self::LINE.0 | Self::BRANCH.0 | Self::METHOD.0);

    const SINGLE: [(Self, &'static str); 3] = [
        (Self::LINE, "line"),
        (Self::BRANCH, "branch"),
        (Self::METHOD, "method"),
    ];

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The single categories contained in this set
    pub fn iter(self) -> impl Iterator<Item = Self> {
        Self::SINGLE
            .into_iter()
            .map(|(flag, _)| flag)
            .filter(move |flag| self.contains(*flag))
    }

    fn name(self) -> &'static str {
        Self::SINGLE
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }
}

impl BitOr for ThresholdTypeFlags {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOrAssign for ThresholdTypeFlags {
    fn bitor_assign(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl fmt::Display for ThresholdTypeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(|flag| flag.name()).collect();
        f.write_str(&names.join(", "))
    }
}

impl FromStr for ThresholdTypeFlags {
    type Err = String;

    /// Accepts a comma separated list: `line,branch`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            flags |= match part.to_lowercase().as_str() {
                "line" => Self::LINE,
                "branch" => Self::BRANCH,
                "method" => Self::METHOD,
                other => {
                    return Err(format!(
                        "Unknown threshold type: {}. Supported: line, branch, method",
                        other
                    ))
                }
            };
        }
        Ok(flags)
    }
}

/// How per-module percentages are combined before comparing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdStatistic {
    /// Worst module must pass
    #[default]
    Minimum,
    /// Best module must pass
    Maximum,
    /// Mean of the module percentages must pass
    Average,
    /// Coverage pooled over all modules must pass
    Total,
}

/// Outcome for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCheck {
    pub category: ThresholdTypeFlags,
    /// None when there is no module to measure
    pub coverage: Option<f64>,
    pub threshold: f64,
    pub passed: bool,
}

impl CategoryCheck {
    pub fn delta(&self) -> Option<f64> {
        self.coverage.map(|coverage| coverage - self.threshold)
    }
}

/// Result of threshold validation
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdResult {
    pub statistic: ThresholdStatistic,
    pub failed: ThresholdTypeFlags,
    pub checks: Vec<CategoryCheck>,
}

impl ThresholdResult {
    pub fn passed(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn print_summary(&self) {
        for check in &self.checks {
            let status = if check.passed { "✓".green() } else { "✗".red() };
            let label = capitalize(check.category.name());

            match (check.coverage, check.delta()) {
                (Some(coverage), Some(delta)) => {
                    let delta_str = if delta >= 0.0 {
                        format!("+{:.1}%", delta).green()
                    } else {
                        format!("{:.1}%", delta).red()
                    };

                    println!(
                        "  {} {} coverage: {:.1}% (threshold: {:.1}%, {})",
                        status, label, coverage, check.threshold, delta_str
                    );
                }
                _ => {
                    println!(
                        "  {} {} coverage: {} (threshold: {:.1}%)",
                        status,
                        label,
                        "no modules instrumented".dimmed(),
                        check.threshold
                    );
                }
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn category_details(summary: &ModuleSummary, category: ThresholdTypeFlags) -> CoverageDetails {
    if category == ThresholdTypeFlags::BRANCH {
        summary.branch
    } else if category == ThresholdTypeFlags::METHOD {
        summary.method
    } else {
        summary.line
    }
}

fn aggregate(
    summaries: &[ModuleSummary],
    category: ThresholdTypeFlags,
    statistic: ThresholdStatistic,
) -> f64 {
    let percents = summaries
        .iter()
        .map(|summary| category_details(summary, category).percent());

    match statistic {
        ThresholdStatistic::Minimum => percents.fold(f64::INFINITY, f64::min),
        ThresholdStatistic::Maximum => percents.fold(f64::NEG_INFINITY, f64::max),
        ThresholdStatistic::Average => percents.sum::<f64>() / summaries.len() as f64,
        ThresholdStatistic::Total => summaries
            .iter()
            .map(|summary| category_details(summary, category))
            .sum::<CoverageDetails>()
            .percent(),
    }
}

/// Validate coverage against per-category minimum percentages
///
/// Keys may combine several categories; each contained category is checked
/// against the key's value. With no modules every configured category fails.
pub fn validate_threshold(
    result: &CoverageResult,
    thresholds: &BTreeMap<ThresholdTypeFlags, f64>,
    statistic: ThresholdStatistic,
) -> ThresholdResult {
    let summaries = summarize_modules(result);
    let mut failed = ThresholdTypeFlags::NONE;
    let mut checks = Vec::new();

    for (&categories, &threshold) in thresholds {
        for category in categories.iter() {
            let coverage = if summaries.is_empty() {
                None
            } else {
                Some(aggregate(&summaries, category, statistic))
            };

            let passed = coverage.map(|c| c >= threshold).unwrap_or(false);
            if !passed {
                failed |= category;
            }

            tracing::debug!(
                category = category.name(),
                ?coverage,
                threshold,
                passed,
                "threshold check"
            );

            checks.push(CategoryCheck {
                category,
                coverage,
                threshold,
                passed,
            });
        }
    }

    ThresholdResult {
        statistic,
        failed,
        checks,
    }
}

/// Categories whose coverage is below the configured minimum
pub fn get_threshold_types_below_threshold(
    result: &CoverageResult,
    thresholds: &BTreeMap<ThresholdTypeFlags, f64>,
    statistic: ThresholdStatistic,
) -> ThresholdTypeFlags {
    validate_threshold(result, thresholds, statistic).failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{lines, sample_modules, sample_result, single_module};
    use crate::model::{CoverageParameters, Method, Methods, Modules};

    fn thresholds(line: f64, method: f64, branch: f64) -> BTreeMap<ThresholdTypeFlags, f64> {
        BTreeMap::from([
            (ThresholdTypeFlags::LINE, line),
            (ThresholdTypeFlags::METHOD, method),
            (ThresholdTypeFlags::BRANCH, branch),
        ])
    }

    /// sample module plus a fully covered one
    fn two_module_result() -> CoverageResult {
        let mut methods = Methods::new();
        methods.insert(
            "System.Void B::Run()".to_string(),
            Method::new(lines(&[(1, 4), (2, 4), (3, 4), (4, 4), (5, 4)]), Vec::new()),
        );

        let mut modules = sample_modules();
        modules.extend(single_module("other", "b.cs", "B", methods));
        CoverageResult::new(modules, CoverageParameters::default())
    }

    #[test]
    fn test_line_below_threshold() {
        let failed = get_threshold_types_below_threshold(
            &sample_result(),
            &thresholds(90.0, 10.0, 10.0),
            ThresholdStatistic::Minimum,
        );
        assert_eq!(failed, ThresholdTypeFlags::LINE);
    }

    #[test]
    fn test_method_below_threshold() {
        let failed = get_threshold_types_below_threshold(
            &sample_result(),
            &thresholds(50.0, 75.0, 10.0),
            ThresholdStatistic::Minimum,
        );
        assert_eq!(failed, ThresholdTypeFlags::METHOD);
    }

    #[test]
    fn test_branch_below_threshold_total() {
        let failed = get_threshold_types_below_threshold(
            &sample_result(),
            &thresholds(50.0, 50.0, 90.0),
            ThresholdStatistic::Total,
        );
        assert_eq!(failed, ThresholdTypeFlags::BRANCH);
    }

    #[test]
    fn test_all_pass_average() {
        let result = validate_threshold(
            &sample_result(),
            &thresholds(50.0, 50.0, 50.0),
            ThresholdStatistic::Average,
        );
        assert!(result.passed());
        assert_eq!(result.failed, ThresholdTypeFlags::NONE);
        assert_eq!(result.checks.len(), 3);
    }

    #[test]
    fn test_all_fail() {
        let failed = get_threshold_types_below_threshold(
            &sample_result(),
            &thresholds(100.0, 100.0, 100.0),
            ThresholdStatistic::Minimum,
        );
        assert_eq!(failed, ThresholdTypeFlags::ALL);
    }

    #[test]
    fn test_no_modules_fails_every_configured_category() {
        let empty = CoverageResult::new(Modules::new(), CoverageParameters::default());

        for statistic in [
            ThresholdStatistic::Minimum,
            ThresholdStatistic::Maximum,
            ThresholdStatistic::Average,
            ThresholdStatistic::Total,
        ] {
            let failed = get_threshold_types_below_threshold(
                &empty,
                &thresholds(80.0, 80.0, 80.0),
                statistic,
            );
            assert_eq!(failed, ThresholdTypeFlags::ALL);
        }

        let only_line = BTreeMap::from([(ThresholdTypeFlags::LINE, 0.0)]);
        let failed =
            get_threshold_types_below_threshold(&empty, &only_line, ThresholdStatistic::Total);
        assert_eq!(failed, ThresholdTypeFlags::LINE);
    }

    #[test]
    fn test_single_module_collapses_all_statistics() {
        let result = sample_result();
        let config = thresholds(60.0, 51.0, 66.0);

        for statistic in [
            ThresholdStatistic::Minimum,
            ThresholdStatistic::Maximum,
            ThresholdStatistic::Average,
            ThresholdStatistic::Total,
        ] {
            let failed = get_threshold_types_below_threshold(&result, &config, statistic);
            assert_eq!(failed, ThresholdTypeFlags::METHOD);
        }
    }

    #[test]
    fn test_statistics_across_modules() {
        // module lines: 60% and 100%, pooled 8/10
        let result = two_module_result();
        let line = |value| BTreeMap::from([(ThresholdTypeFlags::LINE, value)]);

        let check = |value, statistic| {
            get_threshold_types_below_threshold(&result, &line(value), statistic)
        };

        assert_eq!(check(70.0, ThresholdStatistic::Minimum), ThresholdTypeFlags::LINE);
        assert_eq!(check(70.0, ThresholdStatistic::Maximum), ThresholdTypeFlags::NONE);
        assert_eq!(check(80.0, ThresholdStatistic::Average), ThresholdTypeFlags::NONE);
        assert_eq!(check(80.1, ThresholdStatistic::Average), ThresholdTypeFlags::LINE);
        assert_eq!(check(80.0, ThresholdStatistic::Total), ThresholdTypeFlags::NONE);
        assert_eq!(check(80.1, ThresholdStatistic::Total), ThresholdTypeFlags::LINE);
    }

    #[test]
    fn test_combined_key_checks_each_category() {
        let config = BTreeMap::from([(ThresholdTypeFlags::LINE | ThresholdTypeFlags::BRANCH, 65.0)]);
        let result = validate_threshold(&sample_result(), &config, ThresholdStatistic::Minimum);

        assert_eq!(result.failed, ThresholdTypeFlags::LINE);
        assert_eq!(result.checks.len(), 2);
        assert_eq!(result.checks[0].delta(), Some(-5.0));
    }

    #[test]
    fn test_unconfigured_categories_never_fail() {
        let config = BTreeMap::from([(ThresholdTypeFlags::BRANCH, 10.0)]);
        let failed =
            get_threshold_types_below_threshold(&sample_result(), &config, ThresholdStatistic::Minimum);
        assert_eq!(failed, ThresholdTypeFlags::NONE);
    }

    #[test]
    fn test_parse_and_display_flags() {
        let flags: ThresholdTypeFlags = "line, Method".parse().unwrap();
        assert!(flags.contains(ThresholdTypeFlags::LINE));
        assert!(flags.contains(ThresholdTypeFlags::METHOD));
        assert!(!flags.contains(ThresholdTypeFlags::BRANCH));
        assert_eq!(flags.to_string(), "line, method");
        assert_eq!(ThresholdTypeFlags::NONE.to_string(), "none");

        assert!("lines".parse::<ThresholdTypeFlags>().is_err());
    }
}
