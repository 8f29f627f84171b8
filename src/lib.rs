//! covrep - coverage aggregation and reporting
//!
//! Takes the module/document/class/method hit-count tree produced by an
//! instrumentation run and:
//! - Computes line, branch and method coverage and cyclomatic complexity
//! - Gates the run on per-category thresholds (minimum/maximum/average/total)
//! - Renders Cobertura XML, TeamCity service messages, LCOV and JSON reports

pub mod config;
pub mod coverage;
pub mod error;
pub mod execution;
pub mod model;
pub mod report_writer;
pub mod reporters;
pub mod source_root;

#[cfg(test)]
mod fixtures;

pub use coverage::{
    calculate_branch_coverage, calculate_cyclomatic_complexity, calculate_line_coverage,
    calculate_method_coverage, get_threshold_types_below_threshold, validate_threshold,
    CoverageDetails, CoverageScope, ThresholdResult, ThresholdStatistic, ThresholdTypeFlags,
};
pub use error::{ReportError, ReportResult};
pub use model::{BranchInfo, CoverageParameters, CoverageResult, Method, Modules};
pub use report_writer::{ReportOutput, ReportWriter};
pub use reporters::{create_reporter, OutputType, Reporter};
pub use source_root::{IdentityTranslator, SourceRootMapping, SourceRootTranslator};
