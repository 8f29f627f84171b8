//! TeamCity service messages
//!
//! Six `buildStatisticValue` lines with the absolute line, branch and method
//! counts. TeamCity derives the percentages itself.

use std::fmt::Write;

use crate::coverage::{
    calculate_branch_coverage, calculate_line_coverage, calculate_method_coverage,
    CoverageDetails,
};
use crate::error::{ReportError, ReportResult};
use crate::model::CoverageResult;
use crate::source_root::SourceRootTranslator;

use super::format::format_max_two_decimals;
use super::{OutputType, Reporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct TeamCityReporter;

impl Reporter for TeamCityReporter {
    fn output_type(&self) -> OutputType {
        OutputType::Console
    }

    fn format(&self) -> &'static str {
        "teamcity"
    }

    fn extension(&self) -> Option<&'static str> {
        None
    }

    fn report(
        &self,
        result: &CoverageResult,
        _translator: &dyn SourceRootTranslator,
    ) -> ReportResult<String> {
        if result.parameters.deterministic_report {
            return Err(ReportError::DeterministicNotSupported {
                format: self.format(),
            });
        }

        let mut output = String::new();
        write_pair(&mut output, "L", calculate_line_coverage(result));
        write_pair(&mut output, "B", calculate_branch_coverage(result));
        write_pair(&mut output, "M", calculate_method_coverage(result));

        Ok(output)
    }
}

/// `CodeCoverageAbs{kind}Covered` then `CodeCoverageAbs{kind}Total`
fn write_pair(output: &mut String, kind: &str, details: CoverageDetails) {
    write_service_message(
        output,
        &format!("CodeCoverageAbs{}Covered", kind),
        details.covered as f64,
    );
    write_service_message(
        output,
        &format!("CodeCoverageAbs{}Total", kind),
        details.total as f64,
    );
}

fn write_service_message(output: &mut String, key: &str, value: f64) {
    let _ = writeln!(
        output,
        "##teamcity[buildStatisticValue key='{}' value='{}']",
        key,
        format_max_two_decimals(value)
    );
}
