//! LCOV tracefile writer

use std::fmt::Write;

use crate::coverage::{
    calculate_branch_coverage, calculate_line_coverage, calculate_method_coverage,
};
use crate::error::ReportResult;
use crate::model::CoverageResult;
use crate::source_root::SourceRootTranslator;

use super::{OutputType, Reporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct LcovReporter;

impl Reporter for LcovReporter {
    fn output_type(&self) -> OutputType {
        OutputType::File
    }

    fn format(&self) -> &'static str {
        "lcov"
    }

    fn extension(&self) -> Option<&'static str> {
        Some("info")
    }

    fn report(
        &self,
        result: &CoverageResult,
        translator: &dyn SourceRootTranslator,
    ) -> ReportResult<String> {
        let mut out = String::new();

        for documents in result.modules.values() {
            for (document, classes) in documents {
                let path = if result.parameters.deterministic_report {
                    translator.resolve_deterministic_path(document)
                } else {
                    document.clone()
                };
                let _ = writeln!(out, "SF:{}", path);

                for methods in classes.values() {
                    for (signature, method) in methods {
                        if let Some((&first_line, &first_hits)) = method.lines.iter().next() {
                            let _ = writeln!(out, "FN:{},{}", first_line, signature);
                            let _ = writeln!(out, "FNDA:{},{}", first_hits, signature);
                        }

                        for (line, hits) in &method.lines {
                            let _ = writeln!(out, "DA:{},{}", line, hits);
                        }

                        for branch in &method.branches {
                            let _ = writeln!(
                                out,
                                "BRDA:{},{},{},{}",
                                branch.line, branch.offset, branch.path, branch.hits
                            );
                        }
                    }
                }

                let lines = calculate_line_coverage(classes);
                let branches = calculate_branch_coverage(classes);
                let methods = calculate_method_coverage(classes);

                let _ = writeln!(out, "LF:{}", lines.total);
                let _ = writeln!(out, "LH:{}", lines.covered);
                let _ = writeln!(out, "BRF:{}", branches.total);
                let _ = writeln!(out, "BRH:{}", branches.covered);
                let _ = writeln!(out, "FNF:{}", methods.total);
                let _ = writeln!(out, "FNH:{}", methods.covered);
                let _ = writeln!(out, "end_of_record");
            }
        }

        Ok(out)
    }
}
