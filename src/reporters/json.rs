//! Native JSON layout of the module tree
//!
//! Output can be read back with [`CoverageResult::load_modules`].

use crate::error::ReportResult;
use crate::model::CoverageResult;
use crate::source_root::SourceRootTranslator;

use super::{OutputType, Reporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn output_type(&self) -> OutputType {
        OutputType::File
    }

    fn format(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> Option<&'static str> {
        Some("json")
    }

    fn report(
        &self,
        result: &CoverageResult,
        _translator: &dyn SourceRootTranslator,
    ) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(&result.modules)?)
    }
}
