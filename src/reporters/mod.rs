//! Report formats
//!
//! Provides:
//! - Cobertura XML
//! - TeamCity service messages
//! - LCOV tracefile
//! - JSON module tree
//! - Console summary tables

mod cobertura;
mod console;
mod format;
mod json;
mod lcov;
mod teamcity;
mod xml;

pub use cobertura::{get_base_paths, get_relative_path_from_base, CoberturaReporter};
pub use console::{render_summary, render_table};
pub use format::{format_invariant, format_max_two_decimals};
pub use json::JsonReporter;
pub use lcov::LcovReporter;
pub use teamcity::TeamCityReporter;
pub use xml::{to_xml_string, XmlElement, XmlNode};

use crate::error::{ReportError, ReportResult};
use crate::model::CoverageResult;
use crate::source_root::SourceRootTranslator;

/// Where a reporter's text is meant to go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    File,
    Console,
}

pub trait Reporter: Send + Sync {
    fn output_type(&self) -> OutputType;

    /// Short name used to select the reporter
    fn format(&self) -> &'static str;

    /// File extension without leading dot; `None` for console reporters
    fn extension(&self) -> Option<&'static str>;

    /// Render the report; never mutates `result`
    fn report(
        &self,
        result: &CoverageResult,
        translator: &dyn SourceRootTranslator,
    ) -> ReportResult<String>;
}

pub const REPORT_FORMATS: [&str; 4] = ["cobertura", "teamcity", "lcov", "json"];

/// Create a reporter from its format name (case insensitive)
pub fn create_reporter(format: &str) -> ReportResult<Box<dyn Reporter>> {
    match format.to_lowercase().as_str() {
        "cobertura" => Ok(Box::new(CoberturaReporter::new())),
        "teamcity" => Ok(Box::new(TeamCityReporter)),
        "lcov" => Ok(Box::new(LcovReporter)),
        "json" => Ok(Box::new(JsonReporter)),
        _ => Err(ReportError::UnknownFormat(format.to_string())),
    }
}

/// Module file name without directory and last extension
pub(crate) fn module_name(module: &str) -> &str {
    let file = module.rsplit(['/', '\\']).next().unwrap_or(module);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_result;
    use crate::source_root::IdentityTranslator;
    use std::sync::Arc;

    #[test]
    fn test_create_reporter() {
        for format in REPORT_FORMATS {
            let reporter = create_reporter(format).unwrap();
            assert_eq!(reporter.format(), format);
        }

        let reporter = create_reporter("Cobertura").unwrap();
        assert_eq!(reporter.output_type(), OutputType::File);
        assert_eq!(reporter.extension(), Some("cobertura.xml"));

        assert_eq!(create_reporter("lcov").unwrap().extension(), Some("info"));
        assert_eq!(
            create_reporter("teamcity").unwrap().output_type(),
            OutputType::Console
        );
    }

    #[test]
    fn test_unknown_format() {
        let err = create_reporter("html").err().unwrap();
        assert!(matches!(err, ReportError::UnknownFormat(ref name) if name == "html"));
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("Covrep.Core.dll"), "Covrep.Core");
        assert_eq!(module_name("module"), "module");
        assert_eq!(module_name(r"C:\bin\App.exe"), "App");
        assert_eq!(module_name("/usr/lib/libcalc.so"), "libcalc");
    }

    #[test]
    fn test_reporters_run_concurrently_on_shared_result() {
        let result = Arc::new(sample_result());

        let handles: Vec<_> = ["lcov", "json", "teamcity"]
            .into_iter()
            .map(|format| {
                let result = Arc::clone(&result);
                std::thread::spawn(move || {
                    create_reporter(format)
                        .unwrap()
                        .report(&result, &IdentityTranslator)
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert!(!handle.join().unwrap().is_empty());
        }
    }
}
