//! Report dispatch: file name derivation and writing
//!
//! File reporters write to `<output>` (a directory or a file name); console
//! reporters hand their text back to the caller for printing.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::execution::RetryConfig;
use crate::model::CoverageResult;
use crate::reporters::{OutputType, Reporter};
use crate::source_root::SourceRootTranslator;

const DEFAULT_FILE_STEM: &str = "coverage";

/// What happened to a rendered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutput {
    File(PathBuf),
    Console(String),
}

/// Output file for a file reporter
///
/// - `dir/` -> `dir/coverage[.tfm].<extension>`
/// - `dir/file` -> `dir/file[.tfm].<extension>`
/// - `dir/file.ext` -> `dir/file[.tfm].ext`
pub fn output_file_name(output: &str, extension: &str, target_framework: Option<&str>) -> String {
    let qualifier = target_framework
        .filter(|tfm| !tfm.is_empty())
        .map(|tfm| format!(".{}", tfm))
        .unwrap_or_default();

    if output.is_empty() || output.ends_with('/') || output.ends_with('\\') {
        return format!("{}{}{}.{}", output, DEFAULT_FILE_STEM, qualifier, extension);
    }

    let file_start = output.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match output[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = file_start + dot;
            format!("{}{}{}", &output[..dot], qualifier, &output[dot..])
        }
        _ => format!("{}{}.{}", output, qualifier, extension),
    }
}

pub struct ReportWriter {
    output: String,
    target_framework: Option<String>,
    retry: RetryConfig,
}

impl ReportWriter {
    pub fn new(output: impl Into<String>, target_framework: Option<String>) -> Self {
        Self {
            output: output.into(),
            target_framework,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Render with `reporter` and deliver the text where it belongs
    pub fn write_report(
        &self,
        reporter: &dyn Reporter,
        result: &CoverageResult,
        translator: &dyn SourceRootTranslator,
    ) -> Result<ReportOutput> {
        let content = reporter
            .report(result, translator)
            .with_context(|| format!("Failed to generate {} report", reporter.format()))?;

        let extension = match (reporter.output_type(), reporter.extension()) {
            (OutputType::File, Some(extension)) => extension,
            _ => return Ok(ReportOutput::Console(content)),
        };

        let path = PathBuf::from(output_file_name(
            &self.output,
            extension,
            self.target_framework.as_deref(),
        ));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        self.retry
            .run(|| fs::write(&path, &content))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        tracing::debug!(format = reporter.format(), path = %path.display(), "report written");
        Ok(ReportOutput::File(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_result;
    use crate::reporters::{create_reporter, CoberturaReporter, LcovReporter, TeamCityReporter};
    use crate::source_root::IdentityTranslator;

    #[test]
    fn test_output_file_name_single_target() {
        let cases = [
            (Some(""), "/folder/reportFolder/", "info", "/folder/reportFolder/coverage.info"),
            (None, "/folder/reportFolder/", "cobertura.xml", "/folder/reportFolder/coverage.cobertura.xml"),
            (None, "/folder/reportFolder/file.ext", "cobertura.xml", "/folder/reportFolder/file.ext"),
            (None, "/folder/reportFolder/file.ext1.ext2", "cobertura.xml", "/folder/reportFolder/file.ext1.ext2"),
            (None, "/folder/reportFolder/file", "cobertura.xml", "/folder/reportFolder/file.cobertura.xml"),
        ];

        for (tfm, output, extension, expected) in cases {
            assert_eq!(output_file_name(output, extension, tfm), expected, "{}", output);
        }
    }

    #[test]
    fn test_output_file_name_multiple_targets() {
        let cases = [
            ("netcoreapp2.2", "/folder/reportFolder/", "info", "/folder/reportFolder/coverage.netcoreapp2.2.info"),
            ("netcoreapp2.2", "/folder/reportFolder/", "cobertura.xml", "/folder/reportFolder/coverage.netcoreapp2.2.cobertura.xml"),
            ("net472", "/folder/reportFolder/file.ext", "cobertura.xml", "/folder/reportFolder/file.net472.ext"),
            ("net472", "/folder/reportFolder/file.ext1.ext2", "cobertura.xml", "/folder/reportFolder/file.ext1.net472.ext2"),
            ("netcoreapp2.2", "/folder/reportFolder/file", "cobertura.xml", "/folder/reportFolder/file.netcoreapp2.2.cobertura.xml"),
        ];

        for (tfm, output, extension, expected) in cases {
            assert_eq!(output_file_name(output, extension, Some(tfm)), expected, "{}", output);
        }
    }

    #[test]
    fn test_output_file_name_windows_and_dotted_dirs() {
        assert_eq!(
            output_file_name(r"C:\out\", "json", None),
            r"C:\out\coverage.json"
        );
        assert_eq!(
            output_file_name("/build.d/report", "info", None),
            "/build.d/report.info"
        );
    }

    #[test]
    fn test_write_file_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = format!("{}/nested/", dir.path().display());
        let writer = ReportWriter::new(output, Some("net8.0".to_string()));

        let reporter = CoberturaReporter::new().with_timestamp(0);
        let written = writer
            .write_report(&reporter, &sample_result(), &IdentityTranslator)
            .unwrap();

        let expected = dir.path().join("nested").join("coverage.net8.0.cobertura.xml");
        assert_eq!(written, ReportOutput::File(expected.clone()));

        let content = fs::read_to_string(expected).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    }

    #[test]
    fn test_console_report_is_returned() {
        let writer = ReportWriter::new("unused/", None);
        let written = writer
            .write_report(&TeamCityReporter, &sample_result(), &IdentityTranslator)
            .unwrap();

        match written {
            ReportOutput::Console(text) => assert!(text.starts_with("##teamcity[")),
            other => panic!("expected console output, got {:?}", other),
        }
    }

    #[test]
    fn test_write_failure_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the report path makes every write fail
        fs::create_dir(dir.path().join("report.info")).unwrap();

        let writer = ReportWriter::new(format!("{}/report", dir.path().display()), None)
            .with_retry(RetryConfig {
                max_attempts: 2,
                delay_ms: 1,
                exponential_backoff: false,
            });

        let err = writer
            .write_report(&LcovReporter, &sample_result(), &IdentityTranslator)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }

    #[test]
    fn test_reporter_failure_is_surfaced() {
        let mut result = sample_result();
        result.parameters.deterministic_report = true;

        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(format!("{}/", dir.path().display()), None);
        let reporter = create_reporter("teamcity").unwrap();

        let err = writer
            .write_report(reporter.as_ref(), &result, &IdentityTranslator)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Deterministic report not supported"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
