use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::coverage::{ThresholdStatistic, ThresholdTypeFlags};
use crate::model::CoverageParameters;
use crate::reporters::REPORT_FORMATS;
use crate::source_root::SourceRootMapping;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub parameters: CoverageParameters,
    /// Local source root -> deterministic prefix
    #[serde(default)]
    pub source_roots: BTreeMap<String, String>,
    #[serde(default)]
    pub threshold: ThresholdSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Output directory (trailing separator) or file name
    #[serde(default = "default_output")]
    pub output: String,
    /// Build target qualifier inserted into output file names
    #[serde(default)]
    pub target_framework: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            output: default_output(),
            target_framework: None,
        }
    }
}

fn default_formats() -> Vec<String> {
    vec!["cobertura".to_string()]
}

fn default_output() -> String {
    "./".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdSettings {
    #[serde(default)]
    pub line: Option<f64>,
    #[serde(default)]
    pub branch: Option<f64>,
    #[serde(default)]
    pub method: Option<f64>,
    #[serde(default)]
    pub statistic: ThresholdStatistic,
}

impl ThresholdSettings {
    /// Configured categories and their minimum percentage
    pub fn to_map(&self) -> BTreeMap<ThresholdTypeFlags, f64> {
        [
            (ThresholdTypeFlags::LINE, self.line),
            (ThresholdTypeFlags::BRANCH, self.branch),
            (ThresholdTypeFlags::METHOD, self.method),
        ]
        .into_iter()
        .filter_map(|(flag, value)| value.map(|v| (flag, v)))
        .collect()
    }

    /// Set the same minimum for every category in `types`
    pub fn apply(&mut self, types: ThresholdTypeFlags, value: f64) {
        if types.contains(ThresholdTypeFlags::LINE) {
            self.line = Some(value);
        }
        if types.contains(ThresholdTypeFlags::BRANCH) {
            self.branch = Some(value);
        }
        if types.contains(ThresholdTypeFlags::METHOD) {
            self.method = Some(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.branch.is_none() && self.method.is_none()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        let output = shellexpand::full(&config.report.output)
            .with_context(|| format!("Failed to expand output path: {}", config.report.output))?
            .into_owned();
        config.report.output = output;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for format in &self.report.formats {
            if !REPORT_FORMATS.contains(&format.to_lowercase().as_str()) {
                anyhow::bail!(
                    "Unknown report format: {}. Supported: {}",
                    format,
                    REPORT_FORMATS.join(", ")
                );
            }
        }

        for (flag, value) in self.threshold.to_map() {
            if !(0.0..=100.0).contains(&value) {
                anyhow::bail!(
                    "Threshold for {} must be between 0 and 100, got {}",
                    flag,
                    value
                );
            }
        }

        Ok(())
    }

    pub fn source_root_mapping(&self) -> SourceRootMapping {
        SourceRootMapping::from_map(&self.source_roots)
    }
}
