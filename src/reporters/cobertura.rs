//! Cobertura XML report
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <coverage line-rate="0.6" branch-rate="0.6666" version="1.9" timestamp="1700000000"
//!           lines-covered="3" lines-valid="5" branches-covered="2" branches-valid="3">
//!   <sources>
//!     <source>/home/me/project/</source>
//!   </sources>
//!   <packages>
//!     <package name="App" line-rate="0.6" branch-rate="0.6666" complexity="3">
//!       <classes>
//!         <class name="App.Program" filename="src/Program.cs" ...>
//!           <methods>
//!             <method name="Main" signature="(System.String[])" ...>
//!               <lines>
//!                 <line number="10" hits="1" branch="True" condition-coverage="50% (1/2)">
//!                   <conditions>
//!                     <condition number="7" type="jump" coverage="50%" />
//!                   </conditions>
//!                 </line>
//!               </lines>
//!             </method>
//!           </methods>
//!           <lines>...</lines>
//!         </class>
//!       </classes>
//!     </package>
//!   </packages>
//! </coverage>
//! ```

use std::collections::BTreeSet;

use crate::coverage::{
    branch_coverage, calculate_branch_coverage, calculate_cyclomatic_complexity,
    calculate_line_coverage, cyclomatic_complexity, line_coverage, CoverageDetails,
};
use crate::error::ReportResult;
use crate::model::{BranchInfo, CoverageResult, Method};
use crate::source_root::SourceRootTranslator;

use super::format::{format_bool, format_invariant};
use super::xml::{to_xml_string, XmlElement};
use super::{module_name, OutputType, Reporter};

const COBERTURA_VERSION: &str = "1.9";

#[derive(Debug, Clone, Default)]
pub struct CoberturaReporter {
    timestamp: Option<i64>,
}

impl CoberturaReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the `timestamp` attribute instead of using the current time
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the document tree without serializing it
    pub fn build(
        &self,
        result: &CoverageResult,
        translator: &dyn SourceRootTranslator,
    ) -> XmlElement {
        let parameters = &result.parameters;
        let line_coverage_total = calculate_line_coverage(result);
        let branch_coverage_total = calculate_branch_coverage(result);
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let base_paths = if parameters.deterministic_report || parameters.use_source_link {
            Vec::new()
        } else {
            get_base_paths(&result.document_paths())
        };

        let mut sources = XmlElement::new("sources");
        for base_path in &base_paths {
            sources.push(XmlElement::new("source").text(base_path.as_str()));
        }

        let mut packages = XmlElement::new("packages");
        for (module, documents) in &result.modules {
            let mut classes = XmlElement::new("classes");

            for (document, document_classes) in documents {
                let filename = if parameters.deterministic_report {
                    translator.resolve_deterministic_path(document)
                } else if parameters.use_source_link {
                    document.clone()
                } else {
                    get_relative_path_from_base(&base_paths, document)
                };

                for (class_name, methods) in document_classes {
                    let mut method_elements = XmlElement::new("methods");
                    let mut class_lines = XmlElement::new("lines");

                    for (signature, method) in methods {
                        // compiler generated members without source lines
                        if method.lines.is_empty() {
                            continue;
                        }

                        let mut method_lines = XmlElement::new("lines");
                        for (&number, &hits) in &method.lines {
                            let line = line_element(method, number, hits);
                            class_lines.push(line.clone());
                            method_lines.push(line);
                        }

                        let (name, arguments) = split_method_signature(signature);
                        method_elements.push(
                            XmlElement::new("method")
                                .attr("name", name)
                                .attr("signature", arguments)
                                .attr("line-rate", rate(line_coverage(&method.lines)))
                                .attr("branch-rate", rate(branch_coverage(&method.branches)))
                                .attr("complexity", cyclomatic_complexity(&method.branches))
                                .child(method_lines),
                        );
                    }

                    classes.push(
                        XmlElement::new("class")
                            .attr("name", class_name)
                            .attr("filename", &filename)
                            .attr("line-rate", rate(calculate_line_coverage(methods)))
                            .attr("branch-rate", rate(calculate_branch_coverage(methods)))
                            .attr("complexity", calculate_cyclomatic_complexity(methods))
                            .child(method_elements)
                            .child(class_lines),
                    );
                }
            }

            packages.push(
                XmlElement::new("package")
                    .attr("name", module_name(module))
                    .attr("line-rate", rate(calculate_line_coverage(documents)))
                    .attr("branch-rate", rate(calculate_branch_coverage(documents)))
                    .attr("complexity", calculate_cyclomatic_complexity(documents))
                    .child(classes),
            );
        }

        XmlElement::new("coverage")
            .attr("line-rate", rate(line_coverage_total))
            .attr("branch-rate", rate(branch_coverage_total))
            .attr("version", COBERTURA_VERSION)
            .attr("timestamp", timestamp)
            .attr("lines-covered", line_coverage_total.covered)
            .attr("lines-valid", line_coverage_total.total)
            .attr("branches-covered", branch_coverage_total.covered)
            .attr("branches-valid", branch_coverage_total.total)
            .child(sources)
            .child(packages)
    }
}

impl Reporter for CoberturaReporter {
    fn output_type(&self) -> OutputType {
        OutputType::File
    }

    fn format(&self) -> &'static str {
        "cobertura"
    }

    fn extension(&self) -> Option<&'static str> {
        Some("cobertura.xml")
    }

    fn report(
        &self,
        result: &CoverageResult,
        translator: &dyn SourceRootTranslator,
    ) -> ReportResult<String> {
        let document = self.build(result, translator);
        tracing::debug!(modules = result.modules.len(), "rendering cobertura report");
        to_xml_string(&document)
    }
}

fn rate(details: CoverageDetails) -> String {
    format_invariant(details.rate())
}

fn line_element(method: &Method, number: u32, hits: u64) -> XmlElement {
    let is_branch_point = method.is_branch_point(number);
    let line = XmlElement::new("line")
        .attr("number", number)
        .attr("hits", hits)
        .attr("branch", format_bool(is_branch_point));

    if !is_branch_point {
        return line;
    }

    let branches: Vec<&BranchInfo> = method.branches_on_line(number).collect();
    let details = branch_coverage(branches.iter().copied());

    let mut conditions = XmlElement::new("conditions");
    for (offset, group) in group_by_offset(&branches) {
        let kind = if group.len() > 2 { "switch" } else { "jump" };
        conditions.push(
            XmlElement::new("condition")
                .attr("number", offset)
                .attr("type", kind)
                .attr(
                    "coverage",
                    format!("{}%", format_invariant(branch_coverage(group).percent())),
                ),
        );
    }

    line.attr(
        "condition-coverage",
        format!(
            "{}% ({}/{})",
            format_invariant(details.percent()),
            details.covered,
            details.total
        ),
    )
    .child(conditions)
}

/// Branches grouped by decision point, in order of first appearance
fn group_by_offset<'a>(branches: &[&'a BranchInfo]) -> Vec<(u32, Vec<&'a BranchInfo>)> {
    let mut groups: Vec<(u32, Vec<&'a BranchInfo>)> = Vec::new();
    for &branch in branches {
        match groups.iter_mut().find(|(offset, _)| *offset == branch.offset) {
            Some((_, group)) => group.push(branch),
            None => groups.push((branch.offset, vec![branch])),
        }
    }
    groups
}

/// `System.Int32 A.B::Sum(System.Int32,System.Int32)` -> (`Sum`, `(System.Int32,System.Int32)`)
fn split_method_signature(signature: &str) -> (&str, String) {
    let member = signature.rsplit(':').next().unwrap_or(signature);
    let name = member.split('(').next().unwrap_or(member);
    let parameters = member.rsplit('(').next().unwrap_or(member);
    (name, format!("({}", parameters))
}

fn separator_of(path: &str) -> char {
    if path.contains('\\') && !path.starts_with('/') {
        '\\'
    } else {
        '/'
    }
}

/// Filesystem root of a path: `C:\`, `\\server\share\`, `/`, or empty when relative
fn path_root(path: &str) -> String {
    let bytes = path.as_bytes();

    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return match bytes.get(2) {
            Some(b'\\') | Some(b'/') => path[..3].to_string(),
            _ => path[..2].to_string(),
        };
    }

    if let Some(unc) = path.strip_prefix("\\\\") {
        let share: Vec<&str> = unc.splitn(3, '\\').take(2).collect();
        return format!("\\\\{}\\", share.join("\\"));
    }

    match path.chars().next() {
        Some(c @ ('/' | '\\')) => c.to_string(),
        _ => String::new(),
    }
}

/// Longest common directory per filesystem root
///
/// `C:\dir1\dir2\file1`, `C:\dir1\file2`, `E:\dir1\file2` -> `C:\dir1\`, `E:\`
///
/// Relative paths have no root to anchor on and are left out.
pub fn get_base_paths(paths: &[&str]) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for &path in paths {
        let root = path_root(path);
        if root.is_empty() || !seen.insert(path) {
            continue;
        }
        match groups.iter_mut().find(|(key, _)| *key == root) {
            Some((_, group)) => group.push(path),
            None => groups.push((root, vec![path])),
        }
    }

    let mut bases: BTreeSet<String> = BTreeSet::new();
    groups
        .into_iter()
        .map(|(root, group)| {
            if group.len() == 1 {
                return root;
            }

            let separator = separator_of(group[0]);
            let mut split: Vec<Vec<&str>> = group
                .iter()
                .map(|path| path.split(separator).collect())
                .collect();
            split.sort_by_key(|segments| segments.len());

            let mut shared: Vec<&str> = Vec::new();
            for (index, segment) in split[0].iter().enumerate() {
                if split.iter().all(|segments| segments[index] == *segment) {
                    shared.push(*segment);
                } else {
                    break;
                }
            }

            format!("{}{}", shared.join(&separator.to_string()), separator)
        })
        .filter(|base| bases.insert(base.clone()))
        .collect()
}

/// Path relative to the longest base path it starts with, or unchanged
pub fn get_relative_path_from_base(base_paths: &[String], path: &str) -> String {
    base_paths
        .iter()
        .filter(|base| path.starts_with(base.as_str()))
        .max_by_key(|base| base.len())
        .map(|base| path[base.len()..].to_string())
        .unwrap_or_else(|| path.to_string())
}
