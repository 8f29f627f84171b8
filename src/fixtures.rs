//! Shared test data

use crate::model::{
    BranchInfo, Classes, CoverageParameters, CoverageResult, Documents, Lines, Method, Methods,
    Modules,
};

pub const TEST_DOCUMENT: &str = "doc.cs";
pub const TEST_CLASS: &str = "Covrep.Core.Tests.SummaryTests";
pub const COVERED_METHOD: &str =
    "System.Void Covrep.Core.Tests.SummaryTests::CalculateSummary()";
pub const MISSED_METHOD: &str =
    "System.Void Covrep.Core.Tests.SummaryTests::GetThresholdTypesBelowThreshold()";

pub fn branch(line: u32, offset: u32, path: u32, hits: u64) -> BranchInfo {
    BranchInfo {
        line,
        offset,
        end_offset: 0,
        path,
        ordinal: path,
        hits,
    }
}

pub fn lines(entries: &[(u32, u64)]) -> Lines {
    entries.iter().copied().collect()
}

/// One module with two methods:
/// lines 3/5 (60%), branches 2/3 (66.66%), methods 1/2 (50%)
pub fn sample_modules() -> Modules {
    let mut methods = Methods::new();
    methods.insert(
        COVERED_METHOD.to_string(),
        Method::new(
            lines(&[(1, 1), (2, 1), (3, 1)]),
            vec![branch(1, 1, 0, 1), branch(1, 1, 1, 1), branch(2, 1, 0, 0)],
        ),
    );
    methods.insert(
        MISSED_METHOD.to_string(),
        Method::new(lines(&[(1, 0), (2, 0)]), Vec::new()),
    );

    single_module("module", TEST_DOCUMENT, TEST_CLASS, methods)
}

pub fn sample_result() -> CoverageResult {
    CoverageResult::new(sample_modules(), CoverageParameters::default())
}

pub fn single_module(module: &str, document: &str, class: &str, methods: Methods) -> Modules {
    let mut classes = Classes::new();
    classes.insert(class.to_string(), methods);

    let mut documents = Documents::new();
    documents.insert(document.to_string(), classes);

    let mut modules = Modules::new();
    modules.insert(module.to_string(), documents);
    modules
}
