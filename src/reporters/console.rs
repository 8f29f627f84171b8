//! Plain text summary tables printed after a run

use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::Table;

use crate::coverage::{summarize_modules, CoverageDetails, ModuleSummary};
use crate::model::CoverageResult;

use super::format::format_invariant;
use super::module_name;

fn percent(details: CoverageDetails) -> String {
    format!("{}%", format_invariant(details.percent()))
}

fn average(summaries: &[ModuleSummary], pick: fn(&ModuleSummary) -> CoverageDetails) -> String {
    let sum: f64 = summaries.iter().map(|s| pick(s).percent()).sum();
    format!("{}%", format_invariant(sum / summaries.len() as f64))
}

/// ASCII table with a header row
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

/// Per-module table followed by the Total / Average table
///
/// Returns `None` when no module was instrumented.
pub fn render_summary(result: &CoverageResult) -> Option<String> {
    let summaries = summarize_modules(result);
    if summaries.is_empty() {
        return None;
    }

    let module_rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                module_name(&s.name).to_string(),
                percent(s.line),
                percent(s.branch),
                percent(s.method),
            ]
        })
        .collect();

    let line_total: CoverageDetails = summaries.iter().map(|s| s.line).sum();
    let branch_total: CoverageDetails = summaries.iter().map(|s| s.branch).sum();
    let method_total: CoverageDetails = summaries.iter().map(|s| s.method).sum();

    let totals = vec![
        vec![
            "Total".to_string(),
            percent(line_total),
            percent(branch_total),
            percent(method_total),
        ],
        vec![
            "Average".to_string(),
            average(&summaries, |s| s.line),
            average(&summaries, |s| s.branch),
            average(&summaries, |s| s.method),
        ],
    ];

    Some(format!(
        "{}\n\n{}",
        render_table(&["Module", "Line", "Branch", "Method"], &module_rows),
        render_table(&["", "Line", "Branch", "Method"], &totals)
    ))
}
