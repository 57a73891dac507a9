// megohm/src/render.rs
//
// Terminal rendering (comfy-table). No IO here: callers print.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::Value;

use megohm_core::AnalysisReport;
use megohm_core::domain::standards::ThresholdSet;
use megohm_core::domain::validation::Severity;

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new));
    table
}

pub fn findings_table(report: &AnalysisReport) -> Table {
    let mut table = new_table(&[
        "Severity",
        "Rule",
        "Field",
        "Value",
        "Threshold",
        "Reference",
        "Remediation",
    ]);
    for f in report.findings_by_severity() {
        table.add_row(vec![
            Cell::new(f.severity),
            Cell::new(&f.rule_id),
            Cell::new(&f.field_path),
            Cell::new(cell_text(&f.extracted_value)),
            Cell::new(cell_text(&f.threshold)),
            Cell::new(&f.standard_reference),
            Cell::new(f.remediation_kind),
        ]);
    }
    table
}

/// `CRITICAL: 1, MAJOR: 0, MINOR: 2, INFO: 0`
pub fn severity_summary(report: &AnalysisReport) -> String {
    let counts = report.counts_by_severity();
    Severity::ALL
        .iter()
        .map(|s| format!("{}: {}", s, counts.get(s).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn report_text(report: &AnalysisReport) -> String {
    let mut out = format!(
        "Analysis {} [{}] -> {}\n",
        report.analysis_id(),
        report.standard_profile(),
        report.verdict()
    );
    out.push_str(&format!(
        "   Rules evaluated: {} | {}\n",
        report.rules_evaluated(),
        severity_summary(report)
    ));
    if report.findings_by_severity().is_empty() {
        out.push_str("   ✅ No findings.\n");
    } else {
        out.push_str(&format!("{}\n", findings_table(report)));
    }
    let audit = report.audit();
    if audit.failed > 0 {
        out.push_str(&format!(
            "   ⚠️  Audit: {} record(s) written, {} dropped\n",
            audit.emitted, audit.failed
        ));
    }
    out
}

pub fn batch_table(rows: &[(String, Result<&AnalysisReport, String>)]) -> Table {
    let mut table = new_table(&["File", "Analysis", "Verdict", "Critical", "Major", "Minor"]);
    for (file, outcome) in rows {
        match outcome {
            Ok(report) => {
                let counts = report.counts_by_severity();
                let n = |s: Severity| counts.get(&s).copied().unwrap_or(0).to_string();
                table.add_row(vec![
                    Cell::new(file),
                    Cell::new(report.analysis_id()),
                    Cell::new(report.verdict()),
                    Cell::new(n(Severity::Critical)),
                    Cell::new(n(Severity::Major)),
                    Cell::new(n(Severity::Minor)),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(file),
                    Cell::new("-"),
                    Cell::new(format!("ERROR: {e}")),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    table
}

pub fn thresholds_table(sets: &[ThresholdSet]) -> Table {
    let mut table = new_table(&["Domain", "Threshold", "Value", "Reference", "Description"]);
    for set in sets {
        for (name, reference) in set.iter() {
            let label = if name == set.primary_name() {
                format!("{name} (primary)")
            } else {
                name.to_string()
            };
            table.add_row(vec![
                Cell::new(set.domain),
                Cell::new(label),
                Cell::new(cell_text(&reference.value_json())),
                Cell::new(reference.citation()),
                Cell::new(&reference.description),
            ]);
        }
    }
    table
}
