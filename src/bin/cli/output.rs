//! Output formatting for the record-generator CLI
//!
//! Human-readable text goes to stdout, as does JSON when `--json` is given.

use serde::Serialize;

use record_generator::analysis::{AnalysisReport, Finding};
use record_generator::fix::{EditKind, FixPlan};

/// `file(line,column): Kind: message`
pub fn format_finding(finding: &Finding) -> String {
    format!(
        "{}({},{}): {}: {}",
        finding.file.display(),
        finding.line,
        finding.column,
        finding.kind,
        finding.message
    )
}

/// Format a check report for display
pub fn format_report(report: &AnalysisReport, json_output: bool) -> String {
    if json_output {
        return to_json(report);
    }

    let mut out = String::new();
    for failure in &report.parse_failures {
        out.push_str(&format!(
            "{}({},{}): warning: file skipped, {}\n",
            failure.file.display(),
            failure.line,
            failure.column,
            failure.message
        ));
    }
    for finding in &report.findings {
        out.push_str(&format_finding(finding));
        out.push('\n');
    }
    if report.findings.is_empty() {
        out.push_str(&format!("All {} record(s) up to date", report.records.len()));
    } else {
        out.push_str(&format!("{} finding(s)", report.findings.len()));
    }
    if !report.parse_failures.is_empty() {
        out.push_str(&format!(
            ", {} file(s) skipped",
            report.parse_failures.len()
        ));
    }
    out.push('\n');
    out
}

/// Format a fix plan, before (`dry_run`) or after it was applied
pub fn format_plan(plan: &FixPlan, dry_run: bool, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct PlanJson<'a> {
            dry_run: bool,
            #[serde(flatten)]
            plan: &'a FixPlan,
        }
        return to_json(&PlanJson { dry_run, plan });
    }

    let mut out = String::new();
    for edit in &plan.edits {
        let action = match (edit.kind, dry_run) {
            (EditKind::AddPartial, true) => "would add partial to",
            (EditKind::AddPartial, false) => "added partial to",
            (EditKind::WriteCompanion, true) => "would write companion",
            (EditKind::WriteCompanion, false) => "wrote companion",
            (EditKind::WriteAttribute, true) => "would write attribute declaration",
            (EditKind::WriteAttribute, false) => "wrote attribute declaration",
        };
        out.push_str(&format!(
            "{} {} ({})\n",
            action,
            edit.path.display(),
            edit.records.join(", ")
        ));
    }
    for skipped in &plan.skipped {
        out.push_str(&format!(
            "skipped {} in {}: {}\n",
            skipped.record,
            skipped.file.display(),
            skipped.reason
        ));
    }
    if plan.edits.is_empty() && plan.skipped.is_empty() {
        out.push_str("Nothing to fix\n");
    }
    out
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            cause: Option<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            cause: error.chain().nth(1).map(|e| e.to_string()),
        };
        format!("{}\n", to_json(&err))
    } else {
        let mut out = format!("Error: {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("  {}: {}\n", idx + 1, cause));
            }
        }
        out
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
