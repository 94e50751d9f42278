//! Renders a `ReportEnvelope` to stdout or `--output` in the requested
//! format (spec.md §6 "User-visible behavior").

use std::path::Path;

use vigil_common::{Finding, ScanWarning};
use vigil_report::{sink_for, to_sarif, ReportEnvelope};

use crate::cli::args::OutputFormat;

pub fn render(envelope: &ReportEnvelope, format: OutputFormat, output: Option<&Path>, show_confidence: bool) {
    let sink = sink_for(output);
    match format {
        OutputFormat::Table => print_table(envelope, show_confidence),
        OutputFormat::Json => {
            let value = serde_json::to_value(envelope).expect("envelope always serializes");
            let _ = sink.write(&value);
        }
        OutputFormat::Sarif => {
            let value = to_sarif(&envelope.findings);
            let _ = sink.write(&value);
        }
    }
}

fn print_table(envelope: &ReportEnvelope, show_confidence: bool) {
    let s = &envelope.summary;
    println!(
        "Scanned {} files in {}ms | Findings {} | CRITICAL:{} | HIGH:{} | MEDIUM:{} | LOW:{}",
        s.scanned_files,
        s.elapsed_ms,
        s.finding_count,
        s.severities.get("CRITICAL").copied().unwrap_or(0),
        s.severities.get("HIGH").copied().unwrap_or(0),
        s.severities.get("MEDIUM").copied().unwrap_or(0),
        s.severities.get("LOW").copied().unwrap_or(0),
    );

    for finding in &envelope.findings {
        print_finding_row(finding, show_confidence);
    }
}

fn print_finding_row(finding: &Finding, show_confidence: bool) {
    let line = finding.line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
    if show_confidence {
        let confidence = finding
            .confidence
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<30} {}:{} {} [{}]",
            finding.severity, finding.rule_id, finding.file, line, finding.message, confidence
        );
    } else {
        println!(
            "{:<8} {:<30} {}:{} {}",
            finding.severity, finding.rule_id, finding.file, line, finding.message
        );
    }
}

/// Warnings are suppressed in JSON mode, per spec.md §6.
pub fn print_warnings(warnings: &[ScanWarning], format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        return;
    }
    for warning in warnings {
        eprintln!("warning: {} ({})", warning.message, warning.tag);
    }
}
