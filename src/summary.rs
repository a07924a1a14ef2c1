use crate::evaluate::total_matches;
use crate::report::{format_percent, HealthReport};

pub fn render_summary(report: &HealthReport) -> String {
    let sys = &report.system_metrics;
    let eval = &report.evaluations;
    let logs = &report.log_analysis;

    let mut lines = vec![String::new(), "--- Infrastructure Health Summary ---".to_string()];
    lines.push(format!(
        "CPU Usage: {} [{}]",
        format_percent(sys.cpu.usage_percent),
        eval.cpu
    ));
    lines.push(format!(
        "Memory Usage: {} [{}]",
        format_percent(sys.memory.usage_percent),
        eval.memory
    ));
    lines.push(format!(
        "Disk Usage: {} [{}]",
        format_percent(sys.disk.usage_percent),
        eval.disk
    ));

    let mut log_line = format!(
        "Log Issues: {} total matches in {} file(s)",
        total_matches(logs),
        logs.files_scanned
    );
    if !logs.skipped_files.is_empty() {
        log_line.push_str(&format!(" ({} skipped)", logs.skipped_files.len()));
    }
    lines.push(log_line);
    lines.push("-------------------------------------".to_string());

    lines.join("\n")
}
