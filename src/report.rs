use crate::collectors::logs::LogAnalysis;
use crate::collectors::MetricSnapshot;
use crate::config::{ResourceThresholds, Thresholds};
use crate::evaluate::{total_matches, Evaluation, Status};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const FILE_PREFIX: &str = "health_report";
const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Everything one run found. Field order here is the key order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Local>,
    pub system_metrics: MetricSnapshot,
    pub log_analysis: LogAnalysis,
    pub thresholds: Thresholds,
    pub evaluations: Evaluation,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no free report file name in {dir} for stamp {stamp}")]
    NamesExhausted { dir: String, stamp: String },
}

impl HealthReport {
    pub fn build(
        system_metrics: MetricSnapshot,
        log_analysis: LogAnalysis,
        thresholds: Thresholds,
        evaluations: Evaluation,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            system_metrics,
            log_analysis,
            thresholds,
            evaluations,
        }
    }

    /// `YYYY-MM-DD_HH-MM-SS` of the generation time, used in file names.
    pub fn file_stamp(&self) -> String {
        self.timestamp.format(STAMP_FORMAT).to_string()
    }

    /// Writes the report as pretty JSON into `output_dir`, creating it if
    /// needed. Never replaces an existing file.
    pub fn persist(&self, output_dir: &Path) -> Result<PathBuf, ReportError> {
        let body = serde_json::to_string_pretty(self)?;
        let path = write_new_file(output_dir, &self.file_stamp(), "json", body.as_bytes())?;
        info!(path = %path.display(), "JSON report saved");
        Ok(path)
    }

    pub fn export_markdown(&self, output_dir: &Path) -> Result<PathBuf, ReportError> {
        let body = self.render_markdown();
        let path = write_new_file(output_dir, &self.file_stamp(), "md", body.as_bytes())?;
        info!(path = %path.display(), "Markdown report saved");
        Ok(path)
    }

    pub fn render_markdown(&self) -> String {
        let sys = &self.system_metrics;
        let logs = &self.log_analysis;
        let eval = &self.evaluations;

        let mut lines = vec!["# Infrastructure Health Report".to_string(), String::new()];
        lines.push(format!(
            "**Generated:** {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S %:z")
        ));
        lines.push(String::new());

        lines.push("## System".to_string());
        lines.push(format!("- OS: **{}**", or_na(sys.host.os.as_deref())));
        lines.push(format!(
            "- OS version: **{}**",
            or_na(sys.host.os_version.as_deref())
        ));
        lines.push(format!("- Machine: **{}**", sys.host.machine));
        lines.push(format!(
            "- Hostname: **{}**",
            or_na(sys.host.hostname.as_deref())
        ));
        lines.push(String::new());

        lines.push("## Metrics".to_string());
        lines.push(format!(
            "- CPU Usage: **{}** [{}] ({} logical cores)",
            format_percent(sys.cpu.usage_percent),
            eval.cpu,
            sys.cpu.cores_logical
        ));
        lines.push(format!(
            "- Memory Usage: **{}** [{}]",
            format_percent(sys.memory.usage_percent),
            eval.memory
        ));
        lines.push(format!(
            "- Disk Usage: **{}** [{}]",
            format_percent(sys.disk.usage_percent),
            eval.disk
        ));
        lines.push(String::new());

        lines.push("## Thresholds".to_string());
        lines.push("| Resource | Warn | Critical |".to_string());
        lines.push("|---|---|---|".to_string());
        for (name, t) in [
            ("CPU", &self.thresholds.cpu),
            ("Memory", &self.thresholds.memory),
            ("Disk", &self.thresholds.disk),
        ] {
            lines.push(threshold_row(name, t));
        }
        lines.push(String::new());

        lines.push("## Log Analysis".to_string());
        lines.push(format!("- Logs folder: **{}**", logs.logs_dir.display()));
        lines.push(format!("- Files scanned: **{}**", logs.files_scanned));
        lines.push(format!("- Total matches: **{}**", total_matches(logs)));
        if !logs.skipped_files.is_empty() {
            lines.push(format!("- Skipped files: **{}**", logs.skipped_files.len()));
            for skipped in &logs.skipped_files {
                lines.push(format!(
                    "  - `{}`: {}",
                    skipped.path.display(),
                    skipped.reason
                ));
            }
        }
        lines.push(String::new());

        lines.push("### Problem Counts".to_string());
        for (keyword, count) in &logs.problem_counts {
            lines.push(format!("- {keyword}: **{count}**"));
        }
        lines.push(String::new());

        lines.push("### Example Matches (first few)".to_string());
        let mut any_examples = false;
        for (keyword, examples) in &logs.examples {
            if examples.is_empty() {
                continue;
            }
            any_examples = true;
            lines.push(format!("**{keyword}**"));
            for line in examples {
                lines.push(format!("- `{line}`"));
            }
            lines.push(String::new());
        }
        if !any_examples {
            lines.push("_No matching lines._".to_string());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    pub fn worst_status(&self) -> Status {
        self.evaluations
            .statuses()
            .into_iter()
            .max()
            .unwrap_or(Status::Ok)
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "N/A".to_string(),
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

fn threshold_row(name: &str, t: &ResourceThresholds) -> String {
    let critical = t
        .critical
        .map(|c| format!("{c:.1}%"))
        .unwrap_or_else(|| "-".to_string());
    format!("| {name} | {:.1}% | {critical} |", t.warn)
}

fn io_error(path: &Path, source: io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Creates `<prefix>_<stamp>[_N].<ext>` with create-new semantics so two runs
/// in the same second end up in different files.
fn write_new_file(
    output_dir: &Path,
    stamp: &str,
    ext: &str,
    body: &[u8],
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(output_dir).map_err(|source| io_error(output_dir, source))?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{FILE_PREFIX}_{stamp}.{ext}")
        } else {
            format!("{FILE_PREFIX}_{stamp}_{attempt}.{ext}")
        };
        let path = output_dir.join(name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "report name taken, trying next suffix");
                continue;
            }
            Err(err) => return Err(io_error(&path, err)),
        };

        if let Err(err) = file.write_all(body).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(io_error(&path, err));
        }
        return Ok(path);
    }

    Err(ReportError::NamesExhausted {
        dir: output_dir.display().to_string(),
        stamp: stamp.to_string(),
    })
}
