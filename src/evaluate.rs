use crate::collectors::logs::LogAnalysis;
use crate::collectors::MetricSnapshot;
use crate::config::{ResourceThresholds, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one resource. Variant order is severity order for the
/// measured states; `Unknown` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warn,
    Critical,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub cpu: Status,
    pub memory: Status,
    pub disk: Status,
}

impl Evaluation {
    pub fn statuses(&self) -> [Status; 3] {
        [self.cpu, self.memory, self.disk]
    }
}

/// Inclusive at both boundaries. Without a critical tier the result is never
/// `Critical`.
pub fn classify(value: Option<f64>, warn: f64, critical: Option<f64>) -> Status {
    let Some(value) = value else {
        return Status::Unknown;
    };
    if let Some(critical) = critical {
        if value >= critical {
            return Status::Critical;
        }
    }
    if value >= warn {
        return Status::Warn;
    }
    Status::Ok
}

fn classify_with(value: Option<f64>, t: &ResourceThresholds) -> Status {
    classify(value, t.warn, t.critical)
}

pub fn evaluate(snapshot: &MetricSnapshot, thresholds: &Thresholds) -> Evaluation {
    Evaluation {
        cpu: classify_with(snapshot.cpu.usage_percent, &thresholds.cpu),
        memory: classify_with(snapshot.memory.usage_percent, &thresholds.memory),
        disk: classify_with(snapshot.disk.usage_percent, &thresholds.disk),
    }
}

pub fn total_matches(analysis: &LogAnalysis) -> u64 {
    analysis.problem_counts.values().sum()
}
