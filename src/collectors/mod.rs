pub mod logs;
pub mod simulated;
pub mod system;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Anything that can produce one point-in-time view of host utilization.
///
/// A source reports a resource it could not read as `None` instead of
/// failing the whole snapshot.
pub trait MetricSource {
    fn snapshot(&mut self) -> MetricSnapshot;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Local>,
    pub host: HostInfo,
    pub cpu: CpuStat,
    pub memory: MemoryStat,
    pub disk: DiskStat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub machine: String,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuStat {
    pub usage_percent: Option<f64>,
    pub cores_logical: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStat {
    pub usage_percent: Option<f64>,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStat {
    pub usage_percent: Option<f64>,
    pub total_bytes: u64,
    pub mount_point: Option<String>,
}

/// `used / total` as a percentage, `None` when the total is unknown.
pub fn usage_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let pct = (used as f64 / total as f64) * 100.0;
    Some(pct.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percent_handles_zero_total() {
        assert_eq!(usage_percent(10, 0), None);
        assert_eq!(usage_percent(0, 200), Some(0.0));
        assert_eq!(usage_percent(50, 200), Some(25.0));
    }

    #[test]
    fn usage_percent_is_clamped() {
        assert_eq!(usage_percent(300, 200), Some(100.0));
    }
}
