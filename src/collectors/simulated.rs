use crate::collectors::{CpuStat, DiskStat, HostInfo, MemoryStat, MetricSnapshot, MetricSource};
use chrono::Local;

const DEMO_CORES: u32 = 8;
const DEMO_MEMORY_BYTES: u64 = 16 * 1024 * 1024 * 1024;
const DEMO_DISK_BYTES: u64 = 512 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SimulationProfile {
    Ok,
    Warn,
    Critical,
}

impl SimulationProfile {
    /// Fixed (cpu, memory, disk) usage percentages for the profile.
    pub fn usage(self) -> (f64, f64, f64) {
        match self {
            SimulationProfile::Ok => (10.0, 45.0, 30.0),
            SimulationProfile::Warn => (75.0, 78.0, 85.0),
            SimulationProfile::Critical => (95.0, 94.0, 98.0),
        }
    }
}

/// Stand-in source for demos: real host identity, fixed utilization.
pub struct SimulatedSource {
    profile: SimulationProfile,
    host: HostInfo,
}

impl SimulatedSource {
    pub fn new(profile: SimulationProfile, host: HostInfo) -> Self {
        Self { profile, host }
    }
}

impl MetricSource for SimulatedSource {
    fn snapshot(&mut self) -> MetricSnapshot {
        let (cpu, memory, disk) = self.profile.usage();
        MetricSnapshot {
            timestamp: Local::now(),
            host: self.host.clone(),
            cpu: CpuStat {
                usage_percent: Some(cpu),
                cores_logical: DEMO_CORES,
            },
            memory: MemoryStat {
                usage_percent: Some(memory),
                total_bytes: DEMO_MEMORY_BYTES,
            },
            disk: DiskStat {
                usage_percent: Some(disk),
                total_bytes: DEMO_DISK_BYTES,
                mount_point: None,
            },
        }
    }
}
