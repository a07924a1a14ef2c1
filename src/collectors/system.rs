use crate::collectors::{
    usage_percent, CpuStat, DiskStat, HostInfo, MemoryStat, MetricSnapshot, MetricSource,
};
use chrono::Local;
use std::thread;
use std::time::Duration;
use sysinfo::{CpuExt, DiskExt, System, SystemExt};
use tracing::{debug, warn};

/// Gap between the two CPU refreshes that yield one usage figure.
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Live host metrics read through `sysinfo`.
pub struct SystemSource {
    system: System,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemSource {
    fn snapshot(&mut self) -> MetricSnapshot {
        let timestamp = Local::now();
        let cpu = sample_cpu(&mut self.system);

        self.system.refresh_memory();
        let memory_total_bytes = self.system.total_memory();
        let memory = MemoryStat {
            usage_percent: usage_percent(self.system.used_memory(), memory_total_bytes),
            total_bytes: memory_total_bytes,
        };
        if memory.usage_percent.is_none() {
            warn!("memory counters unavailable, memory usage reported as absent");
        }

        self.system.refresh_disks_list();
        let candidates: Vec<DiskCandidate> = self
            .system
            .disks()
            .iter()
            .map(|d| DiskCandidate {
                mount_point: d.mount_point().to_string_lossy().to_string(),
                total_bytes: d.total_space(),
                available_bytes: d.available_space(),
            })
            .collect();
        let disk = disk_stat(&candidates, system_drive().as_deref());
        if disk.usage_percent.is_none() {
            warn!(
                disks = candidates.len(),
                "no usable root disk found, disk usage reported as absent"
            );
        }

        let snapshot = MetricSnapshot {
            timestamp,
            host: host_info_from(&self.system),
            cpu,
            memory,
            disk,
        };
        debug!(
            cpu = ?snapshot.cpu.usage_percent,
            memory = ?snapshot.memory.usage_percent,
            disk = ?snapshot.disk.usage_percent,
            "system snapshot collected"
        );
        snapshot
    }
}

fn sample_cpu(system: &mut System) -> CpuStat {
    system.refresh_cpu();
    thread::sleep(CPU_SAMPLE_INTERVAL);
    system.refresh_cpu();

    let cores = system.cpus();
    let cores_logical = cores.len() as u32;
    let usage_percent = if cores.is_empty() {
        warn!("no CPU cores reported, CPU usage reported as absent");
        None
    } else {
        let sum: f32 = cores.iter().map(|c| c.cpu_usage()).sum();
        let avg = (sum / cores.len() as f32) as f64;
        Some(avg.clamp(0.0, 100.0))
    };

    CpuStat {
        usage_percent,
        cores_logical,
    }
}

pub fn host_info() -> HostInfo {
    host_info_from(&System::new())
}

fn host_info_from(system: &System) -> HostInfo {
    HostInfo {
        os: system.name(),
        os_version: system.os_version(),
        machine: std::env::consts::ARCH.to_string(),
        hostname: system.host_name(),
    }
}

#[derive(Debug, Clone)]
struct DiskCandidate {
    mount_point: String,
    total_bytes: u64,
    available_bytes: u64,
}

fn disk_stat(candidates: &[DiskCandidate], system_drive: Option<&str>) -> DiskStat {
    match select_root_disk(candidates, system_drive) {
        Some(d) => DiskStat {
            usage_percent: usage_percent(
                d.total_bytes.saturating_sub(d.available_bytes),
                d.total_bytes,
            ),
            total_bytes: d.total_bytes,
            mount_point: Some(d.mount_point.clone()),
        },
        None => DiskStat {
            usage_percent: None,
            total_bytes: 0,
            mount_point: None,
        },
    }
}

fn select_root_disk<'a>(
    candidates: &'a [DiskCandidate],
    system_drive: Option<&str>,
) -> Option<&'a DiskCandidate> {
    if let Some(root) = candidates.iter().find(|d| d.mount_point == "/") {
        return Some(root);
    }
    if let Some(drive) = system_drive {
        let drive = drive.trim_end_matches(['\\', '/']).to_ascii_uppercase();
        if let Some(found) = candidates.iter().find(|d| {
            d.mount_point
                .trim_end_matches(['\\', '/'])
                .eq_ignore_ascii_case(&drive)
        }) {
            return Some(found);
        }
    }
    candidates.first()
}

#[cfg(target_os = "windows")]
fn system_drive() -> Option<String> {
    std::env::var("SystemDrive").ok().filter(|v| !v.trim().is_empty())
}

#[cfg(not(target_os = "windows"))]
fn system_drive() -> Option<String> {
    None
}
