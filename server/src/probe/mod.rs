//! Host probing: point-in-time readings of the local machine.
//!
//! The collector only needs CPU load and raw memory counters
//! ([`HostProbe::sample`]); the dashboard's system-info view gets the full
//! snapshot ([`HostProbe::system_info`]). Both calls block on OS queries and
//! must be run off the async executor.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod os;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::Mutex;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

/// Raw reading taken by the collector on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSnapshot {
    pub cpu_load_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
}

/// Full host description served to the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub cpu: cpu::CpuInfo,
    pub memory: memory::MemoryInfo,
    pub os: os::OsInfo,
    pub disk: Vec<disk::DiskInfo>,
    pub network: Vec<network::NetworkInterface>,
    pub current_load: cpu::CurrentLoad,
}

/// Source of host readings.
pub trait HostProbe: Send + Sync {
    /// Current CPU load and memory counters.
    fn sample(&self) -> Result<HostSnapshot>;

    /// Full snapshot of CPU, memory, OS, disks and network interfaces.
    fn system_info(&self) -> Result<SystemInfo>;
}

/// [`HostProbe`] backed by `sysinfo`.
///
/// Holds one long-lived `System` so CPU usage is measured between two
/// consecutive refreshes instead of reading zero on a fresh instance.
pub struct SysinfoProbe {
    sys: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(load_refresh());
        Self {
            sys: Mutex::new(sys),
        }
    }

    fn refreshed(&self) -> Result<std::sync::MutexGuard<'_, System>> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|_| anyhow!("host probe state poisoned"))?;
        sys.refresh_specifics(load_refresh());
        Ok(sys)
    }
}

/// CPU usage, frequencies and memory counters; nothing per-process.
fn load_refresh() -> RefreshKind {
    RefreshKind::nothing()
        .with_cpu(CpuRefreshKind::everything())
        .with_memory(MemoryRefreshKind::everything())
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SysinfoProbe {
    fn sample(&self) -> Result<HostSnapshot> {
        let sys = self.refreshed()?;
        Ok(HostSnapshot {
            cpu_load_percent: cpu::usage_percent(&sys),
            memory_used_bytes: sys.used_memory(),
            memory_total_bytes: sys.total_memory(),
        })
    }

    fn system_info(&self) -> Result<SystemInfo> {
        let sys = self.refreshed()?;
        let disks = Disks::new_with_refreshed_list();

        Ok(SystemInfo {
            cpu: cpu::collect(&sys),
            memory: memory::collect(&sys),
            os: os::collect(),
            disk: disk::collect_from(&disks),
            network: network::collect(),
            current_load: cpu::current_load(&sys),
        })
    }
}
