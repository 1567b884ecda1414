use serde::Serialize;
use sysinfo::System;

/// Static CPU description.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub manufacturer: String,
    pub brand: String,
    /// Frequency of the first core in GHz.
    pub speed: f64,
    pub cores: usize,
    pub physical_cores: usize,
    pub processors: usize,
}

/// Current load figures.
///
/// sysinfo reports one busy percentage per refresh with no user/kernel split,
/// so only the combined figure is served.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLoad {
    /// One-minute load average.
    pub avg_load: f64,
    /// Global CPU usage percentage since the previous refresh.
    pub current_load: f64,
}

/// Collect CPU description from a refreshed `System`.
pub fn collect(sys: &System) -> CpuInfo {
    let first = sys.cpus().first();

    CpuInfo {
        manufacturer: first
            .map(|c| c.vendor_id().to_string())
            .unwrap_or_default(),
        brand: first
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_default(),
        speed: first.map(|c| c.frequency() as f64 / 1000.0).unwrap_or(0.0),
        cores: sys.cpus().len(),
        physical_cores: System::physical_core_count().unwrap_or(sys.cpus().len()),
        // sysinfo does not expose socket count.
        processors: 1,
    }
}

/// Global usage percentage, measured since the previous CPU refresh.
pub fn usage_percent(sys: &System) -> f64 {
    f64::from(sys.global_cpu_usage())
}

pub fn current_load(sys: &System) -> CurrentLoad {
    CurrentLoad {
        avg_load: System::load_average().one,
        current_load: usage_percent(sys),
    }
}
