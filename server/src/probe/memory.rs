use serde::Serialize;
use sysinfo::System;

/// Memory usage in bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}

/// Collect memory metrics.
pub fn collect(sys: &System) -> MemoryInfo {
    let total = sys.total_memory();
    let used = sys.used_memory();
    MemoryInfo {
        total,
        free: sys.free_memory(),
        used,
        used_percent: used_percent(used, total).unwrap_or(0.0),
    }
}

/// `used / total` as a percentage, or `None` when the total is unknown.
pub fn used_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}
