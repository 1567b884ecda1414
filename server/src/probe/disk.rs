use serde::Serialize;
use sysinfo::Disks;

/// Disk usage information for a single mount point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub fs: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub use_percent: f64,
    pub mount: String,
}

/// Collect disk usage from a pre-refreshed `Disks` instance.
pub fn collect_from(disks: &Disks) -> Vec<DiskInfo> {
    disks
        .iter()
        .filter(|d| !is_pseudo_fs(&d.file_system().to_string_lossy()))
        .map(|d| {
            let total = d.total_space();
            let available = d.available_space();
            let used = total.saturating_sub(available);
            DiskInfo {
                fs: d.name().to_string_lossy().to_string(),
                kind: d.file_system().to_string_lossy().to_string(),
                size: total,
                used,
                available,
                use_percent: super::memory::used_percent(used, total).unwrap_or(0.0),
                mount: d.mount_point().to_string_lossy().to_string(),
            }
        })
        .collect()
}

fn is_pseudo_fs(fs: &str) -> bool {
    fs.starts_with("tmpfs") || fs.starts_with("devtmpfs") || fs.starts_with("squashfs")
}
