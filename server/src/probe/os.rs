use serde::Serialize;
use sysinfo::System;

/// Operating system information.
#[derive(Debug, Clone, Serialize)]
pub struct OsInfo {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub arch: String,
    pub hostname: String,
    /// Seconds since boot.
    pub uptime: u64,
}

/// Collect OS information.
pub fn collect() -> OsInfo {
    OsInfo {
        platform: std::env::consts::OS.to_string(),
        distro: System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| "unknown".to_string()),
        release: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
        arch: std::env::consts::ARCH.to_string(),
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        uptime: System::uptime(),
    }
}
