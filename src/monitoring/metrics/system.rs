//! Process resource probes using the sysinfo crate
//!
//! Real figures are only available with the `metrics` feature enabled.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use sysinfo::{ProcessesToUpdate, System};

/// Memory use of the current process
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ProcessMemory {
    /// Resident memory of this process in bytes
    pub used_bytes: u64,
    /// Total system memory in bytes
    pub total_bytes: u64,
    /// `used_bytes` as a percentage of `total_bytes`
    pub usage_percent: f64,
}

#[cfg(feature = "metrics")]
static SYSTEM: Lazy<parking_lot::Mutex<System>> = Lazy::new(|| parking_lot::Mutex::new(System::new()));

/// Sample the current process's memory use
#[cfg(feature = "metrics")]
pub fn process_memory() -> Option<ProcessMemory> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = SYSTEM.lock();
    sys.refresh_memory();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    let used_bytes = sys.process(pid)?.memory();
    let total_bytes = sys.total_memory();
    let usage_percent = if total_bytes > 0 {
        used_bytes as f64 / total_bytes as f64 * 100.0
    } else {
        0.0
    };

    Some(ProcessMemory {
        used_bytes,
        total_bytes,
        usage_percent,
    })
}

#[cfg(not(feature = "metrics"))]
pub fn process_memory() -> Option<ProcessMemory> {
    None
}
