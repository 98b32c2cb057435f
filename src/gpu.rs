//! GPU load/VRAM/temperature with platform-specific backends and optional NVML.
//!
//! Detection cascade:
//! 1. NVML (if `gpu` feature enabled) — richest data for NVIDIA
//! 2. Linux: sysfs (`/sys/class/drm/card*`) — works for AMD, Intel
//! 3. nvidia-smi CLI — NVIDIA on Linux and Windows, cached with a TTL
//!
//! Every backend degrades to "no GPU" instead of erroring: the overlay
//! renders absent readings as zero-valued gauges.

#[cfg(target_os = "linux")]
use std::fs;
#[cfg(target_os = "linux")]
use std::path::Path;
use std::sync::RwLock;
use std::time::Instant;

/// Raw counters for one GPU, before conversion to gauge percentages.
/// Zero means "the backend had no reading", matching what sysfs and
/// nvidia-smi report when a field is missing.
#[derive(Clone, Copy, Debug, Default)]
struct GpuReading {
    utilization: u32, // 0-100%
    memory_used: u64,
    memory_total: u64,
    temperature: f32,
}

impl GpuReading {
    #[cfg(target_os = "linux")]
    fn is_empty(&self) -> bool {
        self.utilization == 0 && self.memory_total == 0 && self.temperature == 0.0
    }

    /// `(load %, vram %, temp °C)` — fields the backend had no reading
    /// for become `None` so the caller can't mistake them for real zeros.
    fn into_stats(self) -> (Option<f32>, Option<f32>, Option<f32>) {
        let vram = if self.memory_total > 0 {
            Some(self.memory_used as f32 / self.memory_total as f32 * 100.0)
        } else {
            None
        };
        let temp = if self.temperature > 0.0 {
            Some(self.temperature)
        } else {
            None
        };
        (Some(self.utilization as f32), vram, temp)
    }
}

/// Query the first GPU using the best available backend.
/// `(None, None, None)` signals "no GPU or query failed" — never an error.
pub fn gpu_stats() -> (Option<f32>, Option<f32>, Option<f32>) {
    match first_gpu() {
        Some(reading) => reading.into_stats(),
        None => (None, None, None),
    }
}

fn first_gpu() -> Option<GpuReading> {
    // 1. NVML (feature-gated, NVIDIA only)
    #[cfg(feature = "gpu")]
    if let Some(reading) = read_nvml() {
        return Some(reading);
    }

    // 2. sysfs (Linux, AMD/Intel; partial for NVIDIA)
    #[cfg(target_os = "linux")]
    if let Some(reading) = read_sysfs() {
        if !reading.is_empty() {
            return Some(reading);
        }
        // A detected card with no usable counters is typically NVIDIA
        // under the proprietary driver — nvidia-smi fills the gap.
        if let Some(smi) = query_nvidia_smi() {
            return Some(smi);
        }
        return Some(reading);
    }

    // 3. nvidia-smi standalone (Linux containers without sysfs, Windows)
    query_nvidia_smi()
}

// ---------------------------------------------------------------------------
// nvidia-smi backend — parses CSV output from the CLI tool
// ---------------------------------------------------------------------------

/// nvidia-smi spawns a subprocess, so results are cached with a short TTL
/// rather than re-queried on every 1-second sampling cycle.
static NVIDIA_SMI_CACHE: RwLock<Option<(Instant, Option<GpuReading>)>> = RwLock::new(None);

const NVIDIA_SMI_TTL_SECS: u64 = 5;

fn query_nvidia_smi() -> Option<GpuReading> {
    if let Ok(guard) = NVIDIA_SMI_CACHE.read() {
        if let Some((ts, cached)) = *guard {
            if ts.elapsed().as_secs() < NVIDIA_SMI_TTL_SECS {
                return cached;
            }
        }
    }

    let result = query_nvidia_smi_uncached();

    if let Ok(mut guard) = NVIDIA_SMI_CACHE.write() {
        *guard = Some((Instant::now(), result));
    }

    result
}

fn query_nvidia_smi_uncached() -> Option<GpuReading> {
    use std::process::Command;

    let output = Command::new("nvidia-smi")
        .args([
            "--query-gpu=utilization.gpu,memory.used,memory.total,temperature.gpu",
            "--format=csv,noheader,nounits",
        ])
        .output();

    let output = match output {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            // The tool exists but the driver refused the query — a
            // transient failure, degraded to "no GPU" for this cycle.
            eprintln!("[perch] nvidia-smi exited with {}", o.status);
            return None;
        }
        // Not installed — no backend, nothing to log.
        Err(_) => return None,
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().find_map(parse_nvidia_smi_line)
}

/// Parse one CSV line of `utilization.gpu, memory.used, memory.total,
/// temperature.gpu` (memory in MiB).
fn parse_nvidia_smi_line(line: &str) -> Option<GpuReading> {
    let fields: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
    if fields.len() < 4 {
        return None;
    }

    Some(GpuReading {
        utilization: fields[0].parse().unwrap_or(0),
        memory_used: fields[1].parse::<u64>().map(|m| m * 1024 * 1024).unwrap_or(0),
        memory_total: fields[2].parse::<u64>().map(|m| m * 1024 * 1024).unwrap_or(0),
        temperature: fields[3].parse().unwrap_or(0.0),
    })
}

// ---------------------------------------------------------------------------
// sysfs backend (Linux) — works for AMD, Intel; partial for NVIDIA
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
fn read_sysfs() -> Option<GpuReading> {
    let drm = Path::new("/sys/class/drm");
    let entries = fs::read_dir(drm).ok()?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        // Match card0, card1, … (skip card0-DP-1 etc.)
        if !name_str.starts_with("card") || name_str.contains('-') {
            continue;
        }

        let device_path = entry.path().join("device");
        if !device_path.exists() {
            continue;
        }

        return Some(GpuReading {
            utilization: read_sysfs_utilization(&device_path),
            memory_used: read_sysfs_str(&device_path.join("mem_info_vram_used"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            memory_total: read_sysfs_str(&device_path.join("mem_info_vram_total"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            temperature: read_hwmon_temp(&device_path),
        });
    }

    None
}

#[cfg(target_os = "linux")]
fn read_sysfs_str(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(target_os = "linux")]
fn read_sysfs_utilization(device_path: &Path) -> u32 {
    // AMD: gpu_busy_percent
    read_sysfs_str(&device_path.join("gpu_busy_percent"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(target_os = "linux")]
fn read_hwmon_temp(device_path: &Path) -> f32 {
    let hwmon_dir = device_path.join("hwmon");
    let Ok(entries) = fs::read_dir(&hwmon_dir) else {
        return 0.0;
    };

    for entry in entries.flatten() {
        let temp_input = entry.path().join("temp1_input");
        if let Some(val) = read_sysfs_str(&temp_input) {
            if let Ok(millideg) = val.parse::<f64>() {
                return (millideg / 1000.0) as f32;
            }
        }
    }
    0.0
}

// ---------------------------------------------------------------------------
// NVML backend (optional, NVIDIA only)
// ---------------------------------------------------------------------------

#[cfg(feature = "gpu")]
fn read_nvml() -> Option<GpuReading> {
    use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
    use nvml_wrapper::Nvml;

    // No NVML library or no NVIDIA hardware — not an error, just no backend.
    let nvml = Nvml::init().ok()?;
    if nvml.device_count().ok()? == 0 {
        return None;
    }

    let device = match nvml.device_by_index(0) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("[perch] nvml device query failed: {e}");
            return None;
        }
    };

    let utilization = device.utilization_rates().map(|u| u.gpu).unwrap_or(0);
    let memory = device.memory_info().ok();
    let temperature = device
        .temperature(TemperatureSensor::Gpu)
        .map(|t| t as f32)
        .unwrap_or(0.0);

    Some(GpuReading {
        utilization,
        memory_used: memory.as_ref().map(|m| m.used).unwrap_or(0),
        memory_total: memory.as_ref().map(|m| m.total).unwrap_or(0),
        temperature,
    })
}
