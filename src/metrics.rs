use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// One cycle's full set of metric readings. Crosses the sampler→UI
/// boundary by value; the optional fields are `None` when no GPU is
/// present or the query failed for that cycle, which the gauges render
/// as zero rather than as an error.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub cpu_percent: f32,
    pub ram_percent: f32,
    pub gpu_percent: Option<f32>,
    pub vram_percent: Option<f32>,
    pub gpu_temp_c: Option<f32>,
}

/// Where readings come from. The sampler is generic over this so tests
/// can drive it with scripted values instead of live hardware.
pub trait MetricSource {
    /// Global CPU load in [0, 100].
    fn cpu_percent(&mut self) -> f32;
    /// Used physical memory in [0, 100].
    fn memory_percent(&mut self) -> f32;
    /// `(load %, vram %, temp °C)` for the first GPU, each `None` when
    /// unavailable.
    fn gpu_stats(&mut self) -> (Option<f32>, Option<f32>, Option<f32>);

    fn sample(&mut self) -> Sample {
        let (gpu_percent, vram_percent, gpu_temp_c) = self.gpu_stats();
        Sample {
            cpu_percent: self.cpu_percent(),
            ram_percent: self.memory_percent(),
            gpu_percent,
            vram_percent,
            gpu_temp_c,
        }
    }
}

/// Live readings via sysinfo plus the GPU backend cascade.
///
/// Keeps one `System` alive across ticks so CPU usage is measured against
/// the previous refresh instead of reallocating every second.
pub struct SystemSource {
    sys: System,
}

impl SystemSource {
    pub fn new() -> Self {
        let mut sys = System::new_with_specifics(Self::refresh_kind());
        // Prime the CPU counters so the first real sample has a baseline.
        sys.refresh_specifics(Self::refresh_kind());
        Self { sys }
    }

    fn refresh_kind() -> RefreshKind {
        RefreshKind::new()
            .with_cpu(CpuRefreshKind::new().with_cpu_usage())
            .with_memory(MemoryRefreshKind::new().with_ram())
    }

    fn refresh(&mut self) {
        self.sys.refresh_specifics(Self::refresh_kind());
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemSource {
    fn cpu_percent(&mut self) -> f32 {
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return 0.0;
        }
        cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
    }

    fn memory_percent(&mut self) -> f32 {
        let total = self.sys.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.sys.used_memory() as f32 / total as f32 * 100.0
    }

    fn gpu_stats(&mut self) -> (Option<f32>, Option<f32>, Option<f32>) {
        crate::gpu::gpu_stats()
    }

    fn sample(&mut self) -> Sample {
        self.refresh();
        let (gpu_percent, vram_percent, gpu_temp_c) = self.gpu_stats();
        Sample {
            cpu_percent: self.cpu_percent(),
            ram_percent: self.memory_percent(),
            gpu_percent,
            vram_percent,
            gpu_temp_c,
        }
    }
}
