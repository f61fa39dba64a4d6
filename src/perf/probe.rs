//! System metric probes
//!
//! `ProcProbe` reads Linux `/proc` pseudo-files; `NullProbe` stands in where
//! no metrics source exists. Parsing is split into pure functions so it can be
//! tested against captured file contents.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Cumulative CPU tick counters from one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

/// One raw reading of system metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    /// `None` when the platform exposes no tick counters
    pub cpu: Option<CpuTicks>,
    pub mem_total_mb: u64,
    pub mem_used_mb: u64,
    pub process_mem_mb: u64,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {resource}: {message}")]
    Parse { resource: String, message: String },
}

/// Source of CPU and memory readings
pub trait SystemProbe {
    fn sample(&mut self) -> Result<RawSample, ProbeError>;
}

/// Probe for platforms without a metrics source; always reports zeros
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl SystemProbe for NullProbe {
    fn sample(&mut self) -> Result<RawSample, ProbeError> {
        Ok(RawSample::default())
    }
}

/// Linux `/proc` reader
#[derive(Debug, Clone)]
pub struct ProcProbe {
    root: PathBuf,
}

impl Default for ProcProbe {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/proc"),
        }
    }
}

impl ProcProbe {
    /// Read from an alternative proc root (tests point this at a temp dir)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &str) -> Result<String, ProbeError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| ProbeError::Io {
            resource: path.display().to_string(),
            source,
        })
    }
}

impl SystemProbe for ProcProbe {
    fn sample(&mut self) -> Result<RawSample, ProbeError> {
        let cpu = parse_proc_stat(&self.read("stat")?)?;
        let (mem_total_mb, mem_used_mb) = parse_meminfo(&self.read("meminfo")?)?;
        let process_mem_mb = parse_vm_rss_mb(&self.read("self/status")?).unwrap_or(0);

        Ok(RawSample {
            cpu: Some(cpu),
            mem_total_mb,
            mem_used_mb,
            process_mem_mb,
        })
    }
}

/// Pick the probe for the current platform
pub fn default_probe() -> Box<dyn SystemProbe> {
    if cfg!(target_os = "linux") {
        Box::new(ProcProbe::default())
    } else {
        tracing::info!("No system metrics source on this platform; admission checks always pass");
        Box::new(NullProbe)
    }
}

/// Parse the aggregate `cpu ` line of `/proc/stat`
///
/// Idle time includes iowait. Total sums user, nice, system, idle, iowait,
/// irq, softirq and steal (guest time is already inside user/nice).
pub fn parse_proc_stat(contents: &str) -> Result<CpuTicks, ProbeError> {
    let line = contents
        .lines()
        .find(|line| line.starts_with("cpu "))
        .ok_or_else(|| ProbeError::Parse {
            resource: "/proc/stat".to_string(),
            message: "no aggregate cpu line".to_string(),
        })?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|field| field.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| ProbeError::Parse {
            resource: "/proc/stat".to_string(),
            message: format!("bad tick counter: {}", e),
        })?;

    if fields.len() < 4 {
        return Err(ProbeError::Parse {
            resource: "/proc/stat".to_string(),
            message: format!("expected at least 4 counters, got {}", fields.len()),
        });
    }

    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total = fields.iter().sum();
    Ok(CpuTicks { idle, total })
}

/// Parse `/proc/meminfo` into `(total_mb, used_mb)`
///
/// Used memory is `MemTotal - MemAvailable`, falling back to `MemFree` on
/// kernels that don't report `MemAvailable`.
pub fn parse_meminfo(contents: &str) -> Result<(u64, u64), ProbeError> {
    let field = |name: &str| -> Option<u64> {
        contents.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            rest.split_whitespace().next()?.parse::<u64>().ok()
        })
    };

    let total_kb = field("MemTotal").ok_or_else(|| ProbeError::Parse {
        resource: "/proc/meminfo".to_string(),
        message: "MemTotal missing".to_string(),
    })?;
    let available_kb = field("MemAvailable")
        .or_else(|| field("MemFree"))
        .ok_or_else(|| ProbeError::Parse {
            resource: "/proc/meminfo".to_string(),
            message: "MemAvailable and MemFree missing".to_string(),
        })?;

    let used_kb = total_kb.saturating_sub(available_kb);
    Ok((total_kb / 1024, used_kb / 1024))
}

/// Resident set size from `/proc/self/status`, in MB
pub fn parse_vm_rss_mb(contents: &str) -> Option<u64> {
    contents.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
        Some(kb / 1024)
    })
}

/// CPU utilisation between two readings, in percent
///
/// Without a baseline, or when no ticks elapsed, the result is 0. Counter
/// wrap-around or idle exceeding total is clamped into `[0, 100]`.
pub fn cpu_percent(previous: Option<CpuTicks>, current: CpuTicks) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    let total = current.total.saturating_sub(previous.total);
    if total == 0 {
        return 0.0;
    }
    let idle = current.idle.saturating_sub(previous.idle);
    let usage = 100.0 * (1.0 - idle as f64 / total as f64);
    usage.clamp(0.0, 100.0)
}
