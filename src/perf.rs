//! Resource-aware admission control
//!
//! `AdmissionController` samples CPU and memory on a fixed interval and gates
//! module creation against configurable thresholds. Checks only ever read the
//! most recent snapshot; sampling happens on the host's tick.

pub mod probe;

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::DockConfig;
use crate::error::{AdmissionDenial, AdmissionError};
use crate::timer::Interval;

pub use probe::{CpuTicks, NullProbe, ProbeError, ProcProbe, RawSample, SystemProbe};

/// Most recent resource reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerformanceSnapshot {
    pub cpu_percent: f64,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
    pub mem_percent: f64,
    pub process_mem_mb: u64,
}

impl PerformanceSnapshot {
    pub fn mem_available_mb(&self) -> u64 {
        self.mem_total_mb.saturating_sub(self.mem_used_mb)
    }
}

/// Limits that gate module creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub process_memory_mb: u64,
    /// Fraction of each limit at which a warning is raised
    pub warning_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 85.0,
            process_memory_mb: 1024,
            warning_ratio: 0.9,
        }
    }
}

impl Thresholds {
    pub fn from_config(config: &DockConfig) -> Self {
        Self {
            cpu_percent: config.cpu_threshold,
            memory_percent: config.memory_threshold,
            process_memory_mb: config.process_memory_threshold_mb,
            warning_ratio: config.warning_ratio,
        }
    }
}

/// Non-blocking notice that a resource is approaching its limit
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceWarning {
    pub resource: AdmissionDenial,
    pub message: String,
}

impl fmt::Display for PerformanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Periodic sampler plus creation gate
pub struct AdmissionController {
    probe: Box<dyn SystemProbe>,
    thresholds: Thresholds,
    interval: Interval,
    snapshot: PerformanceSnapshot,
    cpu_baseline: Option<CpuTicks>,
}

impl fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionController")
            .field("thresholds", &self.thresholds)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl AdmissionController {
    /// Create a controller and take an initial reading
    ///
    /// The initial reading has no CPU baseline, so CPU starts at 0%.
    pub fn new(
        probe: Box<dyn SystemProbe>,
        thresholds: Thresholds,
        period: Duration,
        now: Instant,
    ) -> Self {
        let mut controller = Self {
            probe,
            thresholds,
            interval: Interval::new(period, now),
            snapshot: PerformanceSnapshot::default(),
            cpu_baseline: None,
        };
        controller.sample();
        controller
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn snapshot(&self) -> &PerformanceSnapshot {
        &self.snapshot
    }

    pub fn next_due(&self) -> Instant {
        self.interval.next_due()
    }

    pub fn set_cpu_threshold(&mut self, percent: f64) {
        self.thresholds.cpu_percent = percent;
    }

    pub fn set_memory_threshold(&mut self, percent: f64) {
        self.thresholds.memory_percent = percent;
    }

    pub fn set_process_memory_threshold(&mut self, mb: u64) {
        self.thresholds.process_memory_mb = mb;
    }

    /// Sample if the interval has elapsed; returns warnings from that sample
    pub fn poll(&mut self, now: Instant) -> Option<Vec<PerformanceWarning>> {
        if self.interval.due(now) {
            Some(self.sample())
        } else {
            None
        }
    }

    /// Take a reading now, replacing the snapshot
    ///
    /// A failed reading is logged and leaves the previous snapshot in place.
    pub fn sample(&mut self) -> Vec<PerformanceWarning> {
        let raw = match self.probe.sample() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Performance sample failed: {}", e);
                return Vec::new();
            }
        };

        let cpu_percent = match raw.cpu {
            Some(ticks) => {
                let usage = probe::cpu_percent(self.cpu_baseline, ticks);
                self.cpu_baseline = Some(ticks);
                usage
            }
            None => 0.0,
        };

        let mem_percent = if raw.mem_total_mb > 0 {
            raw.mem_used_mb as f64 / raw.mem_total_mb as f64 * 100.0
        } else {
            0.0
        };

        self.snapshot = PerformanceSnapshot {
            cpu_percent,
            mem_used_mb: raw.mem_used_mb,
            mem_total_mb: raw.mem_total_mb,
            mem_percent,
            process_mem_mb: raw.process_mem_mb,
        };

        tracing::trace!(
            "perf sample: cpu={:.1}% mem={:.1}% ({}/{} MB) process={} MB",
            self.snapshot.cpu_percent,
            self.snapshot.mem_percent,
            self.snapshot.mem_used_mb,
            self.snapshot.mem_total_mb,
            self.snapshot.process_mem_mb
        );

        let warnings = self.warnings();
        for warning in &warnings {
            tracing::debug!("{}", warning);
        }
        warnings
    }

    /// Install a snapshot directly (hosts without a probe, and tests)
    pub fn set_snapshot(&mut self, snapshot: PerformanceSnapshot) {
        self.snapshot = snapshot;
    }

    /// Approve or deny a module creation against the last snapshot
    ///
    /// CPU is checked first, then system memory, then process memory.
    pub fn can_create(&self) -> Result<(), AdmissionError> {
        let s = &self.snapshot;
        let t = &self.thresholds;

        if s.cpu_percent > t.cpu_percent {
            return Err(AdmissionError {
                kind: AdmissionDenial::CpuLimit,
                reason: format!(
                    "CPU usage too high ({:.1}% > {:.1}%). Wait for the system load to drop before creating more modules.",
                    s.cpu_percent, t.cpu_percent
                ),
            });
        }

        if s.mem_percent > t.memory_percent {
            return Err(AdmissionError {
                kind: AdmissionDenial::MemoryLimit,
                reason: format!(
                    "System memory usage too high ({:.1}% > {:.1}%). {} MB available of {} MB.",
                    s.mem_percent,
                    t.memory_percent,
                    s.mem_available_mb(),
                    s.mem_total_mb
                ),
            });
        }

        if s.process_mem_mb > t.process_memory_mb {
            return Err(AdmissionError {
                kind: AdmissionDenial::ProcessMemoryLimit,
                reason: format!(
                    "Application memory usage too high ({} MB > {} MB). Close some modules first.",
                    s.process_mem_mb, t.process_memory_mb
                ),
            });
        }

        Ok(())
    }

    /// Warnings for every resource above `warning_ratio` of its limit
    pub fn warnings(&self) -> Vec<PerformanceWarning> {
        let s = &self.snapshot;
        let t = &self.thresholds;
        let ratio = t.warning_ratio;
        let mut warnings = Vec::new();

        if s.cpu_percent > t.cpu_percent * ratio {
            warnings.push(PerformanceWarning {
                resource: AdmissionDenial::CpuLimit,
                message: format!(
                    "High CPU usage: {:.1}% (limit {:.1}%)",
                    s.cpu_percent, t.cpu_percent
                ),
            });
        }
        if s.mem_percent > t.memory_percent * ratio {
            warnings.push(PerformanceWarning {
                resource: AdmissionDenial::MemoryLimit,
                message: format!(
                    "High memory usage: {:.1}% (limit {:.1}%)",
                    s.mem_percent, t.memory_percent
                ),
            });
        }
        if s.process_mem_mb as f64 > t.process_memory_mb as f64 * ratio {
            warnings.push(PerformanceWarning {
                resource: AdmissionDenial::ProcessMemoryLimit,
                message: format!(
                    "High application memory usage: {} MB (limit {} MB)",
                    s.process_mem_mb, t.process_memory_mb
                ),
            });
        }
        warnings
    }
}
