use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub cpu_usage: f32,
    pub memory_mb: u64,
}

#[derive(Debug, Clone)]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub elapsed: Duration,
}

/// Tracks how long each pipeline phase takes. With the `cli` feature and
/// sampling enabled it also reports the process's memory and CPU.
pub struct RunMonitor {
    started: Instant,
    phase_started: Instant,
    timings: Vec<PhaseTiming>,
    peak_memory_mb: u64,
    #[cfg(feature = "cli")]
    sampler: Option<(System, Pid)>,
}

impl RunMonitor {
    pub fn new(sample_process: bool) -> Self {
        #[cfg(not(feature = "cli"))]
        let _ = sample_process;
        let now = Instant::now();
        Self {
            started: now,
            phase_started: now,
            timings: Vec::new(),
            peak_memory_mb: 0,
            #[cfg(feature = "cli")]
            sampler: if sample_process {
                sysinfo::get_current_pid()
                    .ok()
                    .map(|pid| (System::new(), pid))
            } else {
                None
            },
        }
    }

    pub fn is_sampling(&self) -> bool {
        #[cfg(feature = "cli")]
        {
            self.sampler.is_some()
        }
        #[cfg(not(feature = "cli"))]
        {
            false
        }
    }

    #[cfg(feature = "cli")]
    fn sample(&mut self) -> Option<ProcessSample> {
        let (system, pid) = self.sampler.as_mut()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[*pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        let process = system.process(*pid)?;
        Some(ProcessSample {
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
        })
    }

    #[cfg(not(feature = "cli"))]
    fn sample(&mut self) -> Option<ProcessSample> {
        None
    }

    /// Closes the running phase and starts timing the next one.
    pub fn finish_phase(&mut self, phase: &'static str) -> Duration {
        let elapsed = self.phase_started.elapsed();
        self.phase_started = Instant::now();
        self.timings.push(PhaseTiming { phase, elapsed });

        match self.sample() {
            Some(sample) => {
                self.peak_memory_mb = self.peak_memory_mb.max(sample.memory_mb);
                tracing::info!(
                    phase,
                    elapsed_ms = elapsed.as_millis() as u64,
                    cpu_percent = f64::from(sample.cpu_usage),
                    memory_mb = sample.memory_mb,
                    "phase finished"
                );
            }
            None => {
                tracing::debug!(
                    phase,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "phase finished"
                );
            }
        }
        elapsed
    }

    pub fn timings(&self) -> &[PhaseTiming] {
        &self.timings
    }

    pub fn log_summary(&self) {
        let total = self.started.elapsed();
        let phases = self
            .timings()
            .iter()
            .map(|t| format!("{}={}ms", t.phase, t.elapsed.as_millis()))
            .collect::<Vec<_>>()
            .join(" ");
        if self.is_sampling() {
            tracing::info!(
                total_ms = total.as_millis() as u64,
                peak_memory_mb = self.peak_memory_mb,
                %phases,
                "run finished"
            );
        } else {
            tracing::debug!(total_ms = total.as_millis() as u64, %phases, "run finished");
        }
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
