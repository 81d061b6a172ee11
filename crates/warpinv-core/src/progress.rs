//! Progress reporting for fixed-point sweeps.
//!
//! Callbacks observe a run after every sweep. They cannot alter the sweep
//! budget; the filter always performs all of its sweeps.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Summary of one completed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepInfo {
    /// Zero-based sweep number.
    pub sweep: usize,
    /// Total sweeps in the run (iterations + 1).
    pub total_sweeps: usize,
    /// Points whose mapped position was inside the input domain.
    pub updated_points: usize,
    /// Points left unchanged because they mapped outside.
    pub frozen_points: usize,
    /// Largest change of any estimate vector during this sweep.
    pub max_update: f64,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl SweepInfo {
    /// Completed fraction of the run, in percent.
    pub fn progress_percent(&self) -> f64 {
        if self.total_sweeps == 0 {
            return 100.0;
        }
        ((self.sweep + 1) as f64 / self.total_sweeps as f64) * 100.0
    }

    /// Whether this is the final sweep of the run.
    pub fn is_last(&self) -> bool {
        self.sweep + 1 == self.total_sweeps
    }
}

/// Observer of inversion runs.
pub trait SweepCallback: Send + Sync {
    /// Called after each sweep.
    fn on_sweep(&self, info: &SweepInfo);

    /// Called before the first sweep with the number of output points.
    fn on_start(&self, _total_sweeps: usize, _points: usize) {}

    /// Called once after the last sweep.
    fn on_complete(&self, _info: &SweepInfo) {}
}

/// Callback that logs sweeps through `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingSweepCallback {
    /// Log every `log_interval` sweeps (and always the last one). Zero logs every sweep.
    pub log_interval: usize,
}

impl Default for LoggingSweepCallback {
    fn default() -> Self {
        Self { log_interval: 1 }
    }
}

impl LoggingSweepCallback {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl SweepCallback for LoggingSweepCallback {
    fn on_sweep(&self, info: &SweepInfo) {
        if info.sweep % self.log_interval.max(1) == 0 || info.is_last() {
            tracing::info!(
                "Sweep {}/{} ({:.0}%) | updated: {} | frozen: {} | max update: {:.3e} | elapsed: {:.3}s",
                info.sweep + 1,
                info.total_sweeps,
                info.progress_percent(),
                info.updated_points,
                info.frozen_points,
                info.max_update,
                info.elapsed.as_secs_f64()
            );
        }
    }

    fn on_start(&self, total_sweeps: usize, points: usize) {
        tracing::info!("Inverting displacement field: {} sweeps over {} points", total_sweeps, points);
    }

    fn on_complete(&self, info: &SweepInfo) {
        tracing::info!(
            "Inversion finished in {:.3}s (last max update {:.3e})",
            info.elapsed.as_secs_f64(),
            info.max_update
        );
    }
}

/// Callback that records every sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepHistory {
    history: Arc<Mutex<Vec<SweepInfo>>>,
}

impl SweepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded sweeps, in order.
    pub fn sweeps(&self) -> Vec<SweepInfo> {
        self.lock().clone()
    }

    /// Max-update series, one value per sweep.
    pub fn max_updates(&self) -> Vec<f64> {
        self.lock().iter().map(|info| info.max_update).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SweepInfo>> {
        // A poisoned history still holds valid entries.
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SweepCallback for SweepHistory {
    fn on_sweep(&self, info: &SweepInfo) {
        self.lock().push(info.clone());
    }
}
