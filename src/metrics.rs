// Pass metrics module
//
// Counts what happened to each source file during one convert-and-inject pass

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for a single pass.
///
/// Uses atomic operations so recording only needs `&self`.
#[derive(Debug)]
pub struct PassMetrics {
    /// Source files matched by the walker
    pub files_matched: AtomicUsize,

    /// Style modules successfully injected
    pub files_injected: AtomicUsize,

    /// Sources skipped because their style module does not exist
    pub missing_targets: AtomicUsize,

    /// Sources that compiled to empty CSS
    pub empty_payloads: AtomicUsize,

    /// Style modules without injection comments
    pub regions_not_found: AtomicUsize,

    /// Sources that failed to compile, post-process, read or write
    pub files_failed: AtomicUsize,

    /// Total compile time in milliseconds
    pub total_compile_time_ms: AtomicU64,

    start_time: Instant,
}

/// Snapshot of [`PassMetrics`] returned from every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub matched: usize,
    pub injected: usize,
    pub missing_targets: usize,
    pub empty_payloads: usize,
    pub regions_not_found: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl PassSummary {
    /// True when no file failed outright.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl PassMetrics {
    pub fn new() -> Self {
        Self {
            files_matched: AtomicUsize::new(0),
            files_injected: AtomicUsize::new(0),
            missing_targets: AtomicUsize::new(0),
            empty_payloads: AtomicUsize::new(0),
            regions_not_found: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            total_compile_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_matched(&self) {
        self.files_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_injected(&self) {
        self.files_injected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_target(&self) {
        self.missing_targets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_payload(&self) {
        self.empty_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_region_not_found(&self) {
        self.regions_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compile_time(&self, duration: Duration) {
        self.total_compile_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average compile time per compiled file in milliseconds
    pub fn avg_compile_time_ms(&self) -> f64 {
        let total = self.total_compile_time_ms.load(Ordering::Relaxed);
        let compiled = self
            .files_matched
            .load(Ordering::Relaxed)
            .saturating_sub(self.missing_targets.load(Ordering::Relaxed));
        if compiled > 0 {
            total as f64 / compiled as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> PassSummary {
        PassSummary {
            matched: self.files_matched.load(Ordering::Relaxed),
            injected: self.files_injected.load(Ordering::Relaxed),
            missing_targets: self.missing_targets.load(Ordering::Relaxed),
            empty_payloads: self.empty_payloads.load(Ordering::Relaxed),
            regions_not_found: self.regions_not_found.load(Ordering::Relaxed),
            failed: self.files_failed.load(Ordering::Relaxed),
            duration: self.elapsed(),
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Pass finished in {:.2}s: {} matched, {} injected, {} without module, {} empty, {} without injection comments, {} failed",
            summary.duration.as_secs_f64(),
            summary.matched,
            summary.injected,
            summary.missing_targets,
            summary.empty_payloads,
            summary.regions_not_found,
            summary.failed
        );
        tracing::debug!(
            "Total compile time: {:.2}s (avg: {:.2}ms per file)",
            self.total_compile_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_compile_time_ms()
        );
    }
}

impl Default for PassMetrics {
    fn default() -> Self {
        Self::new()
    }
}
