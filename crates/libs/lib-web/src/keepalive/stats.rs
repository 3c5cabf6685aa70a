//! Lock-free counters for the keep-alive loop.

use lib_core::dto::KeepAliveReport;
use lib_utils::unix_now;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct KeepAliveStats {
    enabled: AtomicBool,
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    consecutive_failures: AtomicU64,
    /// 0 until the first success
    last_success_at: AtomicU64,
}

impl KeepAliveStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.last_success_at.store(unix_now().max(1), Ordering::Relaxed);
    }

    /// Record a failed ping and return the length of the current failure streak.
    pub fn record_failure(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> KeepAliveReport {
        let last = self.last_success_at.load(Ordering::Relaxed);
        KeepAliveReport {
            enabled: self.enabled.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures(),
            last_success_at: (last != 0).then_some(last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_resets_streak() {
        let stats = KeepAliveStats::new();
        assert_eq!(stats.record_failure(), 1);
        assert_eq!(stats.record_failure(), 2);
        stats.record_success();

        let report = stats.report();
        assert_eq!(report.attempts, 3);
        assert_eq!(report.failures, 2);
        assert_eq!(report.successes, 1);
        assert_eq!(report.consecutive_failures, 0);
        assert!(report.last_success_at.is_some());
    }
}
