use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters for the fetch gateway. Cheap to clone; clones share counters.
#[derive(Clone)]
pub struct GatewayMetrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    requests: AtomicU64,
    pages_ok: AtomicU64,
    pages_empty: AtomicU64,
    pages_failed: AtomicU64,
    total_fetch_time_ms: AtomicU64,
}

/// Point-in-time copy of [`GatewayMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub pages_ok: u64,
    pub pages_empty: u64,
    pub pages_failed: u64,
    pub total_fetch_time_ms: u64,
}

impl MetricsSnapshot {
    pub fn average_fetch_time_ms(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.total_fetch_time_ms as f64 / self.requests as f64
    }
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests: AtomicU64::new(0),
                pages_ok: AtomicU64::new(0),
                pages_empty: AtomicU64::new(0),
                pages_failed: AtomicU64::new(0),
                total_fetch_time_ms: AtomicU64::new(0),
            }),
        }
    }

    pub fn increment_requests(&self) {
        self.inner.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ok(&self) {
        self.inner.pages_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_empty(&self) {
        self.inner.pages_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.inner.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fetch_time(&self, duration: Duration) {
        self.inner
            .total_fetch_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.inner.requests.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.inner.requests.load(Ordering::Relaxed),
            pages_ok: self.inner.pages_ok.load(Ordering::Relaxed),
            pages_empty: self.inner.pages_empty.load(Ordering::Relaxed),
            pages_failed: self.inner.pages_failed.load(Ordering::Relaxed),
            total_fetch_time_ms: self.inner.total_fetch_time_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock timer for a single fetch.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
