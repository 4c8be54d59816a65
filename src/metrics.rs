//! Performance metrics for the prediction service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for prediction serving
pub struct ServiceMetrics {
    /// Total single predictions served
    pub predictions_served: AtomicU64,
    /// Total batch requests served
    pub batch_requests: AtomicU64,
    /// Total routes predicted across batch requests
    pub batch_routes: AtomicU64,
    /// Total prediction failures (model-level, not validation)
    pub prediction_failures: AtomicU64,
    /// Inference latencies in microseconds
    latencies: RwLock<Vec<u64>>,
    /// Start time for throughput calculation
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            batch_requests: AtomicU64::new(0),
            batch_routes: AtomicU64::new(0),
            prediction_failures: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful single prediction
    pub fn record_prediction(&self, latency: Duration) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency);
    }

    /// Record a successful batch prediction
    pub fn record_batch(&self, routes: usize, latency: Duration) {
        self.batch_requests.fetch_add(1, Ordering::Relaxed);
        self.batch_routes.fetch_add(routes as u64, Ordering::Relaxed);
        self.record_latency(latency);
    }

    /// Record a model-level prediction failure
    pub fn record_failure(&self) {
        self.prediction_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, latency: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }
    }

    /// Get latency statistics over the recorded window
    pub fn latency_stats(&self) -> LatencyStats {
        let times = self.latencies.read().unwrap();
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
        }
    }

    /// Requests per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let served = self.predictions_served.load(Ordering::Relaxed)
                + self.batch_requests.load(Ordering::Relaxed);
            served as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log a summary of serving statistics
    pub fn log_summary(&self) {
        let stats = self.latency_stats();
        info!(
            predictions = self.predictions_served.load(Ordering::Relaxed),
            batches = self.batch_requests.load(Ordering::Relaxed),
            batch_routes = self.batch_routes.load(Ordering::Relaxed),
            failures = self.prediction_failures.load(Ordering::Relaxed),
            throughput = format!("{:.1} req/s", self.throughput()),
            latency_mean_us = stats.mean_us,
            latency_p95_us = stats.p95_us,
            latency_p99_us = stats.p99_us,
            "Serving metrics"
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics over the recorded window
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Periodic reporter that logs serving metrics on an interval
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100));
        metrics.record_prediction(Duration::from_micros(200));
        metrics.record_batch(3, Duration::from_micros(500));
        metrics.record_failure();

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.batch_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.batch_routes.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.prediction_failures.load(Ordering::Relaxed), 1);

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 3);
        assert!(stats.mean_us >= 100);
    }

    #[test]
    fn test_empty_latency_stats() {
        let metrics = ServiceMetrics::new();
        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p99_us, 0);
    }
}
