//! Prometheus counters and histograms for the monitoring engine.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub packets_total: Counter,
    pub threats_total: Counter,
    pub lookups_total: Counter,
    pub lookup_failures_total: Counter,
    pub capture_restarts_total: Counter,
    pub lookup_latency: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let packets_total =
            Counter::new("netvakt_packets_total", "Packets observed by the capture loop").unwrap();
        let threats_total =
            Counter::new("netvakt_threats_total", "Threat signals scored").unwrap();
        let lookups_total =
            Counter::new("netvakt_lookups_total", "Geolocation lookups issued").unwrap();
        let lookup_failures_total = Counter::new(
            "netvakt_lookup_failures_total",
            "Geolocation lookups that timed out or failed",
        )
        .unwrap();
        let capture_restarts_total = Counter::new(
            "netvakt_capture_restarts_total",
            "Capture stream reopen attempts after an error",
        )
        .unwrap();

        let lookup_latency = Histogram::with_opts(
            HistogramOpts::new(
                "netvakt_lookup_latency_seconds",
                "Geolocation lookup round-trip time",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0]),
        )
        .unwrap();

        registry.register(Box::new(packets_total.clone())).unwrap();
        registry.register(Box::new(threats_total.clone())).unwrap();
        registry.register(Box::new(lookups_total.clone())).unwrap();
        registry
            .register(Box::new(lookup_failures_total.clone()))
            .unwrap();
        registry
            .register(Box::new(capture_restarts_total.clone()))
            .unwrap();
        registry.register(Box::new(lookup_latency.clone())).unwrap();

        Self {
            registry,
            packets_total,
            threats_total,
            lookups_total,
            lookup_failures_total,
            capture_restarts_total,
            lookup_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
