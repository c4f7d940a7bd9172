//! Deduplicating, failure-isolated enrichment of external addresses.

use std::net::IpAddr;
use std::sync::Arc;

use ipnetwork::IpNetwork;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use netvakt_core::addr;
use netvakt_core::geo::GeoRecord;
use netvakt_core::MonitorState;
use netvakt_telemetry::MetricsRecorder;

use crate::lookup::{GeoLookup, GeoReply};

/// Spawns one bounded, fire-and-forget lookup task per newly observed
/// public source address.
///
/// The capture loop never waits on an enrichment; a task dispatched before
/// shutdown may still complete and write afterwards, which is harmless.
/// Cheap to clone — every field is shared.
#[derive(Clone)]
pub struct GeoEnricher {
    state: Arc<MonitorState>,
    lookup: Arc<dyn GeoLookup>,
    metrics: Arc<MetricsRecorder>,
    skip_networks: Arc<[IpNetwork]>,
    permits: Arc<Semaphore>,
}

impl GeoEnricher {
    pub fn new(
        state: Arc<MonitorState>,
        lookup: Arc<dyn GeoLookup>,
        metrics: Arc<MetricsRecorder>,
        skip_networks: Vec<IpNetwork>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            state,
            lookup,
            metrics,
            skip_networks: skip_networks.into(),
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Dispatches an enrichment task and returns immediately.
    pub fn dispatch(&self, ip: IpAddr, protocol: &str) {
        let this = self.clone();
        let protocol = protocol.to_string();
        tokio::spawn(async move {
            this.enrich(ip, &protocol).await;
        });
    }

    /// Resolves one address, recording it on success.
    ///
    /// Skips without a lookup call when the address is non-public, in a
    /// configured skip range, or already resolved. Every failure path drops
    /// the attempt without marking the address seen, so the next packet
    /// from it retries.
    pub async fn enrich(&self, ip: IpAddr, protocol: &str) {
        if !addr::is_public(ip) || self.skip_networks.iter().any(|net| net.contains(ip)) {
            trace!(%ip, "skipping non-public address");
            return;
        }
        if self.state.is_seen(ip) {
            return;
        }

        let Ok(_permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return;
        };
        // A racing task may have resolved this address while we queued.
        if self.state.is_seen(ip) {
            return;
        }

        self.metrics.lookups_total.inc();
        let timer = self.metrics.lookup_latency.start_timer();
        let outcome = self.lookup.lookup(ip).await;
        timer.observe_duration();

        match outcome {
            Ok(reply) if reply.is_success() => {
                let record = to_record(ip, protocol, reply);
                if self.state.insert_geo(record) {
                    debug!(%ip, protocol, "recorded geolocation");
                } else {
                    trace!(%ip, "lost insert race, already recorded");
                }
            }
            Ok(reply) => {
                self.metrics.lookup_failures_total.inc();
                debug!(%ip, status = %reply.status, "lookup refused, eligible for retry");
            }
            Err(e) => {
                self.metrics.lookup_failures_total.inc();
                debug!(%ip, "lookup failed ({e}), eligible for retry");
            }
        }
    }
}

fn to_record(ip: IpAddr, protocol: &str, reply: GeoReply) -> GeoRecord {
    let unknown = || "Unknown".to_string();
    let city = reply.city.unwrap_or_else(unknown);
    let country = reply.country.unwrap_or_else(unknown);
    GeoRecord {
        ip,
        location: format!("{city}, {country}"),
        country,
        isp: reply.isp.unwrap_or_else(unknown),
        org: reply.org.unwrap_or_else(unknown),
        asn: reply.asn.unwrap_or_else(unknown),
        lat: reply.lat.unwrap_or(0.0),
        lon: reply.lon.unwrap_or(0.0),
        protocol: protocol.to_string(),
        is_proxy: reply.proxy.unwrap_or(false),
        is_hosting: reply.hosting.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupError;
    use async_trait::async_trait;
    use netvakt_core::state::StateOptions;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn success_reply() -> GeoReply {
        serde_json::from_str(
            r#"{"status":"success","city":"Paris","country":"France","isp":"Example ISP",
                "org":"Example Org","as":"AS64500","lat":48.85,"lon":2.35,
                "proxy":false,"hosting":true}"#,
        )
        .unwrap()
    }

    fn fail_reply() -> GeoReply {
        serde_json::from_str(r#"{"status":"fail"}"#).unwrap()
    }

    /// Scripted lookup: pops one outcome per call and counts calls.
    struct ScriptedLookup {
        outcomes: Mutex<VecDeque<Result<GeoReply, LookupError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedLookup {
        fn new(outcomes: Vec<Result<GeoReply, LookupError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeoLookup for ScriptedLookup {
        async fn lookup(&self, _ip: IpAddr) -> Result<GeoReply, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or(Err(LookupError::Transport("script exhausted".into())))
        }
    }

    fn enricher(lookup: Arc<ScriptedLookup>) -> (Arc<MonitorState>, GeoEnricher) {
        let state = Arc::new(MonitorState::new(StateOptions::default()));
        let enricher = GeoEnricher::new(
            Arc::clone(&state),
            lookup,
            Arc::new(MetricsRecorder::new()),
            Vec::new(),
            8,
        );
        (state, enricher)
    }

    #[tokio::test]
    async fn private_addresses_never_reach_the_lookup() {
        let lookup = ScriptedLookup::new(vec![]);
        let (state, enricher) = enricher(Arc::clone(&lookup));

        for ip in ["192.168.1.5", "127.0.0.1", "10.0.0.1"] {
            enricher.enrich(ip.parse().unwrap(), "TCP").await;
        }

        assert_eq!(lookup.calls(), 0);
        assert_eq!(state.geo_record_count(), 0);
    }

    #[tokio::test]
    async fn successful_lookup_is_recorded_exactly_once() {
        let lookup = ScriptedLookup::new(vec![Ok(success_reply())]);
        let (state, enricher) = enricher(Arc::clone(&lookup));
        let ip: IpAddr = "203.0.113.9".parse().unwrap();

        enricher.enrich(ip, "TLS").await;
        enricher.enrich(ip, "TLS").await;

        assert_eq!(lookup.calls(), 1);
        assert_eq!(state.geo_record_count(), 1);
        let record = &state.snapshot().geo_records[0];
        assert_eq!(record.location, "Paris, France");
        assert_eq!(record.protocol, "TLS");
        assert!(record.is_hosting);
    }

    #[tokio::test]
    async fn failed_lookup_is_retried_on_the_next_packet() {
        let lookup = ScriptedLookup::new(vec![
            Err(LookupError::Timeout),
            Ok(fail_reply()),
            Ok(success_reply()),
        ]);
        let (state, enricher) = enricher(Arc::clone(&lookup));
        let ip: IpAddr = "198.51.100.4".parse().unwrap();

        enricher.enrich(ip, "DNS").await;
        assert_eq!(state.geo_record_count(), 0);
        assert!(!state.is_seen(ip));

        enricher.enrich(ip, "DNS").await;
        assert_eq!(state.geo_record_count(), 0);

        enricher.enrich(ip, "DNS").await;
        assert_eq!(lookup.calls(), 3);
        assert_eq!(state.geo_record_count(), 1);
        assert!(state.is_seen(ip));
    }

    #[tokio::test]
    async fn concurrent_distinct_addresses_are_both_recorded() {
        let lookup = ScriptedLookup::new(vec![Ok(success_reply()), Ok(success_reply())]);
        let (state, enricher) = enricher(Arc::clone(&lookup));

        let a = enricher.enrich("203.0.113.9".parse().unwrap(), "TCP");
        let b = enricher.enrich("198.51.100.4".parse().unwrap(), "UDP");
        tokio::join!(a, b);

        assert_eq!(state.geo_record_count(), 2);
    }

    #[tokio::test]
    async fn configured_skip_range_is_honored() {
        let lookup = ScriptedLookup::new(vec![Ok(success_reply())]);
        let state = Arc::new(MonitorState::new(StateOptions::default()));
        let enricher = GeoEnricher::new(
            Arc::clone(&state),
            Arc::clone(&lookup) as Arc<dyn GeoLookup>,
            Arc::new(MetricsRecorder::new()),
            vec!["203.0.113.0/24".parse().unwrap()],
            8,
        );

        enricher.enrich("203.0.113.9".parse().unwrap(), "TCP").await;

        assert_eq!(lookup.calls(), 0);
        assert_eq!(state.geo_record_count(), 0);
    }

    #[tokio::test]
    async fn completion_after_shutdown_is_a_best_effort_write() {
        let lookup = ScriptedLookup::new(vec![Ok(success_reply())]);
        let (state, enricher) = enricher(Arc::clone(&lookup));

        state.shutdown();
        enricher.enrich("203.0.113.9".parse().unwrap(), "TCP").await;

        // No failure, and the late write is tolerated.
        assert_eq!(state.geo_record_count(), 1);
    }
}
