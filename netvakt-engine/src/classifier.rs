//! Packet classification: one decoded event in, one classification out.

use std::net::IpAddr;

use netvakt_capture::PacketEvent;
use netvakt_core::addr;

/// Label shown for traffic without a network-layer address.
pub const INTERNAL_LABEL: &str = "Internal";

/// What the engine knows about one packet after classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub protocol: String,
    pub source: Option<IpAddr>,
    pub destination: Option<IpAddr>,
    /// Source is present and publicly routable; only such packets are
    /// eligible for enrichment.
    pub is_external_source: bool,
    /// The packet explicitly carried an active TCP reset.
    pub is_threat_signal: bool,
}

impl Classification {
    pub fn source_label(&self) -> String {
        label(self.source)
    }

    pub fn destination_label(&self) -> String {
        label(self.destination)
    }
}

fn label(addr: Option<IpAddr>) -> String {
    match addr {
        Some(ip) => ip.to_string(),
        None => INTERNAL_LABEL.to_string(),
    }
}

/// Classifies one decoded packet event. Total: events with absent or odd
/// fields classify as internal, non-threat traffic rather than raising.
pub fn classify(event: &PacketEvent) -> Classification {
    Classification {
        protocol: event.protocol.clone(),
        source: event.source,
        destination: event.destination,
        is_external_source: event.source.map(addr::is_public).unwrap_or(false),
        is_threat_signal: event.tcp_reset == Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn addressless_traffic_is_internal() {
        let c = classify(&PacketEvent::internal("ARP"));
        assert_eq!(c.source_label(), INTERNAL_LABEL);
        assert_eq!(c.destination_label(), INTERNAL_LABEL);
        assert!(!c.is_external_source);
        assert!(!c.is_threat_signal);
    }

    #[test]
    fn reset_flag_is_the_only_threat_signal() {
        let mut event = PacketEvent {
            protocol: "TCP".into(),
            source: ip("203.0.113.9"),
            destination: ip("192.168.1.2"),
            tcp_reset: Some(true),
        };
        assert!(classify(&event).is_threat_signal);

        event.tcp_reset = Some(false);
        assert!(!classify(&event).is_threat_signal);

        event.tcp_reset = None;
        assert!(!classify(&event).is_threat_signal);
    }

    #[test]
    fn private_source_is_not_external() {
        let event = PacketEvent {
            protocol: "DNS".into(),
            source: ip("192.168.1.5"),
            destination: ip("8.8.8.8"),
            tcp_reset: None,
        };
        let c = classify(&event);
        assert!(!c.is_external_source);
        assert_eq!(c.source_label(), "192.168.1.5");
    }

    #[test]
    fn public_source_is_external() {
        let event = PacketEvent {
            protocol: "TLS".into(),
            source: ip("93.184.216.34"),
            destination: ip("192.168.1.2"),
            tcp_reset: None,
        };
        assert!(classify(&event).is_external_source);
    }
}
