//! Decoded packet event type.

use std::net::IpAddr;

/// One decoded packet, as handed to the engine.
///
/// Addresses are absent for non-IP traffic (ARP, undecodable frames);
/// `tcp_reset` is present only when the frame carried a TCP header.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Highest decoded layer label, e.g. "DNS", "TCP", "ARP".
    pub protocol: String,
    pub source: Option<IpAddr>,
    pub destination: Option<IpAddr>,
    /// `Some(true)` when the RST flag was set on a TCP segment.
    pub tcp_reset: Option<bool>,
}

impl PacketEvent {
    /// Event for traffic that carries no network-layer addresses.
    pub fn internal(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            source: None,
            destination: None,
            tcp_reset: None,
        }
    }
}
