//! Minimal frame decoding: enough to label traffic and spot TCP resets.
//!
//! This is deliberately not a protocol decoder. It walks Ethernet/IP/TCP
//! headers to produce a highest-layer label, the network-layer addresses,
//! and the RST flag, and nothing more. Anything it cannot make sense of
//! becomes an addressless event with a fallback label, so malformed frames
//! are counted as processed instead of raising.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::event::PacketEvent;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_ARP: u16 = 0x0806;
const ETHERTYPE_IPV6: u16 = 0x86DD;

const PROTO_ICMP: u8 = 1;
const PROTO_IGMP: u8 = 2;
const PROTO_TCP: u8 = 6;
const PROTO_UDP: u8 = 17;
const PROTO_ICMPV6: u8 = 58;

const TCP_FLAG_RST: u8 = 0x04;

/// Label for frames that could not be decoded at all.
pub const FALLBACK_LABEL: &str = "DATA";

/// Decodes one Ethernet frame into a packet event. Total: never fails.
pub fn decode_frame(data: &[u8]) -> PacketEvent {
    let Some(ethertype) = ethertype(data) else {
        return PacketEvent::internal(FALLBACK_LABEL);
    };

    match ethertype {
        ETHERTYPE_ARP => PacketEvent::internal("ARP"),
        ETHERTYPE_IPV4 => decode_ipv4(&data[14..]),
        ETHERTYPE_IPV6 => decode_ipv6(&data[14..]),
        _ => PacketEvent::internal(FALLBACK_LABEL),
    }
}

fn ethertype(data: &[u8]) -> Option<u16> {
    if data.len() < 14 {
        return None;
    }
    Some(u16::from_be_bytes([data[12], data[13]]))
}

fn decode_ipv4(ip: &[u8]) -> PacketEvent {
    if ip.len() < 20 || ip[0] >> 4 != 4 {
        return PacketEvent::internal(FALLBACK_LABEL);
    }
    let header_len = usize::from(ip[0] & 0x0f) * 4;
    if header_len < 20 || ip.len() < header_len {
        return PacketEvent::internal(FALLBACK_LABEL);
    }

    let source = IpAddr::V4(Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]));
    let destination = IpAddr::V4(Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]));
    transport_event(ip[9], &ip[header_len..], source, destination)
}

fn decode_ipv6(ip: &[u8]) -> PacketEvent {
    if ip.len() < 40 || ip[0] >> 4 != 6 {
        return PacketEvent::internal(FALLBACK_LABEL);
    }

    let mut src = [0u8; 16];
    let mut dst = [0u8; 16];
    src.copy_from_slice(&ip[8..24]);
    dst.copy_from_slice(&ip[24..40]);

    let source = IpAddr::V6(Ipv6Addr::from(src));
    let destination = IpAddr::V6(Ipv6Addr::from(dst));
    // Extension headers are not walked; such packets keep the plain label.
    transport_event(ip[6], &ip[40..], source, destination)
}

fn transport_event(
    protocol: u8,
    payload: &[u8],
    source: IpAddr,
    destination: IpAddr,
) -> PacketEvent {
    match protocol {
        PROTO_TCP => {
            let (label, reset) = if payload.len() >= 14 {
                let src_port = u16::from_be_bytes([payload[0], payload[1]]);
                let dst_port = u16::from_be_bytes([payload[2], payload[3]]);
                let reset = payload[13] & TCP_FLAG_RST != 0;
                (service_label(src_port, dst_port, "TCP"), Some(reset))
            } else {
                ("TCP", None)
            };
            PacketEvent {
                protocol: label.into(),
                source: Some(source),
                destination: Some(destination),
                tcp_reset: reset,
            }
        }
        PROTO_UDP => {
            let label = if payload.len() >= 4 {
                let src_port = u16::from_be_bytes([payload[0], payload[1]]);
                let dst_port = u16::from_be_bytes([payload[2], payload[3]]);
                service_label(src_port, dst_port, "UDP")
            } else {
                "UDP"
            };
            PacketEvent {
                protocol: label.into(),
                source: Some(source),
                destination: Some(destination),
                tcp_reset: None,
            }
        }
        PROTO_ICMP | PROTO_ICMPV6 => PacketEvent {
            protocol: "ICMP".into(),
            source: Some(source),
            destination: Some(destination),
            tcp_reset: None,
        },
        PROTO_IGMP => PacketEvent {
            protocol: "IGMP".into(),
            source: Some(source),
            destination: Some(destination),
            tcp_reset: None,
        },
        _ => PacketEvent {
            protocol: "IP".into(),
            source: Some(source),
            destination: Some(destination),
            tcp_reset: None,
        },
    }
}

/// Highest-layer label from well-known ports.
fn service_label(src_port: u16, dst_port: u16, transport: &'static str) -> &'static str {
    match (src_port, dst_port) {
        (53, _) | (_, 53) => "DNS",
        (80, _) | (_, 80) => "HTTP",
        (443, _) | (_, 443) => "TLS",
        _ => transport,
    }
}
