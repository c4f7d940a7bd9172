//! netvakt-capture
//!
//! Packet acquisition seam for netvakt. The engine consumes decoded
//! [`PacketEvent`]s through the [`PacketSource`] trait; the pcap-backed
//! [`LivePacketSource`] is the production implementation, and tests feed
//! streams through an in-memory channel.

pub mod decode;
pub mod event;
pub mod live;
pub mod source;

pub use event::PacketEvent;
pub use live::LivePacketSource;
pub use source::{CaptureError, PacketSource, PacketStream};
