//! pcap-backed live capture source.
//!
//! `pcap` reads are blocking, so each open stream runs its loop on a
//! dedicated blocking task and hands decoded events to the engine through
//! the stream's bounded channel.

use pcap::{Active, Capture, Device};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::decode::decode_frame;
use crate::event::PacketEvent;
use crate::source::{CaptureError, PacketSource, PacketStream};

/// Special interface name accepted by libpcap for capturing on all devices.
const ANY_DEVICE: &str = "any";

const STREAM_CAPACITY: usize = 1024;

/// Live capture via libpcap.
#[derive(Debug, Clone)]
pub struct LivePacketSource {
    buffer_size: usize,
    promiscuous: bool,
    /// Read timeout so the blocking loop can notice a dropped consumer.
    read_timeout_ms: i32,
}

impl LivePacketSource {
    pub fn new(buffer_size: usize, promiscuous: bool) -> Self {
        Self {
            buffer_size,
            promiscuous,
            read_timeout_ms: 1000,
        }
    }

    fn open_capture(
        &self,
        interface: &str,
        filter: Option<&str>,
    ) -> Result<Capture<Active>, CaptureError> {
        let device = if interface == ANY_DEVICE {
            Device::from(ANY_DEVICE)
        } else {
            Device::list()
                .map_err(|e| CaptureError::Open(e.to_string()))?
                .into_iter()
                .find(|d| d.name == interface)
                .ok_or_else(|| CaptureError::DeviceNotFound(interface.to_string()))?
        };

        let mut cap = Capture::from_device(device)
            .map_err(|e| CaptureError::Open(e.to_string()))?
            .promisc(self.promiscuous)
            .snaplen(self.buffer_size as i32)
            .timeout(self.read_timeout_ms)
            .open()
            .map_err(|e| CaptureError::Open(e.to_string()))?;

        if let Some(expr) = filter {
            cap.filter(expr, true).map_err(|e| CaptureError::Filter {
                filter: expr.to_string(),
                reason: e.to_string(),
            })?;
        }

        Ok(cap)
    }
}

impl Default for LivePacketSource {
    fn default() -> Self {
        Self::new(65535, true)
    }
}

#[async_trait::async_trait]
impl PacketSource for LivePacketSource {
    async fn open(
        &self,
        interface: &str,
        filter: Option<&str>,
    ) -> Result<PacketStream, CaptureError> {
        let mut cap = self.open_capture(interface, filter)?;
        debug!(interface, ?filter, "capture opened");

        let (tx, stream) = PacketStream::channel(STREAM_CAPACITY);
        tokio::task::spawn_blocking(move || read_loop(&mut cap, &tx));
        Ok(stream)
    }
}

/// Blocking read loop; exits when the stream's consumer goes away or the
/// capture handle fails.
fn read_loop(
    cap: &mut Capture<Active>,
    tx: &mpsc::Sender<Result<PacketEvent, CaptureError>>,
) {
    loop {
        if tx.is_closed() {
            debug!("capture consumer gone, stopping read loop");
            return;
        }
        match cap.next_packet() {
            Ok(packet) => {
                let event = decode_frame(packet.data);
                trace!(protocol = %event.protocol, "captured packet");
                if tx.blocking_send(Ok(event)).is_err() {
                    return;
                }
            }
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                warn!("capture read failed: {e}");
                let _ = tx.blocking_send(Err(CaptureError::Stream(e.to_string())));
                return;
            }
        }
    }
}

/// Lists capture-capable device names on this host.
pub fn list_devices() -> Result<Vec<String>, CaptureError> {
    let devices = Device::list().map_err(|e| CaptureError::Open(e.to_string()))?;
    Ok(devices.into_iter().map(|d| d.name).collect())
}
