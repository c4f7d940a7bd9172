//! The capture seam: an async source of decoded packet events.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::PacketEvent;

/// Capture acquisition and stream failures.
///
/// These are never fatal to the engine; the capture loop records them into
/// the heartbeat and retries after a fixed backoff.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no such capture device: {0}")]
    DeviceNotFound(String),

    #[error("failed to open capture: {0}")]
    Open(String),

    #[error("invalid capture filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("capture stream failed: {0}")]
    Stream(String),
}

/// Opens streams of decoded packet events for a given interface.
#[async_trait]
pub trait PacketSource: Send + Sync {
    /// Acquires a capture stream on `interface`, optionally constrained by a
    /// BPF filter expression. The stream ends or yields an error on
    /// interface failure.
    async fn open(
        &self,
        interface: &str,
        filter: Option<&str>,
    ) -> Result<PacketStream, CaptureError>;
}

/// Receiving half of an open capture stream.
///
/// Backed by a bounded channel so a slow consumer applies backpressure to
/// the producing thread rather than growing memory.
pub struct PacketStream {
    rx: mpsc::Receiver<Result<PacketEvent, CaptureError>>,
}

impl PacketStream {
    /// Creates a stream plus its sending half. Used by source
    /// implementations and by tests that script event sequences.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<PacketEvent, CaptureError>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Next event, `None` once the stream has closed.
    pub async fn next_event(&mut self) -> Option<Result<PacketEvent, CaptureError>> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_yields_events_then_closes() {
        let (tx, mut stream) = PacketStream::channel(4);
        tx.send(Ok(PacketEvent::internal("ARP"))).await.unwrap();
        drop(tx);

        let event = stream.next_event().await.unwrap().unwrap();
        assert_eq!(event.protocol, "ARP");
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn stream_propagates_errors() {
        let (tx, mut stream) = PacketStream::channel(4);
        tx.send(Err(CaptureError::Stream("interface went down".into())))
            .await
            .unwrap();

        assert!(stream.next_event().await.unwrap().is_err());
    }
}
