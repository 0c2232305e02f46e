//! Links between the two devices.
//!
//! Every transport reports the same three events, so the node driver does
//! not care whether it sits on a BLE characteristic, a TCP socket or an
//! in-process queue. `recv` must be cancel safe: the node polls it inside
//! `tokio::select!` next to its tick.

/// Something that happened on the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    /// One complete payload as written by the peer.
    Message(Vec<u8>),
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Write one payload to the peer.
    async fn send(&mut self, payload: &[u8]) -> anyhow::Result<()>;
    /// Wait for the next link event. An error means the link is gone for good.
    async fn recv(&mut self) -> anyhow::Result<LinkEvent>;
}

pub mod ble;
pub mod in_memory;
pub mod tcp;

pub use ble::{BleTransport, GattLink};
pub use in_memory::{InMemoryTransport, LinkControl};
pub use tcp::TcpTransport;
