use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::transport::{LinkEvent, Transport};

/// Largest payload that fits one characteristic write at the default MTU.
pub const BLE_MTU: usize = 20;

pub type MessageHandler = Box<dyn Fn(&[u8]) + Send + Sync>;
pub type ConnectionHandler = Box<dyn Fn(bool) + Send + Sync>;

/// The GATT side of the link: one writable, notifying characteristic plus
/// a connection callback. Handlers run on the radio stack's context.
pub trait GattLink: Send + Sync {
    /// Write (or notify) one payload to the peer.
    fn write(&self, payload: &[u8]) -> anyhow::Result<()>;
    /// Register the handler for payloads written by the peer.
    fn on_message(&mut self, handler: MessageHandler);
    /// Register the handler for link up (`true`) and down (`false`).
    fn on_connection_change(&mut self, handler: ConnectionHandler);
}

/// Transport over a [`GattLink`]. The registered handlers only enqueue
/// events; all session work happens on the task that calls `recv`.
pub struct BleTransport<L: GattLink> {
    link: L,
    events: UnboundedReceiver<LinkEvent>,
}

impl<L: GattLink> BleTransport<L> {
    pub fn new(mut link: L) -> Self {
        let (tx, events) = unbounded_channel();
        let conn_tx = tx.clone();
        link.on_message(Box::new(move |payload| {
            let _ = tx.send(LinkEvent::Message(payload.to_vec()));
        }));
        link.on_connection_change(Box::new(move |up| {
            let event = if up {
                LinkEvent::Connected
            } else {
                LinkEvent::Disconnected
            };
            let _ = conn_tx.send(event);
        }));
        Self { link, events }
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}

#[async_trait::async_trait]
impl<L: GattLink> Transport for BleTransport<L> {
    async fn send(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        if payload.len() > BLE_MTU {
            return Err(anyhow::anyhow!(
                "Payload too large: {} bytes (max: {})",
                payload.len(),
                BLE_MTU
            ));
        }
        self.link.write(payload)
    }

    async fn recv(&mut self) -> anyhow::Result<LinkEvent> {
        self.events
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("BLE link closed"))
    }
}
