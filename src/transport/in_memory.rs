use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::transport::{LinkEvent, Transport};

struct LinkState {
    up: AtomicBool,
    drop_next: AtomicUsize,
    inboxes: [UnboundedSender<LinkEvent>; 2],
}

impl LinkState {
    fn broadcast(&self, event: LinkEvent) {
        for inbox in &self.inboxes {
            let _ = inbox.send(event.clone());
        }
    }
}

/// Test handle on a simulated radio link shared by both ends of a pair.
#[derive(Clone)]
pub struct LinkControl {
    state: Arc<LinkState>,
}

impl LinkControl {
    pub fn is_up(&self) -> bool {
        self.state.up.load(Ordering::SeqCst)
    }

    /// Take the link down. Both ends see `Disconnected`; payloads written
    /// while down are lost.
    pub fn disconnect(&self) {
        if self.state.up.swap(false, Ordering::SeqCst) {
            self.state.broadcast(LinkEvent::Disconnected);
        }
    }

    /// Bring the link back. Both ends see `Connected`.
    pub fn reconnect(&self) {
        if !self.state.up.swap(true, Ordering::SeqCst) {
            self.state.broadcast(LinkEvent::Connected);
        }
    }

    /// Silently lose the next `n` payloads, whichever end writes them.
    pub fn drop_next(&self, n: usize) {
        self.state.drop_next.store(n, Ordering::SeqCst);
    }
}

/// One end of an in-process link.
pub struct InMemoryTransport {
    side: usize,
    inbox: UnboundedReceiver<LinkEvent>,
    state: Arc<LinkState>,
}

impl InMemoryTransport {
    /// Two connected ends. Each starts with a `Connected` event queued.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = unbounded_channel();
        let (tx_b, rx_b) = unbounded_channel();
        let state = Arc::new(LinkState {
            up: AtomicBool::new(true),
            drop_next: AtomicUsize::new(0),
            inboxes: [tx_a, tx_b],
        });
        state.broadcast(LinkEvent::Connected);
        (
            Self {
                side: 0,
                inbox: rx_a,
                state: state.clone(),
            },
            Self {
                side: 1,
                inbox: rx_b,
                state,
            },
        )
    }

    pub fn control(&self) -> LinkControl {
        LinkControl {
            state: self.state.clone(),
        }
    }

    fn take_drop(&self) -> bool {
        self.state
            .drop_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        if !self.state.up.load(Ordering::SeqCst) {
            log::debug!("link down, {} byte payload lost", payload.len());
            return Ok(());
        }
        if self.take_drop() {
            log::debug!("dropping payload {:?}", String::from_utf8_lossy(payload));
            return Ok(());
        }
        self.state.inboxes[1 - self.side]
            .send(LinkEvent::Message(payload.to_vec()))
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<LinkEvent> {
        self.inbox
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}
