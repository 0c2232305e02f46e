use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

use crate::transport::{LinkEvent, Transport};

/// Default timeout for network writes (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size. Game payloads are a handful of bytes.
const MAX_MESSAGE_SIZE: u32 = 512;

/// Pause between reconnect attempts on the connecting side.
const RECONNECT_DELAY: Duration = Duration::from_millis(500);

enum Endpoint {
    /// Host: accepts a new peer whenever the current one goes away.
    Listen(TcpListener),
    /// Guest: dials the host again after a drop.
    Dial(SocketAddr),
}

type Writer = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// Desktop stand-in for the BLE link. Frames are a 4-byte big-endian length
/// followed by the text payload. A background task owns the read side and
/// re-establishes the connection after it drops, so a game can resume.
pub struct TcpTransport {
    writer: Writer,
    events: UnboundedReceiver<LinkEvent>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
    timeout_duration: Duration,
}

impl TcpTransport {
    /// Bind `addr` and wait for a guest in the background.
    pub async fn listen(addr: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        log::info!("listening on {}", local_addr);
        Ok(Self::spawn(Endpoint::Listen(listener), None, local_addr))
    }

    /// Connect to a listening host. The first attempt must succeed.
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = timeout(DEFAULT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| anyhow::anyhow!("Connect timeout after {:?}", DEFAULT_TIMEOUT))??;
        let peer = stream.peer_addr()?;
        let local_addr = stream.local_addr()?;
        log::info!("connected to {}", peer);
        Ok(Self::spawn(Endpoint::Dial(peer), Some(stream), local_addr))
    }

    pub fn with_timeout(mut self, timeout_duration: Duration) -> Self {
        self.timeout_duration = timeout_duration;
        self
    }

    /// Address of the listening socket (host) or of our end (guest).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn spawn(endpoint: Endpoint, first: Option<TcpStream>, local_addr: SocketAddr) -> Self {
        let (tx, events) = unbounded_channel();
        let writer: Writer = Arc::new(Mutex::new(None));
        let task = tokio::spawn(supervise(endpoint, first, writer.clone(), tx));
        Self {
            writer,
            events,
            task,
            local_addr,
            timeout_duration: DEFAULT_TIMEOUT,
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn establish(endpoint: &Endpoint) -> TcpStream {
    loop {
        let attempt = match endpoint {
            Endpoint::Listen(listener) => listener.accept().await.map(|(stream, peer)| {
                log::info!("accepted {}", peer);
                stream
            }),
            Endpoint::Dial(addr) => TcpStream::connect(addr).await,
        };
        match attempt {
            Ok(stream) => return stream,
            Err(e) => {
                log::debug!("link not established: {}", e);
                sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

async fn supervise(
    endpoint: Endpoint,
    mut first: Option<TcpStream>,
    writer: Writer,
    events: UnboundedSender<LinkEvent>,
) {
    loop {
        let stream = match first.take() {
            Some(stream) => stream,
            None => establish(&endpoint).await,
        };
        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();
        *writer.lock().await = Some(write_half);
        if events.send(LinkEvent::Connected).is_err() {
            return;
        }
        let reason = read_frames(read_half, &events).await;
        log::warn!("link lost: {}", reason);
        *writer.lock().await = None;
        if events.send(LinkEvent::Disconnected).is_err() {
            return;
        }
    }
}

async fn read_frames(mut reader: OwnedReadHalf, events: &UnboundedSender<LinkEvent>) -> anyhow::Error {
    loop {
        let mut len_buf = [0u8; 4];
        if let Err(e) = reader.read_exact(&mut len_buf).await {
            return read_error(e);
        }
        let len = u32::from_be_bytes(len_buf);
        // Bounded read length check to prevent excessive memory allocation
        if len > MAX_MESSAGE_SIZE {
            return anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                MAX_MESSAGE_SIZE
            );
        }
        if len == 0 {
            return anyhow::anyhow!("Invalid message length: 0");
        }
        let mut buf = vec![0u8; len as usize];
        if let Err(e) = reader.read_exact(&mut buf).await {
            return read_error(e);
        }
        if events.send(LinkEvent::Message(buf)).is_err() {
            return anyhow::anyhow!("Transport dropped");
        }
    }
}

fn read_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        if payload.is_empty() || payload.len() as u32 > MAX_MESSAGE_SIZE {
            return Err(anyhow::anyhow!(
                "Invalid payload size: {} bytes (max: {})",
                payload.len(),
                MAX_MESSAGE_SIZE
            ));
        }
        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(payload);

        let mut guard = self.writer.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Not connected"))?;
        timeout(self.timeout_duration, stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::BrokenPipe
                    || e.kind() == std::io::ErrorKind::ConnectionReset
                {
                    anyhow::anyhow!("Connection closed by peer")
                } else {
                    anyhow::anyhow!("Write error: {}", e)
                }
            })
    }

    async fn recv(&mut self) -> anyhow::Result<LinkEvent> {
        self.events
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Transport task ended"))
    }
}
