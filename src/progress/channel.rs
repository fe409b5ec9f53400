//! The shared progress connection.
//!
//! `ProgressChannel` is a cheap-to-clone handle to one lazily opened STOMP
//! over WebSocket connection. Consumers receive the handle (it is never a
//! global) and multiplex their per-operation subscriptions over it.
//!
//! Lifecycle:
//! - `connect()` opens the socket and waits for CONNECTED; concurrent callers
//!   are serialised on `connect_lock` so only one socket is ever opened
//! - a reader task decodes frames and hands them to the `Dispatcher`
//! - a writer task drains the outbound queue into the socket
//! - `disconnect()` unsubscribes everything, sends DISCONNECT, closes the socket
//!
//! A consumer going away never closes the connection; only `disconnect()` does.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::dispatcher::Dispatcher;
use super::frame::{Command, Frame};
use super::subscription::Subscription;
use crate::error::{ClientError, Result};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn topic_for(operation_id: &str) -> String {
    format!("/topic/progress/{}", operation_id)
}

/// One open socket plus its two tasks.
struct Link {
    outbound: mpsc::UnboundedSender<Frame>,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

pub(crate) struct ChannelInner {
    url: String,
    connect_lock: tokio::sync::Mutex<()>,
    link: Mutex<Option<Link>>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    next_id: AtomicU64,
}

impl ChannelInner {
    /// Queue a frame on the live link. Fails when not connected.
    pub(crate) fn send(&self, frame: Frame) -> Result<()> {
        let link = self.link.lock();
        match link.as_ref() {
            Some(link) if link.alive.load(Ordering::SeqCst) => link
                .outbound
                .send(frame)
                .map_err(|_| ClientError::Protocol("progress connection closed".to_string())),
            _ => Err(ClientError::Protocol("progress channel not connected".to_string())),
        }
    }
}

#[derive(Clone)]
pub struct ProgressChannel {
    inner: Arc<ChannelInner>,
}

impl ProgressChannel {
    /// Create the handle. Nothing is opened until `connect` or `subscribe`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                url: url.into(),
                connect_lock: tokio::sync::Mutex::new(()),
                link: Mutex::new(None),
                dispatcher: Arc::new(Dispatcher::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn is_connected(&self) -> bool {
        self.inner
            .link
            .lock()
            .as_ref()
            .is_some_and(|link| link.alive.load(Ordering::SeqCst))
    }

    /// Number of live subscriptions across all consumers.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.dispatcher.len()
    }

    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let _guard = self.inner.connect_lock.lock().await;
        // Another caller may have finished connecting while we waited
        if self.is_connected() {
            return Ok(());
        }

        let link = open_link(&self.inner.url, self.inner.dispatcher.clone()).await?;
        let stale = self.inner.link.lock().replace(link);
        if let Some(stale) = stale {
            stale.reader.abort();
            stale.writer.abort();
        }
        tracing::info!("Progress channel connected to {}", self.inner.url);
        Ok(())
    }

    /// Register interest in one operation's progress topic.
    ///
    /// Connects first if needed. The listener is registered before SUBSCRIBE
    /// is sent so no early update is lost.
    pub async fn subscribe(&self, operation_id: &str) -> Result<Subscription> {
        self.connect().await?;

        let id = format!("sub-{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.dispatcher.register(&id, operation_id, tx);

        if let Err(e) = self.inner.send(Frame::subscribe(&id, &topic_for(operation_id))) {
            self.inner.dispatcher.remove(&id);
            return Err(e);
        }
        tracing::debug!("Subscribed {} to {}", id, topic_for(operation_id));

        Ok(Subscription::new(id, operation_id.to_string(), rx, Arc::downgrade(&self.inner)))
    }

    /// Tear down every subscription, then the transport.
    pub async fn disconnect(&self) {
        let _guard = self.inner.connect_lock.lock().await;

        tracing::debug!("Dropping progress listeners for {:?}", self.inner.dispatcher.operations());
        let ids = self.inner.dispatcher.clear();
        let link = self.inner.link.lock().take();
        let Some(link) = link else {
            return;
        };

        if link.alive.load(Ordering::SeqCst) {
            for id in &ids {
                let _ = link.outbound.send(Frame::unsubscribe(id));
            }
            let _ = link.outbound.send(Frame::disconnect());
        }
        link.alive.store(false, Ordering::SeqCst);

        // Closing the queue lets the writer flush and close the socket
        drop(link.outbound);
        if tokio::time::timeout(CLOSE_TIMEOUT, link.writer).await.is_err() {
            tracing::warn!("Progress channel writer did not finish in time");
        }
        link.reader.abort();
        tracing::info!("Progress channel disconnected ({} subscriptions dropped)", ids.len());
    }
}

/// Virtual host for the CONNECT frame: `host[:port]` of the socket URL.
fn stomp_host(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "localhost".to_string();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => "localhost".to_string(),
    }
}

async fn open_link(url: &str, dispatcher: Arc<Dispatcher>) -> Result<Link> {
    tracing::debug!("Opening progress channel {}", url);
    let (socket, _response) = tokio_tungstenite::connect_async(url).await?;
    let (mut sink, mut stream) = socket.split();

    sink.send(Message::Text(Frame::connect(&stomp_host(url)).encode().into())).await?;

    match tokio::time::timeout(HANDSHAKE_TIMEOUT, await_connected(&mut stream)).await {
        Ok(result) => result?,
        Err(_) => return Err(ClientError::Protocol("STOMP handshake timed out".to_string())),
    }

    let alive = Arc::new(AtomicBool::new(true));
    let (outbound, mut queue) = mpsc::unbounded_channel::<Frame>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = queue.recv().await {
            if let Err(e) = sink.send(Message::Text(frame.encode().into())).await {
                tracing::error!("Progress channel write failed: {}", e);
                return;
            }
        }
        let _ = sink.close().await;
    });

    let reader_alive = alive.clone();
    let reader = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text.as_str().to_owned(),
                Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("Progress channel read failed: {}", e);
                    break;
                }
            };
            match Frame::decode_all(&text) {
                Ok(frames) => frames.iter().for_each(|f| dispatcher.dispatch(f)),
                Err(e) => tracing::warn!("Dropping undecodable progress frame: {}", e),
            }
        }
        reader_alive.store(false, Ordering::SeqCst);
        // Ends every subscription stream so consumers see the drop
        let dropped = dispatcher.clear();
        tracing::info!("Progress channel closed ({} subscriptions ended)", dropped.len());
    });

    Ok(Link {
        outbound,
        alive,
        reader,
        writer,
    })
}

async fn await_connected<S>(stream: &mut S) -> Result<()>
where
    S: futures_util::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        let text = match message? {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Close(_) => break,
            _ => continue,
        };
        for frame in Frame::decode_all(&text)? {
            match frame.command {
                Command::Connected => return Ok(()),
                Command::Error => {
                    return Err(ClientError::Protocol(format!(
                        "broker rejected connection: {}",
                        frame.get("message").unwrap_or(frame.body.as_str())
                    )));
                }
                other => tracing::debug!("Ignoring {} before CONNECTED", other),
            }
        }
    }
    Err(ClientError::Protocol("connection closed during handshake".to_string()))
}
