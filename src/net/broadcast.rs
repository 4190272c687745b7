//! # Snapshot Broadcast
//!
//! Fans session snapshots out to remote viewers as newline-delimited JSON
//! over TCP. A viewer receives the latest full snapshot on connect and every
//! published line after that; a viewer whose socket fails is dropped.
//!
//! The server runs on its own tokio runtime in a background thread so the
//! game loop never waits on the network.

use crate::config::BROADCAST_INTERVAL_MS;
use crate::game::{Snapshot, TickObserver};
use crate::{SarError, SarResult};
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

/// Lines buffered per viewer before a slow viewer starts skipping.
const CHANNEL_CAPACITY: usize = 256;

/// Shared publishing side of the broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<Arc<str>>,
    latest_full: Arc<Mutex<Option<Arc<str>>>>,
    viewers: Arc<AtomicUsize>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            latest_full: Arc::new(Mutex::new(None)),
            viewers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serializes and sends a snapshot to every connected viewer.
    ///
    /// Full snapshots are also kept for viewers that connect later.
    pub fn publish(&self, snapshot: &Snapshot) -> SarResult<()> {
        let line: Arc<str> = Arc::from(snapshot.to_json()?);
        if snapshot.is_full() {
            let mut latest = self
                .latest_full
                .lock()
                .map_err(|_| SarError::Broadcast("snapshot cache poisoned".to_string()))?;
            *latest = Some(Arc::clone(&line));
        }
        // No receivers just means nobody is watching.
        let _ = self.sender.send(line);
        Ok(())
    }

    /// Number of connected viewers.
    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }

    fn latest_full(&self) -> Option<Arc<str>> {
        self.latest_full.lock().ok().and_then(|latest| latest.clone())
    }
}

/// Accepts viewers on `listener` until `shutdown` resolves.
pub async fn serve_listener(
    listener: TcpListener,
    hub: BroadcastHub,
    shutdown: impl Future<Output = ()> + Send,
) -> SarResult<SocketAddr> {
    let addr = listener.local_addr()?;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Broadcast server on {} shutting down", addr);
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_viewer(stream, peer, hub.clone()));
                }
                Err(e) => warn!("Failed to accept viewer: {}", e),
            }
        }
    }
    Ok(addr)
}

async fn handle_viewer(mut stream: TcpStream, peer: SocketAddr, hub: BroadcastHub) {
    let id = Uuid::new_v4();
    // Subscribe before reading the cached snapshot so nothing published in
    // between is lost.
    let mut receiver = hub.sender.subscribe();
    hub.viewers.fetch_add(1, Ordering::SeqCst);
    debug!("Viewer {} connected from {}", id, peer);

    if let Some(snapshot) = hub.latest_full() {
        if let Err(e) = write_line(&mut stream, &snapshot).await {
            warn!("Dropping viewer {}: {}", id, e);
            hub.viewers.fetch_sub(1, Ordering::SeqCst);
            return;
        }
    }

    loop {
        match receiver.recv().await {
            Ok(line) => {
                if let Err(e) = write_line(&mut stream, &line).await {
                    warn!("Dropping viewer {}: {}", id, e);
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Viewer {} skipped {} lines", id, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    hub.viewers.fetch_sub(1, Ordering::SeqCst);
    debug!("Viewer {} disconnected", id);
}

async fn write_line(stream: &mut TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await
}

/// A running broadcast server. Dropping it stops the server.
pub struct BroadcastHandle {
    hub: BroadcastHub,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl BroadcastHandle {
    /// Binds `addr` and starts serving viewers in a background thread.
    pub fn start(addr: &str) -> SarResult<Self> {
        let listener = std::net::TcpListener::bind(addr)
            .map_err(|e| SarError::Broadcast(format!("could not bind {}: {}", addr, e)))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| SarError::Broadcast(format!("could not start runtime: {}", e)))?;

        let hub = BroadcastHub::new();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_hub = hub.clone();

        let thread = std::thread::Builder::new()
            .name("broadcast".to_string())
            .spawn(move || {
                let result = runtime.block_on(async move {
                    let listener = TcpListener::from_std(listener)?;
                    serve_listener(listener, server_hub, async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                });
                if let Err(e) = result {
                    error!("Broadcast server stopped: {}", e);
                }
            })?;

        info!("Broadcasting snapshots on {}", local_addr);
        Ok(Self {
            hub,
            local_addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// An observer publishing to this server at the default rate.
    pub fn observer(&self) -> BroadcastObserver {
        BroadcastObserver::new(self.hub.clone())
    }

    /// Stops accepting viewers and waits for the server thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Broadcast thread panicked");
            }
        }
    }
}

impl Drop for BroadcastHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Publishes session snapshots, throttling per-tick updates.
pub struct BroadcastObserver {
    hub: BroadcastHub,
    interval: Duration,
    last_sent: Option<Instant>,
}

impl BroadcastObserver {
    pub fn new(hub: BroadcastHub) -> Self {
        Self {
            hub,
            interval: Duration::from_millis(BROADCAST_INTERVAL_MS),
            last_sent: None,
        }
    }

    /// Minimum time between two updates.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn send(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.hub.publish(snapshot) {
            warn!("Failed to publish snapshot: {}", e);
        }
        self.last_sent = Some(Instant::now());
    }
}

impl TickObserver for BroadcastObserver {
    fn on_tick(&mut self, snapshot: &Snapshot) {
        let due = self
            .last_sent
            .map_or(true, |last| last.elapsed() >= self.interval);
        if due || snapshot.is_full() {
            self.send(snapshot);
        }
    }

    fn on_level_built(&mut self, snapshot: &Snapshot) {
        self.send(snapshot);
    }

    fn on_mission_end(&mut self, snapshot: &Snapshot) {
        self.send(snapshot);
    }
}
