//! Periodic HTTP-polling reader of a sandbox file (spec §4.6). Each
//! tailer is an independent worker: it holds only what it needs to poll
//! (the resolved sandbox location, a local offset cursor, and a sink) and
//! never reaches back into the command that owns it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::domain::ports::sandbox::{FileReader, SandboxLocation};
use crate::domain::ports::tailer::TailerHandle;

/// Default poll interval. Production code always uses this; tests may
/// construct a `Tailer` with a shorter interval to avoid waiting on wall
/// clock time.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bytes requested per range read.
pub const CHUNK_SIZE: u64 = 50_000;

/// Where tailed output goes. Multiple tailers may write to the same sink
/// concurrently; interleavings at chunk boundaries are acceptable for an
/// operator-facing console (spec §4.6).
pub trait Sink: Send + Sync {
    fn write(&self, data: &str);
}

pub struct Tailer {
    reader: Arc<dyn FileReader>,
    location: SandboxLocation,
    filename: String,
    sink: Arc<dyn Sink>,
    poll_interval: Duration,
    offset: AtomicU64,
    stop_requested: AtomicBool,
    done: AtomicBool,
    done_notify: Notify,
    join: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Tailer {
    /// Resolves nothing itself — sandbox resolution happens in the
    /// caller (`CommandHandler`), which constructs a `Tailer` from an
    /// already-resolved `SandboxLocation`. This keeps `Tailer` free of
    /// any dependency on `SandboxResolver`.
    pub fn new(
        reader: Arc<dyn FileReader>,
        location: SandboxLocation,
        filename: impl Into<String>,
        sink: Arc<dyn Sink>,
    ) -> Arc<Self> {
        Self::with_poll_interval(reader, location, filename, sink, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        reader: Arc<dyn FileReader>,
        location: SandboxLocation,
        filename: impl Into<String>,
        sink: Arc<dyn Sink>,
        poll_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            reader,
            location,
            filename: filename.into(),
            sink,
            poll_interval,
            offset: AtomicU64::new(0),
            stop_requested: AtomicBool::new(false),
            done: AtomicBool::new(false),
            done_notify: Notify::new(),
            join: std::sync::Mutex::new(None),
        })
    }

    /// Launches the periodic poll loop. Each poll's response offset is
    /// authoritative: the local cursor becomes `response.offset +
    /// len(response.data)`, not `cursor + len(data)`, so a
    /// non-contiguous server offset is tolerated rather than corrected.
    pub fn start(self: &Arc<Self>) {
        let this = self.clone();
        let handle = tokio::spawn(async move {
            this.run().await;
        });
        *self.join.lock().expect("tailer join handle poisoned") = Some(handle);
    }

    async fn run(self: Arc<Self>) {
        loop {
            self.fetch_once().await;
            if self.stop_requested.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        self.done.store(true, Ordering::SeqCst);
        self.done_notify.notify_waiters();
    }

    async fn fetch_once(&self) {
        let offset = self.offset.load(Ordering::SeqCst);
        match self
            .reader
            .read_range(&self.location, &self.filename, offset, CHUNK_SIZE)
            .await
        {
            Ok(chunk) => {
                self.offset
                    .store(chunk.offset + chunk.data.len() as u64, Ordering::SeqCst);
                if !chunk.data.is_empty() {
                    self.sink.write(&chunk.data);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, file = %self.filename, "tailer fetch failed");
            }
        }
    }
}

#[async_trait]
impl TailerHandle for Tailer {
    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    async fn wait(&self) {
        let notified = self.done_notify.notified();
        if self.done.load(Ordering::SeqCst) {
            return;
        }
        notified.await;
    }
}
