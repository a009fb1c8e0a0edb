//! The command-side view of a running tailer: just enough surface for
//! `Command` to request a stop and wait for drain, without depending on
//! the tailer's implementation.

use async_trait::async_trait;

#[async_trait]
pub trait TailerHandle: Send + Sync {
    /// Non-blocking: requests the poll loop stop after one final fetch.
    fn stop(&self);

    /// Blocks until the tailer has drained. Idempotent across callers.
    async fn wait(&self);
}
