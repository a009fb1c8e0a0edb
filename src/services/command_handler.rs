//! Bookkeeping of launched/ended/failed commands, tailer lifecycle, and
//! the optional post-run file download (spec §4.5).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;

use crate::domain::models::command::Command;
use crate::domain::ports::sandbox::{FileReader, SandboxResolver};
use crate::services::tailer::{Sink, Tailer};

const STDOUT_FILENAME: &str = "cmd.stdout";
const STDERR_FILENAME: &str = "cmd.stderr";

pub struct CommandHandler {
    resolver: Arc<dyn SandboxResolver>,
    reader: Arc<dyn FileReader>,
    stdout_sink: Arc<dyn Sink>,
    stderr_sink: Arc<dyn Sink>,
    download_file: Option<String>,
    launched: AtomicU64,
    ended: AtomicU64,
    failed: AtomicU64,
    launched_commands: Mutex<Vec<Arc<Command>>>,
}

impl CommandHandler {
    pub fn new(
        resolver: Arc<dyn SandboxResolver>,
        reader: Arc<dyn FileReader>,
        stdout_sink: Arc<dyn Sink>,
        stderr_sink: Arc<dyn Sink>,
        download_file: Option<String>,
    ) -> Self {
        Self {
            resolver,
            reader,
            stdout_sink,
            stderr_sink,
            download_file,
            launched: AtomicU64::new(0),
            ended: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            launched_commands: Mutex::new(Vec::new()),
        }
    }

    pub fn command_launched(&self, command: &Arc<Command>) {
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.launched_commands
            .lock()
            .expect("command handler poisoned")
            .push(command.clone());
    }

    /// Starts the stdout and stderr tailers. A sandbox lookup failure is
    /// logged and swallowed: the task keeps running, just without output
    /// streamed back.
    pub async fn command_running(&self, command: &Arc<Command>) {
        let (Some(slave_id), Some(framework_id)) = (command.slave_id(), command.framework_id())
        else {
            tracing::warn!(
                command_id = %command.id,
                "command entered RUNNING without a slave/framework id recorded"
            );
            return;
        };

        let location = match self
            .resolver
            .resolve(&slave_id, &framework_id, &command.id.0)
            .await
        {
            Ok(location) => location,
            Err(err) => {
                tracing::warn!(
                    command_id = %command.id,
                    error = %err,
                    "sandbox resolution failed, command will not be tailed"
                );
                return;
            }
        };

        let stdout = Tailer::new(
            self.reader.clone(),
            location.clone(),
            STDOUT_FILENAME,
            self.stdout_sink.clone(),
        );
        let stderr = Tailer::new(
            self.reader.clone(),
            location,
            STDERR_FILENAME,
            self.stderr_sink.clone(),
        );
        stdout.start();
        stderr.start();
        command.set_tailers(Some(stdout), Some(stderr));
    }

    pub fn command_ended(&self, command: &Arc<Command>) {
        self.ended.fetch_add(1, Ordering::SeqCst);
        command.stop_tailers();
    }

    /// Success-only hook: fetches the configured download file from the
    /// command's sandbox, if any. A download failure is logged; it never
    /// marks the command as failed.
    pub async fn command_finished(&self, command: &Arc<Command>) {
        let Some(filename) = &self.download_file else {
            return;
        };
        let (Some(slave_id), Some(framework_id)) = (command.slave_id(), command.framework_id())
        else {
            return;
        };

        let location = match self
            .resolver
            .resolve(&slave_id, &framework_id, &command.id.0)
            .await
        {
            Ok(location) => location,
            Err(err) => {
                tracing::warn!(
                    command_id = %command.id,
                    error = %err,
                    "sandbox resolution failed, skipping post-run download"
                );
                return;
            }
        };

        match self.reader.download(&location, filename).await {
            Ok(bytes) => {
                let local_name = format!("{}.{}", command.id, filename);
                if let Err(err) = tokio::fs::write(&local_name, bytes).await {
                    tracing::warn!(
                        command_id = %command.id,
                        path = %local_name,
                        error = %err,
                        "failed to write downloaded file"
                    );
                } else {
                    tracing::info!(command_id = %command.id, path = %local_name, "downloaded file");
                }
            }
            Err(err) => {
                tracing::warn!(
                    command_id = %command.id,
                    error = %err,
                    "post-run download failed"
                );
            }
        }
    }

    pub fn command_failed(&self, _command: &Arc<Command>) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Blocks until every launched command's tailers have drained.
    pub async fn finish_all_commands(&self) {
        let commands = self
            .launched_commands
            .lock()
            .expect("command handler poisoned")
            .clone();
        join_all(commands.iter().map(|c| c.wait_for_tailers())).await;
    }

    pub fn has_failures(&self) -> bool {
        self.failed.load(Ordering::SeqCst) > 0
    }

    pub fn has_running_tasks(&self) -> bool {
        self.launched.load(Ordering::SeqCst) > self.ended.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CoreError;
    use crate::domain::models::command::{CommandId, ContainerInfo};
    use crate::domain::models::{FrameworkId, SlaveId};
    use crate::domain::ports::sandbox::{FileChunk, SandboxLocation};
    use async_trait::async_trait;

    struct StubResolver;

    #[async_trait]
    impl SandboxResolver for StubResolver {
        async fn resolve(
            &self,
            _slave_id: &SlaveId,
            _framework_id: &FrameworkId,
            _task_id: &str,
        ) -> Result<SandboxLocation, CoreError> {
            Ok(SandboxLocation {
                base_url: "http://slave:5051".to_string(),
                directory: "/sandbox".to_string(),
            })
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl SandboxResolver for FailingResolver {
        async fn resolve(
            &self,
            _slave_id: &SlaveId,
            _framework_id: &FrameworkId,
            _task_id: &str,
        ) -> Result<SandboxLocation, CoreError> {
            Err(CoreError::TransientHttp("no route to slave".to_string()))
        }
    }

    struct EmptyReader;

    #[async_trait]
    impl FileReader for EmptyReader {
        async fn read_range(
            &self,
            _location: &SandboxLocation,
            _filename: &str,
            _offset: u64,
            _length: u64,
        ) -> Result<FileChunk, CoreError> {
            Ok(FileChunk {
                offset: 0,
                data: String::new(),
            })
        }

        async fn download(
            &self,
            _location: &SandboxLocation,
            _filename: &str,
        ) -> Result<Vec<u8>, CoreError> {
            Ok(b"payload".to_vec())
        }
    }

    struct NullSink;

    impl Sink for NullSink {
        fn write(&self, _data: &str) {}
    }

    fn command() -> Arc<Command> {
        Arc::new(Command::new(
            CommandId("1".to_string()),
            "echo hi".to_string(),
            1.0,
            128.0,
            None::<ContainerInfo>,
            vec![],
        ))
    }

    fn handler(resolver: Arc<dyn SandboxResolver>) -> CommandHandler {
        CommandHandler::new(
            resolver,
            Arc::new(EmptyReader),
            Arc::new(NullSink),
            Arc::new(NullSink),
            None,
        )
    }

    #[test]
    fn has_running_tasks_is_launched_minus_ended() {
        let handler = handler(Arc::new(StubResolver));
        let cmd = command();
        handler.command_launched(&cmd);
        assert!(handler.has_running_tasks());
        handler.command_ended(&cmd);
        assert!(!handler.has_running_tasks());
    }

    #[test]
    fn has_failures_reflects_failed_count() {
        let handler = handler(Arc::new(StubResolver));
        assert!(!handler.has_failures());
        handler.command_failed(&command());
        assert!(handler.has_failures());
    }

    #[tokio::test]
    async fn command_running_without_ids_does_not_panic() {
        let handler = handler(Arc::new(StubResolver));
        let cmd = command();
        handler.command_running(&cmd).await;
        assert!(cmd.current_state().is_none());
    }

    #[tokio::test]
    async fn command_running_starts_tailers_when_sandbox_resolves() {
        let handler = handler(Arc::new(StubResolver));
        let cmd = command();
        cmd.set_slave_id(SlaveId("s1".to_string()));
        cmd.set_framework_id(FrameworkId("f1".to_string()));
        handler.command_running(&cmd).await;
        // command_ended only requests a stop; the tailer handles must
        // still be in place for wait_for_tailers to actually block on
        // them rather than finding the slots already cleared.
        handler.command_ended(&cmd);
        cmd.wait_for_tailers().await;
        // wait_for_tailers clears the slots once the wait completes.
        let mut second_wait = cmd.wait_for_tailers();
        tokio::time::timeout(std::time::Duration::from_millis(50), &mut second_wait)
            .await
            .expect("second wait returns promptly once tailers are already cleared");
    }

    #[tokio::test]
    async fn sandbox_resolution_failure_is_swallowed() {
        let handler = handler(Arc::new(FailingResolver));
        let cmd = command();
        cmd.set_slave_id(SlaveId("s1".to_string()));
        cmd.set_framework_id(FrameworkId("f1".to_string()));
        // Must not panic even though resolution fails.
        handler.command_running(&cmd).await;
    }

    #[tokio::test]
    async fn finish_all_commands_waits_for_every_launched_command() {
        let handler = handler(Arc::new(StubResolver));
        let a = command();
        let b = Arc::new(Command::new(
            CommandId("2".to_string()),
            "echo bye".to_string(),
            1.0,
            128.0,
            None,
            vec![],
        ));
        handler.command_launched(&a);
        handler.command_launched(&b);
        handler.command_ended(&a);
        handler.command_ended(&b);
        handler.finish_all_commands().await;
    }
}
