//! Commands: the unit of work submitted by the operator.

use std::fmt;
use std::sync::Mutex;

use crate::domain::ports::tailer::TailerHandle;
use std::sync::Arc;

use super::offer::{FrameworkId, SlaveId};
use super::task::TaskStatus;

/// Stable, unique id assigned to a command on enqueue. Encoded as a
/// decimal string starting at 1; ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub String);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque container descriptor, passed through to the task unexamined.
/// Carried as raw JSON since its shape belongs to the executor protocol,
/// which is out of scope for this crate.
#[derive(Debug, Clone)]
pub struct ContainerInfo(pub serde_json::Value);

/// Fields of a command that mutate after creation. Guarded by a single
/// mutex so the scheduler thread and the status-update handler observe a
/// consistent snapshot; tailers only ever touch their own handle, never
/// reach back into the command.
#[derive(Default)]
struct CommandState {
    status: Option<TaskStatus>,
    slave_id: Option<SlaveId>,
    framework_id: Option<FrameworkId>,
    stdout_tailer: Option<Arc<dyn TailerHandle>>,
    stderr_tailer: Option<Arc<dyn TailerHandle>>,
}

/// The unit of work. Created by the enqueuer, mutated only by the
/// scheduler thread and the status-update handler, released once it
/// reaches a terminal state and its tailers have drained.
pub struct Command {
    pub id: CommandId,
    pub cmd: String,
    pub cpu_req: f64,
    pub mem_req: f64,
    pub container: Option<ContainerInfo>,
    pub uris: Vec<String>,
    state: Mutex<CommandState>,
}

impl Command {
    pub fn new(
        id: CommandId,
        cmd: String,
        cpu_req: f64,
        mem_req: f64,
        container: Option<ContainerInfo>,
        uris: Vec<String>,
    ) -> Self {
        Self {
            id,
            cmd,
            cpu_req,
            mem_req,
            container,
            uris,
            state: Mutex::new(CommandState::default()),
        }
    }

    /// Fixes the slave id this command was placed on. Invariant: called
    /// at most once per command's lifetime.
    pub fn set_slave_id(&self, slave_id: SlaveId) {
        self.state.lock().expect("command state poisoned").slave_id = Some(slave_id);
    }

    pub fn slave_id(&self) -> Option<SlaveId> {
        self.state.lock().expect("command state poisoned").slave_id.clone()
    }

    pub fn set_framework_id(&self, framework_id: FrameworkId) {
        self.state
            .lock()
            .expect("command state poisoned")
            .framework_id = Some(framework_id);
    }

    pub fn framework_id(&self) -> Option<FrameworkId> {
        self.state
            .lock()
            .expect("command state poisoned")
            .framework_id
            .clone()
    }

    /// Returns the current status's state, if any has been recorded yet.
    pub fn current_state(&self) -> Option<super::task::TaskState> {
        self.state
            .lock()
            .expect("command state poisoned")
            .status
            .as_ref()
            .map(|s| s.state)
    }

    /// Records the latest status update. Returns the previous state, if
    /// any, so callers can implement idempotence.
    pub fn set_status(&self, status: TaskStatus) -> Option<super::task::TaskState> {
        let mut state = self.state.lock().expect("command state poisoned");
        let previous = state.status.as_ref().map(|s| s.state);
        state.status = Some(status);
        previous
    }

    pub fn set_tailers(
        &self,
        stdout: Option<Arc<dyn TailerHandle>>,
        stderr: Option<Arc<dyn TailerHandle>>,
    ) {
        let mut state = self.state.lock().expect("command state poisoned");
        state.stdout_tailer = stdout;
        state.stderr_tailer = stderr;
    }

    /// Requests that both tailers stop. Symmetric by design: both stdout
    /// and stderr are stopped, unlike the historical implementation this
    /// system is modeled on (see DESIGN.md). The handles are left in
    /// place — `wait_for_tailers` still needs them to block until the
    /// mandatory post-stop fetch actually drains; clearing them here
    /// would make that wait a no-op.
    pub fn stop_tailers(&self) {
        let state = self.state.lock().expect("command state poisoned");
        if let Some(t) = &state.stdout_tailer {
            t.stop();
        }
        if let Some(t) = &state.stderr_tailer {
            t.stop();
        }
    }

    /// Blocks until both tailers (if any were ever started) have
    /// drained, then clears the slots.
    pub async fn wait_for_tailers(&self) {
        let (stdout, stderr) = {
            let state = self.state.lock().expect("command state poisoned");
            (state.stdout_tailer.clone(), state.stderr_tailer.clone())
        };
        if let Some(t) = stdout {
            t.wait().await;
        }
        if let Some(t) = stderr {
            t.wait().await;
        }
        let mut state = self.state.lock().expect("command state poisoned");
        state.stdout_tailer = None;
        state.stderr_tailer = None;
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("cmd", &self.cmd)
            .field("cpu_req", &self.cpu_req)
            .field("mem_req", &self.mem_req)
            .finish_non_exhaustive()
    }
}
