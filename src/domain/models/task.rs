//! Tasks: a command projected into the master's protocol, and the status
//! updates the master reports back for it.

use super::command::ContainerInfo;
use super::offer::SlaveId;

/// The state of a task as reported by the master. Ordering here mirrors
/// the lifecycle diagram in the design: `Launched` is the initial state
/// assigned by this process; every other variant is master-reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Launched,
    Running,
    Finished,
    Failed,
    Lost,
    Killed,
}

impl TaskState {
    /// `Finished`, `Failed`, `Lost`, and `Killed` are all terminal: no
    /// further status update is expected for the task once one of these
    /// is observed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Failed | Self::Lost | Self::Killed
        )
    }

    pub fn is_unexpected(self) -> bool {
        matches!(self, Self::Lost | Self::Killed)
    }
}

/// A status update belonging to a single command/task.
#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub state: TaskState,
    pub message: String,
}

/// A command projected into the master's protocol for a single launch
/// attempt. `task_id` equals the owning command's id.
#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: String,
    pub slave_id: SlaveId,
    pub cpus: f64,
    pub mem: f64,
    pub cmd: String,
    pub container: Option<ContainerInfo>,
    pub uris: Vec<String>,
}
