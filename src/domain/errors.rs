//! Domain-level errors for the scheduling engine.

use thiserror::Error;

/// Errors raised while assembling or validating configuration, before the
/// driver is ever constructed. Fatal; the process exits with code 10.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--master must not be empty")]
    MissingMaster,

    #[error("invalid constraint syntax: {0}")]
    InvalidConstraint(String),

    #[error("--cpu-per-task must be positive, got {0}")]
    InvalidCpuPerTask(f64),

    #[error("--mem-per-task must be positive, got {0}")]
    InvalidMemPerTask(f64),

    #[error("--container is not valid JSON: {0}")]
    InvalidContainerJson(String),

    #[error("zk:// leader detection is not available in this build: {0}")]
    ZkDetectionUnavailable(String),

    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Errors the core distinguishes per the error-handling design. Most of
/// these are logged and converted into a side effect rather than
/// propagated; see `services::scheduler`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A status update named a task id the queue never issued. This is a
    /// protocol invariant violation; the scheduler aborts the driver.
    #[error("protocol violation: unknown task id {0}")]
    UnknownTaskId(String),

    /// Sandbox resolution or a sandbox file read/download failed at the
    /// transport level (connection refused, timeout, non-2xx, bad JSON).
    #[error("sandbox request failed: {0}")]
    TransientHttp(String),

    /// The master's state listed no slave with this id.
    #[error("slave not found in master state: {0}")]
    SlaveNotFound(String),

    /// The slave's state listed no sandbox directory for this
    /// framework/task pair.
    #[error("sandbox directory not found for task {0}")]
    DirectoryNotFound(String),
}
