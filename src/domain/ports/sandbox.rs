//! Sandbox discovery and file access, consumed by the tailer and by the
//! post-run download step. Concrete implementation talks to the master
//! and slave introspection endpoints over HTTP; see
//! `infrastructure::http`.

use async_trait::async_trait;

use crate::domain::errors::CoreError;
use crate::domain::models::{FrameworkId, SlaveId};

/// A resolved sandbox: the slave's base URL and the task's sandbox
/// directory on that slave.
#[derive(Debug, Clone)]
pub struct SandboxLocation {
    pub base_url: String,
    pub directory: String,
}

/// Given (slave, framework, task), discovers the slave's sandbox
/// directory. Resolution is not cached; callers resolve once per tailer
/// construction or download attempt.
#[async_trait]
pub trait SandboxResolver: Send + Sync {
    async fn resolve(
        &self,
        slave_id: &SlaveId,
        framework_id: &FrameworkId,
        task_id: &str,
    ) -> Result<SandboxLocation, CoreError>;
}

/// A byte range read from the response. `offset` is the *server's*
/// reported offset, which callers must use as the basis for the next
/// read request rather than trusting their local bookkeeping alone.
#[derive(Debug, Clone)]
pub struct FileChunk {
    pub offset: u64,
    pub data: String,
}

/// Reads from a sandbox file, and downloads a sandbox file whole.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_range(
        &self,
        location: &SandboxLocation,
        filename: &str,
        offset: u64,
        length: u64,
    ) -> Result<FileChunk, CoreError>;

    async fn download(
        &self,
        location: &SandboxLocation,
        filename: &str,
    ) -> Result<Vec<u8>, CoreError>;
}
