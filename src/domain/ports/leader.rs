//! Leader discovery through the coordination service. A collaborator, not
//! part of the core: `zk://` master URLs need a one-shot detect call
//! before the driver is constructed (spec §9).

use async_trait::async_trait;

use crate::domain::errors::ConfigError;

#[async_trait]
pub trait LeaderDetector: Send + Sync {
    /// Resolves a `zk://...` coordination URL to a `host:port` master
    /// endpoint.
    async fn detect(&self, zk_url: &str) -> Result<String, ConfigError>;
}
