//! `zk://` leader discovery is a collaborator the core depends on
//! through a trait (spec.md §9), not something the core implements.
//! This crate ships only the "unsupported" implementation; a real one
//! needs a ZooKeeper client, which is out of scope (spec.md §1).

use async_trait::async_trait;

use crate::domain::errors::ConfigError;
use crate::domain::ports::leader::LeaderDetector;

pub struct UnsupportedLeaderDetector;

#[async_trait]
impl LeaderDetector for UnsupportedLeaderDetector {
    async fn detect(&self, zk_url: &str) -> Result<String, ConfigError> {
        Err(ConfigError::ZkDetectionUnavailable(zk_url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zk_urls_are_rejected() {
        let detector = UnsupportedLeaderDetector;
        let err = detector.detect("zk://zk1:2181/mesos").await.unwrap_err();
        assert!(matches!(err, ConfigError::ZkDetectionUnavailable(_)));
    }
}
