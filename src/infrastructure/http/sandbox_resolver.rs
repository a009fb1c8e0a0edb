//! Concrete `SandboxResolver`/`FileReader` over the master and slave
//! introspection HTTP endpoints (spec §4.7, §6).

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::errors::CoreError;
use crate::domain::models::{FrameworkId, SlaveId};
use crate::domain::ports::sandbox::{FileChunk, FileReader, SandboxLocation, SandboxResolver};
use crate::infrastructure::http::state::{split_pid, MasterState, ReadResponse, SlaveState};

pub struct HttpSandboxResolver {
    client: Client,
    /// The master's `host:port`, already resolved from any `zk://` URL.
    master_endpoint: String,
}

impl HttpSandboxResolver {
    pub fn new(client: Client, master_endpoint: impl Into<String>) -> Self {
        Self {
            client,
            master_endpoint: master_endpoint.into(),
        }
    }

    fn master_base(&self) -> String {
        format!("http://{}", self.master_endpoint)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CoreError> {
        self.fetch_json_with_query(url, &[]).await
    }

    async fn fetch_json_with_query<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?
            .error_for_status()
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?;
        response
            .json::<T>()
            .await
            .map_err(|err| CoreError::TransientHttp(err.to_string()))
    }
}

#[async_trait]
impl SandboxResolver for HttpSandboxResolver {
    async fn resolve(
        &self,
        slave_id: &SlaveId,
        framework_id: &FrameworkId,
        task_id: &str,
    ) -> Result<SandboxLocation, CoreError> {
        let master_state: MasterState = self
            .fetch_json(&format!("{}/master/state.json", self.master_base()))
            .await?;

        let slave = master_state
            .slaves
            .into_iter()
            .find(|s| s.id == slave_id.0)
            .ok_or_else(|| CoreError::SlaveNotFound(slave_id.0.clone()))?;

        let (name, host_port) = split_pid(&slave.pid).ok_or_else(|| {
            CoreError::TransientHttp(format!("malformed slave pid: {}", slave.pid))
        })?;
        let port = host_port.rsplit_once(':').map_or(host_port, |(_, port)| port);
        let slave_base = format!("http://{}:{port}", slave.hostname);

        let slave_state: SlaveState = self
            .fetch_json(&format!("{slave_base}/{name}/state.json"))
            .await?;

        let directory = slave_state
            .frameworks
            .into_iter()
            .find(|f| f.id == framework_id.0)
            .and_then(|f| {
                f.executors
                    .into_iter()
                    .find(|e| e.tasks.iter().any(|t| t.id == task_id))
            })
            .map(|e| e.directory)
            .ok_or_else(|| CoreError::DirectoryNotFound(task_id.to_string()))?;

        Ok(SandboxLocation {
            base_url: slave_base,
            directory,
        })
    }
}

#[async_trait]
impl FileReader for HttpSandboxResolver {
    async fn read_range(
        &self,
        location: &SandboxLocation,
        filename: &str,
        offset: u64,
        length: u64,
    ) -> Result<FileChunk, CoreError> {
        let path = format!("{}/{}", location.directory, filename);
        let response: ReadResponse = self
            .fetch_json_with_query(
                &format!("{}/files/read.json", location.base_url),
                &[
                    ("length", length.to_string()),
                    ("offset", offset.to_string()),
                    ("path", path),
                ],
            )
            .await?;
        Ok(FileChunk {
            offset: response.offset,
            data: response.data,
        })
    }

    async fn download(&self, location: &SandboxLocation, filename: &str) -> Result<Vec<u8>, CoreError> {
        let path = format!("{}/{}", location.directory, filename);
        let response = self
            .client
            .get(format!("{}/files/download.json", location.base_url))
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?
            .error_for_status()
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|err| CoreError::TransientHttp(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_walks_master_then_slave_state() {
        let mut server = mockito::Server::new_async().await;
        // The host the slave is actually reachable at (`hostname`) is
        // deliberately different from the host embedded in `pid`, which
        // only contributes its port: resolution must follow `hostname`,
        // per spec.md §4.7, not the pid's (possibly unreachable) host.
        let addr = server.host_with_port();
        let (real_host, port) = addr.rsplit_once(':').expect("mockito address has a port");
        let master_mock = server
            .mock("GET", "/master/state.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"slaves":[{{"id":"s1","hostname":"{real_host}","pid":"slave(1)@pid-advertised-host:{port}"}}]}}"#
            ))
            .create_async()
            .await;
        let slave_mock = server
            .mock("GET", "/slave(1)/state.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"frameworks":[{"id":"f1","executors":[{"id":"e1","directory":"/sandbox/1","tasks":[{"id":"task-1"}]}]}]}"#,
            )
            .create_async()
            .await;

        let resolver = HttpSandboxResolver::new(Client::new(), server.host_with_port());
        let location = resolver
            .resolve(&SlaveId("s1".to_string()), &FrameworkId("f1".to_string()), "task-1")
            .await
            .expect("resolves");

        assert_eq!(location.directory, "/sandbox/1");
        master_mock.assert_async().await;
        slave_mock.assert_async().await;
    }

    #[tokio::test]
    async fn resolve_fails_when_slave_is_unknown() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/master/state.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"slaves":[]}"#)
            .create_async()
            .await;

        let resolver = HttpSandboxResolver::new(Client::new(), server.host_with_port());
        let err = resolver
            .resolve(&SlaveId("missing".to_string()), &FrameworkId("f1".to_string()), "task-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SlaveNotFound(_)));
    }

    #[tokio::test]
    async fn read_range_parses_server_offset_and_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"offset":12,"data":"hello"}"#)
            .create_async()
            .await;

        let resolver = HttpSandboxResolver::new(Client::new(), server.host_with_port());
        let location = SandboxLocation {
            base_url: server.url(),
            directory: "/sandbox/1".to_string(),
        };
        let chunk = resolver
            .read_range(&location, "stdout", 0, 50_000)
            .await
            .expect("reads");
        assert_eq!(chunk.offset, 12);
        assert_eq!(chunk.data, "hello");
    }
}
