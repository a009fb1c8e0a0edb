//! `DriverPort` over the Mesos V1 HTTP Scheduler API. Issues a
//! `SUBSCRIBE` call, reads the resulting RecordIO-framed JSON event
//! stream, and dispatches events to the registered callbacks.
//! `ACCEPT`/`DECLINE`/`KILL`/`TEARDOWN` are plain JSON POSTs back to the
//! same endpoint. Kept intentionally thin (spec §4.8): this is a
//! collaborator the core depends on through `DriverPort`, not part of
//! the core's tested surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::{Buf, Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;

use crate::domain::errors::CoreError;
use crate::domain::models::{
    Attribute, AttributeValue, FrameworkId, Offer, OfferId, Resource, SlaveId, Task, TaskState,
    TaskStatus,
};
use crate::domain::ports::driver::{DriverPort, SchedulerCallbacks};

const FRAMEWORK_NAME: &str = "none-scheduler";
const STREAM_ID_HEADER: &str = "Mesos-Stream-Id";

pub struct HttpSchedulerDriver {
    client: Client,
    master_endpoint: String,
    role: String,
    stream_id: Mutex<Option<String>>,
    framework_id: Mutex<Option<String>>,
    stopping: AtomicBool,
}

impl HttpSchedulerDriver {
    pub fn new(client: Client, master_endpoint: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            client,
            master_endpoint: master_endpoint.into(),
            role: role.into(),
            stream_id: Mutex::new(None),
            framework_id: Mutex::new(None),
            stopping: AtomicBool::new(false),
        }
    }

    fn endpoint(&self) -> String {
        format!("http://{}/api/v1/scheduler", self.master_endpoint)
    }

    fn stream_id(&self) -> Option<String> {
        self.stream_id.lock().expect("driver poisoned").clone()
    }

    fn framework_id(&self) -> Option<String> {
        self.framework_id.lock().expect("driver poisoned").clone()
    }

    async fn post_call(&self, body: serde_json::Value) -> Result<(), CoreError> {
        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(id) = self.stream_id() {
            request = request.header(STREAM_ID_HEADER, id);
        }
        request
            .send()
            .await
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?
            .error_for_status()
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?;
        Ok(())
    }

    async fn dispatch(&self, event: &serde_json::Value, callbacks: &Arc<dyn SchedulerCallbacks>) {
        let Some(event_type) = event.get("type").and_then(|t| t.as_str()) else {
            return;
        };

        match event_type {
            "SUBSCRIBED" => {
                if let Some(id) = event["subscribe"]["framework_id"]["value"].as_str() {
                    *self.framework_id.lock().expect("driver poisoned") = Some(id.to_string());
                    callbacks.registered(FrameworkId(id.to_string())).await;
                }
            }
            "OFFERS" => {
                let offers = event["offers"]["offers"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(parse_offer)
                    .collect();
                callbacks.resource_offers(offers).await;
            }
            "UPDATE" => {
                if let Some((task_id, status)) = parse_update(event) {
                    callbacks.status_update(task_id, status).await;
                }
            }
            "RESCIND" => {
                if let Some(id) = event["rescind"]["offer_id"]["value"].as_str() {
                    callbacks.offer_rescinded(OfferId(id.to_string())).await;
                }
            }
            "MESSAGE" => {
                callbacks.framework_message(event["message"].to_string()).await;
            }
            "FAILURE" => {
                let agent_id = event["failure"]["agent_id"]["value"].as_str();
                let has_executor = event["failure"].get("executor_id").is_some();
                if let Some(agent_id) = agent_id {
                    if has_executor {
                        callbacks.executor_lost(SlaveId(agent_id.to_string())).await;
                    } else {
                        callbacks.slave_lost(SlaveId(agent_id.to_string())).await;
                    }
                }
            }
            "ERROR" => {
                let message = event["error"]["message"]
                    .as_str()
                    .unwrap_or("unknown scheduler error")
                    .to_string();
                callbacks.error(message).await;
            }
            "HEARTBEAT" => {}
            other => {
                tracing::debug!(event_type = other, "unhandled scheduler event");
            }
        }
    }
}

#[async_trait]
impl DriverPort for HttpSchedulerDriver {
    async fn run(&self, callbacks: Arc<dyn SchedulerCallbacks>) -> Result<(), CoreError> {
        let subscribe_body = json!({
            "type": "SUBSCRIBE",
            "subscribe": {
                "framework_info": {
                    "user": "",
                    "name": FRAMEWORK_NAME,
                    "roles": [self.role],
                }
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&subscribe_body)
            .send()
            .await
            .map_err(|err| CoreError::TransientHttp(err.to_string()))?;

        if let Some(id) = response.headers().get(STREAM_ID_HEADER) {
            if let Ok(id) = id.to_str() {
                *self.stream_id.lock().expect("driver poisoned") = Some(id.to_string());
            }
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer = BytesMut::new();

        while !self.stopping.load(Ordering::SeqCst) {
            let Some(chunk) = byte_stream.next().await else {
                break;
            };
            let chunk = chunk.map_err(|err| CoreError::TransientHttp(err.to_string()))?;
            buffer.extend_from_slice(&chunk);

            while let Some(record) = take_record(&mut buffer) {
                let event: serde_json::Value = serde_json::from_slice(&record)
                    .map_err(|err| CoreError::TransientHttp(err.to_string()))?;
                self.dispatch(&event, &callbacks).await;
            }
        }

        Ok(())
    }

    async fn stop(&self, graceful: bool) {
        self.stopping.store(true, Ordering::SeqCst);
        if !graceful {
            return;
        }
        let Some(framework_id) = self.framework_id() else {
            return;
        };
        let body = json!({
            "type": "TEARDOWN",
            "framework_id": {"value": framework_id},
        });
        if let Err(err) = self.post_call(body).await {
            tracing::warn!(error = %err, "teardown call failed");
        }
    }

    async fn abort(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        tracing::warn!("driver aborted");
    }

    async fn launch_tasks(&self, offer_id: &OfferId, tasks: Vec<Task>, refusal_seconds: f64) {
        let Some(framework_id) = self.framework_id() else {
            tracing::error!("launch_tasks called before the framework registered");
            return;
        };

        let body = if tasks.is_empty() {
            json!({
                "type": "DECLINE",
                "framework_id": {"value": framework_id},
                "decline": {
                    "offer_ids": [{"value": offer_id.0}],
                    "filters": {"refuse_seconds": refusal_seconds},
                }
            })
        } else {
            let task_infos: Vec<_> = tasks.iter().map(task_info_json).collect();
            json!({
                "type": "ACCEPT",
                "framework_id": {"value": framework_id},
                "accept": {
                    "offer_ids": [{"value": offer_id.0}],
                    "operations": [{
                        "type": "LAUNCH",
                        "launch": {"task_infos": task_infos},
                    }],
                    "filters": {"refuse_seconds": refusal_seconds},
                }
            })
        };

        if let Err(err) = self.post_call(body).await {
            tracing::error!(error = %err, offer_id = %offer_id, "launch_tasks call failed");
        }
    }
}

/// Pulls one length-prefixed RecordIO record off the front of `buffer`,
/// if a complete one is available yet.
fn take_record(buffer: &mut BytesMut) -> Option<Bytes> {
    let newline_pos = buffer.iter().position(|&b| b == b'\n')?;
    let length: usize = std::str::from_utf8(&buffer[..newline_pos]).ok()?.parse().ok()?;
    let record_start = newline_pos + 1;
    if buffer.len() < record_start + length {
        return None;
    }
    buffer.advance(record_start);
    Some(buffer.split_to(length).freeze())
}

fn parse_offer(value: serde_json::Value) -> Option<Offer> {
    let id = value["id"]["value"].as_str()?.to_string();
    let slave_id = value["agent_id"]["value"].as_str()?.to_string();

    let resources = value["resources"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            Some(Resource {
                name: r["name"].as_str()?.to_string(),
                role: r.get("role").and_then(|v| v.as_str()).unwrap_or("*").to_string(),
                value: r["scalar"]["value"].as_f64()?,
            })
        })
        .collect();

    let attributes = value["attributes"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(parse_attribute)
        .collect();

    Some(Offer {
        id: OfferId(id),
        slave_id: SlaveId(slave_id),
        attributes,
        resources,
    })
}

fn parse_attribute(value: serde_json::Value) -> Option<Attribute> {
    let name = value["name"].as_str()?.to_string();
    let attribute_value = match value["type"].as_str().unwrap_or("") {
        "SCALAR" => AttributeValue::Scalar(value["scalar"]["value"].as_f64()?),
        "TEXT" => AttributeValue::Text(value["text"]["value"].as_str()?.to_string()),
        _ => AttributeValue::Other,
    };
    Some(Attribute {
        name,
        value: attribute_value,
    })
}

fn parse_update(event: &serde_json::Value) -> Option<(String, TaskStatus)> {
    let status = &event["update"]["status"];
    let task_id = status["task_id"]["value"].as_str()?.to_string();
    let state = parse_task_state(status["state"].as_str()?)?;
    let message = status
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("")
        .to_string();
    Some((task_id, TaskStatus { state, message }))
}

fn parse_task_state(state: &str) -> Option<TaskState> {
    match state {
        "TASK_STARTING" | "TASK_RUNNING" => Some(TaskState::Running),
        "TASK_FINISHED" => Some(TaskState::Finished),
        "TASK_FAILED" | "TASK_ERROR" => Some(TaskState::Failed),
        "TASK_LOST" | "TASK_DROPPED" | "TASK_UNREACHABLE" | "TASK_GONE" => Some(TaskState::Lost),
        "TASK_KILLED" => Some(TaskState::Killed),
        _ => None,
    }
}

fn task_info_json(task: &Task) -> serde_json::Value {
    let mut info = json!({
        "name": format!("none-task-{}", task.task_id),
        "task_id": {"value": task.task_id},
        "agent_id": {"value": task.slave_id.0},
        "resources": [
            {"name": "cpus", "type": "SCALAR", "scalar": {"value": task.cpus}},
            {"name": "mem", "type": "SCALAR", "scalar": {"value": task.mem}},
        ],
        "command": {
            "value": task.cmd,
            "uris": task.uris.iter().map(|u| json!({"value": u})).collect::<Vec<_>>(),
        },
    });
    if let Some(container) = &task.container {
        info["container"] = container.0.clone();
    }
    info
}
