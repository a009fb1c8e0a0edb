//! Wire shapes for the master/slave introspection JSON (spec §6). Only
//! the fields this crate actually reads are modeled; unknown fields are
//! ignored by serde's default behavior.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MasterState {
    #[serde(default)]
    pub slaves: Vec<SlaveSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SlaveSummary {
    pub id: String,
    pub hostname: String,
    /// `name@host:port`, e.g. `slave(1)@10.0.0.5:5051`.
    pub pid: String,
}

#[derive(Debug, Deserialize)]
pub struct SlaveState {
    #[serde(default)]
    pub frameworks: Vec<FrameworkEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FrameworkEntry {
    pub id: String,
    #[serde(default)]
    pub executors: Vec<ExecutorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ExecutorEntry {
    #[allow(dead_code)]
    pub id: String,
    pub directory: String,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadResponse {
    pub offset: u64,
    pub data: String,
}

/// Splits a slave's `pid` field (`name@host:port`) into its executor
/// name and the `host:port` pair used to build the slave's base URL.
pub fn split_pid(pid: &str) -> Option<(&str, &str)> {
    pid.split_once('@')
}
