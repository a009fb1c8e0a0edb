//! Configuration structures loaded by `infrastructure::config::ConfigLoader`.

use serde::{Deserialize, Serialize};

/// Root configuration. Populated from CLI flags layered over defaults
/// (see `infrastructure::config::ConfigLoader`); there is no on-disk
/// config file for this scheduler, unlike services that run as daemons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Master endpoint, `host:port` or a `zk://` coordination URL.
    pub master: String,

    /// A single command to run; when set, stdin is not read.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default = "default_cpu_per_task")]
    pub cpu_per_task: f64,

    #[serde(default = "default_mem_per_task")]
    pub mem_per_task: f64,

    /// Raw `attr:op[:value][;...]` constraint text, parsed by
    /// `services::constraint_engine`.
    #[serde(default)]
    pub constraints: Option<String>,

    #[serde(default = "default_role")]
    pub role: String,

    /// Container descriptor as raw JSON, mutually exclusive in practice
    /// with `docker_image` (container wins if both are set).
    #[serde(default)]
    pub container: Option<String>,

    #[serde(default)]
    pub docker_image: Option<String>,

    /// Sandbox-relative file to fetch after a command's task finishes.
    #[serde(default)]
    pub download_file: Option<String>,

    #[serde(default)]
    pub send_workdir: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_cpu_per_task() -> f64 {
    1.0
}

fn default_mem_per_task() -> f64 {
    128.0
}

fn default_role() -> String {
    "*".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master: String::new(),
            command: None,
            cpu_per_task: default_cpu_per_task(),
            mem_per_task: default_mem_per_task(),
            constraints: None,
            role: default_role(),
            container: None,
            docker_image: None,
            download_file: None,
            send_workdir: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration, mirrored after the stack's usual
/// tracing-subscriber setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
