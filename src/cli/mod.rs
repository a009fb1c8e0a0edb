//! Operator-facing CLI surface (spec.md §6). Flat flags, not
//! subcommands — there is only ever one thing this process does.

use clap::Parser;

use crate::domain::models::config::{Config, LogFormat, LoggingConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "none-scheduler")]
#[command(about = "Operator-driven shell command scheduler for a two-level cluster resource manager")]
#[command(version)]
pub struct Cli {
    /// Endpoint (host:port) or coordination URL prefix zk://.
    #[arg(long, env = "NONE_SCHEDULER_MASTER")]
    pub master: String,

    /// A single command to run. If present, stdin is not read.
    #[arg(long)]
    pub command: Option<String>,

    /// Default CPU share requested per command.
    #[arg(long)]
    pub cpu_per_task: Option<f64>,

    /// Default memory (MB) requested per command.
    #[arg(long)]
    pub mem_per_task: Option<f64>,

    /// `attr:op[:value][;...]` constraint grammar.
    #[arg(long)]
    pub constraints: Option<String>,

    /// Role used for resource filtering.
    #[arg(long)]
    pub role: Option<String>,

    /// Task container descriptor, as raw JSON.
    #[arg(long, conflicts_with = "docker_image")]
    pub container: Option<String>,

    /// Task container, as a bare Docker image reference.
    #[arg(long, conflicts_with = "container")]
    pub docker_image: Option<String>,

    /// After FINISHED, fetch this sandbox-relative file.
    #[arg(long)]
    pub download_file: Option<String>,

    /// Bundle the current working directory as a staged artifact.
    #[arg(long)]
    pub send_workdir: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    pub log_format: Option<CliLogFormat>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum CliLogFormat {
    Json,
    Pretty,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Json => LogFormat::Json,
            CliLogFormat::Pretty => LogFormat::Pretty,
        }
    }
}

impl Cli {
    /// Projects the parsed flags into a `Config`. Fields the operator
    /// left unset are omitted so the loader's defaults (not this type's)
    /// apply; see `infrastructure::config::ConfigLoader`.
    pub fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            master: self.master,
            command: self.command,
            cpu_per_task: self.cpu_per_task.unwrap_or(defaults.cpu_per_task),
            mem_per_task: self.mem_per_task.unwrap_or(defaults.mem_per_task),
            constraints: self.constraints,
            role: self.role.unwrap_or(defaults.role),
            container: self.container,
            docker_image: self.docker_image,
            download_file: self.download_file,
            send_workdir: self.send_workdir,
            logging: LoggingConfig {
                level: self.log_level.unwrap_or(defaults.logging.level),
                format: self.log_format.map(Into::into).unwrap_or(defaults.logging.format),
            },
        }
    }
}
