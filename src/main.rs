//! Process entry point: wires CLI flags through configuration loading,
//! adapter construction, and the scheduler, then maps the outcome to an
//! exit code (spec.md §6).

use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use none_scheduler::cli::Cli;
use none_scheduler::domain::errors::ConfigError;
use none_scheduler::domain::models::command::ContainerInfo;
use none_scheduler::domain::models::Config;
use none_scheduler::domain::ports::driver::{DriverPort, SchedulerCallbacks};
use none_scheduler::domain::ports::leader::LeaderDetector;
use none_scheduler::domain::ports::sandbox::{FileReader, SandboxResolver};
use none_scheduler::infrastructure::config::ConfigLoader;
use none_scheduler::infrastructure::console::{ConsoleSink, ConsoleStream};
use none_scheduler::infrastructure::driver::{HttpSchedulerDriver, UnsupportedLeaderDetector};
use none_scheduler::infrastructure::http::HttpSandboxResolver;
use none_scheduler::infrastructure::logging::LoggerImpl;
use none_scheduler::services::constraint_engine;
use none_scheduler::services::{CommandHandler, CommandQueue, ResourceFilter, Scheduler};

const EXIT_OK: u8 = 0;
const EXIT_TASK_FAILURE: u8 = 1;
const EXIT_DRIVER_ERROR: u8 = 2;
const EXIT_CONFIG_ERROR: u8 = 10;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("none-scheduler: {err:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = ConfigLoader::load(cli.into_config())?;

    let _logger = LoggerImpl::init(&config.logging).context("failed to initialize logging")?;

    if config.send_workdir {
        // Archive building and the artifact server are out of scope for
        // this build (spec.md §1); the flag is accepted but inert.
        tracing::warn!("--send-workdir has no effect: artifact staging is not implemented in this build");
    }

    let master_endpoint = resolve_master(&config.master).await?;
    let container = build_container(&config)?;
    let constraints = constraint_engine::parse(config.constraints.as_deref())?;

    let client = reqwest::Client::new();

    let sandbox = Arc::new(HttpSandboxResolver::new(client.clone(), master_endpoint.clone()));
    let resolver: Arc<dyn SandboxResolver> = sandbox.clone();
    let reader: Arc<dyn FileReader> = sandbox;

    let driver: Arc<dyn DriverPort> = Arc::new(HttpSchedulerDriver::new(
        client,
        master_endpoint,
        config.role.clone(),
    ));

    let handler = Arc::new(CommandHandler::new(
        resolver,
        reader,
        Arc::new(ConsoleSink::new(ConsoleStream::Stdout)),
        Arc::new(ConsoleSink::new(ConsoleStream::Stderr)),
        config.download_file.clone(),
    ));

    let resource_filter = ResourceFilter::new(config.role.clone(), constraints);
    let queue = Arc::new(CommandQueue::new());

    let scheduler: Arc<dyn SchedulerCallbacks> = Arc::new(Scheduler::new(
        queue.clone(),
        handler.clone(),
        resource_filter,
        driver.clone(),
    ));

    if let Some(command) = config.command.clone() {
        queue
            .enqueue(command, config.cpu_per_task, config.mem_per_task, container, Vec::new())
            .await;
        queue.close();
    } else {
        spawn_stdin_reader(queue.clone(), config.clone(), container);
    }

    let outcome = driver.run(scheduler).await;
    queue.close();

    match outcome {
        Ok(()) => Ok(if handler.has_failures() {
            EXIT_TASK_FAILURE
        } else {
            EXIT_OK
        }),
        Err(err) => {
            tracing::error!(error = %err, "driver returned an error");
            Ok(EXIT_DRIVER_ERROR)
        }
    }
}

/// Resolves a `zk://` coordination URL to a `host:port` master endpoint
/// before the driver is constructed; a plain `host:port` passes through
/// untouched (spec.md §9).
async fn resolve_master(master: &str) -> Result<String, ConfigError> {
    if master.starts_with("zk://") {
        UnsupportedLeaderDetector.detect(master).await
    } else {
        Ok(master.to_string())
    }
}

fn build_container(config: &Config) -> Result<Option<ContainerInfo>, ConfigError> {
    if let Some(raw) = &config.container {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| ConfigError::InvalidContainerJson(err.to_string()))?;
        return Ok(Some(ContainerInfo(value)));
    }
    if let Some(image) = &config.docker_image {
        return Ok(Some(ContainerInfo(serde_json::json!({
            "type": "DOCKER",
            "docker": {"image": image},
        }))));
    }
    Ok(None)
}

/// Reads commands from stdin line by line on a blocking thread, since
/// `std::io::BufRead` has no async-native equivalent in the standard
/// library. Each line suspends on the bounded queue via a nested
/// `block_on`, which is safe here because `spawn_blocking` runs on its
/// own thread pool, not an async worker thread.
fn spawn_stdin_reader(queue: Arc<CommandQueue>, config: Config, container: Option<ContainerInfo>) {
    tokio::task::spawn_blocking(move || {
        let handle = tokio::runtime::Handle::current();
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            handle.block_on(queue.enqueue(
                line,
                config.cpu_per_task,
                config.mem_per_task,
                container.clone(),
                Vec::new(),
            ));
        }
        queue.close();
    });
}
