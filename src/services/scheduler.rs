//! The scheduling engine itself: multiplexes offers and status updates
//! from the driver into launch decisions and command-lifecycle
//! transitions (spec §4.4). Holds no timer of its own — every state
//! change here is driven by a callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::errors::CoreError;
use crate::domain::models::command::CommandId;
use crate::domain::models::{FrameworkId, Offer, OfferId, SlaveId, Task, TaskState, TaskStatus};
use crate::domain::ports::driver::{DriverPort, SchedulerCallbacks};
use crate::services::command_handler::CommandHandler;
use crate::services::command_queue::CommandQueue;
use crate::services::resource_filter::ResourceFilter;

/// Refusal filter attached to `LaunchTasks` so offers this scheduler
/// declines (or only partially consumes) come back to the master
/// quickly rather than being held for the master's default filter
/// duration.
const REFUSAL_SECONDS: f64 = 1.0;

pub struct Scheduler {
    queue: Arc<CommandQueue>,
    handler: Arc<CommandHandler>,
    resource_filter: ResourceFilter,
    driver: Arc<dyn DriverPort>,
    framework_id: Mutex<Option<FrameworkId>>,
    stop_requested: AtomicBool,
}

impl Scheduler {
    pub fn new(
        queue: Arc<CommandQueue>,
        handler: Arc<CommandHandler>,
        resource_filter: ResourceFilter,
        driver: Arc<dyn DriverPort>,
    ) -> Self {
        Self {
            queue,
            handler,
            resource_filter,
            driver,
            framework_id: Mutex::new(None),
            stop_requested: AtomicBool::new(false),
        }
    }

    pub fn framework_id(&self) -> Option<FrameworkId> {
        self.framework_id.lock().expect("scheduler poisoned").clone()
    }

    /// Stops the driver exactly once, the first time the queue is found
    /// closed-and-drained with nothing left running.
    async fn check_termination(&self) {
        if !self.queue.closed() || self.handler.has_running_tasks() {
            return;
        }
        if self
            .stop_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        tracing::info!("queue drained and no tasks outstanding, stopping framework");
        self.handler.finish_all_commands().await;
        self.driver.stop(true).await;
    }
}

#[async_trait]
impl SchedulerCallbacks for Scheduler {
    async fn registered(&self, framework_id: FrameworkId) {
        tracing::info!(framework_id = %framework_id, "framework registered with master");
        *self.framework_id.lock().expect("scheduler poisoned") = Some(framework_id);
    }

    async fn reregistered(&self) {
        tracing::info!("framework reregistered with master");
    }

    async fn disconnected(&self) {
        tracing::warn!("framework disconnected from master");
    }

    /// Packs as many queued commands as fit into each offer in turn,
    /// left to right, never looking past a head-of-queue command that
    /// doesn't fit (spec §4.4.1).
    async fn resource_offers(&self, offers: Vec<Offer>) {
        if self.queue.get_command().is_none() {
            return;
        }

        for offer in offers {
            if !self.resource_filter.filter_offer(&offer) {
                continue;
            }

            let cpu_resources = self.resource_filter.filter_resources(&offer, "cpus");
            let mem_resources = self.resource_filter.filter_resources(&offer, "mem");
            let mut remaining_cpus = ResourceFilter::sum(&cpu_resources);
            let mut remaining_mems = ResourceFilter::sum(&mem_resources);

            let mut tasks = Vec::new();
            while let Some(command) = self.queue.get_command() {
                if command.cpu_req > remaining_cpus || command.mem_req > remaining_mems {
                    break;
                }

                command.set_slave_id(offer.slave_id.clone());
                if let Some(framework_id) = self.framework_id() {
                    command.set_framework_id(framework_id);
                }
                self.handler.command_launched(&command);

                tasks.push(Task {
                    task_id: command.id.0.clone(),
                    slave_id: offer.slave_id.clone(),
                    cpus: command.cpu_req,
                    mem: command.mem_req,
                    cmd: command.cmd.clone(),
                    container: command.container.clone(),
                    uris: command.uris.clone(),
                });

                remaining_cpus -= command.cpu_req;
                remaining_mems -= command.mem_req;
                self.queue.next();
            }

            tracing::info!(
                offer_id = %offer.id,
                task_count = tasks.len(),
                "launching tasks for offer"
            );
            self.driver
                .launch_tasks(&offer.id, tasks, REFUSAL_SECONDS)
                .await;
        }
    }

    /// Applies the per-command state machine of spec §4.4.2, then
    /// re-checks the termination condition.
    async fn status_update(&self, task_id: String, status: TaskStatus) {
        let command_id = CommandId(task_id.clone());
        let Some(command) = self.queue.get_command_by_id(&command_id) else {
            let err = CoreError::UnknownTaskId(task_id);
            tracing::error!(error = %err, "aborting");
            self.driver.abort().await;
            return;
        };

        let state = status.state;
        let previous = command.set_status(status);
        if previous == Some(state) {
            return;
        }

        // Every terminal state (FINISHED, FAILED, LOST, KILLED) stops the
        // tailers the same way; the states only differ in what happens
        // next (spec §4.4.2).
        if state.is_terminal() {
            self.handler.command_ended(&command);
        }

        match state {
            TaskState::Launched => {}
            TaskState::Running => {
                self.handler.command_running(&command).await;
            }
            TaskState::Finished => {
                self.handler.command_finished(&command).await;
            }
            TaskState::Failed | TaskState::Lost | TaskState::Killed => {
                self.handler.command_failed(&command);
            }
        }

        if state.is_unexpected() {
            tracing::error!(
                task_id = %task_id,
                ?state,
                "task in unexpected terminal state, aborting framework"
            );
            self.driver.abort().await;
        }

        self.check_termination().await;
    }

    async fn offer_rescinded(&self, offer_id: OfferId) {
        tracing::info!(offer_id = %offer_id, "offer rescinded");
    }

    async fn framework_message(&self, message: String) {
        tracing::info!(message = %message, "framework message received");
    }

    async fn slave_lost(&self, slave_id: SlaveId) {
        tracing::warn!(slave_id = %slave_id, "slave lost");
    }

    async fn executor_lost(&self, slave_id: SlaveId) {
        tracing::warn!(slave_id = %slave_id, "executor lost");
    }

    async fn error(&self, message: String) {
        tracing::error!(message = %message, "scheduler received error from driver");
    }
}
