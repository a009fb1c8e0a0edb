//! The driver adapter boundary: the narrow interface over the cluster
//! driver's callbacks and commands (spec §6). Wire messages,
//! authentication, and leader discovery are deliberately not visible
//! here — they belong to a concrete `DriverPort` implementation in
//! `infrastructure::driver`.

use async_trait::async_trait;

use crate::domain::errors::CoreError;
use crate::domain::models::{FrameworkId, Offer, OfferId, SlaveId, Task, TaskStatus};

/// Commands the core issues to the driver.
#[async_trait]
pub trait DriverPort: Send + Sync {
    /// Blocking event loop: subscribes to the master and dispatches
    /// events to `callbacks` until `stop` or `abort` is called, or the
    /// connection is unrecoverably lost. Resolves once the loop exits.
    async fn run(&self, callbacks: std::sync::Arc<dyn SchedulerCallbacks>) -> Result<(), CoreError>;

    /// Requests a graceful (or immediate) shutdown; `run`'s loop will
    /// return once any in-flight work drains.
    async fn stop(&self, graceful: bool);

    /// Requests immediate, ungraceful shutdown after a protocol
    /// invariant violation or an unexpected task state.
    async fn abort(&self);

    /// Submits the accumulated task list for a single offer, attached
    /// with a refusal-timeout filter so unused offers return quickly.
    async fn launch_tasks(&self, offer_id: &OfferId, tasks: Vec<Task>, refusal_seconds: f64);
}

/// Events the driver delivers back into the core.
#[async_trait]
pub trait SchedulerCallbacks: Send + Sync {
    async fn registered(&self, framework_id: FrameworkId);
    async fn reregistered(&self);
    async fn disconnected(&self);
    async fn resource_offers(&self, offers: Vec<Offer>);
    async fn status_update(&self, task_id: String, status: TaskStatus);
    async fn offer_rescinded(&self, offer_id: OfferId);
    async fn framework_message(&self, message: String);
    async fn slave_lost(&self, slave_id: SlaveId);
    async fn executor_lost(&self, slave_id: SlaveId);
    async fn error(&self, message: String);
}
