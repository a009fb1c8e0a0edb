//! End-to-end scenarios against the public scheduling API (spec.md §8).
//! Each test wires a real `CommandQueue`, `CommandHandler`, and
//! `Scheduler` behind a mock driver and sandbox, the same way `main`
//! does, and drives it through a sequence of callback deliveries.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use none_scheduler::domain::errors::CoreError;
use none_scheduler::domain::models::{
    Attribute, AttributeValue, Constraint, FrameworkId, Offer, OfferId, Resource, SlaveId, Task,
    TaskState, TaskStatus,
};
use none_scheduler::domain::ports::driver::{DriverPort, SchedulerCallbacks};
use none_scheduler::domain::ports::sandbox::{FileChunk, FileReader, SandboxLocation, SandboxResolver};
use none_scheduler::services::tailer::Sink;
use none_scheduler::services::{CommandHandler, CommandQueue, ResourceFilter, Scheduler};

struct RecordingDriver {
    launched: Mutex<Vec<(OfferId, Vec<Task>)>>,
    stopped: Mutex<Option<bool>>,
    aborted: Mutex<bool>,
}

impl RecordingDriver {
    fn new() -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
            stopped: Mutex::new(None),
            aborted: Mutex::new(false),
        }
    }
}

#[async_trait]
impl DriverPort for RecordingDriver {
    async fn run(&self, _callbacks: Arc<dyn SchedulerCallbacks>) -> Result<(), CoreError> {
        Ok(())
    }

    async fn stop(&self, graceful: bool) {
        *self.stopped.lock().unwrap() = Some(graceful);
    }

    async fn abort(&self) {
        *self.aborted.lock().unwrap() = true;
    }

    async fn launch_tasks(&self, offer_id: &OfferId, tasks: Vec<Task>, _refusal_seconds: f64) {
        self.launched.lock().unwrap().push((offer_id.clone(), tasks));
    }
}

struct NoSandbox;

#[async_trait]
impl SandboxResolver for NoSandbox {
    async fn resolve(&self, _s: &SlaveId, _f: &FrameworkId, _t: &str) -> Result<SandboxLocation, CoreError> {
        Err(CoreError::TransientHttp("no sandbox in scenario tests".to_string()))
    }
}

#[async_trait]
impl FileReader for NoSandbox {
    async fn read_range(&self, _l: &SandboxLocation, _f: &str, _o: u64, _n: u64) -> Result<FileChunk, CoreError> {
        Ok(FileChunk { offset: 0, data: String::new() })
    }

    async fn download(&self, _l: &SandboxLocation, _f: &str) -> Result<Vec<u8>, CoreError> {
        unimplemented!("not exercised by these scenarios")
    }
}

struct DiscardSink;

impl Sink for DiscardSink {
    fn write(&self, _data: &str) {}
}

fn harness() -> (Arc<RecordingDriver>, Arc<CommandQueue>, Arc<CommandHandler>, Scheduler) {
    harness_with_filter(ResourceFilter::new("*", vec![]))
}

fn harness_with_filter(filter: ResourceFilter) -> (Arc<RecordingDriver>, Arc<CommandQueue>, Arc<CommandHandler>, Scheduler) {
    let driver = Arc::new(RecordingDriver::new());
    let queue = Arc::new(CommandQueue::new());
    let handler = Arc::new(CommandHandler::new(
        Arc::new(NoSandbox),
        Arc::new(NoSandbox),
        Arc::new(DiscardSink),
        Arc::new(DiscardSink),
        None,
    ));
    let scheduler = Scheduler::new(queue.clone(), handler.clone(), filter, driver.clone());
    (driver, queue, handler, scheduler)
}

fn offer(id: &str, cpus: f64, mem: f64) -> Offer {
    Offer {
        id: OfferId(id.to_string()),
        slave_id: SlaveId("slave-1".to_string()),
        attributes: vec![],
        resources: vec![Resource::unreserved("cpus", cpus), Resource::unreserved("mem", mem)],
    }
}

fn status(state: TaskState) -> TaskStatus {
    TaskStatus { state, message: String::new() }
}

/// Scenario 1: single successful command.
#[tokio::test]
async fn single_successful_command_runs_to_completion() {
    let (driver, queue, handler, scheduler) = harness();
    let command = queue.enqueue("true".to_string(), 1.0, 128.0, None, vec![]).await;

    scheduler.resource_offers(vec![offer("o1", 4.0, 512.0)]).await;
    let launched = driver.launched.lock().unwrap().clone();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].1.len(), 1);
    assert!((launched[0].1[0].cpus - 1.0).abs() < f64::EPSILON);
    assert!((launched[0].1[0].mem - 128.0).abs() < f64::EPSILON);
    drop(launched);

    scheduler.status_update(command.id.0.clone(), status(TaskState::Running)).await;
    scheduler.status_update(command.id.0.clone(), status(TaskState::Finished)).await;

    assert!(!handler.has_failures());
    assert!(!handler.has_running_tasks());
}

/// Scenario 2: packing stops at the first command that doesn't fit.
#[tokio::test]
async fn packing_stops_at_the_first_command_that_does_not_fit() {
    let (driver, queue, _handler, scheduler) = harness();
    queue.enqueue("a".to_string(), 1.0, 128.0, None, vec![]).await;
    queue.enqueue("b".to_string(), 1.0, 128.0, None, vec![]).await;
    queue.enqueue("c".to_string(), 1.0, 128.0, None, vec![]).await;

    scheduler.resource_offers(vec![offer("o1", 2.5, 300.0)]).await;

    let launched = driver.launched.lock().unwrap();
    assert_eq!(launched.len(), 1);
    let names: Vec<_> = launched[0].1.iter().map(|t| t.cmd.clone()).collect();
    assert_eq!(names, vec!["a", "b"]);

    let still_queued = queue.get_command().expect("c waits for the next offer");
    assert_eq!(still_queued.cmd, "c");
}

/// Scenario 3: constraint filtering rejects one offer and accepts the other.
#[tokio::test]
async fn constraint_filtering_admits_only_the_matching_offer() {
    let filter = ResourceFilter::new(
        "*",
        vec![Constraint::Equals { attribute: "zone".to_string(), value: "us-east".to_string() }],
    );
    let (driver, queue, _handler, scheduler) = harness_with_filter(filter);
    queue.enqueue("a".to_string(), 1.0, 128.0, None, vec![]).await;

    let mut west = offer("o1", 4.0, 512.0);
    west.attributes.push(Attribute { name: "zone".to_string(), value: AttributeValue::Text("us-west".to_string()) });
    let mut east = offer("o2", 4.0, 512.0);
    east.attributes.push(Attribute { name: "zone".to_string(), value: AttributeValue::Text("us-east".to_string()) });

    scheduler.resource_offers(vec![west, east]).await;

    let launched = driver.launched.lock().unwrap();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].0 .0, "o2");
    assert_eq!(launched[0].1.len(), 1);
}

/// Scenario 4: one command fails, the other finishes; run continues and
/// the driver is never aborted, but failures are recorded.
#[tokio::test]
async fn a_task_failure_does_not_abort_the_driver() {
    let (driver, queue, handler, scheduler) = harness();
    let first = queue.enqueue("a".to_string(), 1.0, 128.0, None, vec![]).await;
    let second = queue.enqueue("b".to_string(), 1.0, 128.0, None, vec![]).await;
    scheduler.resource_offers(vec![offer("o1", 4.0, 512.0)]).await;

    scheduler.status_update(first.id.0.clone(), status(TaskState::Running)).await;
    scheduler.status_update(first.id.0.clone(), status(TaskState::Finished)).await;
    scheduler.status_update(second.id.0.clone(), status(TaskState::Running)).await;
    scheduler.status_update(second.id.0.clone(), status(TaskState::Failed)).await;

    assert!(handler.has_failures());
    assert!(!*driver.aborted.lock().unwrap());
}

/// Scenario 5: an unexpected LOST status aborts the driver.
#[tokio::test]
async fn a_lost_task_aborts_the_driver() {
    let (driver, queue, handler, scheduler) = harness();
    let command = queue.enqueue("a".to_string(), 1.0, 128.0, None, vec![]).await;
    scheduler.resource_offers(vec![offer("o1", 4.0, 512.0)]).await;

    scheduler.status_update(command.id.0.clone(), status(TaskState::Running)).await;
    scheduler.status_update(command.id.0.clone(), status(TaskState::Lost)).await;

    assert!(*driver.aborted.lock().unwrap());
    assert!(handler.has_failures());
}

/// Termination: once the queue is closed-and-drained and no tasks are
/// outstanding, the scheduler asks the driver to stop exactly once.
#[tokio::test]
async fn scheduler_stops_the_driver_once_the_queue_drains() {
    let (driver, queue, _handler, scheduler) = harness();
    let command = queue.enqueue("a".to_string(), 1.0, 128.0, None, vec![]).await;
    scheduler.resource_offers(vec![offer("o1", 4.0, 512.0)]).await;

    // drain and close so `closed()` becomes observable as true.
    queue.next();
    queue.close();
    queue.next();

    scheduler.status_update(command.id.0.clone(), status(TaskState::Running)).await;
    assert_eq!(*driver.stopped.lock().unwrap(), None);

    scheduler.status_update(command.id.0.clone(), status(TaskState::Finished)).await;
    assert_eq!(*driver.stopped.lock().unwrap(), Some(true));
}
