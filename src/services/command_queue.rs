//! FIFO buffer of pending commands with id assignment and a
//! single-producer/single-consumer handoff (spec §4.1, §9).
//!
//! The producer side (the stdin reader, or the `--command` one-shot path)
//! calls `enqueue` and `close`. The consumer side (the scheduler) calls
//! `next`, `get_command`, `get_command_by_id`, and `closed`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::domain::models::command::{Command, CommandId, ContainerInfo};

/// Bound on the number of commands buffered ahead of the scheduler.
/// Enqueue suspends once this fills, which is the queue's only
/// backpressure mechanism (spec §5).
const QUEUE_CAPACITY: usize = 64;

struct Index {
    next_id: u64,
    by_id: HashMap<CommandId, Arc<Command>>,
}

pub struct CommandQueue {
    sender: Mutex<Option<mpsc::Sender<Arc<Command>>>>,
    receiver: Mutex<mpsc::Receiver<Arc<Command>>>,
    index: Mutex<Index>,
    current: Mutex<Option<Arc<Command>>>,
    closed: AtomicBool,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            index: Mutex::new(Index {
                next_id: 0,
                by_id: HashMap::new(),
            }),
            current: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Assigns a fresh id, indexes the command, and publishes it into the
    /// FIFO. Suspends when the queue is full. Returns the assigned
    /// command so the caller (the CLI / stdin reader) can report it.
    pub async fn enqueue(
        &self,
        cmd: String,
        cpu_req: f64,
        mem_req: f64,
        container: Option<ContainerInfo>,
        uris: Vec<String>,
    ) -> Arc<Command> {
        let sender = {
            let sender = self.sender.lock().expect("command queue poisoned");
            sender.clone()
        };
        let command = {
            let mut index = self.index.lock().expect("command queue poisoned");
            index.next_id += 1;
            let id = CommandId(index.next_id.to_string());
            let command = Arc::new(Command::new(id.clone(), cmd, cpu_req, mem_req, container, uris));
            index.by_id.insert(id, command.clone());
            command
        };

        if let Some(sender) = sender {
            // The receiver is never dropped before the sender, so send
            // only fails if the queue itself has already been closed by
            // a racing call, which cannot happen: `close` takes the same
            // sender slot.
            let _ = sender.send(command.clone()).await;
        }
        command
    }

    /// Advances the cursor by one if a command is available; returns
    /// `None` without blocking otherwise. Marks the queue closed-and-
    /// drained once the producer side is closed and no command remains.
    pub fn next(&self) -> Option<Arc<Command>> {
        let mut receiver = self.receiver.lock().expect("command queue poisoned");
        let next = match receiver.try_recv() {
            Ok(command) => Some(command),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed.store(true, Ordering::SeqCst);
                None
            }
        };
        *self.current.lock().expect("command queue poisoned") = next.clone();
        next
    }

    /// Returns the current (not yet consumed) cursor without advancing.
    /// If nothing has been peeked yet, tries to advance once.
    pub fn get_command(&self) -> Option<Arc<Command>> {
        let current = self.current.lock().expect("command queue poisoned").clone();
        match current {
            Some(command) => Some(command),
            None => self.next(),
        }
    }

    pub fn get_command_by_id(&self, id: &CommandId) -> Option<Arc<Command>> {
        self.index
            .lock()
            .expect("command queue poisoned")
            .by_id
            .get(id)
            .cloned()
    }

    /// Marks the producer side done. `closed()` flips to true once a
    /// subsequent drain observes no more elements.
    pub fn close(&self) {
        self.sender.lock().expect("command queue poisoned").take();
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
