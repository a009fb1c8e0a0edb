//! Application services: the scheduling and task-lifecycle engine itself.
//! Every type here is transport- and protocol-agnostic; it only ever
//! touches the master/slave world through the `domain::ports` traits.

pub mod command_handler;
pub mod command_queue;
pub mod constraint_engine;
pub mod resource_filter;
pub mod scheduler;
pub mod tailer;

pub use command_handler::CommandHandler;
pub use command_queue::CommandQueue;
pub use resource_filter::ResourceFilter;
pub use scheduler::Scheduler;
pub use tailer::Tailer;
