//! Core data model: commands, offers, tasks, constraints.

pub mod command;
pub mod config;
pub mod constraint;
pub mod offer;
pub mod task;

pub use command::{Command, CommandId, ContainerInfo};
pub use config::Config;
pub use constraint::Constraint;
pub use offer::{Attribute, AttributeValue, FrameworkId, Offer, OfferId, Resource, SlaveId};
pub use task::{Task, TaskState, TaskStatus};
