//! none-scheduler: an operator-driven shell command scheduler for a
//! two-level cluster resource manager. See the crate's design notes for
//! the full architecture; in short, `domain` defines the model and the
//! capability traits the scheduling engine depends on, `services` is
//! that engine, and `infrastructure` supplies the concrete adapters
//! `main` wires together.

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;
