//! Domain layer: core types and the capability traits ("ports") the
//! scheduling engine consumes. Nothing under this module knows about
//! HTTP, the filesystem, or any concrete wire protocol.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, CoreError};
