//! Concrete adapters: everything that talks to the outside world (HTTP,
//! process environment, the filesystem). The domain and service layers
//! never import from here directly — only `main` wires them together.

pub mod config;
pub mod console;
pub mod driver;
pub mod http;
pub mod logging;
