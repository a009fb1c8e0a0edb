//! HTTP adapters over the master/slave introspection endpoints (spec
//! §4.7, §6).

pub mod sandbox_resolver;
pub mod state;

pub use sandbox_resolver::HttpSandboxResolver;
