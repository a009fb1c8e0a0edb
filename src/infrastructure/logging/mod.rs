//! Structured logging setup, built on `tracing`.

pub mod logger;

pub use logger::LoggerImpl;
