//! Configuration loading: CLI-provided values layered over defaults and
//! environment overrides via figment, then validated.

pub mod loader;

pub use loader::ConfigLoader;
