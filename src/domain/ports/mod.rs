//! Capability traits ("ports") the scheduling engine consumes. Concrete
//! implementations live under `infrastructure`; the core only ever holds
//! trait objects so it never depends on a specific wire protocol or HTTP
//! client.

pub mod driver;
pub mod leader;
pub mod sandbox;
pub mod tailer;

pub use driver::{DriverPort, SchedulerCallbacks};
pub use leader::LeaderDetector;
pub use sandbox::{FileReader, SandboxLocation, SandboxResolver};
pub use tailer::TailerHandle;
