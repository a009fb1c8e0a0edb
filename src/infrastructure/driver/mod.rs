//! The driver adapter: a thin `DriverPort` implementation over the
//! Mesos V1 HTTP Scheduler API, plus the `zk://` leader-detection
//! collaborator. Deliberately outside the core's unit-tested surface
//! (spec.md §1); covered by a smoke test only.

pub mod http_scheduler_driver;
pub mod leader_detector;

pub use http_scheduler_driver::HttpSchedulerDriver;
pub use leader_detector::UnsupportedLeaderDetector;
