//! Types shared by every `sshcheck` crate.
//!
//! * [`host`]: parsed host entries and their grouping.
//! * [`probe`]: the outcome of a reachability probe.
//! * [`config`]: options for a single run.
//! * [`error`]: errors raised while reading the host configuration.

pub mod config;
pub mod error;
pub mod host;
pub mod log;
pub mod probe;

#[doc(hidden)]
pub use tracing as __tracing;
