//! # sshcheck core
//!
//! The pipeline behind a check run:
//!
//! * [`ssh_config`] reads host entries out of an ssh config file.
//! * [`prober`] probes every entry concurrently using [`network::ssh`].
//! * [`inventory`] picks one reachable host per group.
//! * [`report`] lists the outcome for every host.
//! * [`artifacts`] writes both to a timestamped run directory.

pub mod artifacts;
pub mod inventory;
pub mod network;
pub mod prober;
pub mod report;
pub mod ssh_config;
