//! # Probe Coordinator
//!
//! Fans a probe out to every host entry and gathers the results.
//!
//! Each entry runs as its own task. A semaphore caps how many of them are
//! talking to the network at once; the rest wait for a permit. Tasks hand their
//! [`ProbeResult`] back as a value and only this coordinator aggregates them,
//! so nothing is shared mutably between tasks.
//!
//! The coordinator returns once every task has finished. There is no global
//! deadline: a run takes as long as its slowest probe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sshcheck_common::host::{GroupedEntries, HostEntry};
use sshcheck_common::probe::{ProbeOutcome, ProbeResult};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error};

use crate::network::ssh;

/// Performs a single reachability check.
///
/// Implementations must not fail; problems are reported as
/// [`ProbeOutcome::Unreachable`].
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, hostname: &str, port: u16, timeout: Duration) -> ProbeOutcome;
}

/// Probes real hosts with the SSH identification exchange.
pub struct SshProber;

#[async_trait]
impl Prober for SshProber {
    async fn probe(&self, hostname: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        ssh::probe(hostname, port, timeout).await
    }
}

/// Everything a completed run produced.
#[derive(Debug, Default)]
pub struct ProbeRun {
    /// One result per entry, in completion order.
    pub results: Vec<ProbeResult>,
    /// `hostname:port` of every reachable entry, by group.
    pub reachable_by_group: HashMap<String, Vec<String>>,
}

impl ProbeRun {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            reachable_by_group: HashMap::new(),
        }
    }

    fn record(&mut self, result: ProbeResult) {
        if result.reachable {
            self.reachable_by_group
                .entry(result.group_key.clone())
                .or_default()
                .push(result.address());
        }
        self.results.push(result);
    }

    pub fn reachable_count(&self) -> usize {
        self.results.iter().filter(|r| r.reachable).count()
    }

    pub fn unreachable_count(&self) -> usize {
        self.results.len() - self.reachable_count()
    }
}

pub type ResultCallback = Box<dyn Fn(&ProbeResult) + Send + Sync>;

pub struct ProbeCoordinator<P> {
    prober: Arc<P>,
    timeout: Duration,
    max_concurrency: usize,
    on_result: Option<ResultCallback>,
}

impl<P: Prober> ProbeCoordinator<P> {
    pub fn new(prober: P, timeout: Duration, max_concurrency: usize) -> Self {
        Self {
            prober: Arc::new(prober),
            timeout,
            max_concurrency: max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
            on_result: None,
        }
    }

    /// Called once per finished probe, from the collecting task.
    pub fn on_result(mut self, callback: ResultCallback) -> Self {
        self.on_result = Some(callback);
        self
    }

    /// Probes every entry and waits for all of them.
    pub async fn run(&self, entries: GroupedEntries) -> ProbeRun {
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<ProbeResult> = JoinSet::new();
        let mut pending: HashMap<task::Id, HostEntry> = HashMap::with_capacity(entries.len());

        for entry in entries {
            let prober = Arc::clone(&self.prober);
            let permits = Arc::clone(&permits);
            let timeout = self.timeout;
            let task_entry = entry.clone();

            let handle = tasks.spawn(async move {
                // The semaphore is never closed, so this only waits.
                let _permit = permits.acquire_owned().await;
                let outcome = prober
                    .probe(&task_entry.hostname, task_entry.port, timeout)
                    .await;
                ProbeResult::new(&task_entry, outcome)
            });
            pending.insert(handle.id(), entry);
        }

        let mut run = ProbeRun::with_capacity(pending.len());

        while let Some(joined) = tasks.join_next_with_id().await {
            let result = match joined {
                Ok((id, result)) => {
                    pending.remove(&id);
                    result
                }
                Err(e) => {
                    let Some(entry) = pending.remove(&e.id()) else {
                        continue;
                    };
                    error!("Probe task for {entry} failed: {e}");
                    let outcome = ProbeOutcome::Unreachable {
                        reason: format!("probe task failed: {e}"),
                    };
                    ProbeResult::new(&entry, outcome)
                }
            };

            debug!(
                "{} {}:{} -> {}",
                result.label,
                result.hostname,
                result.port,
                result.failure_reason.as_deref().unwrap_or("reachable")
            );

            if let Some(callback) = &self.on_result {
                callback(&result);
            }
            run.record(result);
        }

        run
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
