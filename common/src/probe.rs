use std::fmt;

use crate::host::HostEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProbeStatus {
    Reachable,
    Unreachable,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Reachable => f.write_str("Reachable"),
            ProbeStatus::Unreachable => f.write_str("Unreachable"),
        }
    }
}

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The listener sent an SSH identification line.
    Reachable { banner: String },
    Unreachable { reason: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

/// The recorded result for one host entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub group_key: String,
    pub label: String,
    pub hostname: String,
    pub port: u16,
    pub reachable: bool,
    pub failure_reason: Option<String>,
    /// The server identification string, when one was received.
    pub banner: Option<String>,
}

impl ProbeResult {
    pub fn new(entry: &HostEntry, outcome: ProbeOutcome) -> Self {
        let (reachable, failure_reason, banner) = match outcome {
            ProbeOutcome::Reachable { banner } => (true, None, Some(banner)),
            ProbeOutcome::Unreachable { reason } => (false, Some(reason), None),
        };

        Self {
            group_key: entry.group_key.clone(),
            label: entry.label.clone(),
            hostname: entry.hostname.clone(),
            port: entry.port,
            reachable,
            failure_reason,
            banner,
        }
    }

    pub fn status(&self) -> ProbeStatus {
        if self.reachable {
            ProbeStatus::Reachable
        } else {
            ProbeStatus::Unreachable
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}
