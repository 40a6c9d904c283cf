//! # Report Builder
//!
//! Flattens every probe result into a sorted table for diagnostics.

use std::cmp::Ordering;
use std::io;

use sshcheck_common::probe::{ProbeResult, ProbeStatus};

pub const HEADER: [&str; 5] = ["Agency", "Host", "Port", "Status", "Reason"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub group: String,
    pub host: String,
    pub port: u16,
    pub status: ProbeStatus,
    /// Empty when the host was reachable.
    pub reason: String,
}

impl From<&ProbeResult> for ReportRow {
    fn from(result: &ProbeResult) -> Self {
        Self {
            group: result.group_key.clone(),
            host: result.hostname.clone(),
            port: result.port,
            status: result.status(),
            reason: result.failure_reason.clone().unwrap_or_default(),
        }
    }
}

fn by_group_host_port(a: &ReportRow, b: &ReportRow) -> Ordering {
    a.group
        .cmp(&b.group)
        .then_with(|| a.host.cmp(&b.host))
        .then_with(|| a.port.cmp(&b.port))
}

/// One row per probed entry, sorted by group, host, then port.
#[derive(Debug, Clone, Default)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn build(results: &[ProbeResult]) -> Self {
        let mut rows: Vec<ReportRow> = results.iter().map(ReportRow::from).collect();
        rows.sort_by(by_group_host_port);
        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows
            .iter()
            .filter(|row| row.status == ProbeStatus::Unreachable)
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER)?;

        for row in &self.rows {
            let port = row.port.to_string();
            let status = row.status.to_string();
            wtr.write_record([
                row.group.as_str(),
                row.host.as_str(),
                port.as_str(),
                status.as_str(),
                row.reason.as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}
