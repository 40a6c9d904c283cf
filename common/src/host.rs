//! # Host Entry Model
//!
//! A [`HostEntry`] is one concrete host declared in an ssh config file.
//! Entries are bucketed by a group key derived from their label, e.g.
//! `acme_web01` and `acme_db01` both belong to the `acme` group.

use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_GROUP_SEPARATOR: char = '_';

/// Returns the group a host label belongs to.
///
/// The group is everything before the first `separator`, or the whole label
/// when the separator does not occur.
pub fn group_key(label: &str, separator: char) -> &str {
    label
        .split_once(separator)
        .map_or(label, |(prefix, _)| prefix)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    pub group_key: String,
    pub label: String,
    pub hostname: String,
    pub port: u16,
}

impl HostEntry {
    /// Creates an entry that connects to the label itself on port 22.
    pub fn new(label: &str, separator: char) -> Self {
        Self {
            group_key: group_key(label, separator).to_string(),
            label: label.to_string(),
            hostname: label.to_string(),
            port: DEFAULT_SSH_PORT,
        }
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The `hostname:port` form used by the inventory.
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.label, self.hostname, self.port)
    }
}

/// Host entries bucketed by group key.
///
/// Entries keep the order they were declared in within their group. Groups
/// themselves are unordered; use [`GroupedEntries::sorted`] when output order
/// matters.
#[derive(Debug, Clone, Default)]
pub struct GroupedEntries {
    groups: HashMap<String, Vec<HostEntry>>,
    len: usize,
}

impl GroupedEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HostEntry) {
        self.groups
            .entry(entry.group_key.clone())
            .or_default()
            .push(entry);
        self.len += 1;
    }

    /// Total number of entries across all groups.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, group_key: &str) -> Option<&[HostEntry]> {
        self.groups.get(group_key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HostEntry])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Groups ordered by key.
    pub fn sorted(&self) -> Vec<(&str, &[HostEntry])> {
        let mut groups: Vec<(&str, &[HostEntry])> = self.iter().collect();
        groups.sort_unstable_by_key(|(key, _)| *key);
        groups
    }

    pub fn entries(&self) -> impl Iterator<Item = &HostEntry> {
        self.groups.values().flatten()
    }
}

impl IntoIterator for GroupedEntries {
    type Item = HostEntry;
    type IntoIter = std::iter::Flatten<std::collections::hash_map::IntoValues<String, Vec<HostEntry>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_values().flatten()
    }
}

impl FromIterator<HostEntry> for GroupedEntries {
    fn from_iter<I: IntoIterator<Item = HostEntry>>(iter: I) -> Self {
        let mut grouped = Self::new();
        for entry in iter {
            grouped.push(entry);
        }
        grouped
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
