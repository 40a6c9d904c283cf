//! # Inventory Builder
//!
//! Picks one reachable host per group and renders the Ansible inventory.
//!
//! Within a group the lexicographically smallest `hostname:port` wins, so the
//! same set of reachable hosts always yields the same inventory regardless of
//! which probe finished first. Groups without a reachable host are left out.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use sshcheck_common::config::InventoryVar;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    selected: BTreeMap<String, String>,
}

impl Inventory {
    pub fn build(reachable_by_group: &HashMap<String, Vec<String>>) -> Self {
        let selected = reachable_by_group
            .iter()
            .filter_map(|(group, hosts)| {
                hosts
                    .iter()
                    .min()
                    .map(|host| (group.clone(), host.clone()))
            })
            .collect();

        Self { selected }
    }

    pub fn get(&self, group_key: &str) -> Option<&str> {
        self.selected.get(group_key).map(String::as_str)
    }

    /// Selected hosts ordered by group key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selected.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Renders the INI inventory: `[all:vars]` first, then one section per group.
    pub fn render(&self, vars: &[InventoryVar]) -> String {
        let mut out = String::from("[all:vars]\n");
        for var in vars {
            let _ = writeln!(out, "{var}");
        }
        out.push('\n');

        for (group, host) in self.iter() {
            let _ = writeln!(out, "[{group}]\n{host}\n");
        }
        out
    }
}
