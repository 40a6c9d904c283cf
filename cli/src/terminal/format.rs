use colored::*;
use sshcheck_common::host::HostEntry;
use sshcheck_core::report::ReportRow;

use crate::terminal::colors;

type Detail = (String, ColoredString);

pub fn entry_to_detail(entry: &HostEntry) -> Detail {
    let value = entry.address().color(colors::TEXT_DEFAULT);
    (entry.label.clone(), value)
}

pub fn selection_to_detail(group: &str, selected: Option<&str>) -> Detail {
    let value = match selected {
        Some(address) => address.color(colors::REACHABLE),
        None => "no reachable host".color(colors::UNREACHABLE).italic(),
    };
    (group.to_string(), value)
}

pub fn failure_to_detail(row: &ReportRow) -> Detail {
    let key = format!("{}:{}", row.host, row.port);
    (key, row.reason.color(colors::UNREACHABLE))
}
