use sshcheck_common::config::Config;
use sshcheck_common::host::GroupedEntries;
use sshcheck_common::success;
use sshcheck_core::ssh_config;

use crate::mprint;
use crate::terminal::{format, print};

pub fn list(cfg: &Config) -> anyhow::Result<()> {
    let entries: GroupedEntries = ssh_config::parse_file(&cfg.ssh_config, cfg.separator)?;

    if entries.is_empty() {
        print::header("zero hosts configured", cfg.quiet);
        print::no_results();
        return Ok(());
    }

    let groups = entries.sorted();
    for (idx, (group, hosts)) in groups.iter().enumerate() {
        print::tree_head(idx, group);
        let details: Vec<_> = hosts.iter().map(format::entry_to_detail).collect();
        print::as_tree_one_level(&details);
        if idx + 1 != groups.len() {
            mprint!();
        }
    }

    success!(
        "{} hosts in {} groups",
        entries.len(),
        entries.group_count()
    );
    Ok(())
}
