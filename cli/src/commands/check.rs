use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::*;
use tracing::Instrument;

use crate::mprint;
use crate::terminal::{colors, format, print, progress};
use sshcheck_common::config::Config;
use sshcheck_common::host::GroupedEntries;
use sshcheck_common::{error, info, success, warn};
use sshcheck_core::artifacts;
use sshcheck_core::inventory::Inventory;
use sshcheck_core::prober::{ProbeCoordinator, ProbeRun, SshProber};
use sshcheck_core::report::Report;
use sshcheck_core::ssh_config;

pub async fn check(cfg: &Config) -> anyhow::Result<()> {
    let entries: GroupedEntries = ssh_config::parse_file(&cfg.ssh_config, cfg.separator)?;

    if entries.is_empty() {
        warn!("No valid hosts found in {}", cfg.ssh_config.display());
        print::header("zero hosts configured", cfg.quiet);
        print::no_results();
        return Ok(());
    }

    info!(
        "Loaded {} hosts in {} groups from {}",
        entries.len(),
        entries.group_count(),
        cfg.ssh_config.display()
    );

    let groups: Vec<String> = entries
        .sorted()
        .into_iter()
        .map(|(group, _)| group.to_string())
        .collect();

    let start_time: Instant = Instant::now();
    let run: ProbeRun = probe_all(entries, cfg).await?;

    let inventory = Inventory::build(&run.reachable_by_group);
    let report = Report::build(&run.results);

    check_ends(&groups, &inventory, &report, cfg);
    print_summary(&run, start_time.elapsed(), cfg);

    write_artifacts(cfg, &inventory, &report)
}

async fn probe_all(entries: GroupedEntries, cfg: &Config) -> anyhow::Result<ProbeRun> {
    let span = progress::probe_span(entries.len())?;
    let progress_span = span.clone();

    let coordinator = ProbeCoordinator::new(SshProber, cfg.timeout, cfg.max_concurrency)
        .on_result(Box::new(move |_| progress::advance(&progress_span)));

    Ok(coordinator.run(entries).instrument(span).await)
}

fn check_ends(groups: &[String], inventory: &Inventory, report: &Report, cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }

    print::header("inventory", cfg.quiet);
    let details: Vec<_> = groups
        .iter()
        .map(|group| format::selection_to_detail(group, inventory.get(group)))
        .collect();
    print::as_tree_one_level(&details);

    let failures: Vec<_> = report.unreachable().map(format::failure_to_detail).collect();
    if failures.is_empty() || cfg.quiet > 0 {
        return;
    }

    mprint!();
    print::header("unreachable hosts", cfg.quiet);
    print::as_tree_one_level(&failures);
}

fn print_summary(run: &ProbeRun, total_time: Duration, cfg: &Config) {
    let reachable: ColoredString = format!("{} reachable", run.reachable_count()).bold().green();
    let unreachable: ColoredString = format!("{} unreachable", run.unreachable_count()).bold().red();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString =
        &format!("Check Complete: {reachable}, {unreachable} in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}

fn write_artifacts(cfg: &Config, inventory: &Inventory, report: &Report) -> anyhow::Result<()> {
    let run_dir: PathBuf = artifacts::prepare_run_dir(&cfg.output_dir, cfg.retention_days)?;
    write_into(&run_dir, cfg, inventory, report)
}

/// Writes both artifacts. A failure in one does not stop the other.
fn write_into(run_dir: &Path, cfg: &Config, inventory: &Inventory, report: &Report) -> anyhow::Result<()> {
    let mut failures: usize = 0;

    match artifacts::write_inventory(run_dir, inventory, &cfg.inventory_vars) {
        Ok(path) => success!("Ansible inventory saved to {}", path.display()),
        Err(e) => {
            error!("{e}");
            failures += 1;
        }
    }

    match artifacts::write_report(run_dir, report) {
        Ok(path) => success!("SSH check results exported to {}", path.display()),
        Err(e) => {
            error!("{e}");
            failures += 1;
        }
    }

    anyhow::ensure!(failures == 0, "{failures} of 2 artifacts could not be written");
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
