use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use sshcheck_common::error::ConfigError;
use sshcheck_common::host::GroupedEntries;
use sshcheck_common::probe::ProbeStatus;
use sshcheck_core::artifacts;
use sshcheck_core::inventory::Inventory;
use sshcheck_core::prober::{ProbeCoordinator, ProbeRun, SshProber};
use sshcheck_core::report::Report;
use sshcheck_core::ssh_config;

use crate::responder::{self, Behaviour};

const TIMEOUT: Duration = Duration::from_secs(3);

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config");
    fs::write(&path, contents).unwrap();
    path
}

async fn probe(entries: GroupedEntries, max_concurrency: usize) -> ProbeRun {
    ProbeCoordinator::new(SshProber, TIMEOUT, max_concurrency)
        .run(entries)
        .await
}

/// Two hosts in one group, one answering SSH and one refusing connections.
#[tokio::test]
async fn one_reachable_one_unreachable_in_same_group() {
    let ssh = responder::spawn(Behaviour::Ssh).await.unwrap();
    let closed = responder::closed_port().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "Host A_1\n  HostName 127.0.0.1\n  Port {}\n\nHost A_2\n  HostName 127.0.0.2\n  Port {}\n",
            ssh.port, closed
        ),
    );

    let entries = ssh_config::parse_file(&config, '_').unwrap();
    assert_eq!(entries.len(), 2);

    let run = probe(entries, 8).await;
    let h1 = format!("127.0.0.1:{}", ssh.port);

    assert_eq!(run.reachable_by_group.get("A"), Some(&vec![h1.clone()]));

    let inventory = Inventory::build(&run.reachable_by_group);
    assert_eq!(inventory.get("A"), Some(h1.as_str()));

    let report = Report::build(&run.results);
    let rows = report.rows();
    assert_eq!(rows.len(), 2);

    assert_eq!(
        (rows[0].group.as_str(), rows[0].host.as_str(), rows[0].port),
        ("A", "127.0.0.1", ssh.port)
    );
    assert_eq!(rows[0].status, ProbeStatus::Reachable);
    assert_eq!(rows[0].reason, "");

    assert_eq!(
        (rows[1].group.as_str(), rows[1].host.as_str(), rows[1].port),
        ("A", "127.0.0.2", closed)
    );
    assert_eq!(rows[1].status, ProbeStatus::Unreachable);
    assert!(!rows[1].reason.is_empty());
}

#[tokio::test]
async fn artifacts_are_written_for_a_full_run() {
    let ssh = responder::spawn(Behaviour::Ssh).await.unwrap();
    let http = responder::spawn(Behaviour::Http).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "Host web_1\n  HostName 127.0.0.1\n  Port {ssh}\n\
             Host web_2\n  HostName 127.0.0.1\n  Port {http}\n\
             Host db_1\n  HostName 127.0.0.1\n  Port {http}\n",
            ssh = ssh.port,
            http = http.port
        ),
    );

    let run = probe(ssh_config::parse_file(&config, '_').unwrap(), 4).await;
    let inventory = Inventory::build(&run.reachable_by_group);
    let report = Report::build(&run.results);

    let run_dir = artifacts::prepare_run_dir(&dir.path().join("ssh_logs"), 2).unwrap();
    let inventory_path = artifacts::write_inventory(&run_dir, &inventory, &[]).unwrap();
    let report_path = artifacts::write_report(&run_dir, &report).unwrap();

    assert_eq!(
        fs::read_to_string(inventory_path).unwrap(),
        format!("[all:vars]\n\n[web]\n127.0.0.1:{}\n\n", ssh.port)
    );

    let csv = fs::read_to_string(report_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Agency,Host,Port,Status,Reason");
    assert!(lines[1].starts_with("db,127.0.0.1,"));
    assert!(lines[1].contains("Unreachable"));
    assert!(lines[1].contains("not an SSH server"));
}

#[test]
fn config_without_hosts_yields_no_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "# nothing here\nUser admin\nHost *\n  Port 2222\n");

    let entries = ssh_config::parse_file(&config, '_').unwrap();
    assert!(entries.is_empty());
}

#[test]
fn missing_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let result = ssh_config::parse_file(&dir.path().join("absent"), '_');
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

/// 200 entries probed at once against responders with random latency.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_200_hosts_against_mock_responders() {
    let ssh = responder::spawn(Behaviour::Ssh).await.unwrap();
    let http = responder::spawn(Behaviour::Http).await.unwrap();

    let config: String = (0..200)
        .map(|i| {
            let port = if i % 4 == 0 { http.port } else { ssh.port };
            format!("Host g{}_{i}\n  HostName 127.0.0.1\n  Port {port}\n", i % 10)
        })
        .collect();
    let entries = ssh_config::parse(&config, '_');
    assert_eq!(entries.len(), 200);

    let run = probe(entries, 200).await;

    assert_eq!(run.results.len(), 200);
    assert_eq!(run.reachable_count() + run.unreachable_count(), 200);
    assert_eq!(run.unreachable_count(), 50);

    let labels: HashSet<&str> = run.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels.len(), 200);

    let listed: usize = run.reachable_by_group.values().map(Vec::len).sum();
    assert_eq!(listed, 150);

    let inventory = Inventory::build(&run.reachable_by_group);
    assert_eq!(inventory.len(), 10);
    assert_eq!(Report::build(&run.results).len(), 200);
}

#[tokio::test]
async fn repeated_runs_classify_hosts_the_same() {
    let ssh = responder::spawn(Behaviour::Ssh).await.unwrap();
    let http = responder::spawn(Behaviour::Http).await.unwrap();
    let closed = responder::closed_port().await.unwrap();

    let config = format!(
        "Host a_1\nHostName 127.0.0.1\nPort {}\n\
         Host a_2\nHostName 127.0.0.1\nPort {}\n\
         Host b_1\nHostName 127.0.0.1\nPort {}\n",
        ssh.port, http.port, closed
    );

    let classify = |run: &ProbeRun| -> HashMap<String, bool> {
        run.results
            .iter()
            .map(|r| (r.label.clone(), r.reachable))
            .collect()
    };

    let first = probe(ssh_config::parse(&config, '_'), 8).await;
    let second = probe(ssh_config::parse(&config, '_'), 8).await;

    assert_eq!(classify(&first), classify(&second));
    assert_eq!(
        Inventory::build(&first.reachable_by_group),
        Inventory::build(&second.reachable_by_group)
    );
}

#[tokio::test]
async fn silent_listener_times_out_without_blocking_others() {
    let ssh = responder::spawn(Behaviour::Ssh).await.unwrap();
    let silent = responder::spawn(Behaviour::Silent).await.unwrap();

    let config = format!(
        "Host a_1\nHostName 127.0.0.1\nPort {}\nHost a_2\nHostName 127.0.0.1\nPort {}\n",
        ssh.port, silent.port
    );

    let run = ProbeCoordinator::new(SshProber, Duration::from_millis(500), 2)
        .run(ssh_config::parse(&config, '_'))
        .await;

    let timed_out = run.results.iter().find(|r| r.label == "a_2").unwrap();
    assert!(!timed_out.reachable);
    assert!(timed_out.failure_reason.as_deref().unwrap().starts_with("timed out"));
    assert_eq!(run.reachable_count(), 1);
}
