pub mod check;
pub mod list;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use sshcheck_common::config::{
    self, Config, DEFAULT_MAX_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_RETENTION_DAYS,
    DEFAULT_TIMEOUT, InventoryVar,
};
use sshcheck_common::host::DEFAULT_GROUP_SEPARATOR;

#[derive(Parser)]
#[command(name = "sshcheck")]
#[command(version)]
#[command(about = "Finds one reachable SSH host per group and writes an Ansible inventory.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// ssh config file to read hosts from [default: ~/.ssh/config]
    #[arg(short = 'F', long = "config", env = "SSHCHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Character that separates the group from the rest of a host label
    #[arg(long, default_value_t = DEFAULT_GROUP_SEPARATOR, global = true)]
    pub separator: char,

    /// Show more detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Show less output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every configured host, then write the inventory and report
    #[command(alias = "c")]
    Check(CheckArgs),
    /// Show the configured hosts by group without probing them
    #[command(alias = "l")]
    List,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Directory that receives one timestamped folder per run
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Seconds to wait for each host to identify itself
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_secs(),
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Maximum number of hosts probed at the same time
    #[arg(short, long, default_value_t = DEFAULT_MAX_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Delete run folders older than this many days
    #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
    pub retention_days: u32,

    /// Extra inventory variable, may be repeated
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<InventoryVar>,

    /// Written to the inventory as ansible_ssh_user
    #[arg(long, env = "SSHCHECK_ANSIBLE_USER")]
    pub ansible_user: Option<String>,

    /// Written to the inventory as ansible_ssh_password and ansible_become_pass
    #[arg(long, env = "SSHCHECK_ANSIBLE_PASSWORD", hide_env_values = true)]
    pub ansible_password: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> anyhow::Result<Config> {
        let ssh_config: PathBuf = match &self.config {
            Some(path) => path.clone(),
            None => config::default_ssh_config_path().ok_or_else(|| {
                anyhow::anyhow!("could not determine the home directory, pass --config")
            })?,
        };

        let mut cfg = Config::new(ssh_config);
        cfg.separator = self.separator;
        cfg.quiet = self.quiet;

        if let Commands::Check(args) = &self.command {
            cfg.output_dir = args.output_dir.clone();
            cfg.timeout = std::time::Duration::from_secs(args.timeout);
            cfg.max_concurrency = args.concurrency;
            cfg.retention_days = args.retention_days;
            cfg.inventory_vars = config::default_inventory_vars(
                args.ansible_user.as_deref(),
                args.ansible_password.as_deref(),
            );
            cfg.inventory_vars.extend(args.vars.iter().cloned());
        }

        Ok(cfg)
    }
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{s}' is not a positive number")),
    }
}
