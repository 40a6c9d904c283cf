use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::host::DEFAULT_GROUP_SEPARATOR;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;
pub const DEFAULT_RETENTION_DAYS: u32 = 2;
pub const DEFAULT_OUTPUT_DIR: &str = "ssh_logs";

pub struct Config {
    /// The ssh config file to read hosts from.
    pub ssh_config: PathBuf,
    /// Each run creates a timestamped directory below this one.
    pub output_dir: PathBuf,
    /// Upper bound for connecting and exchanging identification strings.
    pub timeout: Duration,
    /// Maximum number of probes in flight at once.
    pub max_concurrency: usize,
    /// Run directories older than this many days are removed.
    pub retention_days: u32,
    pub separator: char,
    /// Written to the `[all:vars]` section of the inventory.
    pub inventory_vars: Vec<InventoryVar>,
    pub quiet: u8,
}

impl Config {
    pub fn new(ssh_config: PathBuf) -> Self {
        Self {
            ssh_config,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retention_days: DEFAULT_RETENTION_DAYS,
            separator: DEFAULT_GROUP_SEPARATOR,
            inventory_vars: default_inventory_vars(None, None),
            quiet: 0,
        }
    }
}

/// Returns `~/.ssh/config` for the current user, if a home directory is known.
pub fn default_ssh_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".ssh").join("config"))
}

/// A `key=value` line in the inventory preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryVar {
    pub key: String,
    pub value: String,
}

impl InventoryVar {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl FromStr for InventoryVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self::new(key.trim(), value)),
            _ => Err(format!("invalid variable '{s}', expected KEY=VALUE")),
        }
    }
}

impl fmt::Display for InventoryVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The deployment variables every inventory starts with.
///
/// Credentials are only emitted when supplied by the caller.
pub fn default_inventory_vars(user: Option<&str>, password: Option<&str>) -> Vec<InventoryVar> {
    let mut vars = vec![
        InventoryVar::new("ansible_ssh_common_args", "'-o StrictHostKeyChecking=no'"),
        InventoryVar::new("ansible_python_interpreter", "/usr/bin/python3"),
    ];

    if let Some(user) = user {
        vars.push(InventoryVar::new("ansible_ssh_user", user));
    }

    if let Some(password) = password {
        let quoted = format!("'{password}'");
        vars.push(InventoryVar::new("ansible_ssh_password", &quoted));
        vars.push(InventoryVar::new("ansible_become_pass", &quoted));
    }

    vars
}
