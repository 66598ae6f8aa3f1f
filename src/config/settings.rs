use crate::core::proof_of_work::{WorkThreshold, DEFAULT_WORK_THRESHOLD};
use crate::error::{LedgerError, Result};
use crate::network::message::{Network, Protocol};
use crate::network::peers::{to_ipv6_peer, DEFAULT_MAX_PEERS};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::{SocketAddr, SocketAddrV6};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

const DEFAULT_BIND_ADDRESS: &str = "[::]:7075";

pub const CONFIG_PATH_KEY: &str = "LATTICE_CONFIG";
pub const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
pub const NETWORK_KEY: &str = "LATTICE_NETWORK";
pub const DATA_DIR_KEY: &str = "LATTICE_DATA_DIR";

/// Live network peers a fresh node starts from
const PRECONFIGURED_PEERS: [&str; 9] = [
    "[::ffff:192.99.176.122]:7075",
    "[::ffff:139.162.199.142]:7075",
    "[::ffff:144.217.167.119]:7075",
    "[::ffff:192.95.57.248]:7075",
    "[::ffff:192.99.176.121]:7075",
    "[::ffff:138.68.2.234]:7075",
    "[::ffff:138.201.94.249]:7075",
    "[::ffff:45.32.246.108]:7075",
    "[::ffff:128.199.199.97]:7075",
];

/// Node settings, read from TOML. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub network: Network,
    pub version_max: u8,
    pub version_using: u8,
    pub version_min: u8,
    pub keepalive_interval_secs: u64,
    pub max_broadcast_peers: usize,
    /// Cap on the known-peer set
    pub max_peers: usize,
    pub preconfigured_peers: Vec<String>,
    pub data_dir: PathBuf,
    /// Hex, e.g. "FFFFFFC000000000"
    pub work_threshold: String,
}

impl Default for Settings {
    fn default() -> Self {
        let protocol = Protocol::default();
        Settings {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            network: protocol.network,
            version_max: protocol.version_max,
            version_using: protocol.version_using,
            version_min: protocol.version_min,
            keepalive_interval_secs: 30,
            max_broadcast_peers: 40,
            max_peers: DEFAULT_MAX_PEERS,
            preconfigured_peers: PRECONFIGURED_PEERS.iter().map(|p| p.to_string()).collect(),
            data_dir: PathBuf::from("./data"),
            work_threshold: format!("{DEFAULT_WORK_THRESHOLD:016X}"),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the node cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.keepalive_interval_secs == 0 {
            return Err(LedgerError::Config(
                "keepalive_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.max_peers == 0 {
            return Err(LedgerError::Config("max_peers must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// File from `path` or `LATTICE_CONFIG` if either is set, defaults
    /// otherwise, then environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let from_env = env::var(CONFIG_PATH_KEY).ok().map(PathBuf::from);
        let mut settings = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                info!("Loading settings from {}", path.display());
                Self::from_file(&path)?
            }
            None => Settings::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `NODE_ADDRESS`, `LATTICE_NETWORK` and `LATTICE_DATA_DIR`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(NODE_ADDRESS_KEY) {
            self.bind_address = addr;
        }
        if let Some(network) = lookup(NETWORK_KEY) {
            self.network = network.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_KEY) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn protocol(&self) -> Protocol {
        Protocol {
            network: self.network,
            version_max: self.version_max,
            version_using: self.version_using,
            version_min: self.version_min,
        }
    }

    pub fn threshold(&self) -> Result<WorkThreshold> {
        WorkThreshold::from_hex(&self.work_threshold)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            LedgerError::Config(format!("Invalid bind address {}: {e}", self.bind_address))
        })
    }

    /// Unparseable entries are skipped with a warning
    pub fn peers(&self) -> Vec<SocketAddrV6> {
        self.preconfigured_peers
            .iter()
            .filter_map(|peer| match peer.parse::<SocketAddr>() {
                Ok(addr) => Some(to_ipv6_peer(addr)),
                Err(e) => {
                    warn!("Ignoring preconfigured peer {peer}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.network.to_string())
    }
}

/// Process-wide settings behind a lock
pub struct Config {
    inner: RwLock<Settings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Defaults plus environment overrides; a bad override is logged and skipped
    pub fn new() -> Config {
        let mut settings = Settings::default();
        if let Err(e) = settings.apply_overrides(|key| env::var(key).ok()) {
            warn!("Ignoring environment settings: {e}");
        }
        Config {
            inner: RwLock::new(settings),
        }
    }

    pub fn settings(&self) -> Settings {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.clone()
    }

    pub fn replace(&self, settings: Settings) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *inner = settings;
    }
}
