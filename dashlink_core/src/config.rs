/// Configuration file support for dashlink
///
/// Transport, scheduler and layout settings can come from a TOML or YAML file.
/// The format is auto-detected from the extension; unknown extensions try both.
use crate::error::{DashError, DashResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default multicast group shared with the remote control loop
pub const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(239, 192, 168, 11);
/// Default port inbound datagrams arrive on
pub const DEFAULT_LOCAL_PORT: u16 = 11077;
/// Default port outbound datagrams are sent to
pub const DEFAULT_DEST_PORT: u16 = 11088;
/// Default sync rate (16 ms period)
pub const DEFAULT_RATE_HZ: f64 = 62.5;
/// Default layout artifact path
pub const DEFAULT_LAYOUT_PATH: &str = "memoryLayout.json";

/// File names tried by [`DashConfig::discover`], in order
const SEARCH_PATHS: &[&str] = &["dashlink.toml", "dashlink.yaml", "dashlink.yml"];

/// Multicast transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Multicast group joined for receiving and used as send destination
    pub group: Ipv4Addr,

    /// Port inbound datagrams are received on
    pub local_port: u16,

    /// Port outbound datagrams are sent to
    pub dest_port: u16,

    /// Multicast TTL for outbound datagrams
    pub multicast_ttl: u32,

    /// Interface address used to join the group and send (0.0.0.0 = any)
    pub interface: Ipv4Addr,

    /// How often a blocked receive wakes up to observe a stop request
    pub poll_interval_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP,
            local_port: DEFAULT_LOCAL_PORT,
            dest_port: DEFAULT_DEST_PORT,
            multicast_ttl: 1,
            interface: Ipv4Addr::UNSPECIFIED,
            poll_interval_ms: 50,
        }
    }
}

impl TransportConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn validate(&self) -> DashResult<()> {
        if !self.group.is_multicast() {
            return Err(DashError::config(format!(
                "group {} is not an IPv4 multicast address",
                self.group
            )));
        }
        if self.local_port == 0 {
            return Err(DashError::config("local_port must be non-zero"));
        }
        if self.dest_port == 0 {
            return Err(DashError::config("dest_port must be non-zero"));
        }
        Ok(())
    }
}

/// Sync scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ticks per second
    pub rate_hz: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_RATE_HZ,
        }
    }
}

impl SchedulerConfig {
    pub fn with_rate(rate_hz: f64) -> Self {
        Self { rate_hz }
    }

    /// Tick period derived from `rate_hz`
    pub fn period(&self) -> Duration {
        Duration::from_nanos((1e9 / self.rate_hz).round() as u64)
    }

    pub fn validate(&self) -> DashResult<()> {
        if !self.rate_hz.is_finite() || self.rate_hz <= 0.0 {
            return Err(DashError::config(format!(
                "rate_hz must be a positive number, got {}",
                self.rate_hz
            )));
        }
        Ok(())
    }
}

/// Layout artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Write the layout file at startup
    pub enabled: bool,

    /// Where to write it
    pub path: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_LAYOUT_PATH),
        }
    }
}

/// Full dashlink configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub transport: TransportConfig,
    pub scheduler: SchedulerConfig,
    pub layout: LayoutConfig,
}

impl DashConfig {
    /// Load config from a file (auto-detect format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let config: Self = load_document(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML string
    pub fn from_toml(contents: &str) -> DashResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from YAML string
    pub fn from_yaml(contents: &str) -> DashResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load config from the working directory.
    ///
    /// Search order: `./dashlink.toml`, `./dashlink.yaml`, `./dashlink.yml`.
    /// Falls back to defaults when none exists.
    pub fn discover() -> DashResult<Self> {
        match find_config_file(Path::new(".")) {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> DashResult<()> {
        self.transport.validate()?;
        self.scheduler.validate()
    }
}

/// First existing config file under `dir`, following the search order
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    SEARCH_PATHS
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Read and deserialize a TOML or YAML document.
///
/// Used for [`DashConfig`] and for documents that embed it (dashboard files).
pub fn load_document<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> DashResult<T> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        DashError::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => Ok(toml::from_str(&contents)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&contents)?),
        _ => toml::from_str(&contents)
            .or_else(|_| serde_yaml::from_str(&contents))
            .map_err(|e| {
                DashError::config(format!(
                    "{} is neither valid TOML nor YAML: {}",
                    path.display(),
                    e
                ))
            }),
    }
}
