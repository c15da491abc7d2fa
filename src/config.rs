/// Thing configuration loader - parses things.toml
///
/// Each `[[thing]]` entry is one location to watch. Keeping them in a file
/// means a new town can be added without recompiling the service.
///
/// ```toml
/// [[thing]]
/// id = "home"
/// location = "smartwater:hamilton"
/// refresh_interval = 5   # hours
/// ```
///
/// Only an unreadable or malformed file fails the load. A bad entry is
/// reported against its own thing by `ThingConfig::validate`.

use crate::handler::{DEFAULT_REFRESH_HOURS, MAX_REFRESH_HOURS};
use crate::model::WaterAlertError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file used when neither `--config` nor `NZWATER_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "things.toml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "NZWATER_CONFIG";

pub const MSG_NO_LOCATION: &str = "No location configured";

/// One configured location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThingConfig {
    /// Unique name, used in logs and on the status endpoint.
    pub id: String,

    /// `"<service>:<region>[:<area>]"`
    #[serde(default)]
    pub location: String,

    /// Hours between successful polls.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_HOURS
}

impl ThingConfig {
    /// Checks the settings of this one thing.
    ///
    /// # Errors
    /// `WaterAlertError::Configuration` with a user-facing message when the
    /// location is missing or the refresh interval is out of range.
    pub fn validate(&self) -> Result<(), WaterAlertError> {
        if self.location.trim().is_empty() {
            return Err(WaterAlertError::Configuration(MSG_NO_LOCATION.to_string()));
        }
        if !(1..=MAX_REFRESH_HOURS).contains(&self.refresh_interval) {
            return Err(WaterAlertError::Configuration(format!(
                "refresh_interval must be between 1 and {} hours",
                MAX_REFRESH_HOURS
            )));
        }
        Ok(())
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Deserialize)]
struct ThingRegistry {
    #[serde(default)]
    thing: Vec<ThingConfig>,
}

/// Picks the config path: explicit argument, then `NZWATER_CONFIG`, then
/// `things.toml` in the working directory.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the thing list from a file.
///
/// # Errors
/// `WaterAlertError::Configuration` if the file cannot be read or is not
/// valid TOML.
pub fn load_config(path: &Path) -> Result<Vec<ThingConfig>, WaterAlertError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        WaterAlertError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents).map_err(|e| match e {
        WaterAlertError::Configuration(msg) => {
            WaterAlertError::Configuration(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parses TOML config text.
///
/// Entries without an id are dropped, and a repeated id keeps its first
/// entry. Per-thing settings are left for `ThingConfig::validate`.
pub fn parse_config(contents: &str) -> Result<Vec<ThingConfig>, WaterAlertError> {
    let registry: ThingRegistry = toml::from_str(contents)
        .map_err(|e| WaterAlertError::Configuration(format!("Failed to parse: {}", e)))?;

    if registry.thing.is_empty() {
        warn!("No [[thing]] entries configured");
    }

    let mut seen = HashSet::new();
    let mut things = Vec::with_capacity(registry.thing.len());
    for thing in registry.thing {
        if thing.id.trim().is_empty() {
            warn!(location = %thing.location, "Skipping thing with an empty id");
            continue;
        }
        if !seen.insert(thing.id.clone()) {
            warn!(thing = %thing.id, "Skipping duplicate thing id");
            continue;
        }
        things.push(thing);
    }

    Ok(things)
}
