//! Device configuration – reads/writes `cadence.toml`.

use cadence_types::{CadenceError, MacAddress};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid mac_address: {0}")]
    Mac(#[from] CadenceError),
}

/// Settings for one hosted device run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base device name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Append `-<last six MAC hex digits>` to the name.
    #[serde(default)]
    pub name_add_mac_suffix: bool,

    /// MAC address reported by the host board.
    #[serde(default = "default_mac_address")]
    pub mac_address: String,

    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u32,

    /// Starvation threshold of the software watchdog.
    #[serde(default = "default_watchdog_timeout_ms")]
    pub watchdog_timeout_ms: u64,

    /// Stop after this many ticks.  Runs until Ctrl-C when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,

    /// Publish period of the uptime sensor.
    #[serde(default = "default_uptime_update_interval_ms")]
    pub uptime_update_interval_ms: u32,
}

fn default_name() -> String {
    "cadence".to_string()
}
fn default_mac_address() -> String {
    "02:00:00:00:00:01".to_string()
}
fn default_loop_interval_ms() -> u32 {
    cadence_runtime::DEFAULT_LOOP_INTERVAL_MS
}
fn default_watchdog_timeout_ms() -> u64 {
    5000
}
fn default_uptime_update_interval_ms() -> u32 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            name_add_mac_suffix: false,
            mac_address: default_mac_address(),
            loop_interval_ms: default_loop_interval_ms(),
            watchdog_timeout_ms: default_watchdog_timeout_ms(),
            max_ticks: None,
            uptime_update_interval_ms: default_uptime_update_interval_ms(),
        }
    }
}

impl Config {
    /// The configured MAC address, parsed.
    pub fn mac(&self) -> Result<MacAddress, ConfigError> {
        Ok(self.mac_address.parse()?)
    }
}

/// Path given as the first argument, or `./cadence.toml`.
pub fn config_path(arg: Option<String>) -> PathBuf {
    arg.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `CADENCE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CADENCE_NAME` | `name` |
/// | `CADENCE_LOOP_INTERVAL_MS` | `loop_interval_ms` |
/// | `CADENCE_MAX_TICKS` | `max_ticks` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("CADENCE_NAME") {
        cfg.name = v;
    }
    if let Ok(v) = std::env::var("CADENCE_LOOP_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u32>()
    {
        cfg.loop_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("CADENCE_MAX_TICKS")
        && let Ok(ticks) = v.parse::<u64>()
    {
        cfg.max_ticks = Some(ticks);
    }
}

/// Write `cfg` to `path`, creating parent directories.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let raw = toml::to_string_pretty(cfg)?;
    fs::write(path, raw).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Serialises every test that reads or writes `CADENCE_*` variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.loop_interval_ms, 16);
        assert_eq!(cfg.watchdog_timeout_ms, 5000);
        assert!(cfg.max_ticks.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            name = "greenhouse"
            name_add_mac_suffix = true
            max_ticks = 50
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.name, "greenhouse");
        assert!(cfg.name_add_mac_suffix);
        assert_eq!(cfg.max_ticks, Some(50));
        assert_eq!(cfg.uptime_update_interval_ms, 1000);
    }

    #[test]
    fn roundtrip_default_config() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("device").join(DEFAULT_CONFIG_FILE);

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.name, "cadence");
        assert_eq!(loaded.mac_address, "02:00:00:00:00:01");
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join(DEFAULT_CONFIG_FILE)).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "loop_interval_ms = \"fast\"").expect("write");
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn mac_parses_or_reports() {
        let mut cfg = Config::default();
        assert_eq!(cfg.mac().expect("mac").to_hex(), "020000000001");
        cfg.mac_address = "not-a-mac".to_string();
        assert!(matches!(cfg.mac(), Err(ConfigError::Mac(_))));
    }

    #[test]
    fn config_path_defaults_to_working_directory() {
        assert_eq!(config_path(None), PathBuf::from("cadence.toml"));
        assert_eq!(
            config_path(Some("/etc/cadence/device.toml".to_string())),
            PathBuf::from("/etc/cadence/device.toml")
        );
    }

    #[test]
    fn apply_env_overrides_changes_name() {
        let _env = env_lock();
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::set_var("CADENCE_NAME", "porch-light") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.name, "porch-light");
        unsafe { std::env::remove_var("CADENCE_NAME") };
    }

    #[test]
    fn apply_env_overrides_changes_loop_interval() {
        let _env = env_lock();
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::set_var("CADENCE_LOOP_INTERVAL_MS", "50") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.loop_interval_ms, 50);
        unsafe { std::env::remove_var("CADENCE_LOOP_INTERVAL_MS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_tick_limit() {
        let _env = env_lock();
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::set_var("CADENCE_MAX_TICKS", "forever") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!(cfg.max_ticks.is_none());
        unsafe { std::env::remove_var("CADENCE_MAX_TICKS") };
    }
}
