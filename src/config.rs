use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::CaptureSettings;
use crate::domain::WatchedPorts;
use crate::error::ConfigError;
use crate::monitor::MAX_INTERFACES;
use crate::parser::UnknownLinkPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/portwatch.conf";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub ports: WatchedPorts,
    /// Restrict monitoring to these interfaces; empty means every interface that is up
    pub interfaces: Vec<String>,
    pub capture: CaptureSettings,
    pub max_interfaces: usize,
    pub unknown_link: UnknownLinkPolicy,
    pub log_level: String,
}

/// Command-line values layered over the file and environment.
///
/// Empty lists and `None` leave the loaded value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ports: Vec<u16>,
    pub interfaces: Vec<String>,
    pub snaplen: Option<i32>,
    pub timeout_ms: Option<u64>,
    pub no_promisc: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ports: WatchedPorts::default(),
            interfaces: Vec::new(),
            capture: CaptureSettings::default(),
            max_interfaces: MAX_INTERFACES,
            unknown_link: UnknownLinkPolicy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load from the config file and the process environment.
    ///
    /// The file is `path`, else `$PORTWATCH_CONFIG`, else
    /// `/etc/portwatch.conf`; a missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| env("PORTWATCH_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Config::default();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config.apply_file(&content)?;
        }

        // Allow environment variable overrides
        if let Some(val) = env("PORTWATCH_PORTS") {
            config.ports = WatchedPorts::parse(&val)?;
        }
        if let Some(val) = env("PORTWATCH_INTERFACES") {
            config.interfaces = parse_list(&val);
        }
        if let Some(val) = env("PORTWATCH_LOG_LEVEL") {
            config.log_level = val;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys ignored.
    pub fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();
                match key {
                    "ports" => self.ports = WatchedPorts::parse(value)?,
                    "interfaces" => self.interfaces = parse_list(value),
                    "snaplen" => self.capture.snaplen = parse_value(key, value)?,
                    "promiscuous" => self.capture.promiscuous = parse_value(key, value)?,
                    "read_timeout_ms" => {
                        self.capture.read_timeout =
                            Duration::from_millis(parse_value(key, value)?)
                    }
                    "max_interfaces" => self.max_interfaces = parse_value(key, value)?,
                    "unknown_link" => {
                        self.unknown_link = value.parse().map_err(|_| invalid(key, value))?
                    }
                    "log_level" => self.log_level = value.to_string(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Apply command-line flags on top, then validate the result.
    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if !overrides.ports.is_empty() {
            self.ports = WatchedPorts::new(overrides.ports)?;
        }
        if !overrides.interfaces.is_empty() {
            self.interfaces = overrides.interfaces;
        }
        if let Some(snaplen) = overrides.snaplen {
            self.capture.snaplen = snaplen;
        }
        if let Some(ms) = overrides.timeout_ms {
            self.capture.read_timeout = Duration::from_millis(ms);
        }
        if overrides.no_promisc {
            self.capture.promiscuous = false;
        }
        if overrides.verbose {
            self.log_level = "debug".to_string();
        }
        self.validate()
    }

    /// Check bounds that the individual parsers cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.snaplen <= 0 {
            return Err(invalid("snaplen", &self.capture.snaplen.to_string()));
        }
        if self.capture.read_timeout.is_zero() {
            return Err(invalid("read_timeout_ms", "0"));
        }
        if self.max_interfaces == 0 || self.max_interfaces > MAX_INTERFACES {
            return Err(invalid("max_interfaces", &self.max_interfaces.to_string()));
        }
        Ok(())
    }

    /// Filter directive for the tracing subscriber.
    pub fn tracing_filter(&self) -> &str {
        &self.log_level
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
