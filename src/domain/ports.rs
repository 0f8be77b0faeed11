//! The watched-port set.

use std::fmt;

use crate::error::ConfigError;

/// Default watch-list: SSH and HTTP.
pub const DEFAULT_PORTS: [u16; 2] = [22, 80];

/// Immutable, ordered set of TCP ports to watch.
///
/// Built once at startup and shared read-only between capture workers.
/// Order follows first appearance in the input; duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedPorts {
    ports: Vec<u16>,
}

impl WatchedPorts {
    /// Build a watch-list. Fails if `ports` is empty.
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Result<Self, ConfigError> {
        let mut unique: Vec<u16> = Vec::new();
        for port in ports {
            if !unique.contains(&port) {
                unique.push(port);
            }
        }

        if unique.is_empty() {
            return Err(ConfigError::NoPorts);
        }

        Ok(Self { ports: unique })
    }

    /// Parse a comma or whitespace separated list such as `"22, 80,443"`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let ports = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ports)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Always false; an empty watch-list cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl Default for WatchedPorts {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
        }
    }
}

impl fmt::Display for WatchedPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", list.join(","))
    }
}
