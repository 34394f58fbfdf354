//! Server Configuration
//!
//! Defaults suit local development; every field can be overridden from
//! the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::network::relay::UnknownEventPolicy;
use crate::network::rooms::DEFAULT_ROOM_CAPACITY;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Events buffered per room before slow subscribers lag.
    pub room_capacity: usize,
    /// Interval between empty-room sweeps.
    pub cleanup_interval: Duration,
    /// Time a new socket gets to complete the WebSocket handshake.
    pub handshake_timeout: Duration,
    /// Handling of unrecognized room event types.
    pub unknown_events: UnknownEventPolicy,
    /// Insert default themes into an empty catalog at startup.
    pub seed_themes: bool,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            room_capacity: DEFAULT_ROOM_CAPACITY,
            cleanup_interval: Duration::from_secs(60),
            handshake_timeout: Duration::from_secs(10),
            unknown_events: UnknownEventPolicy::Passthrough,
            seed_themes: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build config from any variable source; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: parse_var(&lookup, "MEMORY_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            max_connections: parse_var(&lookup, "MEMORY_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            room_capacity: parse_var(&lookup, "MEMORY_ROOM_CAPACITY")?.unwrap_or(defaults.room_capacity),
            unknown_events: parse_var(&lookup, "MEMORY_UNKNOWN_EVENTS")?
                .unwrap_or(defaults.unknown_events),
            seed_themes: parse_var(&lookup, "MEMORY_SEED_THEMES")?.unwrap_or(defaults.seed_themes),
            ..defaults
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.room_capacity, 256);
        assert_eq!(config.unknown_events, UnknownEventPolicy::Passthrough);
        assert!(config.seed_themes);
    }

    #[test]
    fn test_empty_environment_keeps_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MEMORY_BIND_ADDR", "127.0.0.1:9000"),
            ("MEMORY_MAX_CONNECTIONS", "10"),
            ("MEMORY_ROOM_CAPACITY", "32"),
            ("MEMORY_UNKNOWN_EVENTS", "drop"),
            ("MEMORY_SEED_THEMES", "false"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.room_capacity, 32);
        assert_eq!(config.unknown_events, UnknownEventPolicy::Drop);
        assert!(!config.seed_themes);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = ServerConfig::from_lookup(lookup(&[("MEMORY_MAX_CONNECTIONS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MEMORY_MAX_CONNECTIONS"));
        assert!(err.to_string().contains("lots"));
    }
}
