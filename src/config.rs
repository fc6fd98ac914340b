// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration file.
//!
//! ```toml
//! topics_file = "/etc/devola-bridge/topics.conf"
//!
//! [mqtt]
//! host = "192.168.1.1"
//! port = 1883
//! username = "bridge"
//! password = "secret"
//!
//! [frame]
//! checksum = "warn"
//!
//! [network]
//! wait_for_broker = true
//! probe_interval_secs = 15
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::codec::ChecksumPolicy;
use crate::error::ConfigError;

/// Smallest keep-alive the MQTT client accepts.
const MIN_KEEP_ALIVE_SECS: u64 = 5;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Path of the mapping table.
    #[serde(default = "default_topics_file")]
    pub topics_file: PathBuf,
    /// Broker connection.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Frame handling.
    #[serde(default)]
    pub frame: FrameConfig,
    /// Startup network wait.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// `[mqtt]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MqttConfig {
    /// Broker host name or address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Broker TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Keep-alive interval in seconds, at least 5.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// MQTT client identifier.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Optional broker username.
    #[serde(default)]
    pub username: Option<String>,
    /// Broker password. Requires `username`.
    #[serde(default)]
    pub password: Option<String>,
    /// Retain flag for every publish.
    #[serde(default)]
    pub retain: bool,
}

/// `[frame]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameConfig {
    /// How received status checksums are treated.
    #[serde(default)]
    pub checksum: ChecksumPolicy,
}

/// `[network]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Wait for the broker to accept TCP before connecting.
    #[serde(default = "default_wait_for_broker")]
    pub wait_for_broker: bool,
    /// Seconds between broker reachability probes, at least 1.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

fn default_topics_file() -> PathBuf {
    PathBuf::from("topics.conf")
}
fn default_host() -> String {
    "192.168.1.1".to_string()
}
fn default_port() -> u16 {
    1883
}
fn default_keep_alive_secs() -> u64 {
    60
}
fn default_client_id() -> String {
    "devola-bridge".to_string()
}
fn default_wait_for_broker() -> bool {
    true
}
fn default_probe_interval_secs() -> u64 {
    15
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            keep_alive_secs: default_keep_alive_secs(),
            client_id: default_client_id(),
            username: None,
            password: None,
            retain: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wait_for_broker: default_wait_for_broker(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            topics_file: default_topics_file(),
            mqtt: MqttConfig::default(),
            frame: FrameConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or the errors of
    /// [`BridgeConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` for invalid TOML or unknown keys, and
    /// `ConfigError::InvalidValue` for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if self.mqtt.host.trim().is_empty() {
            return invalid("mqtt.host", "must not be empty");
        }
        if self.mqtt.port == 0 {
            return invalid("mqtt.port", "must not be 0");
        }
        if self.mqtt.client_id.is_empty() {
            return invalid("mqtt.client_id", "must not be empty");
        }
        if self.mqtt.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return invalid("mqtt.keep_alive_secs", "must be at least 5");
        }
        if self.mqtt.password.is_some() && self.mqtt.username.is_none() {
            return invalid("mqtt.password", "requires mqtt.username");
        }
        if self.network.probe_interval_secs == 0 {
            return invalid("network.probe_interval_secs", "must be at least 1");
        }
        Ok(())
    }

    /// MQTT keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.mqtt.keep_alive_secs)
    }

    /// Interval between broker reachability probes.
    #[must_use]
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.network.probe_interval_secs)
    }

    /// Username and password, if configured. A missing password is empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.mqtt
            .username
            .as_deref()
            .map(|user| (user, self.mqtt.password.as_deref().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config.topics_file, PathBuf::from("topics.conf"));
        assert_eq!(config.mqtt.host, "192.168.1.1");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.client_id, "devola-bridge");
        assert_eq!(config.keep_alive(), Duration::from_secs(60));
        assert!(!config.mqtt.retain);
        assert_eq!(config.frame.checksum, ChecksumPolicy::Ignore);
        assert!(config.network.wait_for_broker);
        assert_eq!(config.probe_interval(), Duration::from_secs(15));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn full_file() {
        let config = BridgeConfig::from_toml_str(
            r#"
            topics_file = "/etc/devola/topics.conf"

            [mqtt]
            host = "broker.local"
            port = 8883
            keep_alive_secs = 30
            client_id = "bridge-a"
            username = "user"
            password = "pass"
            retain = true

            [frame]
            checksum = "strict"

            [network]
            wait_for_broker = false
            probe_interval_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.topics_file, PathBuf::from("/etc/devola/topics.conf"));
        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.keep_alive(), Duration::from_secs(30));
        assert_eq!(config.mqtt.client_id, "bridge-a");
        assert_eq!(config.credentials(), Some(("user", "pass")));
        assert!(config.mqtt.retain);
        assert_eq!(config.frame.checksum, ChecksumPolicy::Strict);
        assert!(!config.network.wait_for_broker);
        assert_eq!(config.probe_interval(), Duration::from_secs(5));
    }

    #[test]
    fn username_without_password() {
        let config = BridgeConfig::from_toml_str("[mqtt]\nusername = \"user\"\n").unwrap();
        assert_eq!(config.credentials(), Some(("user", "")));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = BridgeConfig::from_toml_str("[mqtt]\nhots = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn unknown_checksum_policy_rejected() {
        let err = BridgeConfig::from_toml_str("[frame]\nchecksum = \"maybe\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        for (text, key) in [
            ("[mqtt]\nport = 0\n", "mqtt.port"),
            ("[mqtt]\nhost = \"\"\n", "mqtt.host"),
            ("[mqtt]\nclient_id = \"\"\n", "mqtt.client_id"),
            ("[mqtt]\nkeep_alive_secs = 1\n", "mqtt.keep_alive_secs"),
            ("[mqtt]\npassword = \"x\"\n", "mqtt.password"),
            ("[network]\nprobe_interval_secs = 0\n", "network.probe_interval_secs"),
        ] {
            let err = BridgeConfig::from_toml_str(text).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: ref k, .. } if k == key),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BridgeConfig::from_file("/nonexistent/devola-bridge.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
