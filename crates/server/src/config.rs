/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Server configuration.
//!
//! Values are resolved in order of priority: environment variables
//! (`POSTINO_*`), then the TOML configuration file, then built-in
//! defaults. Every loaded configuration goes through [`ServerConfig::validate`]
//! before the server starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use common::address;

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Network settings.
    pub net: NetConfig,

    /// Mailbox storage settings.
    pub storage: StorageConfig,

    /// The closed registry of valid addresses, fixed for the life of
    /// the process.
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Interface to bind.
    pub bind: String,

    /// TCP port the clients connect to.
    pub port: u16,

    /// Maximum concurrently served connections; further accepts wait
    /// for a free worker slot.
    pub max_connections: usize,

    /// Seconds a connection may take to deliver its request line.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one mailbox file per registered address.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            net: NetConfig::default(),
            storage: StorageConfig::default(),
            users: vec![
                "user1@mail.com".to_string(),
                "user2@mail.com".to_string(),
                "user3@mail.com".to_string(),
            ],
        }
    }
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8189,
            max_connections: 100,
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ServerData"),
        }
    }
}

impl ServerConfig {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `POSTINO_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("POSTINO_BIND") {
            self.net.bind = val;
        }
        if let Ok(val) = std::env::var("POSTINO_PORT") {
            if let Ok(port) = val.parse() {
                self.net.port = port;
            }
        }
        if let Ok(val) = std::env::var("POSTINO_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                self.net.max_connections = max;
            }
        }
        if let Ok(val) = std::env::var("POSTINO_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }

        debug!("applied environment variable overrides");
    }

    /// Checks that the configuration can actually run a server.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.net.bind.is_empty() {
            return Err(ConfigError::Invalid("net.bind must not be empty".into()));
        }
        if self.net.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "net.max_connections must be greater than 0".into(),
            ));
        }
        if self.net.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "net.request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.users.is_empty() {
            return Err(ConfigError::Invalid(
                "users must list at least one address".into(),
            ));
        }
        for user in &self.users {
            if !address::is_valid_address(user) {
                return Err(ConfigError::Invalid(format!(
                    "users entry is not a valid address: {user}"
                )));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.net.bind, self.net.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.net.request_timeout_secs)
    }
}
