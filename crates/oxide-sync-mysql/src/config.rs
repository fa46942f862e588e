//! Connection configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};

use crate::error::Result;

/// Everything needed to open a MySQL session.
///
/// Missing fields take their defaults when deserialized, so a JSON file
/// only needs the keys it changes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Default database. Empty means none.
    pub database: String,
    /// Connection character set.
    pub charset: String,
    /// Probe the connection with `SELECT 1` before every statement and
    /// reconnect eagerly when the probe fails.
    pub keep_alive: bool,
    /// Require TLS.
    pub use_tls: bool,
    /// Server-side autocommit, applied after every (re)connect.
    pub auto_commit: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            charset: String::from("utf8"),
            keep_alive: false,
            use_tls: false,
            auto_commit: false,
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("keep_alive", &self.keep_alive)
            .field("use_tls", &self.use_tls)
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}

impl ConnectionConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Driver options for this configuration.
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let ssl_mode = if self.use_tls {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Disabled
        };
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .charset(&self.charset)
            .ssl_mode(ssl_mode);
        if self.database.is_empty() {
            options
        } else {
            options.database(&self.database)
        }
    }

    /// Statement applying the autocommit setting.
    #[must_use]
    pub const fn autocommit_statement(&self) -> &'static str {
        if self.auto_commit {
            "SET autocommit = 1"
        } else {
            "SET autocommit = 0"
        }
    }
}
