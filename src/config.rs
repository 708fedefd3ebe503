use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{ConnectionParams, DatabaseType};

/// Values the connection form starts with. Never carries a password; that is
/// typed in every run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConnectionDefaults {
    pub db_type: String, // "mysql" or "sqlite"
    pub host: String,
    pub port: String,
    pub user: String,
    pub database: String,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            db_type: "mysql".to_string(),
            host: "localhost".to_string(),
            port: "3306".to_string(),
            user: "root".to_string(),
            database: "clothing_retail_store".to_string(),
        }
    }
}

impl ConnectionDefaults {
    pub fn to_params(&self) -> ConnectionParams {
        ConnectionParams {
            db_type: DatabaseType::parse(&self.db_type),
            host: self.host.clone(),
            port: self.port.clone(),
            user: self.user.clone(),
            password: String::new(),
            database: self.database.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionDefaults,
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins over it.
    pub log_filter: Option<String>,
}

impl Config {
    /// Reads the optional defaults file. The app only ever reads it; what the
    /// user types into the connection form is not written back.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tui-crud").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_built_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());

        let params = config.connection.to_params();
        assert_eq!(params.db_type, DatabaseType::MySQL);
        assert_eq!(params.host, "localhost");
        assert_eq!(params.port, "3306");
        assert_eq!(params.user, "root");
        assert_eq!(params.database, "clothing_retail_store");
        assert!(params.password.is_empty());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "connection": { "db_type": "sqlite", "database": "shop.db" }, "log_filter": "tui_crud=debug" }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.connection.db_type, "sqlite");
        assert_eq!(config.connection.database, "shop.db");
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.log_filter.as_deref(), Some("tui_crud=debug"));
        assert_eq!(config.connection.to_params().db_type, DatabaseType::SQLite);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
