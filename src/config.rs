//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// SQLite file (from MINION_STORE_DB_PATH, default under the user data dir)
    pub db_path: PathBuf,
    /// Interface to bind (from MINION_STORE_HOST)
    pub host: String,
    /// HTTP port (from MINION_STORE_PORT)
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset or unparsable values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match lookup("MINION_STORE_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let host = lookup("MINION_STORE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = lookup("MINION_STORE_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            db_path,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "minion-store")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("minion-store.db"))
}
