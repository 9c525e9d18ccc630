//! Configuration management.
//!
//! catadm reads an optional JSON config file:
//!
//! ```json
//! {
//!   "repository": { "database": "/srv/catalog/catalog.db", "table": "records" },
//!   "server": { "url": "https://catalog.example.org/csw" }
//! }
//! ```
//!
//! The file is looked up at `--config`, then `CATADM_CONFIG`, then
//! `~/.catadm/config.json`. Command-line flags always win over file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::schema::DEFAULT_TABLE;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CATADM_CONFIG";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// SQLite database file.
    pub database: Option<PathBuf>,
    /// Records table name.
    pub table: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Public catalog endpoint, used for sitemaps and harvest requests.
    pub url: Option<String>,
}

/// Get the global catadm directory (`~/.catadm`).
#[must_use]
pub fn global_catadm_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".catadm"))
}

/// Default config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    global_catadm_dir().map(|dir| dir.join("config.json"))
}

/// Load the config file.
///
/// An explicitly named file (flag or `CATADM_CONFIG`) must exist; a missing
/// default file yields the default config.
///
/// # Errors
///
/// Returns `Config` if a named file is missing or any file is unreadable or
/// not valid JSON.
pub fn load_config(explicit: Option<&Path>) -> Result<CatalogConfig> {
    let named = explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });

    let path = match named {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            path
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(CatalogConfig::default()),
        },
    };

    load_config_file(&path)
}

/// Parse one config file.
///
/// # Errors
///
/// Returns `Config` if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<CatalogConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

/// Resolve the database path.
///
/// Priority:
/// 1. `--db` (clap also fills this from `CATADM_DB`)
/// 2. `repository.database` from the config file
/// 3. `~/.catadm/data/catalog.db`
#[must_use]
pub fn resolve_db_path(explicit: Option<&Path>, config: &CatalogConfig) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = &config.repository.database {
        return Some(path.clone());
    }
    global_catadm_dir().map(|dir| dir.join("data").join("catalog.db"))
}

/// Resolve the records table: `--table`, then config, then `records`.
#[must_use]
pub fn resolve_table(explicit: Option<&str>, config: &CatalogConfig) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| config.repository.table.clone())
        .unwrap_or_else(|| DEFAULT_TABLE.to_string())
}

/// Resolve the catalog endpoint URL: `--url`, then `server.url`.
///
/// # Errors
///
/// Returns `InvalidArgument` when neither is set.
pub fn resolve_server_url(explicit: Option<&str>, config: &CatalogConfig) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| config.server.url.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            Error::InvalidArgument(
                "No catalog URL given: pass --url or set server.url in the config file".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> CatalogConfig {
        CatalogConfig {
            repository: RepositoryConfig {
                database: Some(PathBuf::from("/srv/catalog.db")),
                table: Some("metadata".into()),
            },
            server: ServerConfig {
                url: Some("https://example.org/csw".into()),
            },
        }
    }

    #[test]
    fn test_resolve_db_path_priority() {
        let config = sample();
        let explicit = PathBuf::from("/custom/db.sqlite");
        assert_eq!(resolve_db_path(Some(&explicit), &config), Some(explicit));
        assert_eq!(
            resolve_db_path(None, &config),
            Some(PathBuf::from("/srv/catalog.db"))
        );

        let fallback = resolve_db_path(None, &CatalogConfig::default()).unwrap();
        assert!(fallback.ends_with("data/catalog.db"));
    }

    #[test]
    fn test_resolve_table_and_url() {
        let config = sample();
        assert_eq!(resolve_table(Some("other"), &config), "other");
        assert_eq!(resolve_table(None, &config), "metadata");
        assert_eq!(resolve_table(None, &CatalogConfig::default()), DEFAULT_TABLE);

        assert_eq!(
            resolve_server_url(None, &config).unwrap(),
            "https://example.org/csw"
        );
        assert!(resolve_server_url(None, &CatalogConfig::default()).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"repository": {"table": "t1"}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.repository.table.as_deref(), Some("t1"));
        assert_eq!(config.repository.database, None);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_named_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }
}
