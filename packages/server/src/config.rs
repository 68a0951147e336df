//! Server configuration resolved from the environment
//!
//! | Variable | Default |
//! |---|---|
//! | `NAVTREE_HOST` | `127.0.0.1` |
//! | `NAVTREE_PORT` | `3001` |
//! | `NAVTREE_DB_PATH` | `~/.navtree/database/navtree.db` |
//! | `NAVTREE_ACCESS_FILE` | `~/.navtree/access.json` |
//! | `NAVTREE_ROLE_GATE` | `ignore` (or `require-role`) |
//! | `CORS_ALLOW_ORIGIN` | local dev origins |

use std::path::PathBuf;
use thiserror::Error;

use navtree_core::access::RoleGate;

pub const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:1420",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to get home directory")]
    HomeDirUnavailable,

    #[error("Invalid {var} '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub access_file: PathBuf,
    pub role_gate: RoleGate,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Resolve from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("NAVTREE_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                var: "NAVTREE_PORT",
                value,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let role_gate = match var("NAVTREE_ROLE_GATE") {
            Some(value) => value
                .parse::<RoleGate>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "NAVTREE_ROLE_GATE",
                    value,
                    reason,
                })?,
            None => RoleGate::default(),
        };

        let db_path = match var("NAVTREE_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => navtree_home()?.join("database").join("navtree.db"),
        };

        let access_file = match var("NAVTREE_ACCESS_FILE") {
            Some(path) => PathBuf::from(path),
            None => navtree_home()?.join("access.json"),
        };

        let cors_origins = match var("CORS_ALLOW_ORIGIN") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host: var("NAVTREE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            db_path,
            access_file,
            role_gate,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn navtree_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".navtree"))
        .ok_or(ConfigError::HomeDirUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("NAVTREE_PORT", "4100"),
            ("NAVTREE_DB_PATH", "/tmp/nav.db"),
            ("NAVTREE_ACCESS_FILE", "/tmp/access.json"),
            ("NAVTREE_ROLE_GATE", "require-role"),
            ("CORS_ALLOW_ORIGIN", "https://a.example, https://b.example"),
        ]))
        .unwrap();

        assert_eq!(config.port, 4100);
        assert_eq!(config.db_path, PathBuf::from("/tmp/nav.db"));
        assert_eq!(config.role_gate, RoleGate::RequireRole);
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.bind_address(), "127.0.0.1:4100");
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("NAVTREE_DB_PATH", "/tmp/nav.db"),
            ("NAVTREE_ACCESS_FILE", "/tmp/access.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.role_gate, RoleGate::Ignore);
        assert_eq!(config.cors_origins.len(), DEFAULT_CORS_ORIGINS.len());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("NAVTREE_PORT", "eighty"),
            ("NAVTREE_DB_PATH", "/tmp/nav.db"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "NAVTREE_PORT",
                ..
            }
        ));

        let err =
            ServerConfig::from_lookup(lookup(&[("NAVTREE_ROLE_GATE", "strict")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "NAVTREE_ROLE_GATE",
                ..
            }
        ));
    }
}
