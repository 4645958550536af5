use anyhow::{Context, Error};
use serde::Deserialize;
use std::path::PathBuf;

/// Directory Asterisk polls for new call files on a stock install.
pub const DEFAULT_SPOOL_DIR: &str = "/var/spool/asterisk/outgoing";

pub const ENV_SPOOL_DIR: &str = "CALLFILE_SPOOL_DIR";
pub const ENV_TEMP_DIR: &str = "CALLFILE_TEMP_DIR";
pub const ENV_USER: &str = "CALLFILE_USER";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub spool_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub user: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spool_dir: PathBuf::from(DEFAULT_SPOOL_DIR),
            temp_dir: None,
            user: None,
            log_level: Some("info".to_string()),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )
        .with_context(|| format!("parse config {}", path))?;
        Ok(config)
    }

    /// Apply `CALLFILE_*` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SPOOL_DIR).filter(|v| !v.is_empty()) {
            self.spool_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR).filter(|v| !v.is_empty()) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        if let Some(user) = lookup(ENV_USER).filter(|v| !v.is_empty()) {
            self.user = Some(user);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.spool_dir, PathBuf::from("/var/spool/asterisk/outgoing"));
        assert_eq!(config.temp_dir, None);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "spool_dir = \"/srv/spool\"").unwrap();
        writeln!(file, "user = \"asterisk\"").unwrap();
        file.flush().unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.spool_dir, PathBuf::from("/srv/spool"));
        assert_eq!(config.user.as_deref(), Some("asterisk"));
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/callfile.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/callfile.toml"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SPOOL_DIR, "/tmp/spool"),
            (ENV_TEMP_DIR, ""),
            (ENV_USER, "nobody"),
        ]
        .into_iter()
        .collect();
        let config =
            Config::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.spool_dir, PathBuf::from("/tmp/spool"));
        assert_eq!(config.temp_dir, None);
        assert_eq!(config.user.as_deref(), Some("nobody"));
    }
}
