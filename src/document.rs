use crate::{
    action::Action,
    call::Call,
    callfile::CallFile,
    config::Config,
    error::Result,
    schedule::parse_time,
};
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

/// A call file described in TOML:
///
/// ```toml
/// archive = true
/// schedule = "+1h"
///
/// [call]
/// channel = "SIP/flowroute/18002223333"
/// wait_time = 45
///
/// [action]
/// application = "Playback"
/// data = "hello-world"
///
/// [variables]
/// greeting = "hello"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallFileDocument {
    pub call: Call,
    pub action: Action,
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub archive: bool,
    #[serde(default)]
    pub always_delete: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub spool_dir: Option<String>,
    #[serde(default)]
    pub temp_dir: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

impl CallFileDocument {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read call file document {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parse call file document {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Placement time requested by the document, if any.
    pub fn schedule_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.schedule.as_deref().map(parse_time).transpose()
    }

    /// Build the [`CallFile`], layering the document's own settings over `config`.
    pub fn into_callfile(self, config: &Config) -> CallFile {
        let mut callfile = CallFile::new(self.call, self.action)
            .with_config(config)
            .with_archive(self.archive)
            .with_always_delete(self.always_delete);
        if let Some(variables) = self.variables {
            callfile = callfile.with_variables(variables);
        }
        if let Some(user) = self.user {
            callfile = callfile.with_user(user);
        }
        if let Some(filename) = self.filename {
            callfile = callfile.with_filename(filename);
        }
        if let Some(dir) = self.spool_dir {
            callfile = callfile.with_spool_dir(dir);
        }
        if let Some(dir) = self.temp_dir {
            callfile = callfile.with_temp_dir(dir);
        }
        callfile
    }
}
