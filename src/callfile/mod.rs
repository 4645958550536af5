use crate::{
    action::Action,
    call::Call,
    config::{Config, DEFAULT_SPOOL_DIR},
    error::{CallFileError, Result},
    preflight::{
        check_directive_value, check_directory, check_file_name, check_variable, ValidationReport,
    },
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

mod spool;

pub use spool::SpoolReceipt;

/// A complete call file: one [`Call`], one [`Action`] and the file-level
/// settings that control how it is handed to the switch.
///
/// Validation runs on demand; nothing touches the filesystem until
/// [`CallFile::write_file`] or [`CallFile::spool`] is called.
#[derive(Debug, Clone)]
pub struct CallFile {
    call: Call,
    action: Action,
    variables: Option<BTreeMap<String, String>>,
    archive: bool,
    always_delete: bool,
    user: Option<String>,
    filename: String,
    temp_dir: Option<PathBuf>,
    spool_dir: PathBuf,
}

impl CallFile {
    pub fn new(call: Call, action: impl Into<Action>) -> Self {
        Self {
            call,
            action: action.into(),
            variables: None,
            archive: false,
            always_delete: false,
            user: None,
            filename: format!("{}.call", uuid::Uuid::new_v4()),
            temp_dir: None,
            spool_dir: PathBuf::from(DEFAULT_SPOOL_DIR),
        }
    }

    /// Take the spool directory, and the temp directory and user when
    /// present, from `config`. Per-file settings applied afterwards win.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.spool_dir = config.spool_dir.clone();
        if let Some(temp_dir) = &config.temp_dir {
            self.temp_dir = Some(temp_dir.clone());
        }
        if let Some(user) = &config.user {
            self.user = Some(user.clone());
        }
        self
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_always_delete(mut self, always_delete: bool) -> Self {
        self.always_delete = always_delete;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn variables(&self) -> Option<&BTreeMap<String, String>> {
        self.variables.as_ref()
    }

    pub fn archive(&self) -> bool {
        self.archive
    }

    pub fn always_delete(&self) -> bool {
        self.always_delete
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    /// Where the file is assembled; the system temp directory unless overridden.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = self.call.validate();
        for (field, value) in self.action.values() {
            check_directive_value(&mut report, field, value);
        }
        if let Some(variables) = &self.variables {
            for (key, value) in variables {
                check_variable(&mut report, "variables", key, value);
            }
        }
        check_file_name(&mut report, "filename", &self.filename);
        check_directory(&mut report, "spool_dir", &self.spool_dir);
        if let Some(temp_dir) = &self.temp_dir {
            check_directory(&mut report, "temp_dir", temp_dir);
        }
        report
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Assemble the directive lines in the order the switch expects.
    pub fn build_file(&self) -> Result<Vec<String>> {
        let report = self.validate();
        if !report.is_empty() {
            warn!(filename = %self.filename, issues = %report, "call file failed validation");
            return Err(CallFileError::Validation(report));
        }

        let mut lines = self.call.render();
        lines.extend(self.action.render());
        if let Some(variables) = &self.variables {
            for (key, value) in variables {
                lines.push(format!("Set: {}={}", key, value));
            }
        }
        if self.always_delete {
            lines.push("AlwaysDelete: yes".to_string());
        }
        if self.archive {
            lines.push("Archive: yes".to_string());
        }
        debug!(filename = %self.filename, directives = lines.len(), "call file built");
        Ok(lines)
    }

    /// Full file body, rebuilt and revalidated on every call.
    pub fn contents(&self) -> Result<String> {
        let lines = self.build_file()?;
        let mut contents = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            contents.push_str(&line);
            contents.push('\n');
        }
        Ok(contents)
    }
}
