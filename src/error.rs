use crate::preflight::ValidationReport;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub type Result<T, E = CallFileError> = std::result::Result<T, E>;

/// Every way building or spooling a call file can fail.
///
/// Handoff errors raised after the file was written carry the path of the
/// temporary file, which is left on disk for inspection.
#[derive(Error, Debug)]
pub enum CallFileError {
    #[error("call file could not be validated: {0}")]
    Validation(ValidationReport),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("no action defined: set `application` and `data`, or `context`, `extension` and `priority`")]
    NoAction,

    #[error("both an application and a context are defined, choose one")]
    MultipleActions,

    #[error("failed to write call file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("no such user `{user}`")]
    NoUser { user: String, path: PathBuf },

    #[error("failed to look up user `{user}`: {source}")]
    UserLookup {
        user: String,
        path: PathBuf,
        source: io::Error,
    },

    #[error("no permission to change ownership of {} to `{user}`: {source}", .path.display())]
    NoUserPermission {
        user: String,
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("failed to set timestamps on {}: {source}", .path.display())]
    Timestamp { path: PathBuf, source: io::Error },

    #[error("no permission to spool {} into {}: {source}", .path.display(), .spool_dir.display())]
    NoSpoolPermission {
        path: PathBuf,
        spool_dir: PathBuf,
        source: io::Error,
    },
}

impl CallFileError {
    /// The temporary file left behind by a failed handoff, if one was written.
    pub fn temp_path(&self) -> Option<&Path> {
        match self {
            CallFileError::NoUser { path, .. }
            | CallFileError::UserLookup { path, .. }
            | CallFileError::NoUserPermission { path, .. }
            | CallFileError::Timestamp { path, .. }
            | CallFileError::NoSpoolPermission { path, .. } => Some(path),
            _ => None,
        }
    }
}
