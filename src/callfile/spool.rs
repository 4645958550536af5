use super::CallFile;
use crate::{
    error::{CallFileError, Result},
    schedule::to_file_time,
    user::{lookup_user, SystemUser},
};
use chrono::{DateTime, Utc};
use nix::errno::Errno;
use std::{
    fs::{self, File, FileTimes},
    io,
    os::unix::fs::chown,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info, warn};

/// Outcome of a successful handoff. The spooled file now belongs to the
/// switch and is not touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolReceipt {
    pub temp_path: PathBuf,
    pub spool_path: PathBuf,
    pub owner: Option<SystemUser>,
    pub scheduled: Option<DateTime<Utc>>,
}

impl CallFile {
    /// Write `contents` to `<temp_dir>/<filename>`, truncating any previous
    /// file of that name, and return the absolute path.
    pub fn write_file(&self) -> Result<PathBuf> {
        let contents = self.contents()?;
        let temp_dir = self.temp_dir();
        let dir = fs::canonicalize(&temp_dir).map_err(|source| CallFileError::Write {
            path: temp_dir.join(&self.filename),
            source,
        })?;
        let path = dir.join(&self.filename);
        fs::write(&path, contents.as_bytes()).map_err(|source| CallFileError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "call file written");
        Ok(path)
    }

    /// Hand the call file to the switch: write, chown (when a user is set),
    /// stamp the placement time (when given), then move it into the spool
    /// directory.
    ///
    /// Without `time` the file keeps its natural timestamps and the call is
    /// placed as soon as the switch notices it. A failure after the write
    /// leaves the temporary file where it is.
    pub fn spool(&self, time: Option<DateTime<Utc>>) -> Result<SpoolReceipt> {
        let temp_path = self.write_file()?;

        let owner = match &self.user {
            Some(user) => Some(change_owner(&temp_path, user)?),
            None => None,
        };

        let file_time = match &time {
            Some(time) => {
                let file_time = to_file_time(time).inspect_err(|e| {
                    warn!(path = %temp_path.display(), "not scheduling call file: {}", e);
                })?;
                stamp(&temp_path, file_time)?;
                Some(file_time)
            }
            None => None,
        };

        let spool_path = relocate(
            &temp_path,
            &self.spool_dir,
            &self.filename,
            owner.as_ref(),
            file_time,
        )?;

        info!(
            channel = %self.call.channel(),
            path = %spool_path.display(),
            scheduled = ?time,
            "call file spooled"
        );
        Ok(SpoolReceipt {
            temp_path,
            spool_path,
            owner,
            scheduled: time,
        })
    }
}

fn change_owner(path: &Path, user: &str) -> Result<SystemUser> {
    let account = resolve_owner(path, user, lookup_user(user))?;

    chown(path, Some(account.uid), Some(account.gid)).map_err(|source| {
        warn!(user, path = %path.display(), "chown failed: {}", source);
        CallFileError::NoUserPermission {
            user: user.to_string(),
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(user, uid = account.uid, gid = account.gid, "call file ownership changed");
    Ok(account)
}

pub(super) fn resolve_owner(
    path: &Path,
    user: &str,
    lookup: io::Result<Option<SystemUser>>,
) -> Result<SystemUser> {
    match lookup {
        Ok(Some(account)) => Ok(account),
        Ok(None) => {
            warn!(user, path = %path.display(), "no such user");
            Err(CallFileError::NoUser {
                user: user.to_string(),
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            warn!(user, path = %path.display(), "user lookup failed: {}", source);
            Err(CallFileError::UserLookup {
                user: user.to_string(),
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn set_times(path: &Path, time: SystemTime) -> io::Result<()> {
    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
}

fn stamp(path: &Path, time: SystemTime) -> Result<()> {
    set_times(path, time).map_err(|source| {
        warn!(path = %path.display(), "failed to set timestamps: {}", source);
        CallFileError::Timestamp {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn relocate(
    src: &Path,
    spool_dir: &Path,
    filename: &str,
    owner: Option<&SystemUser>,
    file_time: Option<SystemTime>,
) -> Result<PathBuf> {
    let target = spool_dir.join(filename);
    let no_permission = |source: io::Error| {
        warn!(
            path = %src.display(),
            spool_dir = %spool_dir.display(),
            "failed to spool call file: {}",
            source
        );
        CallFileError::NoSpoolPermission {
            path: src.to_path_buf(),
            spool_dir: spool_dir.to_path_buf(),
            source,
        }
    };

    match fs::rename(src, &target) {
        Ok(()) => Ok(target),
        Err(e) if e.raw_os_error() == Some(Errno::EXDEV as i32) => {
            debug!(
                path = %src.display(),
                spool_dir = %spool_dir.display(),
                "temp and spool directories are on different filesystems, staging a copy"
            );
            copy_across(src, spool_dir, filename, &target, owner, file_time)
                .map_err(no_permission)?;
            Ok(target)
        }
        Err(e) => Err(no_permission(e)),
    }
}

/// Copy into a dot-prefixed staging file next to the target, restore owner
/// and timestamps, then rename it into place so the switch never sees a
/// partial file.
fn copy_across(
    src: &Path,
    spool_dir: &Path,
    filename: &str,
    target: &Path,
    owner: Option<&SystemUser>,
    file_time: Option<SystemTime>,
) -> io::Result<()> {
    let staging = spool_dir.join(format!(".{}.tmp", filename));
    let staged = (|| {
        fs::copy(src, &staging)?;
        if let Some(owner) = owner {
            chown(&staging, Some(owner.uid), Some(owner.gid))?;
        }
        if let Some(time) = file_time {
            set_times(&staging, time)?;
        }
        fs::rename(&staging, target)
    })();

    if let Err(e) = staged {
        if let Err(cleanup) = fs::remove_file(&staging) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(path = %staging.display(), "failed to remove staging file: {}", cleanup);
            }
        }
        return Err(e);
    }

    if let Err(e) = fs::remove_file(src) {
        warn!(path = %src.display(), "call file spooled but temp copy not removed: {}", e);
    }
    Ok(())
}
