use nix::unistd::{Uid, User};
use std::io;

/// A local account the call file can be handed over to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemUser {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

impl From<User> for SystemUser {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
        }
    }
}

/// Look up `name` in the system password database.
///
/// Returns `Ok(None)` when no such account exists.
pub fn lookup_user(name: &str) -> io::Result<Option<SystemUser>> {
    if name.contains('\0') {
        return Ok(None);
    }
    let user = User::from_name(name).map_err(io::Error::from)?;
    Ok(user.map(SystemUser::from))
}

pub fn is_superuser() -> bool {
    Uid::effective().is_root()
}
