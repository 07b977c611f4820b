//! crates/metadata/src/id_lookup.rs
//!
//! Account and group database lookups backed by NSS through `nix`.

use std::io;

use nix::unistd::{Gid, Group, Uid, User};

/// Raw user ID type.
pub type RawUid = u32;

/// Raw group ID type.
pub type RawGid = u32;

/// Looks up the username for a given UID.
pub fn lookup_user_name(uid: RawUid) -> Result<Option<String>, io::Error> {
    let user = User::from_uid(Uid::from_raw(uid)).map_err(io::Error::from)?;
    Ok(user.map(|user| user.name))
}

/// Looks up the UID for a given username.
pub fn lookup_user_by_name(name: &str) -> Result<Option<RawUid>, io::Error> {
    if name.is_empty() || name.contains('\0') {
        return Ok(None);
    }
    let user = User::from_name(name).map_err(io::Error::from)?;
    Ok(user.map(|user| user.uid.as_raw()))
}

/// Looks up the group name for a given GID.
pub fn lookup_group_name(gid: RawGid) -> Result<Option<String>, io::Error> {
    let group = Group::from_gid(Gid::from_raw(gid)).map_err(io::Error::from)?;
    Ok(group.map(|group| group.name))
}

/// Looks up the GID for a given group name.
pub fn lookup_group_by_name(name: &str) -> Result<Option<RawGid>, io::Error> {
    if name.is_empty() || name.contains('\0') {
        return Ok(None);
    }
    let group = Group::from_name(name).map_err(io::Error::from)?;
    Ok(group.map(|group| group.gid.as_raw()))
}
