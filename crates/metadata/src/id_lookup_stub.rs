//! Account lookups for targets without a passwd/group database.
//!
//! Every query reports "not found", so principals keep their decimal ids.

use std::io;

/// User id as carried by [`model::Principal`].
pub type RawUid = u32;

/// Group id as carried by [`model::Principal`].
pub type RawGid = u32;

/// Always `Ok(None)`: no account database is available.
pub fn lookup_user_name(_uid: RawUid) -> io::Result<Option<String>> {
    Ok(None)
}

/// Always `Ok(None)`: no account database is available.
pub fn lookup_user_by_name(_name: &str) -> io::Result<Option<RawUid>> {
    Ok(None)
}

/// Always `Ok(None)`: no group database is available.
pub fn lookup_group_name(_gid: RawGid) -> io::Result<Option<String>> {
    Ok(None)
}

/// Always `Ok(None)`: no group database is available.
pub fn lookup_group_by_name(_name: &str) -> io::Result<Option<RawGid>> {
    Ok(None)
}
