//! crates/metadata/src/nfsv4_acl.rs
//!
//! NFSv4 ACL wire codec for the `system.nfs4_acl` extended attribute.
//!
//! NFSv4 ACLs differ significantly from POSIX ACLs:
//!
//! - **ACE-based model**: each entry allows, denies, audits or alarms a set of
//!   permissions for one principal (user, group, or special identifier).
//! - **Granular permissions**: 14 distinct permission bits instead of `rwx`.
//! - **Order matters**: entries are evaluated in order; first match wins.
//!
//! # Wire Format
//!
//! All words are big-endian `u32`:
//!
//! ```text
//! entry_count
//! repeated entry_count times:
//!   type      0 = allow, 1 = deny, 2 = audit, 3 = alarm
//!   flags     inheritance and audit flags, 0x40 = identifier is a group
//!   mask      permission bits
//!   who_len   length of the identity token in bytes
//!   who       UTF-8 token, not NUL terminated, padded to a 4-byte boundary
//! ```
//!
//! The attribute is writable by anyone who can set extended attributes on the
//! file, so [`Nfs4Codec::decode`] treats every length as untrusted.
//!
//! # Identity tokens
//!
//! `OWNER@`, `GROUP@` and `EVERYONE@` name the implicit principals. Anything
//! else is `name@domain`; the name is looked up when the domain matches the
//! configured NFSv4 id domain, otherwise the name part must be a decimal id.

use logging::debug_log;
use model::{
    AclEntry, AclError, AclResult, AclType, EntryKind, Flag, Flags, GenericAcl, Permission,
    Permissions, Principal, TagType,
};

use crate::identity::{IdentityLookup, SystemIdentity};
use crate::idmap::{self, IdmapConfig};

/// The extended attribute name for NFSv4 ACLs.
pub const NFS4_ACL_XATTR: &str = "system.nfs4_acl";

/// Flag bit marking the identity token as a group name.
pub const ACE_IDENTIFIER_GROUP: u32 = 0x0040;

const OWNER_TOKEN: &str = "OWNER@";
const GROUP_TOKEN: &str = "GROUP@";
const EVERYONE_TOKEN: &str = "EVERYONE@";

const WORD: usize = 4;
/// Smallest possible encoded entry: four words and an empty token.
const MIN_ENTRY_LEN: usize = 4 * WORD;

/// NFSv4 access mask bit for each generic permission.
const PERMISSION_BITS: [(Permission, u32); 14] = [
    (Permission::ReadData, 0x0000_0001),
    (Permission::WriteData, 0x0000_0002),
    (Permission::AppendData, 0x0000_0004),
    (Permission::ReadNamedAttrs, 0x0000_0008),
    (Permission::WriteNamedAttrs, 0x0000_0010),
    (Permission::Execute, 0x0000_0020),
    (Permission::DeleteChild, 0x0000_0040),
    (Permission::ReadAttributes, 0x0000_0080),
    (Permission::WriteAttributes, 0x0000_0100),
    (Permission::Delete, 0x0001_0000),
    (Permission::ReadAcl, 0x0002_0000),
    (Permission::WriteAcl, 0x0004_0000),
    (Permission::WriteOwner, 0x0008_0000),
    (Permission::Synchronize, 0x0010_0000),
];

/// NFSv4 ACE flag bit for each generic flag.
const FLAG_BITS: [(Flag, u32); 7] = [
    (Flag::FileInherit, 0x0001),
    (Flag::DirectoryInherit, 0x0002),
    (Flag::NoPropagateInherit, 0x0004),
    (Flag::InheritOnly, 0x0008),
    (Flag::SuccessfulAccess, 0x0010),
    (Flag::FailedAccess, 0x0020),
    (Flag::Inherited, 0x0080),
];

/// Converts generic permissions to an NFSv4 access mask.
#[must_use]
pub fn permissions_to_mask(permissions: Permissions) -> u32 {
    PERMISSION_BITS
        .iter()
        .filter(|(perm, _)| permissions.contains(*perm))
        .fold(0, |mask, (_, bit)| mask | bit)
}

/// Converts an NFSv4 access mask to generic permissions; unknown bits are dropped.
#[must_use]
pub fn mask_to_permissions(mask: u32) -> Permissions {
    PERMISSION_BITS
        .iter()
        .filter(|(_, bit)| mask & bit != 0)
        .map(|(perm, _)| *perm)
        .collect()
}

/// Converts generic flags to NFSv4 ACE flags (without the group bit).
#[must_use]
pub fn flags_to_wire(flags: Flags) -> u32 {
    FLAG_BITS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .fold(0, |raw, (_, bit)| raw | bit)
}

/// Converts NFSv4 ACE flags to generic flags; the group bit and unknown bits are dropped.
#[must_use]
pub fn wire_to_flags(raw: u32) -> Flags {
    FLAG_BITS
        .iter()
        .filter(|(_, bit)| raw & bit != 0)
        .map(|(flag, _)| *flag)
        .collect()
}

const fn padded_len(len: usize) -> Option<usize> {
    match len.checked_add(WORD - 1) {
        Some(n) => Some(n & !(WORD - 1)),
        None => None,
    }
}

/// Bounds-checked big-endian cursor over untrusted bytes.
struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    const fn offset(&self) -> usize {
        self.offset
    }

    const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize, reason: &'static str) -> AclResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(AclError::malformed(self.offset, reason));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u32(&mut self, reason: &'static str) -> AclResult<u32> {
        let bytes = self.take(WORD, reason)?;
        let mut word = [0u8; WORD];
        word.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(word))
    }

    /// Reads `len` bytes plus padding to the next word boundary.
    fn read_padded(&mut self, len: usize) -> AclResult<&'a [u8]> {
        let start = self.offset;
        let padded = padded_len(len)
            .ok_or_else(|| AclError::malformed(start, "identity length overflows"))?;
        let bytes = self.take(padded, "identity runs past end of buffer")?;
        Ok(&bytes[..len])
    }
}

/// Bounded big-endian writer; never writes past the destination.
struct WireWriter<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> WireWriter<'a> {
    const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn reserve(&mut self, len: usize) -> AclResult<&mut [u8]> {
        let available = self.buf.len();
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= available)
            .ok_or(AclError::BufferTooSmall {
                required: self.offset.saturating_add(len),
                available,
            })?;
        let slot = &mut self.buf[self.offset..end];
        self.offset = end;
        Ok(slot)
    }

    fn put_u32(&mut self, value: u32) -> AclResult<()> {
        self.reserve(WORD)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn put_padded(&mut self, bytes: &[u8]) -> AclResult<()> {
        let padded = padded_len(bytes.len()).ok_or_else(|| AclError::invalid("identity too long"))?;
        let slot = self.reserve(padded)?;
        let (data, padding) = slot.split_at_mut(bytes.len());
        data.copy_from_slice(bytes);
        padding.fill(0);
        Ok(())
    }

    const fn finish(self) -> usize {
        self.offset
    }
}

/// Encoder/decoder bound to an identity source and an id domain.
#[derive(Debug, Clone)]
pub struct Nfs4Codec<L = SystemIdentity> {
    lookup: L,
    config: IdmapConfig,
}

impl Nfs4Codec<SystemIdentity> {
    /// Codec using the host account databases and `/etc/idmapd.conf`.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemIdentity, idmap::system_config().clone())
    }
}

impl<L: IdentityLookup> Nfs4Codec<L> {
    /// Creates a codec from an identity source and id-mapping configuration.
    pub const fn new(lookup: L, config: IdmapConfig) -> Self {
        Self { lookup, config }
    }

    /// Returns the id domain used for `name@domain` tokens.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.config.domain()
    }

    /// Returns the exact number of bytes [`encode`](Self::encode) needs.
    pub fn encoded_len(&self, acl: &GenericAcl) -> AclResult<usize> {
        let tokens = self.tokens(acl)?;
        Self::required_len(&tokens)
    }

    /// Encodes `acl` into `buf` and returns the number of bytes written.
    ///
    /// Fails with [`AclError::BufferTooSmall`] before touching `buf` when it
    /// cannot hold the whole encoding.
    pub fn encode(&self, acl: &GenericAcl, buf: &mut [u8]) -> AclResult<usize> {
        let tokens = self.tokens(acl)?;
        let required = Self::required_len(&tokens)?;
        if buf.len() < required {
            return Err(AclError::BufferTooSmall {
                required,
                available: buf.len(),
            });
        }

        let count = u32::try_from(acl.len())
            .map_err(|_| AclError::invalid(format!("{} entries exceed the wire limit", acl.len())))?;
        let mut writer = WireWriter::new(&mut buf[..required]);
        writer.put_u32(count)?;
        for (entry, token) in acl.iter().zip(&tokens) {
            let group_bit = if entry.principal.tag.is_group() {
                ACE_IDENTIFIER_GROUP
            } else {
                0
            };
            let token_len = u32::try_from(token.len())
                .map_err(|_| AclError::invalid("identity token too long"))?;
            writer.put_u32(entry.kind as u32)?;
            writer.put_u32(flags_to_wire(entry.flags) | group_bit)?;
            writer.put_u32(permissions_to_mask(entry.permissions))?;
            writer.put_u32(token_len)?;
            writer.put_padded(token.as_bytes())?;
        }
        let written = writer.finish();
        debug_log!(Codec, 2, "encoded {} entries into {} bytes", acl.len(), written);
        Ok(written)
    }

    /// Encodes `acl` into a freshly allocated buffer of the exact size.
    pub fn encode_to_vec(&self, acl: &GenericAcl) -> AclResult<Vec<u8>> {
        let tokens = self.tokens(acl)?;
        let required = Self::required_len(&tokens)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(required)
            .map_err(|_| AclError::OutOfMemory { requested: required })?;
        buf.resize(required, 0);
        let written = self.encode(acl, &mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Decodes an attribute value into a generic ACL.
    ///
    /// Bytes past the last declared entry are ignored. Unknown permission and
    /// flag bits are dropped.
    pub fn decode(&self, data: &[u8]) -> AclResult<GenericAcl> {
        let mut reader = WireReader::new(data);
        let count = reader.read_u32("missing entry count")? as usize;
        if count > reader.remaining() / MIN_ENTRY_LEN {
            return Err(AclError::malformed(0, "entry count exceeds buffer"));
        }

        let mut acl = GenericAcl::with_capacity(AclType::Nfs4, count)?;
        for _ in 0..count {
            let kind_offset = reader.offset();
            let raw_kind = reader.read_u32("truncated entry type")?;
            let kind = EntryKind::try_from(raw_kind)
                .map_err(|_| AclError::malformed(kind_offset, "unknown entry type"))?;
            let raw_flags = reader.read_u32("truncated entry flags")?;
            let mask = reader.read_u32("truncated access mask")?;
            let who_offset = reader.offset();
            let who_len = reader.read_u32("truncated identity length")? as usize;
            let who = reader.read_padded(who_len)?;
            let who = std::str::from_utf8(who)
                .map_err(|_| AclError::malformed(who_offset, "identity is not valid UTF-8"))?;

            let principal = self.decode_principal(who, raw_flags & ACE_IDENTIFIER_GROUP != 0);
            acl.push(AclEntry {
                kind,
                principal,
                permissions: mask_to_permissions(mask),
                flags: wire_to_flags(raw_flags),
            })?;
        }

        debug_log!(Codec, 2, "decoded {} entries from {} bytes", acl.len(), data.len());
        Ok(acl)
    }

    fn decode_principal(&self, who: &str, group: bool) -> Principal {
        match (group, who) {
            (true, GROUP_TOKEN) => Principal::group_owner(),
            (false, OWNER_TOKEN) => Principal::owner(),
            (false, EVERYONE_TOKEN) => Principal::everyone(),
            _ => self.resolve_token(who, group),
        }
    }

    fn resolve_token(&self, token: &str, group: bool) -> Principal {
        let tag = if group { TagType::Group } else { TagType::User };
        let (name, domain) = match token.split_once('@') {
            Some((name, domain)) => (name, Some(domain)),
            None => (token, None),
        };

        // Only a bare token is a numeric id; `77@elsewhere` stays foreign.
        if let Ok(id) = token.parse::<u32>() {
            return Principal::new(tag, Some(id), token);
        }
        if self.config.matches(domain) {
            if let Some(id) = self.lookup.id_for(name, group) {
                return Principal::new(tag, Some(id), name);
            }
        }
        debug_log!(Idmap, 1, "unresolved identity '{}'", token);
        Principal::new(tag, None, token)
    }

    fn identity_token(&self, principal: &Principal) -> AclResult<String> {
        match principal.tag {
            TagType::UserObject => Ok(OWNER_TOKEN.to_owned()),
            TagType::GroupObject => Ok(GROUP_TOKEN.to_owned()),
            TagType::Everyone => Ok(EVERYONE_TOKEN.to_owned()),
            TagType::User | TagType::Group => {
                let group = principal.tag == TagType::Group;
                let id = principal.id.ok_or_else(|| {
                    AclError::invalid(format!("principal '{}' has no numeric id", principal.name))
                })?;
                Ok(match self.lookup.name_for(id, group) {
                    Some(name) => format!("{name}@{}", self.domain().unwrap_or("")),
                    None => {
                        debug_log!(Idmap, 1, "no name for id {}, encoding numerically", id);
                        id.to_string()
                    }
                })
            }
            TagType::Mask | TagType::Other | TagType::Unknown => Err(AclError::invalid(format!(
                "{:?} principals cannot be encoded as NFSv4 identities",
                principal.tag
            ))),
        }
    }

    fn tokens(&self, acl: &GenericAcl) -> AclResult<Vec<String>> {
        acl.iter()
            .map(|entry| self.identity_token(&entry.principal))
            .collect()
    }

    fn required_len(tokens: &[String]) -> AclResult<usize> {
        tokens.iter().try_fold(WORD, |total, token| {
            padded_len(token.len())
                .and_then(|padded| total.checked_add(MIN_ENTRY_LEN + padded))
                .ok_or_else(|| AclError::invalid("encoded ACL size overflows"))
        })
    }
}

/// Encodes with the host identity databases; see [`Nfs4Codec::encode`].
pub fn encode(acl: &GenericAcl, buf: &mut [u8]) -> AclResult<usize> {
    Nfs4Codec::system().encode(acl, buf)
}

/// Encodes with the host identity databases; see [`Nfs4Codec::encode_to_vec`].
pub fn encode_to_vec(acl: &GenericAcl) -> AclResult<Vec<u8>> {
    Nfs4Codec::system().encode_to_vec(acl)
}

/// Decodes with the host identity databases; see [`Nfs4Codec::decode`].
pub fn decode(data: &[u8]) -> AclResult<GenericAcl> {
    Nfs4Codec::system().decode(data)
}
