//! End-to-end checks of the `gacl` facade: model, codec, renderer and walker
//! used together the way a command layer would.

use std::path::PathBuf;

use gacl::{
    AclEntry, AclErrorKind, AclType, EntryKind, Error, FileTypeFilter, Flag, GenericAcl,
    Ownership, Permission, Permissions, Principal, Renderer, Style, WalkEntry,
};
use metadata::StaticIdentity;
use test_support::TempTree;

fn sample_acl() -> GenericAcl {
    let mut acl = GenericAcl::new(AclType::Nfs4);
    acl.push(
        AclEntry::allow(Principal::owner())
            .with_permissions("rwxp----------".parse::<Permissions>().expect("perms")),
    )
    .expect("owner");
    acl.push(
        AclEntry::deny(Principal::user(1000))
            .with_permissions(Permission::WriteData)
            .with_flags(Flag::FileInherit | Flag::DirectoryInherit),
    )
    .expect("user");
    acl.push(AclEntry::allow(Principal::everyone()).with_permissions(Permission::ReadData))
        .expect("everyone");
    acl
}

#[test]
fn codec_round_trip_keeps_entry_order() {
    let acl = sample_acl();
    let bytes = gacl::encode_to_vec(&acl).expect("encode");

    let mut buf = vec![0_u8; bytes.len()];
    assert_eq!(gacl::encode(&acl, &mut buf).expect("encode into"), bytes.len());
    assert_eq!(buf, bytes);

    let decoded = gacl::decode(&bytes).expect("decode");
    let kinds: Vec<EntryKind> = decoded.iter().map(|entry| entry.kind).collect();
    assert_eq!(kinds, [EntryKind::Allow, EntryKind::Deny, EntryKind::Allow]);
    assert_eq!(decoded.get(1).map(|e| e.principal.id), Some(Some(1000)));
}

#[test]
fn truncated_wire_data_is_malformed() {
    let bytes = gacl::encode_to_vec(&sample_acl()).expect("encode");
    let error = gacl::decode(&bytes[..bytes.len() - 1]).expect_err("truncated");
    assert_eq!(error.kind(), AclErrorKind::MalformedData);

    let error: Error = error.into();
    assert!(error.path().is_none());
}

#[test]
fn rendered_lines_follow_style() {
    let identities = StaticIdentity::new().user(1000, "alice").group(100, "staff");
    let acl = sample_acl();
    let owner = Some(Ownership::new(1000, 100));

    let symbolic = Renderer::with_lookup(Style::Symbolic, &identities)
        .render_acl(&acl, owner)
        .expect("symbolic");
    assert_eq!(
        symbolic,
        [
            "owner@:rwxp----------:-------:allow",
            "u:alice:-w------------:fd-----:deny",
            "everyone@:r-------------:-------:allow",
        ]
    );

    let samba = Renderer::with_lookup(Style::Samba, &identities)
        .render_acl(&acl, owner)
        .expect("samba");
    assert_eq!(samba[0], "ACL:alice:ALLOWED//R|W|X|AD\trwxp----------");
    assert_eq!(samba[1], "ACL:alice:DENIED/OI|CI/W\t-w------------");

    let icacls = Renderer::with_lookup(Style::Icacls, &identities)
        .render_acl(&acl, owner)
        .expect("icacls");
    assert_eq!(icacls[2], "Everyone:(R)");
}

#[test]
fn walk_reports_tree_in_depth_first_order() {
    let tree = TempTree::new()
        .and_then(|tree| tree.file("a.txt", b"a"))
        .and_then(|tree| tree.file("dir/b.txt", b"b"))
        .expect("tree");

    let mut seen = Vec::new();
    gacl::walk(tree.path(), None, FileTypeFilter::empty(), |entry: &WalkEntry| {
        seen.push((entry.relative_path().to_path_buf(), entry.depth()));
        Ok::<_, Error>(())
    })
    .expect("walk");

    assert_eq!(
        seen,
        [
            (PathBuf::new(), 0),
            (PathBuf::from("a.txt"), 1),
            (PathBuf::from("dir"), 1),
            (PathBuf::from("dir/b.txt"), 2),
        ]
    );
}

#[test]
fn walk_failure_surfaces_as_facade_error() {
    let tree = TempTree::new().expect("tree");
    let missing = tree.join("missing");

    let result = gacl::walk(&missing, Some(0), FileTypeFilter::empty(), |_| Ok::<_, Error>(()));
    match result {
        Err(error @ Error::Walk(_)) => assert_eq!(error.path(), Some(missing.as_path())),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[cfg(all(target_os = "linux", feature = "acl"))]
#[test]
fn walk_acls_stops_at_first_unreadable_acl() {
    let tree = TempTree::new()
        .and_then(|tree| tree.file("plain.txt", b"x"))
        .expect("tree");

    let mut visited = 0;
    let result = gacl::walk_acls(
        tree.path(),
        None,
        FileTypeFilter::empty(),
        &gacl::AclOptions::new(),
        |_, _| {
            visited += 1;
            Ok(())
        },
    );

    // Local filesystems carry no `system.nfs4_acl` attribute.
    match result {
        Err(Error::Acl(error)) => {
            assert_eq!(error.kind(), AclErrorKind::Io);
            assert_eq!(error.path(), Some(tree.path()));
        }
        Ok(()) => assert!(visited > 0),
        Err(other) => panic!("unexpected error: {other}"),
    }
}
