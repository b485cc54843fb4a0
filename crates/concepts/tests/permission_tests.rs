use concepts::{ConceptError, PermissionConcept};
use doc_store::{DocId, Filter};

fn id(n: u32) -> DocId {
    format!("00000000-0000-4000-8000-{n:012x}")
        .parse()
        .expect("id")
}

#[test]
fn duplicate_grant_is_rejected() {
    let perms = PermissionConcept::in_memory();
    perms.grant_permission(id(1), id(10)).expect("grant");

    let err = perms.grant_permission(id(1), id(10)).expect_err("dup");
    assert!(matches!(err, ConceptError::NotAuthorized(_)));

    let all = perms.get_perms(&Filter::all()).expect("perms");
    assert_eq!(all.len(), 1);
}

#[test]
fn queries_by_user_resource_and_pair() {
    let perms = PermissionConcept::in_memory();
    perms.grant_permission(id(1), id(10)).expect("grant");
    perms.grant_permission(id(1), id(11)).expect("grant");
    perms.grant_permission(id(2), id(10)).expect("grant");

    assert_eq!(perms.get_by_user(id(1)).expect("by user").len(), 2);
    assert_eq!(perms.get_by_resource(id(10)).expect("by resource").len(), 2);
    assert!(perms.get_specific(id(1), id(10)).expect("pair").is_some());
    assert!(perms.get_specific(id(2), id(11)).expect("pair").is_none());
}

#[test]
fn queries_return_most_recent_first() {
    let perms = PermissionConcept::in_memory();
    perms.grant_permission(id(1), id(10)).expect("grant");
    let latest = perms.grant_permission(id(1), id(11)).expect("grant");

    let by_user = perms.get_by_user(id(1)).expect("by user");
    assert_eq!(by_user[0].id, latest.id);
}

#[test]
fn remove_by_identity() {
    let perms = PermissionConcept::in_memory();
    let grant = perms.grant_permission(id(1), id(10)).expect("grant");

    perms.remove_permission(grant.id).expect("remove");
    assert!(perms.get_specific(id(1), id(10)).expect("pair").is_none());

    // Removing again is a no-op.
    perms.remove_permission(grant.id).expect("noop");
}

#[test]
fn revoke_by_exact_pair() {
    let perms = PermissionConcept::in_memory();
    perms.grant_permission(id(1), id(10)).expect("grant");
    perms.grant_permission(id(1), id(11)).expect("grant");

    perms.revoke_specific(id(1), id(10)).expect("revoke");
    assert!(perms.get_specific(id(1), id(10)).expect("pair").is_none());
    assert!(perms.get_specific(id(1), id(11)).expect("pair").is_some());

    perms.revoke_specific(id(3), id(30)).expect("noop");
}

#[test]
fn grant_is_allowed_again_after_revoke() {
    let perms = PermissionConcept::in_memory();
    perms.grant_permission(id(1), id(10)).expect("grant");
    perms.revoke_specific(id(1), id(10)).expect("revoke");
    perms.grant_permission(id(1), id(10)).expect("regrant");
}
