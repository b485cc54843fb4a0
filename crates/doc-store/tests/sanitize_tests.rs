use doc_store::{sanitize_update, StoreError, Update};

#[test]
fn allows_fields_on_the_list() {
    let update = Update::new().set("expire", 1_700_000_000_000_i64);
    sanitize_update(&update, &["expire"]).expect("allowed");
}

#[test]
fn rejects_any_field_off_the_list() {
    let update = Update::new()
        .set("expire", 1_700_000_000_000_i64)
        .set("resource", "someone-else");
    let err = sanitize_update(&update, &["expire"]).expect_err("disallowed");
    match err {
        StoreError::DisallowedField(field) => assert_eq!(field, "resource"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_update_passes() {
    sanitize_update(&Update::new(), &["name"]).expect("empty");
}

#[test]
fn empty_allow_list_rejects_everything() {
    let update = Update::new().set("name", "x");
    let err = sanitize_update(&update, &[]).expect_err("disallowed");
    assert!(matches!(err, StoreError::DisallowedField(_)));
}
