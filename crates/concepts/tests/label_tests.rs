use concepts::{ConceptError, LabelConcept};
use doc_store::{DocId, Filter, Update};

fn id(n: u32) -> DocId {
    format!("00000000-0000-4000-8000-{n:012x}")
        .parse()
        .expect("id")
}

#[test]
fn create_and_query_by_name() {
    let labels = LabelConcept::in_memory();
    labels.create("team", id(10)).expect("create");
    labels.create("urgent", id(11)).expect("create");

    let team = labels
        .get_labels(&Filter::all().eq("name", "team"))
        .expect("labels");
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].fields.target, id(10));
}

#[test]
fn empty_filter_lists_every_label() {
    let labels = LabelConcept::in_memory();
    labels.create("a", id(10)).expect("create");
    labels.create("b", id(11)).expect("create");
    let all = labels.get_labels(&Filter::all()).expect("labels");
    assert_eq!(all.len(), 2);
}

#[test]
fn update_may_touch_the_name_only() {
    let labels = LabelConcept::in_memory();
    let label = labels.create("team", id(10)).expect("create");

    labels
        .update(label.id, &Update::new().set("name", "newname"))
        .expect("rename");
    let doc = &labels.get_labels(&Filter::by_id(label.id)).expect("labels")[0];
    assert_eq!(doc.fields.name, "newname");

    let err = labels
        .update(label.id, &Update::new().set("target", id(11)))
        .expect_err("target is off the allow-list");
    assert!(matches!(err, ConceptError::NotAuthorized(_)));
    let doc = &labels.get_labels(&Filter::by_id(label.id)).expect("labels")[0];
    assert_eq!(doc.fields.target, id(10));
}

#[test]
fn delete_removes_the_label() {
    let labels = LabelConcept::in_memory();
    let label = labels.create("team", id(10)).expect("create");
    labels.delete(label.id).expect("delete");
    assert!(labels
        .get_labels(&Filter::by_id(label.id))
        .expect("labels")
        .is_empty());

    // Deleting an unknown label is a no-op.
    labels.delete(label.id).expect("noop");
}
