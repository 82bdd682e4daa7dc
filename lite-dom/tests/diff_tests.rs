use lite_dom::{
    comment,
    diff::{diff, is_identical, Patch},
    h, text, Document, Props,
};

#[test]
fn props_set_and_remove() {
    let a = h("div", vec![("class", "a"), ("id", "x")], vec![]);
    let b = h("div", vec![("class", "b")], vec![]);

    let patches = diff(&a, &b);

    assert!(patches.contains(&Patch::SetAttr("class".into(), "b".into())));
    assert!(patches.contains(&Patch::RemoveAttr("id".into())));
}

#[test]
fn insert_and_remove_children() {
    let empty = h("ul", Props::new(), vec![]);
    let one = h("ul", Props::new(), vec![text("a")]);
    let two = h("ul", Props::new(), vec![text("a"), text("b")]);

    assert_eq!(diff(&empty, &one), vec![Patch::InsertChild(0, text("a"))]);
    assert_eq!(diff(&two, &one), vec![Patch::RemoveChild(1)]);
}

#[test]
fn replace_on_tag_change() {
    let a = h("div", Props::new(), vec![]);
    let b = h("span", Props::new(), vec![]);
    assert_eq!(diff(&a, &b), vec![Patch::Replace(b.clone())]);
}

#[test]
fn character_data_changes_in_place() {
    assert_eq!(diff(&text("hello"), &text("world")), vec![Patch::SetData("world".into())]);
    assert_eq!(diff(&comment("a"), &comment("b")), vec![Patch::SetData("b".into())]);
    assert_eq!(diff(&text("a"), &comment("a")), vec![Patch::Replace(comment("a"))]);
}

#[test]
fn live_tree_matches_parsed_markup() {
    let doc = Document::new();
    let built = doc.create_element("p");
    doc.set_attribute(built, "class", "x");
    let t = doc.create_text("hi");
    doc.append_child(built, t);

    let parsed = doc.parse_fragment(r#"<p class="x">hi</p>"#);
    let first = doc.first_child(parsed).unwrap();
    assert!(is_identical(&doc.snapshot(built), &doc.snapshot(first)));

    doc.set_data(t, "bye");
    let patches = diff(&doc.snapshot(first), &doc.snapshot(built));
    assert_eq!(patches, vec![Patch::UpdateChild(0, vec![Patch::SetData("bye".into())])]);
}
