use lite_dom::diff::diff;
use lite_dom::{Document, NodeId, NodeType};
use lite_html::{html, render, rendered_part, TemplateError, TemplateResult, Value};

fn setup() -> (Document, NodeId) {
    let doc = Document::new();
    let root = doc.create_element("main");
    (doc, root)
}

/// First element child of `node`.
fn element(doc: &Document, node: NodeId) -> NodeId {
    doc.children(node)
        .into_iter()
        .find(|c| doc.node_type(*c) == NodeType::Element)
        .expect("element child")
}

fn para(n: i32) -> TemplateResult {
    html!("<p>{}</p>", n)
}

#[test]
fn rerender_reuses_paragraph() {
    let (doc, root) = setup();
    render(para(1), &doc, root).unwrap();
    let p = element(&doc, root);
    assert_eq!(doc.inner_markup(root), "<!----><p><!---->1<!----></p><!---->");

    for n in 2..=3 {
        render(para(n), &doc, root).unwrap();
        assert_eq!(element(&doc, root), p);
        assert_eq!(doc.text_content(p), n.to_string());
    }
    assert!(rendered_part(&doc, root).is_some());
}

#[test]
fn first_render_replaces_existing_children() {
    let (doc, root) = setup();
    let old = doc.create_text("server rendered");
    doc.append_child(root, old);

    render(para(1), &doc, root).unwrap();
    assert_eq!(doc.parent(old), None);
    assert_eq!(doc.text_content(root), "1");
}

#[test]
fn rendering_unchanged_values_is_idempotent() {
    let (doc, root) = setup();
    let view = |title: &str, body: i32| html!("<div class={}>{}</div>", title, body);

    render(view("a", 1), &doc, root).unwrap();
    let before = doc.mutation_count();
    render(view("a", 1), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before);

    // one changed primitive is one write
    render(view("a", 2), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before + 1);
}

fn list(items: Vec<i32>) -> TemplateResult {
    html!("<ul>{}</ul>", items)
}

#[test]
fn iterable_grows_shrinks_and_regrows() {
    let (doc, root) = setup();
    for items in [vec![1, 2, 3], vec![1, 2, 3, 4, 5], vec![], vec![9]] {
        render(list(items.clone()), &doc, root).unwrap();
        let ul = element(&doc, root);
        let expected: String = items.iter().map(i32::to_string).collect();
        assert_eq!(doc.text_content(ul), expected);
    }

    let (fresh, fresh_root) = setup();
    render(list(vec![9]), &fresh, fresh_root).unwrap();
    assert_eq!(doc.snapshot(root), fresh.snapshot(fresh_root));
    assert!(diff(&doc.snapshot(root), &fresh.snapshot(fresh_root)).is_empty());
}

#[test]
fn iterable_of_templates() {
    let (doc, root) = setup();
    let items = |n: usize| -> TemplateResult {
        let lis: Vec<TemplateResult> = (0..n).map(|i| html!("<li>{}</li>", i)).collect();
        html!("<ul>{}</ul>", lis)
    };

    render(items(3), &doc, root).unwrap();
    let ul = element(&doc, root);
    let first_li = element(&doc, ul);
    assert_eq!(doc.to_markup(ul).matches("<li>").count(), 3);

    render(items(1), &doc, root).unwrap();
    assert_eq!(doc.to_markup(ul).matches("<li>").count(), 1);
    assert_eq!(element(&doc, ul), first_li);

    render(items(4), &doc, root).unwrap();
    assert_eq!(doc.text_content(ul), "0123");
}

#[test]
fn multi_hole_attribute_commits_once() {
    let (doc, root) = setup();
    let view = |x: i32, y: i32| html!("<div a=\"{} e {}\"></div>", x, y);

    render(view(1, 2), &doc, root).unwrap();
    let div = element(&doc, root);
    assert_eq!(doc.attribute(div, "a").as_deref(), Some("1 e 2"));

    let before = doc.mutation_count();
    render(view(1, 3), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before + 1);
    assert_eq!(doc.attribute(div, "a").as_deref(), Some("1 e 3"));
}

fn view_a(n: i32) -> TemplateResult {
    html!("<p class=\"a\">{}</p>", n)
}

fn view_b(n: i32) -> TemplateResult {
    html!("<span>{}</span>", n)
}

#[test]
fn alternating_templates_reuse_instances() {
    let (doc, root) = setup();
    render(view_a(1), &doc, root).unwrap();
    let p = element(&doc, root);
    doc.set_attribute(p, "data-touched", "yes");

    render(view_b(1), &doc, root).unwrap();
    let span = element(&doc, root);
    assert_eq!(doc.tag_name(span).as_deref(), Some("span"));
    assert_ne!(doc.parent(p), Some(root));

    render(view_a(2), &doc, root).unwrap();
    assert_eq!(element(&doc, root), p);
    assert_eq!(doc.attribute(p, "data-touched").as_deref(), Some("yes"));
    assert_eq!(doc.text_content(p), "2");

    render(view_b(2), &doc, root).unwrap();
    assert_eq!(element(&doc, root), span);
    assert_eq!(doc.text_content(root), "2");
}

#[test]
fn ambiguous_tag_end_fails_to_render() {
    let (doc, root) = setup();
    let err = render(html!("<div a=\">\" b={}></div>", 1), &doc, root).unwrap_err();
    assert_eq!(err, TemplateError::AmbiguousTagEnd { tag: "div".into() });
}

#[test]
fn wrong_value_count_fails_to_render() {
    let (doc, root) = setup();
    let err = render(html!("<p>{}</p>"), &doc, root).unwrap_err();
    assert_eq!(err, TemplateError::ValueCount { expected: 1, actual: 0 });
}

#[test]
fn nothing_clears_and_nested_templates_render() {
    let (doc, root) = setup();
    let view = |inner: Value| html!("<section>{}</section>", inner);

    render(view(html!("<b>{}</b>", "bold").into()), &doc, root).unwrap();
    let section = element(&doc, root);
    assert_eq!(doc.text_content(section), "bold");
    assert_eq!(doc.tag_name(element(&doc, section)).as_deref(), Some("b"));

    render(view(Value::Nothing), &doc, root).unwrap();
    assert_eq!(doc.text_content(section), "");
    assert_eq!(doc.child_count(section), 2);
}

#[test]
fn nodes_and_fragments_as_values() {
    let (doc, root) = setup();
    let view = |v: Value| html!("<div>{}</div>", v);

    let em = doc.create_element("em");
    render(view(em.into()), &doc, root).unwrap();
    let div = element(&doc, root);
    assert_eq!(doc.parent(em), Some(div));

    let before = doc.mutation_count();
    render(view(em.into()), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before);

    let frag = doc.parse_fragment("<i>a</i><b>b</b>");
    render(view(frag.into()), &doc, root).unwrap();
    assert_eq!(doc.parent(em), None);
    assert_eq!(doc.text_content(div), "ab");
    assert_eq!(doc.child_count(frag), 0);

    // cleared fragment content goes back home
    render(view("text".into()), &doc, root).unwrap();
    assert_eq!(doc.child_count(frag), 2);
    assert_eq!(doc.text_content(div), "text");
}
