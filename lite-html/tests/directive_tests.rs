use lite_core::{run_until_idle, Promise};
use lite_dom::{Document, NodeId, NodeType};
use lite_html::{directive, html, render, unsafe_html, until, Value};

fn setup() -> (Document, NodeId) {
    let doc = Document::new();
    let root = doc.create_element("main");
    (doc, root)
}

fn element(doc: &Document, node: NodeId) -> NodeId {
    doc.children(node)
        .into_iter()
        .find(|c| doc.node_type(*c) == NodeType::Element)
        .expect("element child")
}

fn slot(v: Value) -> lite_html::TemplateResult {
    html!("<p>{}</p>", v)
}

#[test]
fn promise_renders_on_a_later_turn() {
    let (doc, root) = setup();
    let (promise, resolver) = Promise::<Value>::new();
    render(slot(promise.into()), &doc, root).unwrap();
    let p = element(&doc, root);
    assert_eq!(doc.text_content(p), "");

    resolver.resolve("done".into());
    assert_eq!(doc.text_content(p), "");
    run_until_idle();
    assert_eq!(doc.text_content(p), "done");
}

#[test]
fn only_the_latest_promise_renders() {
    let (doc, root) = setup();
    let (first, resolve_first) = Promise::<Value>::new();
    let (second, resolve_second) = Promise::<Value>::new();
    render(slot(first.into()), &doc, root).unwrap();
    render(slot(second.clone().into()), &doc, root).unwrap();
    let p = element(&doc, root);

    resolve_first.resolve("stale".into());
    run_until_idle();
    assert_eq!(doc.text_content(p), "");

    // the same promise again is a no-op
    let before = doc.mutation_count();
    render(slot(second.into()), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before);

    resolve_second.resolve("fresh".into());
    run_until_idle();
    assert_eq!(doc.text_content(p), "fresh");
}

#[test]
fn plain_value_supersedes_pending_promise() {
    let (doc, root) = setup();
    let (promise, resolver) = Promise::<Value>::new();
    render(slot(promise.into()), &doc, root).unwrap();
    render(slot("now".into()), &doc, root).unwrap();

    resolver.resolve("later".into());
    run_until_idle();
    assert_eq!(doc.text_content(element(&doc, root)), "now");
}

#[test]
fn until_shows_default_first() {
    let (doc, root) = setup();
    let (promise, resolver) = Promise::<Value>::new();
    render(slot(until(promise.clone(), "loading")), &doc, root).unwrap();
    let p = element(&doc, root);
    assert_eq!(doc.text_content(p), "loading");

    resolver.resolve(html!("<b>{}</b>", "ready").into());
    run_until_idle();
    assert_eq!(doc.text_content(p), "ready");

    // resolved promises render straight away
    render(slot(until(promise, "loading")), &doc, root).unwrap();
    assert_eq!(doc.text_content(p), "ready");
}

#[test]
fn until_works_in_attributes() {
    let (doc, root) = setup();
    let (promise, resolver) = Promise::<Value>::new();
    render(html!("<p title={}></p>", until(promise, "wait")), &doc, root).unwrap();
    let p = element(&doc, root);
    assert_eq!(doc.attribute(p, "title").as_deref(), Some("wait"));

    resolver.resolve("hello".into());
    run_until_idle();
    assert_eq!(doc.attribute(p, "title").as_deref(), Some("hello"));
}

#[test]
fn unsafe_html_renders_markup() {
    let (doc, root) = setup();
    render(slot(unsafe_html("<b>bold</b> <i>it</i>")), &doc, root).unwrap();
    let p = element(&doc, root);
    let b = element(&doc, p);
    assert_eq!(doc.tag_name(b).as_deref(), Some("b"));
    assert_eq!(doc.text_content(p), "bold it");

    render(slot("<b>escaped</b>".into()), &doc, root).unwrap();
    assert_eq!(doc.inner_markup(p), "<!---->&lt;b&gt;escaped&lt;/b&gt;<!---->");
}

#[test]
fn custom_directive_drives_the_part() {
    let (doc, root) = setup();
    let shout = |s: &'static str| directive(move |part| part.set_value(s.to_uppercase().into()));
    render(slot(shout("hi")), &doc, root).unwrap();
    assert_eq!(doc.text_content(element(&doc, root)), "HI");
}

#[test]
fn settled_promise_is_not_rendered_twice() {
    let (doc, root) = setup();
    let promise = Promise::resolved(Value::from("done"));
    render(slot(promise.clone().into()), &doc, root).unwrap();
    run_until_idle();
    let p = element(&doc, root);
    assert_eq!(doc.text_content(p), "done");

    let before = doc.mutation_count();
    render(slot(promise.into()), &doc, root).unwrap();
    assert_eq!(doc.text_content(p), "done");
    run_until_idle();
    assert_eq!(doc.mutation_count(), before);
}

#[test]
fn until_in_a_shared_attribute_writes_once() {
    let (doc, root) = setup();
    let view = |first: Value, second: &str| html!("<p title=\"{} {}\"></p>", first, second);
    render(view("a".into(), "b"), &doc, root).unwrap();
    let p = element(&doc, root);

    let (promise, resolver) = Promise::<Value>::new();
    let before = doc.mutation_count();
    render(view(until(promise, "x"), "y"), &doc, root).unwrap();
    assert_eq!(doc.mutation_count() - before, 1);
    assert_eq!(doc.attribute(p, "title").as_deref(), Some("x y"));

    resolver.resolve("z".into());
    run_until_idle();
    assert_eq!(doc.attribute(p, "title").as_deref(), Some("z y"));
}
