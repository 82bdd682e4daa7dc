use std::cell::Cell;
use std::rc::Rc;

use lite_dom::{Document, Listener, NodeId, NodeType};
use lite_html::{html, render, AttributeBehavior, Value};

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

#[test]
fn prefixes_select_behavior() {
    assert_eq!(AttributeBehavior::parse(".value"), (AttributeBehavior::Property, "value"));
    assert_eq!(AttributeBehavior::parse("?hidden"), (AttributeBehavior::BooleanToggle, "hidden"));
    assert_eq!(AttributeBehavior::parse("@click"), (AttributeBehavior::Subscription, "click"));
    assert_eq!(AttributeBehavior::parse("title"), (AttributeBehavior::Literal, "title"));
}

#[test]
fn property_binding_assigns_the_raw_value() {
    let (doc, root) = setup();
    render(html!("<input .value={}>", 42), &doc, root).unwrap();
    let input = element(&doc, root);

    let value = doc.property(input, "value").unwrap();
    let value = value.downcast_ref::<Value>().unwrap();
    assert!(value.same(&Value::Int(42)));
    assert!(doc.attributes(input).is_empty());
}

#[test]
fn boolean_binding_toggles_presence() {
    let (doc, root) = setup();
    let view = |on: bool| html!("<input ?disabled={}>", on);

    render(view(true), &doc, root).unwrap();
    let input = element(&doc, root);
    assert_eq!(doc.attribute(input, "disabled").as_deref(), Some(""));

    render(view(false), &doc, root).unwrap();
    assert!(!doc.has_attribute(input, "disabled"));
}

#[test]
fn listener_binding_replaces_only_on_identity_change() {
    let (doc, root) = setup();
    let view = |l: Listener| html!("<button @click={}>go</button>", l);

    let clicks = Rc::new(Cell::new(0));
    let first = {
        let clicks = clicks.clone();
        Listener::new(move |_| clicks.set(clicks.get() + 1))
    };
    render(view(first.clone()), &doc, root).unwrap();
    let button = element(&doc, root);
    assert_eq!(doc.dispatch(button, "click"), 1);
    assert_eq!(clicks.get(), 1);

    let before = doc.mutation_count();
    render(view(first.clone()), &doc, root).unwrap();
    assert_eq!(doc.mutation_count(), before);
    assert_eq!(doc.listener_count(button, "click"), 1);

    let second_hits = Rc::new(Cell::new(0));
    let second = {
        let hits = second_hits.clone();
        Listener::new(move |_| hits.set(hits.get() + 1))
    };
    render(view(second), &doc, root).unwrap();
    doc.dispatch(button, "click");
    assert_eq!(doc.listener_count(button, "click"), 1);
    assert_eq!(clicks.get(), 1);
    assert_eq!(second_hits.get(), 1);
}

#[test]
fn listener_binding_ignores_other_values() {
    let (doc, root) = setup();
    render(html!("<button @click={}></button>", "not a listener"), &doc, root).unwrap();
    let button = element(&doc, root);
    assert_eq!(doc.listener_count(button, "click"), 0);
}

#[test]
fn lone_attribute_bound_to_nothing_is_removed() {
    let (doc, root) = setup();
    let view = |href: Option<&str>| html!("<a href={}>x</a>", href.map(str::to_string));

    render(view(Some("/home")), &doc, root).unwrap();
    let a = element(&doc, root);
    assert_eq!(doc.attribute(a, "href").as_deref(), Some("/home"));

    render(view(None), &doc, root).unwrap();
    assert!(!doc.has_attribute(a, "href"));

    render(view(Some("/again")), &doc, root).unwrap();
    assert_eq!(doc.attribute(a, "href").as_deref(), Some("/again"));
}

#[test]
fn comment_binding_joins_segments() {
    let (doc, root) = setup();
    render(html!("<div><!--a{}b{}--></div>", 1, "x"), &doc, root).unwrap();
    let div = element(&doc, root);
    let comment = doc.first_child(div).unwrap();
    assert_eq!(doc.node_type(comment), NodeType::Comment);
    assert_eq!(doc.data(comment).as_deref(), Some("a1bx"));
}

#[test]
fn raw_text_binding_sets_element_text() {
    let (doc, root) = setup();
    let view = |color: &str| html!("<style>p {{ color: {} }}</style>", color);

    render(view("red"), &doc, root).unwrap();
    let style = element(&doc, root);
    assert_eq!(doc.text_content(style), "p { color: red }");

    render(view("blue"), &doc, root).unwrap();
    assert_eq!(doc.inner_markup(style), "p { color: blue }");
}
