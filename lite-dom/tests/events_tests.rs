use std::cell::RefCell;
use std::rc::Rc;

use lite_dom::{Document, Event, Listener};

#[test]
fn dispatch_invokes_registered_callbacks() {
    let doc = Document::new();
    let button = doc.create_element("button");

    let seen: Rc<RefCell<Vec<Event>>> = Rc::new(RefCell::new(Vec::new()));
    let listener = {
        let seen = seen.clone();
        Listener::new(move |e| seen.borrow_mut().push(e.clone()))
    };
    doc.add_listener(button, "click", listener.clone());
    doc.add_listener(button, "click", listener);

    assert_eq!(doc.dispatch(button, "click"), 2);
    assert_eq!(doc.dispatch(button, "input"), 0);
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[0], Event { name: "click".into(), target: button });
}

#[test]
fn remove_listener_matches_identity() {
    let doc = Document::new();
    let button = doc.create_element("button");
    let a = Listener::new(|_| {});
    let b = Listener::new(|_| {});
    doc.add_listener(button, "click", a.clone());

    assert!(!doc.remove_listener(button, "click", &b));
    assert!(!doc.remove_listener(button, "input", &a));
    assert!(doc.remove_listener(button, "click", &a));
    assert_eq!(doc.listener_count(button, "click"), 0);
}

#[test]
fn callbacks_may_mutate_the_document() {
    let doc = Document::new();
    let button = doc.create_element("button");
    let weak = doc.downgrade();
    doc.add_listener(
        button,
        "click",
        Listener::new(move |e| {
            if let Some(doc) = weak.upgrade() {
                doc.set_attribute(e.target, "pressed", "");
                doc.add_listener(e.target, "click", Listener::new(|_| {}));
            }
        }),
    );
    assert_eq!(doc.dispatch(button, "click"), 1);
    assert!(doc.has_attribute(button, "pressed"));
    assert_eq!(doc.listener_count(button, "click"), 2);
}
