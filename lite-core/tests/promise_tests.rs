use std::cell::RefCell;
use std::rc::Rc;

use lite_core::{Promise, run_until_idle};

#[test]
fn then_runs_on_a_later_turn() {
    let (promise, resolver) = Promise::<i32>::new();
    let seen = Rc::new(RefCell::new(None));
    {
        let seen = seen.clone();
        promise.then(move |v| *seen.borrow_mut() = Some(v));
    }

    resolver.resolve(7);
    // Resolution queues the continuation; it has not run yet
    assert_eq!(*seen.borrow(), None);
    assert!(promise.is_resolved());

    run_until_idle();
    assert_eq!(*seen.borrow(), Some(7));
}

#[test]
fn then_on_resolved_promise_is_still_deferred() {
    let promise = Promise::resolved("done".to_string());
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = seen.clone();
        promise.then(move |v| seen.borrow_mut().push(v));
    }
    assert!(seen.borrow().is_empty());
    run_until_idle();
    assert_eq!(*seen.borrow(), vec!["done".to_string()]);
}

#[test]
fn second_resolve_is_ignored() {
    let (promise, resolver) = Promise::new();
    resolver.resolve(1);
    resolver.resolve(2);
    assert_eq!(promise.value(), Some(1));
}

#[test]
fn identity_follows_the_allocation() {
    let (a, _ra) = Promise::<i32>::new();
    let (b, _rb) = Promise::<i32>::new();
    let a2 = a.clone();
    assert!(a.ptr_eq(&a2));
    assert!(!a.ptr_eq(&b));
}
