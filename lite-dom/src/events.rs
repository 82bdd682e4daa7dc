use std::fmt;
use std::rc::Rc;

use crate::{Document, NodeId};

/// What a listener receives when an event is dispatched on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub target: NodeId,
}

/// A subscribed callback. Two listeners are the same subscription when they
/// share an allocation.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    pub fn new<F: Fn(&Event) + 'static>(f: F) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Listener")
    }
}

impl Document {
    pub fn add_listener(&self, id: NodeId, event: impl Into<String>, listener: Listener) {
        self.inner.nodes.borrow_mut()[id.index()]
            .listeners
            .push((event.into(), listener));
        self.mutated();
    }

    /// Remove one subscription of `listener` for `event`. Returns whether one
    /// was found.
    pub fn remove_listener(&self, id: NodeId, event: &str, listener: &Listener) -> bool {
        let mut nodes = self.inner.nodes.borrow_mut();
        let listeners = &mut nodes[id.index()].listeners;
        let Some(pos) = listeners
            .iter()
            .position(|(name, l)| name == event && l.ptr_eq(listener))
        else {
            return false;
        };
        listeners.remove(pos);
        drop(nodes);
        self.mutated();
        true
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.inner.nodes.borrow()[id.index()]
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Invoke every listener for `event` on `target`, in subscription order.
    /// Returns the number of callbacks invoked. There is no bubbling.
    pub fn dispatch(&self, target: NodeId, event: &str) -> usize {
        // Snapshot first: a callback may mutate the document.
        let targets: Vec<Listener> = self.inner.nodes.borrow()[target.index()]
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, l)| l.clone())
            .collect();
        let ev = Event { name: event.to_string(), target };
        for listener in &targets {
            listener.call(&ev);
        }
        targets.len()
    }
}
