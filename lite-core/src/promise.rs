// lite-core/src/promise.rs

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::task::spawn_local;

type Callback<T> = Box<dyn FnOnce(T)>;

enum State<T> {
    Pending(Vec<Callback<T>>),
    Resolved(T),
}

/// A single-threaded thenable.
///
/// Continuations registered with [`Promise::then`] always run on a later turn
/// of the task queue, never inside `then` or `resolve`. Two handles are the
/// same promise when they point at the same allocation.
pub struct Promise<T> {
    state: Rc<RefCell<State<T>>>,
}

/// The resolving half of a pending [`Promise`].
pub struct Resolver<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = matches!(*self.state.borrow(), State::Resolved(_));
        f.debug_struct("Promise").field("resolved", &resolved).finish()
    }
}

impl<T> Promise<T>
where
    T: Clone + 'static,
{
    /// Create a pending promise and the resolver that settles it.
    pub fn new() -> (Self, Resolver<T>) {
        let state = Rc::new(RefCell::new(State::Pending(Vec::new())));
        (Self { state: state.clone() }, Resolver { state })
    }

    /// Create a promise that is already settled with `value`.
    pub fn resolved(value: T) -> Self {
        Self { state: Rc::new(RefCell::new(State::Resolved(value))) }
    }

    /// Register a continuation. It runs on a later turn with a clone of the
    /// resolved value.
    pub fn then<F>(&self, f: F)
    where
        F: FnOnce(T) + 'static,
    {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            State::Pending(callbacks) => callbacks.push(Box::new(f)),
            State::Resolved(value) => {
                let value = value.clone();
                spawn_local(move || f(value));
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), State::Resolved(_))
    }

    /// The settled value, if any.
    pub fn value(&self) -> Option<T> {
        match &*self.state.borrow() {
            State::Resolved(value) => Some(value.clone()),
            State::Pending(_) => None,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> Resolver<T>
where
    T: Clone + 'static,
{
    /// Settle the promise. Continuations are queued, not run. A second call
    /// is ignored.
    pub fn resolve(&self, value: T) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                State::Resolved(_) => return,
                State::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *state = State::Resolved(value.clone());
                    callbacks
                }
            }
        };
        for callback in callbacks {
            let value = value.clone();
            spawn_local(move || callback(value));
        }
    }
}
