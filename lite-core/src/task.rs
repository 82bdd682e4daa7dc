// lite-core/src/task.rs

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// Tasks scheduled for a later turn, in FIFO order.
thread_local! {
    static TASK_QUEUE: RefCell<VecDeque<Box<dyn FnOnce()>>> = RefCell::new(VecDeque::new());
    static IS_DRAINING: Cell<bool> = Cell::new(false);
}

/// Schedule `f` to run on a later turn of this thread's task queue.
///
/// The task never runs synchronously inside `spawn_local`; it runs the next
/// time the queue is drained with [`run_until_idle`].
pub fn spawn_local<F>(f: F)
where
    F: FnOnce() + 'static,
{
    TASK_QUEUE.with(|q| q.borrow_mut().push_back(Box::new(f)));
}

/// Number of tasks waiting in the queue.
pub fn pending_tasks() -> usize {
    TASK_QUEUE.with(|q| q.borrow().len())
}

/// Run queued tasks until the queue is empty, including tasks that were
/// scheduled by the tasks themselves. Returns how many tasks ran.
///
/// A nested call from inside a running task returns 0 immediately; the outer
/// drain picks up whatever the inner call would have run.
pub fn run_until_idle() -> usize {
    if IS_DRAINING.with(|f| f.replace(true)) {
        return 0;
    }
    let _draining = Draining;

    let mut ran = 0;
    loop {
        // Pop without holding the borrow while the task runs: the task may
        // schedule more work.
        let next = TASK_QUEUE.with(|q| q.borrow_mut().pop_front());
        let Some(task) = next else { break };
        task();
        ran += 1;
    }

    ran
}

// Clears the draining flag even when a task panics.
struct Draining;

impl Drop for Draining {
    fn drop(&mut self) {
        IS_DRAINING.with(|f| f.set(false));
    }
}
