//! Scheduling primitives shared by the lite crates.
//!
//! Everything here is single-threaded: the queue is thread-local and
//! [`Promise`] is `!Send`.

pub mod promise;
pub mod task;

pub use promise::{Promise, Resolver};
pub use task::{pending_tasks, run_until_idle, spawn_local};
