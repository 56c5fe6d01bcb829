//! The deferred-callback scheduler capability.
//!
//! The core never invokes a reaction handler synchronously. Every handler
//! invocation, and every foreign-thenable adoption step, is wrapped in a
//! [`Job`] and handed to a [`Scheduler`], an injected capability that must
//! satisfy one contract:
//!
//! > A scheduled job runs *later*, after the current synchronous execution
//! > completes, and jobs run in FIFO order relative to each other.
//!
//! The scheduler is passed explicitly at promise construction and inherited
//! by dependent promises; there is no hidden process-wide queue. That makes
//! the execution order of an entire promise graph deterministic under the
//! bundled [`MicrotaskQueue`], which a test (or a simple embedder) pumps by
//! hand.
//!
//! Hosts with a real event loop implement [`Scheduler`] over their own
//! "next tick" primitive and pass the handle in the same way.

pub mod microtask;

pub use microtask::MicrotaskQueue;

use std::sync::Arc;

/// A deferred unit of work: invoke a reaction handler, or run one
/// foreign-thenable adoption step.
pub type Job = Box<dyn FnOnce()>;

/// Shared handle to an injected scheduler.
pub type SchedulerHandle = Arc<dyn Scheduler>;

/// The deferred-callback capability required by the promise core.
///
/// Implementations must run jobs after the current synchronous execution
/// completes (never re-entrantly inside `schedule`) and must preserve FIFO
/// order between jobs scheduled on the same handle.
pub trait Scheduler {
    /// Accepts a job to run later.
    fn schedule(&self, job: Job);
}
