//! Promissory: a deferred-settlement ("promise") primitive for Rust.
//!
//! # Overview
//!
//! A [`Promise`] models the eventual completion of an asynchronous operation
//! with exactly one of two terminal outcomes: a fulfillment value or a
//! rejection reason. The crate is built around three guarantees:
//!
//! - **Settle-once**: the first settlement wins; every later attempt, from
//!   any source, is a silent no-op
//! - **Never synchronous**: reaction handlers run via the injected
//!   deferred-callback scheduler, never from inside `then`, a constructor,
//!   or another handler's stack frame
//! - **Transparent flattening**: resolving a promise with another promise
//!   (or any foreign [`Thenable`]) adopts that source's eventual outcome
//!   rather than nesting it
//!
//! # Scheduling Model
//!
//! The crate does not own an event loop. Every promise carries a
//! [`SchedulerHandle`], an injected capability that accepts zero-argument
//! jobs and runs them later, in FIFO order, after the current synchronous
//! execution completes. [`MicrotaskQueue`] is the bundled implementation:
//! a manually pumped FIFO queue that doubles as a deterministic test
//! scheduler. Embedders with a real event loop implement [`Scheduler`] on
//! their own tick primitive.
//!
//! # Module Structure
//!
//! - [`scheduler`]: the deferred-callback capability and the FIFO queue
//! - [`promise`]: the state cell, resolution algorithm, and chaining
//! - [`combinator`]: `all` and `race` aggregation over many promises
//! - [`error`]: library error values
//!
//! # Example
//!
//! ```
//! use promissory::{MicrotaskQueue, Promise, Resolution, SelfResolution};
//!
//! #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
//! #[error("failure: {0}")]
//! struct Failure(&'static str);
//!
//! impl From<SelfResolution> for Failure {
//!     fn from(_: SelfResolution) -> Self {
//!         Failure("self resolution")
//!     }
//! }
//!
//! let (queue, scheduler) = MicrotaskQueue::with_handle();
//!
//! let (promise, settler) = Promise::<i32, Failure>::deferred(&scheduler);
//! let doubled = promise.then(|v| Resolution::Value(v * 2));
//!
//! settler.resolve(Resolution::Value(21));
//! assert_eq!(doubled.try_outcome(), None); // nothing runs synchronously
//!
//! queue.run_until_idle();
//! assert_eq!(doubled.try_outcome(), Some(Ok(42)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod error;
pub mod promise;
pub mod scheduler;

pub use combinator::{all, race};
pub use error::SelfResolution;
pub use promise::{Promise, PromiseId, RejectFn, ResolveFn, Resolution, Settler, Thenable};
pub use scheduler::{Job, MicrotaskQueue, Scheduler, SchedulerHandle};
