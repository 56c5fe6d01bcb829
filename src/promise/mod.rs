//! The promise state cell, reaction dispatch, and chaining.
//!
//! A [`Promise`] is a cheaply cloneable handle onto one shared state cell:
//!
//! ```text
//!                ┌──────────────────────────────────────────┐
//!                │              PROMISE CELL                │
//!                │                                          │
//!                │   Pending(reactions) ──fulfill──► Fulfilled(value)
//!                │        │                                 │
//!                │        └────────reject────────► Rejected(reason)
//!                └──────────────────────────────────────────┘
//! ```
//!
//! The pending→terminal transition happens exactly once; the losing side of
//! any settlement race is a silent no-op. Settling drains the registered
//! reactions and schedules one job per reaction, in attachment order, on
//! the promise's [`SchedulerHandle`]. Registering against an already
//! settled promise schedules the dispatch immediately, still through the
//! scheduler, never synchronously.
//!
//! # Producer and consumer halves
//!
//! [`Promise::deferred`] splits the cell into a consumer handle and a
//! [`Settler`], the single-use settlement capability, in the same way a
//! oneshot channel splits into a receiver and a sender. [`Promise::new`]
//! layers the initiation-function style on top of it.

mod resolution;
mod settler;
mod thenable;

pub use resolution::Resolution;
pub use settler::Settler;
pub use thenable::{RejectFn, ResolveFn, Thenable};

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;
use tracing::trace;

use crate::error::SelfResolution;
use crate::scheduler::{Scheduler as _, SchedulerHandle};

/// Identity of a promise cell, for diagnostics and tracing.
///
/// Allocated from a process-wide counter; two handles report the same id
/// exactly when they share a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A registered observer: the handlers and dependent settlement are already
/// closed over, so dispatch is just "call with the settled payload".
struct Reaction<T, E> {
    on_fulfilled: Box<dyn FnOnce(T)>,
    on_rejected: Box<dyn FnOnce(E)>,
}

/// Reaction list with an inline first slot; most promises have exactly one
/// observer.
type Reactions<T, E> = SmallVec<[Reaction<T, E>; 1]>;

enum State<T, E> {
    Pending(Reactions<T, E>),
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> State<T, E> {
    const fn tag(&self) -> &'static str {
        match self {
            Self::Pending(_) => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}

pub(crate) struct Shared<T, E> {
    pub(crate) id: PromiseId,
    pub(crate) scheduler: SchedulerHandle,
    state: Mutex<State<T, E>>,
}

impl<T, E> Shared<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Swaps in a terminal state, returning the drained reactions, or
    /// `None` if the cell was already settled.
    fn transition(&self, next: State<T, E>) -> Option<Reactions<T, E>> {
        let mut state = self.state.lock().expect("lock poisoned");
        if !matches!(*state, State::Pending(_)) {
            return None;
        }
        match mem::replace(&mut *state, next) {
            State::Pending(reactions) => Some(reactions),
            _ => None,
        }
    }

    pub(crate) fn fulfill(&self, value: T) {
        let Some(reactions) = self.transition(State::Fulfilled(value.clone())) else {
            return;
        };
        trace!(promise = %self.id, reactions = reactions.len(), "fulfilled");
        for reaction in reactions {
            let handler = reaction.on_fulfilled;
            let value = value.clone();
            self.scheduler.schedule(Box::new(move || handler(value)));
        }
    }

    pub(crate) fn reject(&self, reason: E) {
        let Some(reactions) = self.transition(State::Rejected(reason.clone())) else {
            return;
        };
        trace!(promise = %self.id, reactions = reactions.len(), "rejected");
        for reaction in reactions {
            let handler = reaction.on_rejected;
            let reason = reason.clone();
            self.scheduler.schedule(Box::new(move || handler(reason)));
        }
    }
}

/// A one-shot broadcast of a single eventual outcome.
///
/// `Promise<T, E>` settles exactly once, to a fulfillment value `T` or a
/// rejection reason `E`, and delivers that outcome to any number of
/// observers in attachment order. Handles are cheap clones of a shared
/// cell.
///
/// The reason type carries `E: From<SelfResolution>` so the resolution
/// algorithm can reject a cycle with a typed reason; see
/// [`SelfResolution`].
///
/// # Example
///
/// ```
/// use promissory::{MicrotaskQueue, Promise, Resolution, SelfResolution};
///
/// #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// #[error("{0}")]
/// struct Reason(&'static str);
///
/// impl From<SelfResolution> for Reason {
///     fn from(_: SelfResolution) -> Self {
///         Self("self resolution")
///     }
/// }
///
/// let (queue, scheduler) = MicrotaskQueue::with_handle();
/// let (promise, settler) = Promise::<&str, Reason>::deferred(&scheduler);
///
/// let length = promise.then(|v| Resolution::Value(v.len()));
/// settler.resolve(Resolution::Value("hello"));
///
/// queue.run_until_idle();
/// assert_eq!(length.try_outcome(), Some(Ok(5)));
/// ```
pub struct Promise<T, E> {
    pub(crate) shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
{
    /// Creates a pending promise and its settlement capability.
    ///
    /// The oneshot-style split: the promise is the consumer half, the
    /// [`Settler`] the producer half.
    #[must_use]
    pub fn deferred(scheduler: &SchedulerHandle) -> (Self, Settler<T, E>) {
        let shared = Arc::new(Shared {
            id: PromiseId::next(),
            scheduler: Arc::clone(scheduler),
            state: Mutex::new(State::Pending(SmallVec::new())),
        });
        let settler = Settler::new(Arc::clone(&shared));
        (Self { shared }, settler)
    }

    /// Creates a promise and synchronously runs `initiate` with its
    /// settlement capability.
    ///
    /// An `Err` return rejects the promise, but only if `initiate` did not
    /// already settle it through the settler.
    pub fn new<F>(scheduler: &SchedulerHandle, initiate: F) -> Self
    where
        F: FnOnce(Settler<T, E>) -> Result<(), E>,
    {
        let (promise, settler) = Self::deferred(scheduler);
        let guard = settler.clone();
        if let Err(reason) = initiate(settler) {
            guard.reject(reason);
        }
        promise
    }

    /// Coerces a [`Resolution`] to a promise.
    ///
    /// `Resolution::Promise` is returned unchanged (keeping its own
    /// scheduler); everything else is wrapped through the resolution
    /// algorithm on a fresh promise.
    #[must_use]
    pub fn resolve(scheduler: &SchedulerHandle, resolution: Resolution<T, E>) -> Self {
        if let Resolution::Promise(promise) = resolution {
            return promise;
        }
        let (promise, settler) = Self::deferred(scheduler);
        settler.resolve(resolution);
        promise
    }

    /// Creates a promise rejected with `reason`.
    ///
    /// Always wraps: a reason is carried verbatim, never adopted, even if
    /// the reason type happens to be promise-like.
    #[must_use]
    pub fn reject(scheduler: &SchedulerHandle, reason: E) -> Self {
        let (promise, settler) = Self::deferred(scheduler);
        settler.reject(reason);
        promise
    }

    /// Registers a fulfillment handler; returns the dependent promise.
    ///
    /// The handler's [`Resolution`] settles the dependent promise, so
    /// returning `Resolution::Promise`/`Resolution::Foreign` chains and
    /// flattens, and `Resolution::Reject` rejects it. A rejection of
    /// `self` passes through to the dependent promise unchanged.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Resolution<U, E> + 'static,
    {
        let (dependent, settler) = Promise::deferred(&self.shared.scheduler);
        let pass_rejection = settler.clone();
        self.register(
            Box::new(move |value| settler.resolve(on_fulfilled(value))),
            Box::new(move |reason| pass_rejection.reject(reason)),
        );
        dependent
    }

    /// Registers a rejection handler; returns the dependent promise.
    ///
    /// Sugar for the rejection arm of [`then_catch`](Self::then_catch): a
    /// fulfillment of `self` passes through unchanged, a rejection runs the
    /// handler, whose resolution may recover (`Value`/`Promise`/`Foreign`)
    /// or re-reject (`Reject`).
    pub fn catch<R>(&self, on_rejected: R) -> Promise<T, E>
    where
        R: FnOnce(E) -> Resolution<T, E> + 'static,
    {
        let (dependent, settler) = Promise::deferred(&self.shared.scheduler);
        let pass_fulfillment = settler.clone();
        self.register(
            Box::new(move |value| pass_fulfillment.resolve(Resolution::Value(value))),
            Box::new(move |reason| settler.resolve(on_rejected(reason))),
        );
        dependent
    }

    /// Registers both handlers; returns the dependent promise.
    pub fn then_catch<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Resolution<U, E> + 'static,
        R: FnOnce(E) -> Resolution<U, E> + 'static,
    {
        let (dependent, settler) = Promise::deferred(&self.shared.scheduler);
        let on_reject = settler.clone();
        self.register(
            Box::new(move |value| settler.resolve(on_fulfilled(value))),
            Box::new(move |reason| on_reject.resolve(on_rejected(reason))),
        );
        dependent
    }

    /// Maps the fulfillment value, leaving rejections untouched.
    pub fn map<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.then(move |value| Resolution::Value(f(value)))
    }

    /// Maps the rejection reason, leaving fulfillments untouched.
    pub fn map_err<F>(&self, f: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> E + 'static,
    {
        self.catch(move |reason| Resolution::Reject(f(reason)))
    }

    /// Returns the settled outcome, or `None` while pending.
    ///
    /// Non-blocking inspection; clones the payload.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Result<T, E>> {
        match &*self.shared.state.lock().expect("lock poisoned") {
            State::Pending(_) => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    /// Returns true while no settlement has taken effect.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(
            *self.shared.state.lock().expect("lock poisoned"),
            State::Pending(_)
        )
    }

    /// Returns this promise's id.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.shared.id
    }

    /// Returns the scheduler this promise dispatches on.
    #[must_use]
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.shared.scheduler
    }

    /// Returns true if both handles share one cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Registers a raw reaction: append while pending, or schedule the
    /// matching handler immediately (still deferred) when already settled.
    pub(crate) fn register(
        &self,
        on_fulfilled: Box<dyn FnOnce(T)>,
        on_rejected: Box<dyn FnOnce(E)>,
    ) {
        enum Attached<T, E> {
            Queued,
            Fulfilled(T, Box<dyn FnOnce(T)>),
            Rejected(E, Box<dyn FnOnce(E)>),
        }

        let attached = {
            let mut state = self.shared.state.lock().expect("lock poisoned");
            match &mut *state {
                State::Pending(reactions) => {
                    reactions.push(Reaction {
                        on_fulfilled,
                        on_rejected,
                    });
                    Attached::Queued
                }
                State::Fulfilled(value) => Attached::Fulfilled(value.clone(), on_fulfilled),
                State::Rejected(reason) => Attached::Rejected(reason.clone(), on_rejected),
            }
        };

        match attached {
            Attached::Queued => {}
            Attached::Fulfilled(value, handler) => {
                trace!(promise = %self.shared.id, "reaction registered on fulfilled promise");
                self.shared.scheduler.schedule(Box::new(move || handler(value)));
            }
            Attached::Rejected(reason, handler) => {
                trace!(promise = %self.shared.id, "reaction registered on rejected promise");
                self.shared.scheduler.schedule(Box::new(move || handler(reason)));
            }
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .shared
            .state
            .try_lock()
            .map_or("locked", |state| state.tag());
        f.debug_struct("Promise")
            .field("id", &self.shared.id)
            .field("state", &state)
            .finish()
    }
}
