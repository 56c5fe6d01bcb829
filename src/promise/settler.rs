//! The settlement capability and the resolution algorithm.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::resolution::Resolution;
use super::thenable::Thenable as _;
use super::Shared;
use crate::error::SelfResolution;
use crate::scheduler::Scheduler as _;

/// The producer half of a promise: the capability to settle it.
///
/// Returned by [`Promise::deferred`](super::Promise::deferred) and passed to
/// the initiation function of [`Promise::new`](super::Promise::new). Clones
/// share one settle-once latch: across all clones, only the first call to
/// [`resolve`](Settler::resolve) or [`reject`](Settler::reject) has any
/// effect, even when a later adoption step for that first call is still in
/// flight.
pub struct Settler<T, E> {
    shared: Arc<Shared<T, E>>,
    latch: Arc<AtomicBool>,
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            latch: Arc::clone(&self.latch),
        }
    }
}

impl<T, E> std::fmt::Debug for Settler<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settler")
            .field("promise", &self.shared.id)
            .field("used", &self.latch.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T, E> Settler<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
{
    pub(super) fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self {
            shared,
            latch: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A settler for the same cell with a fresh latch.
    ///
    /// Each adoption step gets its own "already called" guard, independent
    /// of the latch that admitted the step. The cell's own pending→terminal
    /// transition stays the final arbiter.
    fn renew(&self) -> Self {
        Self::new(Arc::clone(&self.shared))
    }

    /// Claims the latch. Only the first claim across all clones succeeds.
    fn claim(&self) -> bool {
        !self.latch.swap(true, Ordering::AcqRel)
    }

    /// Runs the resolution algorithm against `resolution`.
    ///
    /// - `Value` fulfills the promise directly
    /// - `Promise` adopts the other promise's eventual outcome; resolving
    ///   a promise with itself rejects with [`SelfResolution`]
    /// - `Foreign` schedules one adoption job that subscribes to the
    ///   thenable with freshly latched callbacks
    /// - `Reject` rejects with the carried reason
    ///
    /// Any call after the first effective `resolve`/`reject` on this
    /// settler (or any clone of it) is a no-op.
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        if !self.claim() {
            return;
        }
        match resolution {
            Resolution::Value(value) => self.shared.fulfill(value),
            Resolution::Reject(reason) => self.shared.reject(reason),
            Resolution::Promise(source) => {
                if Arc::ptr_eq(&source.shared, &self.shared) {
                    debug!(promise = %self.shared.id, "rejecting self resolution");
                    self.shared.reject(E::from(SelfResolution));
                    return;
                }
                trace!(promise = %self.shared.id, source = %source.shared.id, "adopting promise");
                let adopt = self.renew();
                let adopt_reject = adopt.clone();
                source.register(
                    Box::new(move |value| adopt.resolve(Resolution::Value(value))),
                    Box::new(move |reason| adopt_reject.reject(reason)),
                );
            }
            Resolution::Foreign(thenable) => {
                trace!(promise = %self.shared.id, "adopting foreign thenable");
                let adopt = self.renew();
                self.shared.scheduler.schedule(Box::new(move || {
                    let on_resolve = adopt.clone();
                    let on_reject = adopt.clone();
                    if let Err(reason) = thenable.subscribe(
                        Box::new(move |resolution| on_resolve.resolve(resolution)),
                        Box::new(move |reason| on_reject.reject(reason)),
                    ) {
                        adopt.reject(reason);
                    }
                }));
            }
        }
    }

    /// Rejects the promise with `reason`.
    ///
    /// A no-op after the first effective settlement call.
    pub fn reject(&self, reason: E) {
        if !self.claim() {
            return;
        }
        self.shared.reject(reason);
    }
}
