//! First-settled: forward whichever element settles first.

use tracing::trace;

use crate::error::SelfResolution;
use crate::promise::{Promise, Resolution};
use crate::scheduler::SchedulerHandle;

/// Settles with the first element to settle, fulfilled or rejected.
///
/// Every element is coerced with [`Promise::resolve`] and wired to one
/// shared settlement capability; the result promise's own settle-once
/// latch makes the first forwarded settlement win and every later one a
/// no-op. Losing elements still run to their own settlement; there is no
/// cancellation.
///
/// An empty sequence leaves the result pending forever. That mirrors the
/// reference algorithm and is deliberate: there is no outcome an empty
/// race could honestly report.
///
/// # Example
///
/// ```
/// use promissory::{race, MicrotaskQueue, Promise, Resolution, SelfResolution};
///
/// let (queue, scheduler) = MicrotaskQueue::with_handle();
///
/// let (slow, _keep_pending) = Promise::<&str, SelfResolution>::deferred(&scheduler);
/// let first = race(
///     &scheduler,
///     [Resolution::Promise(slow), Resolution::Value("fast")],
/// );
///
/// queue.run_until_idle();
/// assert_eq!(first.try_outcome(), Some(Ok("fast")));
/// ```
pub fn race<T, E, I>(scheduler: &SchedulerHandle, elements: I) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
    I: IntoIterator<Item = Resolution<T, E>>,
{
    let (result, settler) = Promise::deferred(scheduler);

    let mut count = 0usize;
    for element in elements {
        count += 1;
        let element_promise = Promise::resolve(scheduler, element);
        let on_fulfilled = settler.clone();
        let on_rejected = settler.clone();
        element_promise.register(
            Box::new(move |value| on_fulfilled.resolve(Resolution::Value(value))),
            Box::new(move |reason| on_rejected.reject(reason)),
        );
    }
    trace!(promise = %result.id(), elements = count, "race registered");

    result
}
