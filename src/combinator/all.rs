//! Join-all: aggregate every element's fulfillment, in input order.

use std::mem;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::error::SelfResolution;
use crate::promise::{Promise, Resolution};
use crate::scheduler::SchedulerHandle;

/// Order-preserving slot vector plus the shared pending count.
struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

/// Waits for every element to fulfill, producing the values in input
/// order, not completion order.
///
/// The sequence is traversed eagerly, once. Each element is coerced with
/// [`Promise::resolve`] and observed for its slot. The pending count
/// starts with a +1 bias that is only released after traversal completes,
/// so an element that settles mid-iteration cannot fulfill the result
/// early.
///
/// The first rejection settles the result immediately with that reason;
/// later settlements of sibling elements are no-ops for the result, though
/// the siblings themselves still run to completion.
///
/// An empty sequence fulfills immediately with an empty vector.
///
/// # Example
///
/// ```
/// use promissory::{all, MicrotaskQueue, Promise, Resolution, SelfResolution};
///
/// let (queue, scheduler) = MicrotaskQueue::with_handle();
///
/// let (b, settle_b) = Promise::<i32, SelfResolution>::deferred(&scheduler);
/// let joined = all(&scheduler, [Resolution::Value(1), Resolution::Promise(b)]);
///
/// settle_b.resolve(Resolution::Value(2));
/// queue.run_until_idle();
/// assert_eq!(joined.try_outcome(), Some(Ok(vec![1, 2])));
/// ```
pub fn all<T, E, I>(scheduler: &SchedulerHandle, elements: I) -> Promise<Vec<T>, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
    I: IntoIterator<Item = Resolution<T, E>>,
{
    let (result, settler) = Promise::deferred(scheduler);
    let gather = Arc::new(Mutex::new(Gather {
        slots: Vec::new(),
        // Bias held until traversal finishes, released below.
        remaining: 1,
    }));

    let mut count = 0usize;
    for (index, element) in elements.into_iter().enumerate() {
        count += 1;
        {
            let mut gather = gather.lock().expect("lock poisoned");
            gather.slots.push(None);
            gather.remaining += 1;
        }

        let element_promise = Promise::resolve(scheduler, element);
        let on_fulfilled = settler.clone();
        let on_rejected = settler.clone();
        let gather = Arc::clone(&gather);
        element_promise.register(
            Box::new(move |value| {
                if let Some(values) = record(&gather, index, value) {
                    on_fulfilled.resolve(Resolution::Value(values));
                }
            }),
            Box::new(move |reason| on_rejected.reject(reason)),
        );
    }
    trace!(promise = %result.id(), elements = count, "join-all registered");

    if let Some(values) = release_bias(&gather) {
        settler.resolve(Resolution::Value(values));
    }
    result
}

/// Stores `value` at `index` and decrements the pending count, returning
/// the completed vector when this was the last outstanding element.
fn record<T>(gather: &Arc<Mutex<Gather<T>>>, index: usize, value: T) -> Option<Vec<T>> {
    let mut gather = gather.lock().expect("lock poisoned");
    gather.slots[index] = Some(value);
    decrement(&mut gather)
}

fn release_bias<T>(gather: &Arc<Mutex<Gather<T>>>) -> Option<Vec<T>> {
    let mut gather = gather.lock().expect("lock poisoned");
    decrement(&mut gather)
}

fn decrement<T>(gather: &mut Gather<T>) -> Option<Vec<T>> {
    gather.remaining -= 1;
    if gather.remaining > 0 {
        return None;
    }
    let slots = mem::take(&mut gather.slots);
    Some(
        slots
            .into_iter()
            .map(|slot| slot.expect("pending count reached zero with an empty slot"))
            .collect(),
    )
}
