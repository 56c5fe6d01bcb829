//! State-cell settlement semantics: settle-once, self-resolution, and the
//! initiation function.

mod common;

use common::{boom, lab, TestError};
use promissory::{Promise, Resolution, Scheduler as _};
use proptest::prelude::*;

type TestPromise = Promise<i32, TestError>;

#[test]
fn first_fulfillment_wins_over_later_rejection() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);

    settler.resolve(Resolution::Value(1));
    settler.reject(boom("late"));
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Ok(1)));
}

#[test]
fn first_rejection_wins_over_later_fulfillment() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);

    settler.reject(boom("first"));
    settler.resolve(Resolution::Value(2));
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Err(boom("first"))));
}

#[test]
fn settler_clones_share_one_latch() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);
    let other = settler.clone();

    settler.resolve(Resolution::Value(1));
    other.resolve(Resolution::Value(2));
    other.reject(boom("late"));
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Ok(1)));
}

#[test]
fn reactions_observe_only_the_first_outcome() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);

    let seen = common::log();
    let on_ok = seen.clone();
    let on_err = seen.clone();
    let observed = promise.then_catch(
        move |_| {
            common::push(&on_ok, "fulfilled");
            Resolution::Value(())
        },
        move |_| {
            common::push(&on_err, "rejected");
            Resolution::Value(())
        },
    );

    settler.resolve(Resolution::Value(1));
    settler.reject(boom("late"));
    queue.run_until_idle();

    assert_eq!(common::entries(&seen), vec!["fulfilled"]);
    assert_eq!(observed.try_outcome(), Some(Ok(())));
}

#[test]
fn initiation_error_rejects() {
    let (queue, handle) = lab();
    let promise = TestPromise::new(&handle, |_settler| Err(boom("init")));
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Err(boom("init"))));
}

#[test]
fn initiation_error_after_settlement_is_ignored() {
    let (queue, handle) = lab();
    let promise = TestPromise::new(&handle, |settler| {
        settler.resolve(Resolution::Value(7));
        Err(boom("too late"))
    });
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Ok(7)));
}

#[test]
fn initiation_may_defer_settlement() {
    let (queue, handle) = lab();
    let scheduler = handle.clone();
    let promise = TestPromise::new(&handle, move |settler| {
        scheduler.schedule(Box::new(move || settler.resolve(Resolution::Value(9))));
        Ok(())
    });

    assert!(promise.is_pending());
    queue.run_until_idle();
    assert_eq!(promise.try_outcome(), Some(Ok(9)));
}

#[test]
fn self_resolution_rejects_instead_of_hanging() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);

    settler.resolve(Resolution::Promise(promise.clone()));

    // Settled on the spot: no adoption job exists that could hang.
    assert!(queue.is_empty());
    assert!(matches!(
        promise.try_outcome(),
        Some(Err(TestError::Cycle(_)))
    ));
    queue.run_until_idle();
    assert!(matches!(
        promise.try_outcome(),
        Some(Err(TestError::Cycle(_)))
    ));
}

#[test]
fn self_resolution_loses_to_an_earlier_settlement() {
    let (queue, handle) = lab();
    let (promise, settler) = TestPromise::deferred(&handle);

    settler.resolve(Resolution::Value(3));
    settler.resolve(Resolution::Promise(promise.clone()));
    queue.run_until_idle();

    assert_eq!(promise.try_outcome(), Some(Ok(3)));
}

proptest! {
    /// For any sequence of settlement calls, only the first has an effect.
    #[test]
    fn only_the_first_settlement_call_wins(
        ops in proptest::collection::vec((any::<bool>(), 0i32..100), 1..8),
    ) {
        let (queue, handle) = lab();
        let (promise, settler) = TestPromise::deferred(&handle);

        for (fulfill, value) in &ops {
            if *fulfill {
                settler.resolve(Resolution::Value(*value));
            } else {
                settler.reject(boom("op"));
            }
        }
        queue.run_until_idle();

        let (first_fulfill, first_value) = ops[0];
        let expected = if first_fulfill {
            Ok(first_value)
        } else {
            Err(boom("op"))
        };
        prop_assert_eq!(promise.try_outcome(), Some(expected));
    }
}
