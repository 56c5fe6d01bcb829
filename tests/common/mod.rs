#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use promissory::{
    MicrotaskQueue, Promise, Resolution, Scheduler as _, SchedulerHandle, SelfResolution, Settler,
};
use std::sync::{Arc, Mutex, Once};
use thiserror::Error;

static INIT_LOGGING: Once = Once::new();

/// Initializes tracing output for tests, once per process.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Rejection reason used across the integration suites.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestError {
    /// A test-injected failure.
    #[error("boom: {0}")]
    Boom(&'static str),
    /// The library's self-resolution rejection.
    #[error(transparent)]
    Cycle(#[from] SelfResolution),
}

pub fn boom(tag: &'static str) -> TestError {
    TestError::Boom(tag)
}

/// A fresh manually pumped queue plus its scheduler handle.
pub fn lab() -> (Arc<MicrotaskQueue>, SchedulerHandle) {
    init_logging();
    MicrotaskQueue::with_handle()
}

/// A promise that settles with `resolution` after `turns` microtask hops.
///
/// `turns` is the number of queue jobs consumed before settlement, so
/// relative delays are deterministic under a single drain: fewer hops
/// settles first.
pub fn delayed<T, E>(
    scheduler: &SchedulerHandle,
    turns: usize,
    resolution: Resolution<T, E>,
) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
{
    let (promise, settler) = Promise::deferred(scheduler);
    hop(Arc::clone(scheduler), turns, settler, resolution);
    promise
}

fn hop<T, E>(
    scheduler: SchedulerHandle,
    turns: usize,
    settler: Settler<T, E>,
    resolution: Resolution<T, E>,
) where
    T: Clone + 'static,
    E: Clone + From<SelfResolution> + 'static,
{
    if turns == 0 {
        settler.resolve(resolution);
        return;
    }
    let next = Arc::clone(&scheduler);
    scheduler.schedule(Box::new(move || hop(next, turns - 1, settler, resolution)));
}

/// Order-of-events log shared between handlers and assertions.
pub type Log = Arc<Mutex<Vec<&'static str>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn push(log: &Log, entry: &'static str) {
    log.lock().unwrap().push(entry);
}

pub fn entries(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}
