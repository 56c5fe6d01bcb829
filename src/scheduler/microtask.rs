//! Manually pumped FIFO job queue.
//!
//! `MicrotaskQueue` is the bundled [`Scheduler`] implementation. It is a
//! plain FIFO queue with no thread of its own: the embedder (or a test)
//! drains it explicitly with [`run_until_idle`](MicrotaskQueue::run_until_idle)
//! or [`step`](MicrotaskQueue::step). Jobs scheduled while the queue is
//! draining join the back of the same drain pass, which is exactly the
//! microtask behavior the promise core relies on.
//!
//! [`with_handle`](MicrotaskQueue::with_handle) splits the queue into a
//! pumping half and a scheduling half, the way a channel splits into a
//! receiver and a sender: keep the `Arc<MicrotaskQueue>` for draining and
//! hand the [`SchedulerHandle`] to promise constructors.
//!
//! ```
//! use promissory::{MicrotaskQueue, Scheduler};
//!
//! let (queue, scheduler) = MicrotaskQueue::with_handle();
//!
//! scheduler.schedule(Box::new(|| {}));
//! assert_eq!(queue.len(), 1);
//! assert_eq!(queue.run_until_idle(), 1);
//! assert!(queue.is_empty());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use super::{Job, Scheduler, SchedulerHandle};

/// A FIFO deferred-callback queue, drained by hand.
#[derive(Default)]
pub struct MicrotaskQueue {
    jobs: Mutex<VecDeque<Job>>,
    draining: AtomicBool,
}

impl MicrotaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue and a [`SchedulerHandle`] backed by it.
    ///
    /// Keep the queue half for pumping; pass the handle to promise
    /// constructors.
    #[must_use]
    pub fn with_handle() -> (Arc<Self>, SchedulerHandle) {
        let queue = Arc::new(Self::new());
        let handle: SchedulerHandle = queue.clone();
        (queue, handle)
    }

    /// Returns the number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().expect("lock poisoned").len()
    }

    /// Returns true if no jobs are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs at most one job. Returns true if a job ran.
    pub fn step(&self) -> bool {
        let job = self.jobs.lock().expect("lock poisoned").pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Drains the queue in FIFO order, including jobs enqueued by the jobs
    /// being run. Returns the number of jobs executed.
    ///
    /// A nested call from inside a running job is a no-op returning zero;
    /// the outer drain pass picks up whatever the job scheduled. Without
    /// the guard a nested drain would run younger jobs ahead of older ones.
    pub fn run_until_idle(&self) -> usize {
        if self.draining.swap(true, Ordering::Acquire) {
            return 0;
        }
        let mut ran = 0usize;
        while self.step() {
            ran += 1;
        }
        self.draining.store(false, Ordering::Release);
        trace!(jobs = ran, "microtask queue drained");
        ran
    }
}

impl Scheduler for MicrotaskQueue {
    fn schedule(&self, job: Job) {
        self.jobs.lock().expect("lock poisoned").push_back(job);
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("jobs", &self.len())
            .field("draining", &self.draining.load(Ordering::Relaxed))
            .finish()
    }
}
