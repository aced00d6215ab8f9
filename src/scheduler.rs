//! Priority-ordered work queue feeding a fixed worker-thread pool, yielding
//! results to the caller as they complete.
//!
//! Grounded on this crate's existing `Arc`-shared-callback pattern
//! (`differ::Differ::progress_fn`) for cross-thread state, generalized from a
//! single callback to a full submit/collect queue. A worker is free to submit
//! further work from inside its own closure — this is how `HashDiffer`'s
//! recursive bisection keeps the pool fed.

use crate::error::DiffError;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

/// A unit of work: runs once on a worker thread (or inline, in serial mode),
/// with a handle it can use to submit further work or push a result.
pub type Job<T> = Box<dyn FnOnce(&SchedulerHandle<T>) + Send>;

struct QueueEntry<T> {
    priority: i64,
    seq: u64,
    job: Job<T>,
}

impl<T> PartialEq for QueueEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl<T> Eq for QueueEntry<T> {}

impl<T> PartialOrd for QueueEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueueEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; among equal priorities, lower seq (submitted
        // earlier) first — BinaryHeap is a max-heap so the seq comparison is
        // reversed to get FIFO-within-priority.
        self.priority.cmp(&other.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner<T> {
    queue: Mutex<BinaryHeap<QueueEntry<T>>>,
    queue_cv: Condvar,
    results: Mutex<VecDeque<Result<T, DiffError>>>,
    results_cv: Condvar,
    next_seq: AtomicU64,
    /// Jobs submitted but not yet finished running, including ones submitted
    /// recursively from inside a running job. Reaches zero only when every
    /// branch of recursive submission has completed.
    pending: AtomicI64,
    closed: std::sync::atomic::AtomicBool,
}

/// A cloneable reference to a running scheduler, passed to each job so it can
/// submit more work or report a result.
#[derive(Clone)]
pub struct SchedulerHandle<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> SchedulerHandle<T> {
    /// Enqueue `job` at `priority` (higher runs first; ties are FIFO).
    pub fn submit<F>(&self, priority: i64, job: F)
    where
        F: FnOnce(&SchedulerHandle<T>) + Send + 'static,
    {
        self.inner.pending.fetch_add(1, AtomicOrdering::SeqCst);
        let seq = self.inner.next_seq.fetch_add(1, AtomicOrdering::SeqCst);
        let entry = QueueEntry { priority, seq, job: Box::new(job) };
        let mut queue = self.inner.queue.lock().expect("scheduler queue mutex poisoned");
        queue.push(entry);
        self.inner.queue_cv.notify_one();
    }

    /// Make one result available to the caller's iteration.
    pub fn push(&self, result: Result<T, DiffError>) {
        let mut results = self.inner.results.lock().expect("scheduler results mutex poisoned");
        results.push_back(result);
        self.inner.results_cv.notify_all();
    }

    fn finish_one(&self) {
        self.inner.pending.fetch_sub(1, AtomicOrdering::SeqCst);
        self.inner.results_cv.notify_all();
        self.inner.queue_cv.notify_all();
    }
}

/// A priority work queue backed by `n_workers` OS threads (or none, in serial
/// mode). Drop (or `close()`) stops accepting new work and joins workers.
pub struct Scheduler<T: Send + 'static> {
    handle: SchedulerHandle<T>,
    worker_threads: Vec<thread::JoinHandle<()>>,
    serial: bool,
}

impl<T: Send + 'static> Scheduler<T> {
    /// `n_workers == 1` (or `0`) runs every job synchronously, inline, in the
    /// submitting thread — useful for deterministic tests and debugging.
    pub fn new(n_workers: usize) -> Self {
        let inner = Arc::new(Inner {
            queue: Mutex::new(BinaryHeap::new()),
            queue_cv: Condvar::new(),
            results: Mutex::new(VecDeque::new()),
            results_cv: Condvar::new(),
            next_seq: AtomicU64::new(0),
            pending: AtomicI64::new(0),
            closed: std::sync::atomic::AtomicBool::new(false),
        });
        let handle = SchedulerHandle { inner: inner.clone() };
        let serial = n_workers <= 1;

        let mut worker_threads = Vec::new();
        if !serial {
            for _ in 0..n_workers {
                let worker_handle = SchedulerHandle { inner: inner.clone() };
                worker_threads.push(thread::spawn(move || worker_loop(worker_handle)));
            }
        }

        Self { handle, worker_threads, serial }
    }

    pub fn handle(&self) -> SchedulerHandle<T> {
        self.handle.clone()
    }

    /// Enqueue `job` at `priority`. In serial mode this runs `job` immediately.
    pub fn submit<F>(&self, priority: i64, job: F)
    where
        F: FnOnce(&SchedulerHandle<T>) + Send + 'static,
    {
        if self.serial {
            self.handle.inner.pending.fetch_add(1, AtomicOrdering::SeqCst);
            job(&self.handle);
            self.handle.finish_one();
        } else {
            self.handle.submit(priority, job);
        }
    }

    /// Block until a result is ready, or `None` once every submitted (and
    /// recursively submitted) job has completed.
    pub fn next_result(&self) -> Option<Result<T, DiffError>> {
        let inner = &self.handle.inner;
        let mut results = inner.results.lock().expect("scheduler results mutex poisoned");
        loop {
            if let Some(result) = results.pop_front() {
                return Some(result);
            }
            if inner.pending.load(AtomicOrdering::SeqCst) <= 0 {
                return None;
            }
            results = inner.results_cv.wait(results).expect("scheduler results mutex poisoned");
        }
    }

    /// Drain remaining results, stop accepting new work, and join workers.
    pub fn close(mut self) {
        self.close_mut();
    }

    fn close_mut(&mut self) {
        self.handle.inner.closed.store(true, AtomicOrdering::SeqCst);
        self.handle.inner.queue_cv.notify_all();
        for t in self.worker_threads.drain(..) {
            let _ = t.join();
        }
    }
}

impl<T: Send + 'static> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.close_mut();
    }
}

impl<T: Send + 'static> Iterator for Scheduler<T> {
    type Item = Result<T, DiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result()
    }
}

fn worker_loop<T: Send + 'static>(handle: SchedulerHandle<T>) {
    loop {
        let job = {
            let mut queue = handle.inner.queue.lock().expect("scheduler queue mutex poisoned");
            loop {
                if let Some(entry) = queue.pop() {
                    break Some(entry.job);
                }
                if handle.inner.closed.load(AtomicOrdering::SeqCst) {
                    break None;
                }
                queue = handle.inner.queue_cv.wait(queue).expect("scheduler queue mutex poisoned");
            }
        };

        match job {
            Some(job) => {
                job(&handle);
                handle.finish_one();
            }
            None => break,
        }
    }
}
