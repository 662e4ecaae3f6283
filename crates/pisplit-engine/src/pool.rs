//! Bounded worker pool with joinable task handles.
//!
//! The execution service behind the evaluator's fork points: a fixed set of
//! OS threads draining one bounded channel. Submission blocks while the
//! backlog is at capacity (backpressure, never rejection), so callers size
//! the queue against their maximum in-flight fan-out (the binary uses three
//! slots per worker). A worker that unwinds mid-task keeps running; the
//! failure surfaces as [`ComputeError::TaskLost`] at the task's join.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, warn};

use pisplit_core::error::ComputeError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable submission handle to the pool's queue.
///
/// Tasks may capture a clone to submit nested work; the pool only drains
/// fully once every outstanding handle has been dropped.
#[derive(Clone)]
pub struct TaskExecutor {
    queue: Sender<Job>,
}

/// Result handle for one submitted task.
pub struct TaskHandle<T> {
    result: Receiver<Result<T, ComputeError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes and take its result.
    ///
    /// Returns [`ComputeError::TaskLost`] when the worker dropped the task
    /// without producing a result: a panic inside the job, or a pool that
    /// shut down before the job ran.
    pub fn join(self) -> Result<T, ComputeError> {
        match self.result.recv() {
            Ok(result) => result,
            Err(_) => Err(ComputeError::TaskLost),
        }
    }
}

impl TaskExecutor {
    /// Queue a job, blocking while the backlog is full.
    pub fn submit<T, F>(&self, job: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ComputeError> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let wrapped: Job = Box::new(move || {
            let _ = tx.send(job());
        });
        // A closed queue means the pool is gone; the rejected job is dropped
        // here, which closes the result channel and makes the join report
        // TaskLost.
        let _ = self.queue.send(wrapped);
        TaskHandle { result: rx }
    }
}

/// Fixed-size worker pool over one bounded queue.
pub struct WorkerPool {
    executor: TaskExecutor,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads sharing a queue with `queue_capacity` slots.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = bounded::<Job>(queue_capacity);
        let workers = (0..workers)
            .map(|id| {
                let rx = rx.clone();
                thread::spawn(move || worker_loop(id, rx))
            })
            .collect();
        Self {
            executor: TaskExecutor { queue: tx },
            workers,
        }
    }

    /// Submission handle; clones are cheap.
    pub fn executor(&self) -> TaskExecutor {
        self.executor.clone()
    }

    /// Close the queue and wait for every worker to drain and exit.
    ///
    /// Outstanding [`TaskExecutor`] clones keep the queue open, so callers
    /// drop the driver (and any stray executors) first; tasks still in
    /// flight run to completion before the workers stop.
    pub fn shutdown(self) {
        let WorkerPool { executor, workers } = self;
        drop(executor);
        for handle in workers {
            if handle.join().is_err() {
                warn!("worker thread terminated abnormally");
            }
        }
    }
}

fn worker_loop(id: usize, queue: Receiver<Job>) {
    debug!(worker = id, "worker started");
    while let Ok(job) = queue.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!(worker = id, "task panicked; the failure surfaces at its join handle");
        }
    }
    debug!(worker = id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_and_join_round_trip() {
        let pool = WorkerPool::new(2, 6);
        let handle = pool.executor().submit(|| Ok(21 * 2));
        assert_eq!(handle.join(), Ok(42));
        pool.shutdown();
    }

    #[test]
    fn task_error_reaches_the_join() {
        let pool = WorkerPool::new(1, 3);
        let handle = pool
            .executor()
            .submit::<(), _>(|| Err(ComputeError::DivisionByZero));
        assert_eq!(handle.join(), Err(ComputeError::DivisionByZero));
        pool.shutdown();
    }

    #[test]
    fn panicking_task_surfaces_as_lost() {
        let pool = WorkerPool::new(1, 3);
        let handle = pool.executor().submit::<(), _>(|| panic!("boom"));
        assert_eq!(handle.join(), Err(ComputeError::TaskLost));
        // The worker survives the panic and keeps serving.
        let next = pool.executor().submit(|| Ok(7));
        assert_eq!(next.join(), Ok(7));
        pool.shutdown();
    }

    #[test]
    fn backlog_larger_than_queue_completes() {
        let pool = WorkerPool::new(2, 2);
        let executor = pool.executor();
        let handles: Vec<_> = (0..20u64).map(|i| executor.submit(move || Ok(i * i))).collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join(), Ok((i * i) as u64));
        }
        drop(executor);
        pool.shutdown();
    }

    #[test]
    fn nested_submission_joins_from_inside_a_task() {
        let pool = WorkerPool::new(2, 6);
        let executor = pool.executor();
        let inner_executor = pool.executor();
        let handle = executor.submit(move || {
            let inner = inner_executor.submit(|| Ok(10));
            inner.join().map(|v| v + 1)
        });
        assert_eq!(handle.join(), Ok(11));
        drop(executor);
        pool.shutdown();
    }

    #[test]
    fn join_after_shutdown_still_delivers() {
        let pool = WorkerPool::new(1, 3);
        let handle = pool.executor().submit(|| Ok("done"));
        pool.shutdown();
        assert_eq!(handle.join(), Ok("done"));
    }
}
