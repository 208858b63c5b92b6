//! Single-threaded job loop.
//!
//! A tick loop is one tokio task draining a queue of jobs in order. Jobs
//! submitted to the same loop never run concurrently with each other, which
//! is what gives a region its single-threaded view of the world.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, trace};

/// Unit of work executed on a loop.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sending side of a loop. Cheap to clone.
#[derive(Clone, Debug)]
pub struct TickLoop {
    name: Arc<str>,
    jobs: mpsc::UnboundedSender<Job>,
    /// Jobs queued or running. Shared by every handle and the worker.
    backlog: Arc<AtomicUsize>,
}

impl TickLoop {
    /// Starts a loop task named `name`.
    pub fn spawn(name: impl Into<Arc<str>>) -> (Self, JoinHandle<()>) {
        let name = name.into();
        let backlog = Arc::new(AtomicUsize::new(0));
        let (jobs, rx) = mpsc::unbounded_channel();
        let worker = LoopWorker {
            name: name.clone(),
            jobs: rx,
            backlog: Arc::clone(&backlog),
        };
        let handle = tokio::spawn(worker.run());
        (
            Self {
                name,
                jobs,
                backlog,
            },
            handle,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queues a job. Returns false if the loop has stopped.
    pub fn submit(&self, job: Job) -> bool {
        self.backlog.fetch_add(1, Ordering::SeqCst);
        if self.jobs.send(job).is_err() {
            self.backlog.fetch_sub(1, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// True if this is the only handle and no job is queued or running.
    pub fn is_idle(&self) -> bool {
        // The worker holds the other reference.
        Arc::strong_count(&self.backlog) <= 2 && self.backlog.load(Ordering::SeqCst) == 0
    }
}

struct LoopWorker {
    name: Arc<str>,
    jobs: mpsc::UnboundedReceiver<Job>,
    backlog: Arc<AtomicUsize>,
}

impl LoopWorker {
    async fn run(mut self) {
        trace!(target: "runtime::scheduler", loop_name = %self.name, "tick loop started");
        loop {
            tokio::select! {
                Some(job) = self.jobs.recv() => {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!(
                            target: "runtime::scheduler",
                            loop_name = %self.name,
                            "job panicked, loop continues"
                        );
                    }
                    self.backlog.fetch_sub(1, Ordering::SeqCst);
                }
                else => break,
            }
        }
        trace!(target: "runtime::scheduler", loop_name = %self.name, "tick loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn jobs_run_in_submission_order() {
        let (tick_loop, handle) = TickLoop::spawn("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let seen = Arc::clone(&seen);
            assert!(tick_loop.submit(Box::new(move || seen.lock().unwrap().push(i))));
        }
        drop(tick_loop);
        handle.await.expect("loop task");

        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn panicking_job_does_not_kill_loop() {
        let (tick_loop, handle) = TickLoop::spawn("test");
        let ran = Arc::new(Mutex::new(false));

        tick_loop.submit(Box::new(|| panic!("boom")));
        let flag = Arc::clone(&ran);
        tick_loop.submit(Box::new(move || *flag.lock().unwrap() = true));
        drop(tick_loop);
        handle.await.expect("loop task");

        assert!(*ran.lock().unwrap());
    }

    #[tokio::test]
    async fn idle_only_without_other_handles_or_backlog() {
        let (tick_loop, _handle) = TickLoop::spawn("test");
        assert!(tick_loop.is_idle());

        let other = tick_loop.clone();
        assert!(!tick_loop.is_idle());
        drop(other);

        let (done_tx, done_rx) = oneshot::channel();
        tick_loop.submit(Box::new(move || {
            let _ = done_tx.send(());
        }));
        assert!(!tick_loop.is_idle());

        done_rx.await.expect("job ran");
        assert!(tick_loop.is_idle());
    }
}
