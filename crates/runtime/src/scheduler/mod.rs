//! Tick-based task scheduling with optional region affinity.
//!
//! Three primitives are offered:
//! - [`Scheduler::run_later`]: fire once after a delay
//! - [`Scheduler::run_repeating`]: run at a fixed interval until stopped
//! - [`Scheduler::run_async`]: run off the tick loops on the async pool
//!
//! Delays and periods are counted in game ticks. Timed tasks run on the tick
//! loop that owns their anchor, resolved anew for every invocation. A
//! repeating task never overlaps itself: the next tick is only scheduled once
//! the previous one has returned.

mod handle;
mod tick_loop;
mod topology;

pub use handle::TaskHandle;
pub use tick_loop::{Job, TickLoop};
pub use topology::{LoopTopology, RegionalLoops, SingleLoop};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use spell_core::Location;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Returned by a repeating task after each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Work that runs once per period on the loop owning its anchor.
pub trait RepeatingTask: Send + 'static {
    /// Current location, or `None` for the global loop.
    fn anchor(&self) -> Option<Location>;

    fn tick(&mut self) -> TickControl;
}

pub struct Scheduler {
    topology: Arc<dyn LoopTopology>,
    tick: Duration,
    tasks: Mutex<Vec<TaskHandle>>,
}

impl Scheduler {
    pub fn new(topology: Arc<dyn LoopTopology>, tick: Duration) -> Self {
        Self {
            topology,
            tick: tick.max(Duration::from_millis(1)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// One global loop.
    pub fn single(tick: Duration) -> Self {
        Self::new(Arc::new(SingleLoop::new()), tick)
    }

    /// A global loop plus one loop per `region_size`-wide region.
    pub fn regional(region_size: u32, tick: Duration) -> Self {
        Self::new(Arc::new(RegionalLoops::new(region_size)), tick)
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Whole ticks covering `millis`, at least one.
    pub fn ticks_from_millis(&self, millis: u64) -> u64 {
        let tick = self.tick.as_millis().max(1) as u64;
        millis.div_ceil(tick).max(1)
    }

    pub fn loop_count(&self) -> usize {
        self.topology.loop_count()
    }

    /// Runs `job` once, `delay_ticks` from now, on the loop owning `anchor`.
    pub fn run_later<F>(&self, anchor: Option<Location>, delay_ticks: u64, job: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = self.track();
        let task = handle.clone();
        let topology = Arc::clone(&self.topology);
        let delay = self.ticks(delay_ticks);

        tokio::spawn(async move {
            if sleep_or_cancel(&task, delay).await
                && let Some(tick_loop) = topology.loop_for(anchor.as_ref())
            {
                let (done_tx, done_rx) = oneshot::channel();
                let guard = task.clone();
                tick_loop.submit(Box::new(move || {
                    if !guard.is_cancelled() {
                        job();
                    }
                    let _ = done_tx.send(());
                }));
                let _ = done_rx.await;
            }
            task.mark_finished();
        });

        handle
    }

    /// Runs `task` every `period_ticks` (at least one), starting after
    /// `delay_ticks`, until it returns [`TickControl::Stop`] or the handle is
    /// cancelled.
    pub fn run_repeating<T>(&self, task: T, delay_ticks: u64, period_ticks: u64) -> TaskHandle
    where
        T: RepeatingTask,
    {
        let handle = self.track();
        let control = handle.clone();
        let topology = Arc::clone(&self.topology);
        let delay = self.ticks(delay_ticks);
        let period = self.ticks(period_ticks.max(1));

        tokio::spawn(async move {
            if sleep_or_cancel(&control, delay).await {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut task = task;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = control.cancelled() => break,
                    }

                    let Some(tick_loop) = topology.loop_for(task.anchor().as_ref()) else {
                        break;
                    };

                    let (reply_tx, reply_rx) = oneshot::channel();
                    let guard = control.clone();
                    tick_loop.submit(Box::new(move || {
                        let outcome = if guard.is_cancelled() {
                            TickControl::Stop
                        } else {
                            task.tick()
                        };
                        let _ = reply_tx.send((task, outcome));
                    }));

                    match reply_rx.await {
                        Ok((returned, TickControl::Continue)) if !control.is_cancelled() => {
                            task = returned;
                        }
                        _ => break,
                    }
                }
            }
            control.mark_finished();
        });

        handle
    }

    /// Runs `job` on the async pool, outside every tick loop.
    pub fn run_async<F>(&self, job: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = self.track();
        let task = handle.clone();

        tokio::spawn(async move {
            if !task.is_cancelled() {
                job();
            }
            task.mark_finished();
        });

        handle
    }

    /// Cancels every outstanding task and closes the loops.
    pub fn shutdown(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        let pending = tasks.iter().filter(|task| !task.is_finished()).count();
        for task in &tasks {
            task.cancel();
        }
        self.topology.stop();

        tracing::debug!(target: "runtime::scheduler", pending, "scheduler stopped");
    }

    fn ticks(&self, ticks: u64) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX))
    }

    fn track(&self) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle.clone());
        handle
    }
}

async fn sleep_or_cancel(handle: &TaskHandle, delay: Duration) -> bool {
    if handle.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => !handle.is_cancelled(),
        _ = handle.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const TICK: Duration = Duration::from_millis(50);

    struct Counter {
        hits: Arc<AtomicU32>,
        stop_after: u32,
    }

    impl RepeatingTask for Counter {
        fn anchor(&self) -> Option<Location> {
            None
        }

        fn tick(&mut self) -> TickControl {
            let n = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.stop_after {
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_later_fires_once_after_delay() {
        let scheduler = Scheduler::single(TICK);
        let hits = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&hits);
        let handle = scheduler.run_later(None, 4, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(TICK * 3).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        handle.finished().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_task_stops_itself() {
        let scheduler = Scheduler::single(TICK);
        let hits = Arc::new(AtomicU32::new(0));

        let handle = scheduler.run_repeating(
            Counter {
                hits: Arc::clone(&hits),
                stop_after: 5,
            },
            0,
            1,
        );
        handle.finished().await;

        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_observed_at_next_tick() {
        let scheduler = Scheduler::single(TICK);
        let hits = Arc::new(AtomicU32::new(0));

        let handle = scheduler.run_repeating(
            Counter {
                hits: Arc::clone(&hits),
                stop_after: u32::MAX,
            },
            0,
            2,
        );
        tokio::time::sleep(TICK * 5).await;
        handle.cancel();
        handle.finished().await;

        let seen = hits.load(Ordering::SeqCst);
        tokio::time::sleep(TICK * 10).await;
        assert!(seen >= 2);
        assert_eq!(hits.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_later_never_fires() {
        let scheduler = Scheduler::single(TICK);
        let hits = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&hits);
        let handle = scheduler.run_later(None, 10, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        handle.finished().await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn regional_loops_are_created_per_region() {
        let scheduler = Scheduler::regional(16, TICK);
        assert_eq!(scheduler.loop_count(), 1);

        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let held = scheduler.run_later(Some(Location::at(1.0, 0.0, 1.0)), 0, move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        });
        started_rx.await.expect("first job started");
        let other = scheduler.run_later(Some(Location::at(40.0, 0.0, 1.0)), 0, || {});
        other.finished().await;

        assert_eq!(scheduler.loop_count(), 3);

        release_tx.send(()).expect("job waiting");
        held.finished().await;
        scheduler.shutdown();
        assert_eq!(scheduler.loop_count(), 0);
    }

    #[tokio::test]
    async fn idle_region_loops_are_dropped_when_a_new_region_opens() {
        let scheduler = Scheduler::regional(16, TICK);

        scheduler
            .run_later(Some(Location::at(1.0, 0.0, 1.0)), 0, || {})
            .finished()
            .await;
        scheduler
            .run_later(Some(Location::at(2.0, 0.0, 3.0)), 0, || {})
            .finished()
            .await;
        assert_eq!(scheduler.loop_count(), 2);

        scheduler
            .run_later(Some(Location::at(40.0, 0.0, 1.0)), 0, || {})
            .finished()
            .await;
        assert_eq!(scheduler.loop_count(), 2);
    }

    #[test]
    fn ticks_round_up() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let _guard = runtime.enter();
        let scheduler = Scheduler::single(TICK);

        assert_eq!(scheduler.ticks_from_millis(1_000), 20);
        assert_eq!(scheduler.ticks_from_millis(1_001), 21);
        assert_eq!(scheduler.ticks_from_millis(0), 1);
    }
}
