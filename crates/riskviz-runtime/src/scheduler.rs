#![forbid(unsafe_code)]

//! Cancellable timers on a single-threaded event queue.
//!
//! The engine never blocks and never spawns threads. Work is expressed as
//! tasks handed to a [`Scheduler`]: a periodic task re-arms itself after each
//! run, a one-shot task runs once. Both return a [`CancelToken`].
//!
//! [`TimerQueue`] is the deterministic implementation. Time only moves when
//! the owner calls [`TimerQueue::advance`], which makes pulse timing exactly
//! reproducible in tests; [`FramePump`] feeds it wall-clock time in a real
//! frame loop.
//!
//! # Invariants
//!
//! 1. Tasks run in due-time order; ties run in scheduling order.
//! 2. No queue borrow is held while a task runs, so tasks may schedule or
//!    cancel other tasks (including themselves).
//! 3. A cancelled task never runs again. Its closure is released on the next
//!    queue operation.
//! 4. A periodic task re-arms relative to its own due time, not to when
//!    `advance` was called, so long frames do not drift the cadence.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Identifier of a scheduled task, unique per queue.
pub type TaskId = u64;

/// Shortest period a periodic task may have. Shorter intervals are raised to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle that cancels a scheduled task.
///
/// Clones share the same flag. Cancelling is idempotent.
#[derive(Clone)]
pub struct CancelToken {
    id: TaskId,
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    /// The task this token controls.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Prevent the task from running again.
    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            tracing::trace!(task_id = self.id, "task cancelled");
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Something that can run closures later on the caller's thread.
///
/// Implementations are cheap handles (`Clone`) so tasks can capture the
/// scheduler and arm follow-up tasks.
pub trait Scheduler: Clone + 'static {
    /// Run `task` every `interval`, first after one full interval.
    fn schedule_periodic<F>(&self, interval: Duration, task: F) -> CancelToken
    where
        F: FnMut() + 'static;

    /// Run `task` once after `delay`.
    fn schedule_once<F>(&self, delay: Duration, task: F) -> CancelToken
    where
        F: FnOnce() + 'static;
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Periodic {
        interval: Duration,
        run: Box<dyn FnMut()>,
    },
}

struct Entry {
    due: Duration,
    seq: u64,
    token: CancelToken,
    task: Task,
}

// BinaryHeap is a max-heap: order entries so the earliest (due, seq) is greatest.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

#[derive(Default)]
struct QueueState {
    now: Duration,
    next_seq: u64,
    next_id: TaskId,
    heap: BinaryHeap<Entry>,
}

impl QueueState {
    fn purge_cancelled(&mut self) {
        self.heap.retain(|entry| !entry.token.is_cancelled());
    }

    fn insert(&mut self, due: Duration, token: CancelToken, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due,
            seq,
            token,
            task,
        });
    }
}

/// Deterministic single-threaded timer queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TimerQueue {
    state: Rc<RefCell<QueueState>>,
}

impl TimerQueue {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks that may still run.
    #[must_use]
    pub fn pending(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.purge_cancelled();
        state.heap.len()
    }

    /// Due time of the earliest live task.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        let mut state = self.state.borrow_mut();
        state.purge_cancelled();
        state.heap.peek().map(|entry| entry.due)
    }

    /// Move time forward by `dt`, running every task that falls due.
    ///
    /// Returns the number of task runs.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        self.advance_to(target)
    }

    /// Move time forward to `target` (no-op for targets in the past).
    ///
    /// Returns the number of task runs.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        while let Some(Entry {
            due, token, task, ..
        }) = self.pop_due(target)
        {
            fired += 1;
            match task {
                Task::Once(run) => {
                    tracing::trace!(
                        task_id = token.id(),
                        due_ms = due.as_millis() as u64,
                        "one-shot fired"
                    );
                    run();
                }
                Task::Periodic { interval, mut run } => {
                    tracing::trace!(
                        task_id = token.id(),
                        due_ms = due.as_millis() as u64,
                        "periodic fired"
                    );
                    run();
                    if !token.is_cancelled() {
                        let next = due.saturating_add(interval);
                        self.state
                            .borrow_mut()
                            .insert(next, token, Task::Periodic { interval, run });
                    }
                }
            }
        }
        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<Entry> {
        let mut state = self.state.borrow_mut();
        loop {
            if state.heap.peek()?.due > target {
                return None;
            }
            let entry = state.heap.pop()?;
            if entry.token.is_cancelled() {
                continue;
            }
            state.now = entry.due;
            return Some(entry);
        }
    }

    fn schedule(&self, delay: Duration, task: Task) -> CancelToken {
        let mut state = self.state.borrow_mut();
        state.purge_cancelled();
        let id = state.next_id;
        state.next_id += 1;
        let token = CancelToken::new(id);
        let due = state.now.saturating_add(delay);
        state.insert(due, token.clone(), task);
        token
    }
}

impl Scheduler for TimerQueue {
    fn schedule_periodic<F>(&self, interval: Duration, task: F) -> CancelToken
    where
        F: FnMut() + 'static,
    {
        let interval = interval.max(MIN_PERIOD);
        let token = self.schedule(
            interval,
            Task::Periodic {
                interval,
                run: Box::new(task),
            },
        );
        tracing::trace!(
            task_id = token.id(),
            interval_ms = interval.as_millis() as u64,
            "periodic scheduled"
        );
        token
    }

    fn schedule_once<F>(&self, delay: Duration, task: F) -> CancelToken
    where
        F: FnOnce() + 'static,
    {
        let token = self.schedule(delay, Task::Once(Box::new(task)));
        tracing::trace!(
            task_id = token.id(),
            delay_ms = delay.as_millis() as u64,
            "one-shot scheduled"
        );
        token
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TimerQueue")
            .field("now", &state.now)
            .field("queued", &state.heap.len())
            .finish()
    }
}

/// Feeds wall-clock time into a [`TimerQueue`] from a frame loop.
#[derive(Debug, Clone, Copy)]
pub struct FramePump {
    last: Instant,
}

impl FramePump {
    /// Start measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Advance `queue` by the wall-clock time since the previous pump.
    pub fn pump(&mut self, queue: &TimerQueue) -> usize {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        queue.advance(dt)
    }
}

impl Default for FramePump {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn once_fires_at_due_time() {
        let q = TimerQueue::new();
        let hits = log();
        let h = hits.clone();
        q.schedule_once(100 * MS, move || h.borrow_mut().push("once"));

        assert_eq!(q.advance(99 * MS), 0);
        assert!(hits.borrow().is_empty());
        assert_eq!(q.advance(MS), 1);
        assert_eq!(*hits.borrow(), vec!["once"]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn periodic_repeats_until_cancelled() {
        let q = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let token = q.schedule_periodic(10 * MS, move || c.set(c.get() + 1));

        q.advance(35 * MS);
        assert_eq!(count.get(), 3);
        token.cancel();
        q.advance(100 * MS);
        assert_eq!(count.get(), 3);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let q = TimerQueue::new();
        let token = q.schedule_once(MS, || {});
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(q.advance(10 * MS), 0);
    }

    #[test]
    fn ties_run_in_scheduling_order() {
        let q = TimerQueue::new();
        let hits = log();
        for name in ["a", "b", "c"] {
            let h = hits.clone();
            q.schedule_once(5 * MS, move || h.borrow_mut().push(name));
        }
        q.advance(5 * MS);
        assert_eq!(*hits.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn tasks_run_in_due_order_within_one_advance() {
        let q = TimerQueue::new();
        let hits = log();
        let (h1, h2) = (hits.clone(), hits.clone());
        q.schedule_once(20 * MS, move || h1.borrow_mut().push("late"));
        q.schedule_once(10 * MS, move || h2.borrow_mut().push("early"));
        q.advance(50 * MS);
        assert_eq!(*hits.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn task_can_schedule_follow_up_in_same_advance() {
        let q = TimerQueue::new();
        let hits = log();
        let (inner_q, h) = (q.clone(), hits.clone());
        q.schedule_once(10 * MS, move || {
            h.borrow_mut().push("first");
            let h = h.clone();
            inner_q.schedule_once(5 * MS, move || h.borrow_mut().push("second"));
        });
        assert_eq!(q.advance(20 * MS), 2);
        assert_eq!(*hits.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn follow_up_sees_virtual_time_of_its_parent() {
        let q = TimerQueue::new();
        let seen = Rc::new(Cell::new(Duration::ZERO));
        let (inner_q, s) = (q.clone(), seen.clone());
        q.schedule_once(10 * MS, move || s.set(inner_q.now()));
        q.advance(100 * MS);
        assert_eq!(seen.get(), 10 * MS);
        assert_eq!(q.now(), 100 * MS);
    }

    #[test]
    fn periodic_task_may_cancel_itself() {
        let q = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<CancelToken>>> = Rc::new(RefCell::new(None));
        let (c, s) = (count.clone(), slot.clone());
        let token = q.schedule_periodic(MS, move || {
            c.set(c.get() + 1);
            if c.get() == 2 {
                if let Some(t) = s.borrow().as_ref() {
                    t.cancel();
                }
            }
        });
        *slot.borrow_mut() = Some(token);
        q.advance(10 * MS);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn zero_interval_is_raised_to_min_period() {
        let q = TimerQueue::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        q.schedule_periodic(Duration::ZERO, move || c.set(c.get() + 1));
        q.advance(5 * MIN_PERIOD);
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn next_due_skips_cancelled() {
        let q = TimerQueue::new();
        let early = q.schedule_once(MS, || {});
        q.schedule_once(7 * MS, || {});
        early.cancel();
        assert_eq!(q.next_due(), Some(7 * MS));
    }

    #[test]
    fn advance_to_past_is_noop() {
        let q = TimerQueue::new();
        q.advance(10 * MS);
        assert_eq!(q.advance_to(5 * MS), 0);
        assert_eq!(q.now(), 10 * MS);
    }

    #[test]
    fn frame_pump_moves_time_forward() {
        let q = TimerQueue::new();
        let mut pump = FramePump::new();
        std::thread::sleep(2 * MS);
        pump.pump(&q);
        assert!(q.now() >= 2 * MS);
    }
}
