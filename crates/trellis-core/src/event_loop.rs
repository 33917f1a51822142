//! The UI-thread event loop pump.
//!
//! `EventLoop<T>` owns the timer registry and the deferred-call queue of one
//! UI context. It does not own the state those callbacks act on: the owner of
//! the loop (the widget tree) calls [`EventLoop::begin_turn`] to collect due
//! work, then delivers timers and runs the detached batch against itself.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use trellis_core::{EventLoop, TimerKind};
//!
//! struct App {
//!     ticks: u32,
//!     event_loop: EventLoop<App>,
//! }
//!
//! let mut app = App { ticks: 0, event_loop: EventLoop::new() };
//! let now = Instant::now();
//! app.event_loop.timers_mut().start_at(now, Duration::ZERO, TimerKind::OneShot);
//! app.event_loop.post(|app: &mut App| app.ticks += 10);
//!
//! let turn = app.event_loop.begin_turn(now);
//! app.ticks += turn.timers.len() as u32;
//! turn.calls.run(&mut app);
//! assert_eq!(app.ticks, 11);
//! ```

use std::time::{Duration, Instant};

use crate::logging::targets;
use crate::task::{TaskBatch, TaskGroup, TaskId, TaskQueue, TaskSender};
use crate::thread_check::ThreadAffinity;
use crate::timer::{TimerId, TimerManager};

/// Configuration for an [`EventLoop`].
#[derive(Debug, Clone)]
pub struct EventLoopConfig {
    /// Name used in log fields.
    pub name: String,
    /// Deferred calls run per turn. `None` runs everything queued before the
    /// turn started.
    pub task_batch_size: Option<usize>,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            name: "trellis-ui".to_string(),
            task_batch_size: None,
        }
    }
}

/// Builder for an [`EventLoop`] with custom configuration.
#[derive(Debug, Default)]
pub struct EventLoopBuilder {
    config: EventLoopConfig,
}

impl EventLoopBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loop name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Cap the number of deferred calls run per turn.
    pub fn task_batch_size(mut self, size: usize) -> Self {
        self.config.task_batch_size = Some(size);
        self
    }

    /// Build the loop, bound to the calling thread.
    pub fn build<T: 'static>(self) -> EventLoop<T> {
        EventLoop::with_config(self.config)
    }
}

/// Work collected for one turn of the loop.
pub struct Turn<T> {
    /// Timers that fired, in fire order.
    pub timers: Vec<TimerId>,
    /// Deferred calls to run after the timers are delivered.
    pub calls: TaskBatch<T>,
}

/// Timer registry plus deferred-call queue for one UI thread.
pub struct EventLoop<T> {
    config: EventLoopConfig,
    timers: TimerManager,
    tasks: TaskQueue<T>,
    affinity: ThreadAffinity,
}

impl<T: 'static> EventLoop<T> {
    /// Create a loop with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EventLoopConfig::default())
    }

    /// Create a loop with an explicit configuration.
    pub fn with_config(config: EventLoopConfig) -> Self {
        tracing::debug!(target: targets::EVENT_LOOP, name = %config.name, "event loop created");
        Self {
            config,
            timers: TimerManager::new(),
            tasks: TaskQueue::new(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// The loop configuration.
    pub fn config(&self) -> &EventLoopConfig {
        &self.config
    }

    /// The thread this loop belongs to.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Shared access to the timer registry.
    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    /// Mutable access to the timer registry.
    pub fn timers_mut(&mut self) -> &mut TimerManager {
        &mut self.timers
    }

    /// Post a deferred call from the UI thread.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.affinity.debug_assert_same_thread();
        self.tasks.post(task)
    }

    /// Post a deferred call tied to a revocation group.
    pub fn post_in<F>(&mut self, group: &TaskGroup, task: F) -> TaskId
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.affinity.debug_assert_same_thread();
        self.tasks.post_in(group, task)
    }

    /// Cancel a pending deferred call.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.cancel(id)
    }

    /// Handle for posting from other threads.
    pub fn sender(&self) -> TaskSender<T> {
        self.tasks.sender()
    }

    /// Whether deferred calls are waiting.
    pub fn has_pending_calls(&self) -> bool {
        self.tasks.has_pending()
    }

    /// How long the platform may sleep before the next turn is due.
    ///
    /// Zero when calls are already waiting; `None` when nothing is scheduled.
    pub fn wait_timeout(&mut self, now: Instant) -> Option<Duration> {
        if self.tasks.has_pending() {
            return Some(Duration::ZERO);
        }
        self.timers.time_until_next(now)
    }

    /// Collect the timers due at `now` and detach the pending calls.
    ///
    /// Calls posted while the returned batch runs are left for the next turn.
    pub fn begin_turn(&mut self, now: Instant) -> Turn<T> {
        self.affinity.debug_assert_same_thread();
        let _span = tracing::trace_span!(target: targets::EVENT_LOOP, "turn", name = %self.config.name).entered();

        let timers = self.timers.process_expired_at(now);
        let calls = self.tasks.take_batch(self.config.task_batch_size);
        tracing::trace!(
            target: targets::EVENT_LOOP,
            timers = timers.len(),
            calls = calls.len(),
            "turn collected"
        );
        Turn { timers, calls }
    }

    /// Detach the pending calls without touching the timers.
    pub fn take_calls(&mut self) -> TaskBatch<T> {
        self.affinity.debug_assert_same_thread();
        self.tasks.take_batch(self.config.task_batch_size)
    }
}

impl<T: 'static> Default for EventLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerKind;

    #[derive(Default)]
    struct Counter {
        hits: Vec<&'static str>,
    }

    #[test]
    fn test_turn_collects_timers_and_calls() {
        let mut event_loop = EventLoop::<Counter>::new();
        let now = Instant::now();
        let id = event_loop
            .timers_mut()
            .start_at(now, Duration::from_millis(5), TimerKind::OneShot);
        event_loop.post(|c| c.hits.push("call"));

        let turn = event_loop.begin_turn(now + Duration::from_millis(5));
        assert_eq!(turn.timers, vec![id]);

        let mut counter = Counter::default();
        assert_eq!(turn.calls.run(&mut counter), 1);
        assert_eq!(counter.hits, vec!["call"]);
    }

    #[test]
    fn test_batch_size_limits_calls() {
        let mut event_loop: EventLoop<Counter> = EventLoopBuilder::new()
            .name("limited")
            .task_batch_size(1)
            .build();
        event_loop.post(|c| c.hits.push("a"));
        event_loop.post(|c| c.hits.push("b"));

        let mut counter = Counter::default();
        event_loop.begin_turn(Instant::now()).calls.run(&mut counter);
        assert_eq!(counter.hits, vec!["a"]);
        assert!(event_loop.has_pending_calls());
        assert_eq!(event_loop.config().name, "limited");
    }

    #[test]
    fn test_take_calls_leaves_timers() {
        let mut event_loop = EventLoop::<Counter>::new();
        let now = Instant::now();
        event_loop
            .timers_mut()
            .start_at(now, Duration::ZERO, TimerKind::OneShot);
        event_loop.post(|c| c.hits.push("call"));

        let mut counter = Counter::default();
        assert_eq!(event_loop.take_calls().run(&mut counter), 1);
        assert!(!event_loop.has_pending_calls());
        assert_eq!(event_loop.timers().active_count(), 1);
    }

    #[test]
    fn test_wait_timeout() {
        let mut event_loop = EventLoop::<Counter>::new();
        let now = Instant::now();
        assert_eq!(event_loop.wait_timeout(now), None);

        event_loop
            .timers_mut()
            .start_at(now, Duration::from_millis(30), TimerKind::Repeating);
        assert_eq!(event_loop.wait_timeout(now), Some(Duration::from_millis(30)));

        event_loop.post(|_| {});
        assert_eq!(event_loop.wait_timeout(now), Some(Duration::ZERO));
    }
}
