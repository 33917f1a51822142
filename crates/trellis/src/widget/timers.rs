//! Timers, deferred calls and the loop turn of a widget tree.
//!
//! Timers started for a widget are delivered to it as `Timer` events and
//! stopped when it is destroyed. A [`Timer`] object emits a signal instead.
//! Deferred calls run on the next turn, after the current dispatch has
//! unwound, which is what makes [`WidgetTree::defer_delete`] safe to call
//! from inside a widget's own hook.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use trellis_core::logging::{span_names, targets};
use trellis_core::{PerfSpan, Signal, TaskGroup, TaskId, TaskSender, TimerId, TimerKind};

use crate::error::{WidgetError, WidgetResult};
use crate::event::Event;
use crate::widget::{WidgetId, WidgetTree};

/// Who receives a fired timer.
pub(crate) enum TimerTarget {
    Widget(WidgetId),
    /// A [`Timer`] object. Once the object is dropped the timer stops itself.
    Object(Weak<Signal<()>>),
}

impl WidgetTree {
    // =========================================================================
    // Widget timers
    // =========================================================================

    /// Start a timer owned by widget `id`. It fires as a `Timer` event.
    pub fn add_timer(&mut self, id: WidgetId, interval: Duration, kind: TimerKind) -> WidgetResult<TimerId> {
        if !self.contains(id) {
            return Err(WidgetError::StaleWidget(id));
        }
        let timer = self.event_loop.timers_mut().start_at(Instant::now(), interval, kind);
        self.timer_targets.insert(timer, TimerTarget::Widget(id));
        if let Some(node) = self.nodes.get_mut(id) {
            node.timers.push(timer);
        }
        tracing::trace!(target: targets::TIMER, ?id, ?timer, ?interval, "widget timer started");
        Ok(timer)
    }

    /// Stop a timer of widget `id`. Returns `false` if the widget does not
    /// own it.
    pub fn del_timer(&mut self, id: WidgetId, timer: TimerId) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let Some(pos) = node.timers.iter().position(|&t| t == timer) else {
            return false;
        };
        node.timers.swap_remove(pos);
        self.timer_targets.remove(&timer);
        self.event_loop.timers_mut().stop(timer).is_ok()
    }

    /// The widget a timer was started for.
    pub fn timer_owner(&self, timer: TimerId) -> Option<WidgetId> {
        match self.timer_targets.get(&timer)? {
            TimerTarget::Widget(id) => Some(*id),
            TimerTarget::Object(_) => None,
        }
    }

    pub(crate) fn start_object_timer(
        &mut self,
        interval: Duration,
        kind: TimerKind,
        signal: &Arc<Signal<()>>,
    ) -> TimerId {
        let timer = self.event_loop.timers_mut().start_at(Instant::now(), interval, kind);
        self.timer_targets
            .insert(timer, TimerTarget::Object(Arc::downgrade(signal)));
        timer
    }

    pub(crate) fn stop_object_timer(&mut self, timer: TimerId) {
        if self.timer_targets.remove(&timer).is_some() {
            let _ = self.event_loop.timers_mut().stop(timer);
        }
    }

    pub(crate) fn is_timer_active(&self, timer: TimerId) -> bool {
        self.timer_targets.contains_key(&timer) && self.event_loop.timers().is_active(timer)
    }

    fn deliver_timer(&mut self, timer: TimerId) {
        match self.timer_targets.get(&timer) {
            Some(TimerTarget::Widget(id)) => {
                let id = *id;
                self.handle(id, &mut Event::timer(timer));
            }
            Some(TimerTarget::Object(signal)) => match signal.upgrade() {
                Some(signal) => signal.emit(()),
                None => {
                    tracing::trace!(target: targets::TIMER, ?timer, "timer object gone, stopping");
                    self.stop_object_timer(timer);
                }
            },
            None => {
                tracing::trace!(target: targets::TIMER, ?timer, "fired timer has no target");
                return;
            }
        }

        // One-shot timers are gone once they fired.
        if !self.event_loop.timers().is_active(timer) {
            if let Some(TimerTarget::Widget(id)) = self.timer_targets.remove(&timer) {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.timers.retain(|&t| t != timer);
                }
            }
        }
    }

    // =========================================================================
    // Deferred calls
    // =========================================================================

    /// Run `call` on the next turn of the loop.
    pub fn defer_call<F>(&mut self, call: F) -> TaskId
    where
        F: FnOnce(&mut WidgetTree) + Send + 'static,
    {
        self.event_loop.post(call)
    }

    /// Like [`defer_call`](Self::defer_call), but skipped if `group` is
    /// cancelled or dropped first.
    pub fn defer_call_in<F>(&mut self, group: &TaskGroup, call: F) -> TaskId
    where
        F: FnOnce(&mut WidgetTree) + Send + 'static,
    {
        self.event_loop.post_in(group, call)
    }

    /// Revoke a deferred call that has not run yet.
    pub fn cancel_call(&mut self, call: TaskId) -> bool {
        self.event_loop.cancel(call)
    }

    /// Destroy the widget on the next turn.
    pub fn defer_delete(&mut self, id: WidgetId) {
        tracing::trace!(target: targets::TREE, ?id, "deferred delete posted");
        self.defer_call(move |tree| {
            if let Err(err) = tree.destroy(id) {
                tracing::debug!(target: targets::TREE, %err, "deferred delete skipped");
            }
        });
    }

    /// Handle for posting calls from other threads.
    pub fn task_sender(&self) -> TaskSender<WidgetTree> {
        self.event_loop.sender()
    }

    pub fn has_pending_calls(&self) -> bool {
        self.event_loop.has_pending_calls()
    }

    /// Run the deferred calls queued so far. Calls they post wait for the
    /// next turn. Returns how many ran.
    pub fn process_deferred(&mut self) -> usize {
        let calls = self.event_loop.take_calls();
        if calls.is_empty() {
            return 0;
        }
        let _perf = PerfSpan::new(span_names::TASK);
        calls.run(self)
    }

    // =========================================================================
    // Loop turn
    // =========================================================================

    /// One turn of the loop at time `now`: deliver the timers due, then run
    /// the deferred calls. Returns the number of timers and calls handled.
    pub fn process_events_at(&mut self, now: Instant) -> usize {
        let turn = self.event_loop.begin_turn(now);
        let fired = turn.timers.len();
        if fired > 0 {
            let _perf = PerfSpan::new(span_names::TIMER);
            for timer in turn.timers {
                self.deliver_timer(timer);
            }
        }
        fired + turn.calls.run(self)
    }

    /// [`process_events_at`](Self::process_events_at) with the current time.
    pub fn process_events(&mut self) -> usize {
        self.process_events_at(Instant::now())
    }

    /// How long the platform may sleep before the next turn is due. `None`
    /// when nothing is scheduled.
    pub fn wait_timeout(&mut self, now: Instant) -> Option<Duration> {
        self.event_loop.wait_timeout(now)
    }
}

/// A timer that emits [`timeout`](Self::timeout) instead of sending events.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::{Duration, Instant};
/// use trellis::{Timer, WidgetTree};
///
/// let mut tree = WidgetTree::new();
/// let fired = Arc::new(AtomicUsize::new(0));
///
/// let mut timer = Timer::new(Duration::from_millis(10));
/// let counter = fired.clone();
/// timer.timeout().connect(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// timer.start(&mut tree);
///
/// tree.process_events_at(Instant::now() + Duration::from_millis(20));
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
/// assert!(!timer.is_active(&tree));
/// ```
pub struct Timer {
    interval: Duration,
    repeat: bool,
    id: Option<TimerId>,
    timeout: Arc<Signal<()>>,
}

impl Timer {
    /// A one-shot timer.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            repeat: false,
            id: None,
            timeout: Arc::new(Signal::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect on the next [`start`](Self::start).
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    /// Takes effect on the next [`start`](Self::start).
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn timeout(&self) -> &Arc<Signal<()>> {
        &self.timeout
    }

    /// The running timer's id.
    pub fn id(&self) -> Option<TimerId> {
        self.id
    }

    /// Start, or restart, the timer.
    pub fn start(&mut self, tree: &mut WidgetTree) {
        self.stop(tree);
        let kind = if self.repeat {
            TimerKind::Repeating
        } else {
            TimerKind::OneShot
        };
        self.id = Some(tree.start_object_timer(self.interval, kind, &self.timeout));
    }

    pub fn stop(&mut self, tree: &mut WidgetTree) {
        if let Some(id) = self.id.take() {
            tree.stop_object_timer(id);
        }
    }

    pub fn is_active(&self, tree: &WidgetTree) -> bool {
        self.id.is_some_and(|id| tree.is_timer_active(id))
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("interval", &self.interval)
            .field("repeat", &self.repeat)
            .field("id", &self.id)
            .finish()
    }
}
