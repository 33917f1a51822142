//! Timer registry for the event loop.
//!
//! Timers are identified by an opaque [`TimerId`]. The manager only tracks
//! *when* timers fire; who receives a fired timer is decided by the owner of
//! the manager (the widget tree routes each id to the widget that started it).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages all timers of one event loop.
#[derive(Debug)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create an empty timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a timer measured from `now`.
    pub fn start_at(&mut self, now: Instant, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = now + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?interval, ?kind, "timer started");
        id
    }

    /// Start a one-shot timer that fires after `duration`.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.start_at(Instant::now(), duration, TimerKind::OneShot)
    }

    /// Start a repeating timer. The first fire occurs after `interval`.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.start_at(Instant::now(), interval, TimerKind::Repeating)
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check if a timer is still registered.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Time until the earliest pending fire, measured from `now`.
    ///
    /// Returns `None` if there are no active timers.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        while let Some(entry) = self.queue.peek() {
            if self.is_live(entry) {
                break;
            }
            self.queue.pop();
        }

        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Collect every timer due at or before `now`, in fire order.
    ///
    /// One-shot timers are removed; repeating timers are rescheduled one
    /// interval after `now`, so a late loop never delivers a burst.
    #[tracing::instrument(skip(self), target = "trellis_core::timer", level = "trace")]
    pub fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Stale entries belong to stopped or rescheduled timers.
            if !self.is_live(&entry) {
                continue;
            }
            let id = entry.id;
            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };

            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            fired.push(id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(id);
                }
                TimerKind::Repeating => {
                    timer.next_fire = now + timer.interval;
                    self.queue.push(TimerQueueEntry {
                        id,
                        fire_time: timer.next_fire,
                    });
                }
            }
        }

        fired
    }

    /// [`process_expired_at`](Self::process_expired_at) with the current time.
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        self.process_expired_at(Instant::now())
    }

    /// Number of registered timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn is_live(&self, entry: &TimerQueueEntry) -> bool {
        self.timers
            .get(entry.id)
            .is_some_and(|t| t.next_fire == entry.fire_time)
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let id = timers.start_at(start, 10 * MS, TimerKind::OneShot);

        assert!(timers.process_expired_at(start + 5 * MS).is_empty());
        assert_eq!(timers.process_expired_at(start + 10 * MS), vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.process_expired_at(start + 50 * MS).is_empty());
    }

    #[test]
    fn test_repeating_reschedules() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let id = timers.start_at(start, 10 * MS, TimerKind::Repeating);

        assert_eq!(timers.process_expired_at(start + 10 * MS), vec![id]);
        assert_eq!(timers.process_expired_at(start + 20 * MS), vec![id]);
        assert!(timers.is_active(id));
        assert_eq!(timers.active_count(), 1);
    }

    #[test]
    fn test_fire_order_and_stop() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let late = timers.start_at(start, 30 * MS, TimerKind::OneShot);
        let early = timers.start_at(start, 10 * MS, TimerKind::OneShot);
        let stopped = timers.start_at(start, 20 * MS, TimerKind::OneShot);

        timers.stop(stopped).unwrap();
        assert!(timers.stop(stopped).is_err());

        assert_eq!(timers.process_expired_at(start + 40 * MS), vec![early, late]);
    }

    #[test]
    fn test_time_until_next_skips_stopped() {
        let mut timers = TimerManager::new();
        let start = Instant::now();
        let first = timers.start_at(start, 10 * MS, TimerKind::OneShot);
        timers.start_at(start, 25 * MS, TimerKind::OneShot);

        assert_eq!(timers.time_until_next(start), Some(10 * MS));
        timers.stop(first).unwrap();
        assert_eq!(timers.time_until_next(start), Some(25 * MS));
        assert_eq!(timers.time_until_next(start + 30 * MS), Some(Duration::ZERO));
    }

    #[test]
    fn test_no_timers() {
        let mut timers = TimerManager::default();
        assert_eq!(timers.time_until_next(Instant::now()), None);
        assert_eq!(timers.active_count(), 0);
    }
}
