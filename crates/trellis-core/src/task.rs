//! Deferred-call queue.
//!
//! A deferred call is a closure that runs on a later turn of the event loop,
//! never inside the dispatch that scheduled it. The UI thread posts directly
//! into a [`TaskQueue`]; other threads post through a [`TaskSender`], which
//! marshals the closure over a channel that the queue drains on the UI thread.
//!
//! Every closure receives `&mut T`, the state the loop owns (for the widget
//! toolkit, the widget tree), so a deferred call may freely mutate it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::{Result, TaskError};
use crate::logging::targets;

/// A unique identifier for a deferred call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

type BoxedTask<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

struct TaskData<T> {
    id: TaskId,
    task: BoxedTask<T>,
    /// Liveness flag of the [`TaskGroup`] the call was posted through.
    group: Option<Arc<AtomicBool>>,
}

impl<T> TaskData<T> {
    fn new<F>(task: F, group: Option<&TaskGroup>) -> Self
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        Self {
            id: next_task_id(),
            task: Box::new(task),
            group: group.map(|g| g.alive.clone()),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.group
            .as_ref()
            .is_some_and(|alive| !alive.load(Ordering::Acquire))
    }
}

/// A revocation token for a set of deferred calls.
///
/// Calls posted with [`TaskQueue::post_in`] or [`TaskSender::post_in`] are
/// skipped once their group is cancelled. Dropping the group cancels it.
#[derive(Debug)]
pub struct TaskGroup {
    alive: Arc<AtomicBool>,
}

impl TaskGroup {
    /// Create a live group.
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Revoke every pending call posted through this group.
    pub fn cancel(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Whether the group has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Cross-thread handle for posting deferred calls to a [`TaskQueue`].
pub struct TaskSender<T> {
    sender: Sender<TaskData<T>>,
}

impl<T> Clone for TaskSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: 'static> TaskSender<T> {
    /// Post a call to run on the UI thread.
    ///
    /// Fails with [`TaskError::LoopClosed`] if the queue has been dropped.
    pub fn post<F>(&self, task: F) -> Result<TaskId>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.send(TaskData::new(task, None))
    }

    /// Post a call that is skipped if `group` is cancelled before it runs.
    pub fn post_in<F>(&self, group: &TaskGroup, task: F) -> Result<TaskId>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.send(TaskData::new(task, Some(group)))
    }

    fn send(&self, data: TaskData<T>) -> Result<TaskId> {
        let id = data.id;
        self.sender
            .send(data)
            .map_err(|_| TaskError::LoopClosed)?;
        tracing::trace!(target: targets::TASK, task = id.as_u64(), "deferred call posted from sender");
        Ok(id)
    }
}

/// Calls taken out of a [`TaskQueue`] for one loop turn.
///
/// Running a batch needs `&mut T` while the queue usually lives inside `T`,
/// so the batch is detached from the queue before it runs.
pub struct TaskBatch<T> {
    tasks: Vec<TaskData<T>>,
}

impl<T> TaskBatch<T> {
    /// Number of calls in the batch, cancelled ones included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the batch holds no calls.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every call that has not been revoked. Returns how many ran.
    pub fn run(self, ctx: &mut T) -> usize {
        let mut ran = 0;
        for data in self.tasks {
            if data.is_cancelled() {
                tracing::trace!(target: targets::TASK, task = data.id.as_u64(), "skipping revoked call");
                continue;
            }
            (data.task)(ctx);
            ran += 1;
        }
        ran
    }
}

/// FIFO queue of deferred calls owned by the UI thread.
pub struct TaskQueue<T> {
    tasks: VecDeque<TaskData<T>>,
    sender: Sender<TaskData<T>>,
    receiver: Receiver<TaskData<T>>,
}

impl<T: 'static> TaskQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            tasks: VecDeque::new(),
            sender,
            receiver,
        }
    }

    /// A cloneable handle other threads can post through.
    pub fn sender(&self) -> TaskSender<T> {
        TaskSender {
            sender: self.sender.clone(),
        }
    }

    /// Post a call for a later turn.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.push(TaskData::new(task, None))
    }

    /// Post a call tied to `group`.
    pub fn post_in<F>(&mut self, group: &TaskGroup, task: F) -> TaskId
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.push(TaskData::new(task, Some(group)))
    }

    fn push(&mut self, data: TaskData<T>) -> TaskId {
        let id = data.id;
        self.drain_channel();
        self.tasks.push_back(data);
        tracing::trace!(target: targets::TASK, task = id.as_u64(), "deferred call posted");
        id
    }

    /// Cancel a pending call. Returns `true` if it was still queued.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.drain_channel();
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    /// Whether any call is waiting, including ones still in the channel.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty() || !self.receiver.is_empty()
    }

    /// Number of waiting calls, including ones still in the channel.
    pub fn pending_count(&self) -> usize {
        self.tasks.len() + self.receiver.len()
    }

    /// Detach up to `limit` calls (all if `None`) in posting order.
    pub fn take_batch(&mut self, limit: Option<usize>) -> TaskBatch<T> {
        self.drain_channel();
        let count = limit.map_or(self.tasks.len(), |n| n.min(self.tasks.len()));
        TaskBatch {
            tasks: self.tasks.drain(..count).collect(),
        }
    }

    fn drain_channel(&mut self) {
        self.tasks.extend(self.receiver.try_iter());
    }
}

impl<T: 'static> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(TaskSender<Vec<u32>>: Send, Sync, Clone);
static_assertions::assert_impl_all!(TaskGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_run_in_order() {
        let mut queue = TaskQueue::<Vec<u32>>::new();
        queue.post(|log| log.push(1));
        queue.post(|log| log.push(2));
        assert_eq!(queue.pending_count(), 2);

        let mut log = Vec::new();
        let ran = queue.take_batch(None).run(&mut log);
        assert_eq!(ran, 2);
        assert_eq!(log, vec![1, 2]);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_cancel() {
        let mut queue = TaskQueue::<Vec<u32>>::new();
        let id = queue.post(|log| log.push(1));
        queue.post(|log| log.push(2));

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));

        let mut log = Vec::new();
        queue.take_batch(None).run(&mut log);
        assert_eq!(log, vec![2]);
    }

    #[test]
    fn test_batch_limit() {
        let mut queue = TaskQueue::<Vec<u32>>::new();
        for i in 0..5 {
            queue.post(move |log| log.push(i));
        }
        let batch = queue.take_batch(Some(3));
        assert_eq!(batch.len(), 3);
        assert_eq!(queue.pending_count(), 2);
    }

    #[test]
    fn test_group_revokes_pending_calls() {
        let mut queue = TaskQueue::<Vec<u32>>::new();
        let group = TaskGroup::new();
        queue.post_in(&group, |log| log.push(1));
        queue.post(|log| log.push(2));
        drop(group);

        let mut log = Vec::new();
        assert_eq!(queue.take_batch(None).run(&mut log), 1);
        assert_eq!(log, vec![2]);
    }

    #[test]
    fn test_sender_from_other_thread() {
        let mut queue = TaskQueue::<Vec<u32>>::new();
        let sender = queue.sender();

        std::thread::spawn(move || {
            sender.post(|log| log.push(7)).unwrap();
        })
        .join()
        .unwrap();

        assert!(queue.has_pending());
        let mut log = Vec::new();
        queue.take_batch(None).run(&mut log);
        assert_eq!(log, vec![7]);
    }

    #[test]
    fn test_sender_after_queue_dropped() {
        let queue = TaskQueue::<Vec<u32>>::new();
        let sender = queue.sender();
        drop(queue);
        assert!(sender.post(|_| {}).is_err());
    }
}
