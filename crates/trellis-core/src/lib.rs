//! Core systems for Trellis.
//!
//! This crate is the substrate the widget toolkit is built on. It knows
//! nothing about widgets:
//!
//! - **Timers**: one-shot and repeating timers keyed by [`TimerId`]
//! - **Deferred calls**: closures that run on a later loop turn, posted from
//!   the UI thread or marshaled from other threads through a [`TaskSender`]
//! - **Event loop**: [`EventLoop`] collects due timers and pending calls per turn
//! - **Signals**: observer-style [`Signal`] connections
//! - **Thread affinity**: debug-build checks that UI state stays on one thread
//!
//! # Deferred Call Example
//!
//! ```
//! use std::time::Instant;
//! use trellis_core::EventLoop;
//!
//! let mut event_loop = EventLoop::<Vec<&str>>::new();
//! let sender = event_loop.sender();
//! std::thread::spawn(move || {
//!     sender.post(|log| log.push("from worker")).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! let mut log = Vec::new();
//! event_loop.begin_turn(Instant::now()).calls.run(&mut log);
//! assert_eq!(log, ["from worker"]);
//! ```

mod error;
mod event_loop;
pub mod logging;
pub mod signal;
mod task;
pub mod thread_check;
mod timer;

pub use error::{Result, TaskError, TimerError, TrellisError};
pub use event_loop::{EventLoop, EventLoopBuilder, EventLoopConfig, Turn};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{TaskBatch, TaskGroup, TaskId, TaskQueue, TaskSender};
pub use timer::{TimerId, TimerKind, TimerManager};
