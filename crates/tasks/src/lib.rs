#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! corvid task management.
//!
//! Long-running jobs are spawned through a [`TaskExecutor`] so they observe a
//! shared shutdown signal, and panics in critical tasks are surfaced instead
//! of failing silently.

use crate::shutdown::{signal, Shutdown, Signal};
use futures_util::{future::select, pin_mut, Future, FutureExt, Stream};
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};
use tracing::{error, Instrument};

pub mod shutdown;

/// Owns the spawning side of the runtime used by corvid components.
///
/// A [`TaskManager`] stores the [`tokio::runtime::Handle`] it is associated
/// with and hands out [`TaskExecutor`]s that spawn onto that runtime. Its
/// main purpose is to observe whether a critical task panicked, since tokio
/// tasks otherwise fail silently: the manager is a [`Stream`] yielding the
/// names of panicked critical tasks. Dropping the manager fires the shutdown
/// signal for every task spawned through its executors.
pub struct TaskManager {
    /// Handle to the tokio runtime this task manager is associated with.
    handle: Handle,
    /// Sender half for reporting panicked critical tasks.
    panicked_tasks_tx: UnboundedSender<String>,
    /// Listens for panicked critical tasks.
    panicked_tasks_rx: UnboundedReceiver<String>,
    /// The [`Signal`] fired when all tasks should shut down; fired on drop.
    _signal: Signal,
    /// Receiver of the shutdown signal.
    on_shutdown: Shutdown,
}

// === impl TaskManager ===

impl TaskManager {
    /// Creates a new instance connected to the given handle's tokio runtime.
    pub fn new(handle: Handle) -> Self {
        let (panicked_tasks_tx, panicked_tasks_rx) = unbounded_channel();
        let (_signal, on_shutdown) = signal();
        Self { handle, panicked_tasks_tx, panicked_tasks_rx, _signal, on_shutdown }
    }

    /// Returns a new [`TaskExecutor`] that spawns tasks onto this manager's
    /// runtime.
    pub fn executor(&self) -> TaskExecutor {
        TaskExecutor {
            handle: self.handle.clone(),
            on_shutdown: self.on_shutdown.clone(),
            panicked_tasks_tx: self.panicked_tasks_tx.clone(),
        }
    }
}

/// A stream that yields the names of panicked critical tasks.
///
/// See [`TaskExecutor::spawn_critical`].
impl Stream for TaskManager {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().panicked_tasks_rx.poll_recv(cx)
    }
}

/// A type that can spawn new tokio tasks that observe the shared shutdown
/// signal.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    /// Handle to the tokio runtime this executor spawns onto.
    handle: Handle,
    /// Receiver of the shutdown signal.
    on_shutdown: Shutdown,
    /// Sender half for reporting panicked critical tasks.
    panicked_tasks_tx: UnboundedSender<String>,
}

// === impl TaskExecutor ===

impl TaskExecutor {
    /// Returns the shutdown signal observed by tasks spawned through this
    /// executor.
    pub fn on_shutdown(&self) -> Shutdown {
        self.on_shutdown.clone()
    }

    /// Spawns the task onto the runtime.
    ///
    /// The task stops when it completes or when the shutdown signal fires,
    /// whichever happens first.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let on_shutdown = self.on_shutdown.clone();

        let task = async move {
            pin_mut!(fut);
            let _ = select(on_shutdown, fut).await;
        }
        .in_current_span();

        self.handle.spawn(task);
    }

    /// Spawns a critical task onto the runtime.
    ///
    /// If this task panics, the [`TaskManager`] is notified with `name`.
    pub fn spawn_critical<F>(&self, name: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let panicked_tasks_tx = self.panicked_tasks_tx.clone();
        let on_shutdown = self.on_shutdown.clone();

        // wrap the task in catch unwind
        let task = std::panic::AssertUnwindSafe(fut)
            .catch_unwind()
            .map(move |res| {
                if res.is_err() {
                    error!("Critical task `{name}` panicked");
                    let _ = panicked_tasks_tx.send(name.to_string());
                }
            })
            .in_current_span();

        self.handle.spawn(async move {
            pin_mut!(task);
            let _ = select(on_shutdown, task).await;
        });
    }
}
