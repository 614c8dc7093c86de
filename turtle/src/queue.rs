// tortuga/turtle/src/queue.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single-flight command queue.
//!
//! Each queue owns one worker task that runs submitted jobs strictly in
//! submission order, one at a time. A job's failure settles only its own
//! [`Pending`]; the worker moves on to the next job regardless. There is no
//! cancellation and no timeout: a job waiting on an unresolved argument
//! stalls everything behind it.

use crate::error::{Result, TurtleError};
use crate::pending::Pending;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

type Job = BoxFuture<'static, ()>;

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// What a job produced, plus how long the queue should idle afterwards.
pub struct Step<T> {
    pub result: Result<T>,
    pub pause: Duration,
}

impl<T> Step<T> {
    pub fn immediate(result: Result<T>) -> Step<T> {
        Step {
            result,
            pause: Duration::ZERO,
        }
    }
}

/// The idle time after an operation run at `speed`. Zero means none.
pub fn pause_for_speed(speed: u8) -> Duration {
    Duration::from_millis(u64::from(speed) * 100)
}

/// Handle to a queue. Clones feed the same worker.
#[derive(Clone, Debug)]
pub struct CommandQueue {
    id: u64,
    sender: mpsc::UnboundedSender<Job>,
}

impl CommandQueue {
    /// Starts a worker on the current tokio runtime.
    pub fn new() -> Result<CommandQueue> {
        let handle = Handle::try_current().map_err(|err| TurtleError::NoRuntime(err.to_string()))?;
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        handle.spawn(async move {
            debug!(queue = id, "worker started");
            while let Some(job) = receiver.recv().await {
                job.await;
            }
            debug!(queue = id, "worker stopped");
        });
        Ok(CommandQueue { id, sender })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Appends `job` and returns its eventual result.
    ///
    /// The job future is not polled until every earlier job has settled, so
    /// arguments it awaits are resolved inside the queue. Its pause elapses
    /// before the result is published.
    pub fn submit<T, F>(&self, name: &'static str, job: F) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = Step<T>> + Send + 'static,
    {
        let (reply, settled) = oneshot::channel();
        let queue = self.id;
        let task = async move {
            trace!(queue = queue, op = name, "run");
            let step = job.await;
            if let Err(err) = &step.result {
                debug!(queue = queue, op = name, %err, "operation failed");
            }
            if !step.pause.is_zero() {
                tokio::time::sleep(step.pause).await;
            }
            // The caller may have dropped every handle to the result.
            let _ = reply.send(step.result);
        };
        if self.sender.send(task.boxed()).is_err() {
            return Pending::failed(TurtleError::QueueClosed);
        }
        Pending::from_future(async move { settled.await.unwrap_or(Err(TurtleError::QueueClosed)) })
    }
}
