//! Bounded FIFO task queue.
//!
//! Tasks are admitted in submission order and run on the Tokio runtime while
//! fewer than `max_concurrency` are in flight. Every completion (success,
//! failure or panic) releases its slot and drains the queue again, so the
//! queue keeps itself moving without polling. Draining is an explicit loop
//! under the state mutex; completions never recurse into each other.

use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::DispatchError;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    active: usize,
    completed: u64,
}

struct Inner {
    name: String,
    max_concurrency: usize,
    state: Mutex<QueueState>,
}

/// Point-in-time view of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    pub name: String,
    pub max_concurrency: usize,
    pub active: usize,
    pub pending: usize,
    pub completed: u64,
}

/// Concurrency-limited FIFO executor. Cloning shares the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("stats", &self.stats())
            .finish()
    }
}

impl TaskQueue {
    /// `max_concurrency` of 0 is treated as 1.
    pub fn new(name: impl Into<String>, max_concurrency: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                max_concurrency: max_concurrency.max(1),
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn max_concurrency(&self) -> usize {
        self.inner.max_concurrency
    }

    pub fn stats(&self) -> QueueStats {
        let st = self.inner.lock_state();
        QueueStats {
            name: self.inner.name.clone(),
            max_concurrency: self.inner.max_concurrency,
            active: st.active,
            pending: st.pending.len(),
            completed: st.completed,
        }
    }

    /// Submit a task. It is queued immediately; the returned handle resolves
    /// with the task's own result once it has run.
    ///
    /// Dropping the handle does not cancel the task. Must be called from
    /// within a Tokio runtime.
    pub fn enqueue<T, F, Fut>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, DispatchError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let Ok(runtime) = Handle::try_current() else {
            let _ = tx.send(Err(DispatchError::InternalError(
                "task queue used outside of a Tokio runtime".to_string(),
            )));
            return TaskHandle { rx };
        };

        let job: Job = Box::new(move || {
            Box::pin(async move {
                let result = task().await;
                // Receiver may be gone; the task still counts as done.
                let _ = tx.send(result);
            })
        });

        let pending = {
            let mut st = self.inner.lock_state();
            st.pending.push_back(job);
            st.pending.len()
        };
        tracing::debug!(lane = %self.inner.name, pending, "Task enqueued");

        Inner::drain(&self.inner, &runtime);
        TaskHandle { rx }
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // A poisoned lock only means a drain panicked mid-update; the counters
        // are still the best information available.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Start pending jobs while slots are free.
    fn drain(this: &Arc<Self>, runtime: &Handle) {
        let ready: Vec<Job> = {
            let mut st = this.lock_state();
            let mut ready = Vec::new();
            while st.active < this.max_concurrency {
                let Some(job) = st.pending.pop_front() else {
                    break;
                };
                st.active += 1;
                ready.push(job);
            }
            if !ready.is_empty() {
                tracing::debug!(
                    lane = %this.name,
                    started = ready.len(),
                    active = st.active,
                    pending = st.pending.len(),
                    "Tasks admitted"
                );
            }
            ready
        };

        for job in ready {
            let slot = SlotGuard {
                queue: Arc::clone(this),
                runtime: runtime.clone(),
            };
            runtime.spawn(async move {
                let _slot = slot;
                job().await;
            });
        }
    }

    fn release(this: &Arc<Self>, runtime: &Handle) {
        {
            let mut st = this.lock_state();
            st.active = st.active.saturating_sub(1);
            st.completed += 1;
            tracing::debug!(
                lane = %this.name,
                active = st.active,
                pending = st.pending.len(),
                "Task finished"
            );
        }
        Self::drain(this, runtime);
    }
}

/// Releases a concurrency slot when the running job ends, including by panic.
struct SlotGuard {
    queue: Arc<Inner>,
    runtime: Handle,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        Inner::release(&self.queue, &self.runtime);
    }
}

/// Resolves with the outcome of a queued task.
#[must_use = "the task runs regardless, but its result is lost if the handle is dropped"]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, DispatchError>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DispatchError::TaskAborted(
                "task ended without reporting a result".to_string(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}
