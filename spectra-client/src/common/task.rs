//! Deferred work returned by domain `update` functions.
//!
//! A [`Task`] wraps at most one future that resolves into the next message.
//! The update function stays synchronous; whoever owns the state decides
//! where the future runs and feeds its message back into `update`.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

#[must_use = "a Task does nothing unless it is run"]
pub struct Task<M> {
    future: Option<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    /// A task that produces nothing.
    pub fn none() -> Self {
        Self { future: None }
    }

    /// Run `future` and map its output into a message.
    pub fn perform<F, T>(
        future: F,
        map: impl FnOnce(T) -> M + Send + 'static,
    ) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Self {
            future: Some(future.map(map).boxed()),
        }
    }

    /// Yield `message` without doing any work.
    pub fn done(message: M) -> Self {
        Self {
            future: Some(futures::future::ready(message).boxed()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.future.is_none()
    }

    pub fn into_future(self) -> Option<BoxFuture<'static, M>> {
        self.future
    }
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("pending", &self.future.is_some())
            .finish()
    }
}
