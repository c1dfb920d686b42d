//! Completion handle for gated operations.
//!
//! A gated call returns a `Pending` at once, whether the operation runs now
//! or waits for login. The handle resolves with the operation's own result.
//! If the operation is discarded before it runs, its `Completion` is
//! dropped and the handle resolves to `BotError::Cancelled`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::BotError;

/// Creates a connected completion/handle pair for `operation`.
pub fn channel<T>(operation: &'static str) -> (Completion<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Completion { operation, tx },
        Pending { operation, rx },
    )
}

/// Sending half, owned by the operation.
#[derive(Debug)]
pub struct Completion<T> {
    operation: &'static str,
    tx: oneshot::Sender<Result<T, BotError>>,
}

impl<T> Completion<T> {
    /// Delivers the result. A caller that dropped its handle is ignored.
    pub fn complete(self, result: Result<T, BotError>) {
        if let Err(ref err) = result {
            tracing::debug!(operation = self.operation, error = %err, "Operation failed");
        }
        if self.tx.send(result).is_err() {
            tracing::trace!(operation = self.operation, "Result dropped, caller stopped waiting");
        }
    }
}

/// Resolves with the result of a gated operation.
#[must_use]
#[derive(Debug)]
pub struct Pending<T> {
    operation: &'static str,
    rx: oneshot::Receiver<Result<T, BotError>>,
}

impl<T> Pending<T> {
    /// Name of the operation this handle waits on.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, BotError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let operation = self.operation;
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(result) => result,
            Err(_) => Err(BotError::Cancelled { operation }),
        })
    }
}
