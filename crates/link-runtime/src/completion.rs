//! Callback-to-future bridge
//!
//! Provider operations report through `FnOnce` completions. [`completion`]
//! pairs such a callback with a future, so async callers can `.await` the
//! result instead of threading state through closures.

use futures_channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Create a connected [`Completer`] / [`Completion`] pair
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, Completion { rx })
}

/// Sending half, moved into the completion callback
pub struct Completer<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Completer<T> {
    /// Resolve the paired [`Completion`]
    ///
    /// If the completion was already dropped the value is discarded.
    pub fn complete(self, value: T) {
        let _ = self.tx.send(value);
    }
}

/// Receiving half
///
/// Resolves to `Some(value)` once completed, or `None` if the [`Completer`]
/// was dropped without completing (the callback was discarded uninvoked).
pub struct Completion<T> {
    rx: oneshot::Receiver<T>,
}

/// Returned by [`Completion::try_take`] when the completer was dropped without a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

impl<T> Completion<T> {
    /// Take the value without waiting
    ///
    /// `Ok(None)` means the callback has not fired yet.
    pub fn try_take(&mut self) -> Result<Option<T>, Abandoned> {
        self.rx.try_recv().map_err(|_| Abandoned)
    }
}

impl<T> Future for Completion<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}
