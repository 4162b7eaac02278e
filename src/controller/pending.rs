use futures::future::FusedFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;

use crate::error::RecorderError;

pub type Outcome<T> = Result<T, RecorderError>;

/// Caller handle for an outstanding request
///
/// Resolves to the request's single outcome. If the controller is dropped
/// before resolving it, resolves to `RecorderError::Cancelled`.
///
/// Once the outcome has been observed the handle is terminated: it never
/// yields a second one. Polling it again returns `Poll::Pending`; check
/// `is_terminated` when polling by hand.
#[must_use = "a pending request does nothing unless awaited"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: Option<oneshot::Receiver<Outcome<T>>>,
}

impl<T> Pending<T> {
    /// Take the outcome if it is already available, without waiting
    ///
    /// Hands the handle back when the request is still outstanding.
    pub fn try_outcome(mut self) -> Result<Outcome<T>, Self> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(self);
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return Err(self),
            Err(oneshot::error::TryRecvError::Closed) => Err(RecorderError::Cancelled),
        };
        self.rx = None;
        Ok(outcome)
    }
}

impl<T> Future for Pending<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Pending;
        };

        let received = ready!(Pin::new(rx).poll(cx));
        self.rx = None;
        Poll::Ready(received.unwrap_or(Err(RecorderError::Cancelled)))
    }
}

impl<T> FusedFuture for Pending<T> {
    fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}

/// Controller-side half of a pending request
///
/// Resolving consumes the responder, so a request can be resolved at most
/// once. The controller keeps responders in `Option` slots under its lock
/// and `take()`s them to resolve.
#[derive(Debug)]
pub(crate) struct Responder<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> Responder<T> {
    /// Deliver the outcome. Returns false if the caller stopped waiting.
    pub(crate) fn resolve(self, outcome: Outcome<T>) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

pub(crate) fn request<T>() -> (Responder<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Responder { tx }, Pending { rx: Some(rx) })
}

/// A request that is already decided when it is returned
pub(crate) fn resolved<T>(outcome: Outcome<T>) -> Pending<T> {
    let (responder, pending) = request();
    responder.resolve(outcome);
    pending
}
