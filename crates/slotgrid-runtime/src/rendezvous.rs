#![forbid(unsafe_code)]

//! One-shot rendezvous between the background and foreground contexts.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::time::Duration;

use slotgrid_core::Rejection;

/// Sending half of a one-shot rendezvous.
pub(crate) struct Signal<T>(SyncSender<T>);

impl<T> Signal<T> {
    /// Resolve the rendezvous. A receiver that already gave up is ignored.
    pub(crate) fn send(self, value: T) {
        let _ = self.0.send(value);
    }
}

/// Create a one-shot rendezvous.
pub(crate) fn oneshot<T>() -> (Signal<T>, Receiver<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (Signal(tx), rx)
}

/// How an `open` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The container is shown and the menu is `Open`.
    Opened,
    /// The first render was rejected; the container was never shown.
    Rejected(Rejection),
    /// The menu was closed or dropped before opening finished.
    Abandoned,
}

/// Handle to an in-flight `open`.
///
/// Waiting blocks the calling thread. Never wait on the host's foreground
/// thread: opening finishes there.
#[derive(Debug)]
pub struct Opening {
    receiver: Receiver<OpenOutcome>,
    resolved: Option<OpenOutcome>,
}

impl Opening {
    pub(crate) fn channel() -> (Self, Signal<OpenOutcome>) {
        let (signal, receiver) = oneshot();
        (
            Self {
                receiver,
                resolved: None,
            },
            signal,
        )
    }

    /// Block until resolved, keeping the outcome for later queries.
    pub(crate) fn settle(&mut self) {
        if self.resolved.is_none() {
            self.resolved = Some(self.receiver.recv().unwrap_or(OpenOutcome::Abandoned));
        }
    }

    /// Block until opening finishes.
    pub fn wait(mut self) -> OpenOutcome {
        if let Some(outcome) = self.resolved.take() {
            return outcome;
        }
        self.receiver.recv().unwrap_or(OpenOutcome::Abandoned)
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<OpenOutcome> {
        if self.resolved.is_none() {
            self.resolved = match self.receiver.recv_timeout(timeout) {
                Ok(outcome) => Some(outcome),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => Some(OpenOutcome::Abandoned),
            };
        }
        self.resolved.clone()
    }

    /// The outcome, if opening already finished.
    pub fn try_outcome(&mut self) -> Option<OpenOutcome> {
        if self.resolved.is_none() {
            self.resolved = match self.receiver.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(OpenOutcome::Abandoned),
            };
        }
        self.resolved.clone()
    }
}
