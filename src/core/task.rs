//! Coordination primitives for parse tasks.
//!
//! [`TaskCell`] is a write-once result slot shared between a spawned parse
//! task, any deduplicated `add()` calls that joined it, and the workspace
//! drain barrier. [`with_deadline`] races a future against a fixed deadline
//! and an optional cooperative cancellation signal.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// A write-once completion cell. Multiple waiters observe the same result;
/// completions after the first are ignored.
pub struct TaskCell<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
}

impl<T: Clone> TaskCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    pub fn complete(&self, value: T) {
        {
            let mut slot = self.slot.lock();
            if slot.is_some() {
                return;
            }
            *slot = Some(value);
        }
        self.notify.notify_waiters();
    }

    pub fn is_complete(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub async fn wait(&self) -> T {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking the slot so a completion
            // between the check and the await cannot be missed.
            notified.as_mut().enable();
            if let Some(value) = self.slot.lock().as_ref() {
                return value.clone();
            }
            notified.await;
        }
    }
}

impl<T: Clone> Default for TaskCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a deadline race ended without the inner future completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expired {
    DeadlineElapsed,
    Cancelled,
}

/// Run `future` to completion unless the deadline elapses or the optional
/// cancellation token fires first.
pub async fn with_deadline<F: Future>(
    deadline: Duration,
    cancel: Option<&CancellationToken>,
    future: F,
) -> Result<F::Output, Expired> {
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    // Biased: an already-fired cancellation or deadline wins over work
    // that would also be ready, which keeps abort behavior deterministic.
    tokio::select! {
        biased;
        _ = cancelled => Err(Expired::Cancelled),
        _ = tokio::time::sleep(deadline) => Err(Expired::DeadlineElapsed),
        output = future => Ok(output),
    }
}
