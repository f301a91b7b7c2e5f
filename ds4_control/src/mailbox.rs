//! Depth-1 input mailbox between the reader thread and the control loop.
//!
//! The reader posts every decoded frame; an unconsumed frame is overwritten
//! by the next one, so the loop always sees the most recent controller
//! state and never a backlog.

use ds4_common::input::InputSnapshot;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Result of waiting on the mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A new frame arrived.
    Input(InputSnapshot),
    /// Nothing arrived within the timeout.
    Timeout,
    /// Input ended; no further frames will arrive.
    Closed,
}

/// Mailbox counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Frames posted.
    pub posted: u64,
    /// Frames replaced before the loop took them.
    pub overwritten: u64,
    /// Frames the reader could not decode.
    pub rejected: u64,
}

#[derive(Debug, Default)]
struct MailboxState {
    slot: Option<InputSnapshot>,
    closed: bool,
    stats: MailboxStats,
}

/// Single-slot, overwrite-on-post mailbox.
#[derive(Debug, Default)]
pub struct InputMailbox {
    state: Mutex<MailboxState>,
    ready: Condvar,
}

impl InputMailbox {
    /// Create an empty, open mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a frame, replacing any frame not yet taken.
    ///
    /// Frames posted after [`close`](Self::close) are dropped.
    pub fn post(&self, snapshot: InputSnapshot) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.stats.posted += 1;
        if state.slot.replace(snapshot).is_some() {
            state.stats.overwritten += 1;
        }
        drop(state);
        self.ready.notify_one();
    }

    /// Count a frame the reader discarded.
    pub fn reject(&self) {
        self.lock().stats.rejected += 1;
    }

    /// Mark the input as ended and wake the waiter.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Wait up to `timeout` for a frame.
    ///
    /// A pending frame is delivered before `Closed` is reported.
    pub fn wait(&self, timeout: Duration) -> Delivery {
        let state = self.lock();
        let (mut state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |s| s.slot.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);

        match state.slot.take() {
            Some(snapshot) => Delivery::Input(snapshot),
            None if state.closed => Delivery::Closed,
            None => Delivery::Timeout,
        }
    }

    /// Take the pending frame without waiting.
    pub fn try_take(&self) -> Option<InputSnapshot> {
        self.lock().slot.take()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> MailboxStats {
        self.lock().stats
    }
}
