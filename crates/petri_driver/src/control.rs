//! # Control Queue
//!
//! Single-slot message path from the command issuer to the driver worker.
//!
//! ```text
//! ┌──────────────┐  send (never blocks)  ┌────────┐  try_receive  ┌────────┐
//! │   Command    │──────────────────────>│ slot   │──────────────>│ Worker │
//! │   issuer     │   full? drop + count  │ (cap 1)│   (polling)   │        │
//! └──────────────┘                       └────────┘               └────────┘
//! ```
//!
//! At most one command is pending. While the slot is occupied every new
//! signal is dropped: a burst coalesces to the first accepted signal, not
//! the last one sent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Command sent to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    /// Begin a run; stops the run if one is active.
    Start,
    /// Clear the field while idle; stops the run if one is active.
    Reset,
}

impl ControlSignal {
    /// Wire code used by the command source.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Start => 0,
            Self::Reset => 1,
        }
    }

    /// Parses a wire code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Start),
            1 => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Constructor for the sender/receiver pair.
pub struct ControlQueue;

impl ControlQueue {
    /// Capacity of the queue.
    pub const CAPACITY: usize = 1;

    /// Creates a connected sender and receiver.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new() -> (ControlSender, ControlReceiver) {
        let (sender, receiver) = bounded(Self::CAPACITY);
        (
            ControlSender {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            ControlReceiver { receiver },
        )
    }
}

/// Issuer-side handle.
///
/// Clone it to hand a copy to a UI callback; only one logical producer is
/// expected.
#[derive(Clone)]
pub struct ControlSender {
    sender: Sender<ControlSignal>,
    dropped: Arc<AtomicU64>,
}

impl ControlSender {
    /// Offers a signal to the worker (non-blocking).
    ///
    /// Returns `false` if the slot was occupied or the worker is gone; the
    /// signal is dropped and counted.
    #[inline]
    pub fn send(&self, signal: ControlSignal) -> bool {
        match self.sender.try_send(signal) {
            Ok(()) => true,
            Err(TrySendError::Full(signal)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(?signal, dropped, "control slot occupied, signal dropped");
                false
            }
            Err(TrySendError::Disconnected(signal)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(?signal, "simulation worker gone, signal dropped");
                false
            }
        }
    }

    /// Parses a wire code and sends it.
    ///
    /// Unknown codes are logged and rejected without touching the queue.
    pub fn send_code(&self, code: i64) -> bool {
        match ControlSignal::from_code(code) {
            Some(signal) => self.send(signal),
            None => {
                tracing::warn!(code, "unknown control code ignored");
                false
            }
        }
    }

    /// Signals dropped so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Worker-side handle.
pub struct ControlReceiver {
    receiver: Receiver<ControlSignal>,
}

impl ControlReceiver {
    /// Takes the pending signal, if any (non-blocking).
    #[inline]
    #[must_use]
    pub fn try_receive(&self) -> Option<ControlSignal> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending signals (0 or 1).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
