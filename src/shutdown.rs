//! Interruptible sleeping.
//!
//! [`channel`] returns a [`ShutdownHandle`] for the signal handler and a
//! [`ShutdownClock`] for the poll loop.  Sleeping on the clock is a
//! `recv_timeout` on the shutdown channel, so a Ctrl-C wakes the loop
//! immediately instead of after the current interval.

use crate::traits::Clock;
use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Returned by a [`Clock`] when shutdown was requested during (or before)
/// a sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Sending half, handed to the signal handler.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    /// Ask the loop to stop.  Safe to call repeatedly.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

/// Production [`Clock`]: sleeps until the timeout elapses or shutdown is
/// triggered, whichever comes first.  Once triggered it stays interrupted.
#[derive(Debug)]
pub struct ShutdownClock {
    rx: Receiver<()>,
    requested: Cell<bool>,
}

/// Create a connected handle/clock pair.
pub fn channel() -> (ShutdownHandle, ShutdownClock) {
    let (tx, rx) = mpsc::channel();
    (
        ShutdownHandle { tx },
        ShutdownClock {
            rx,
            requested: Cell::new(false),
        },
    )
}

impl ShutdownClock {
    /// `true` once a shutdown request has been observed.
    pub fn is_shutdown(&self) -> bool {
        self.requested.get()
    }
}

impl Clock for ShutdownClock {
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        if self.requested.get() {
            return Err(Interrupted);
        }
        match self.rx.recv_timeout(duration) {
            Ok(()) => {
                self.requested.set(true);
                Err(Interrupted)
            }
            Err(RecvTimeoutError::Timeout) => Ok(()),
            // Nobody can interrupt us any more; degrade to a plain sleep.
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(duration);
                Ok(())
            }
        }
    }
}
