//! Core traits that decouple the poller from the music player, the
//! notification backend and wall-clock time.
//!
//! Every concrete backend (the MPD client, the desktop notifier, a test
//! harness, …) implements one of these traits.  The
//! [`Observer`](crate::observer::Observer) and the
//! [`Supervisor`](crate::supervisor::Supervisor) only depend on these
//! abstractions.

use crate::observation::{Notification, PlaybackStatus, Song};
use crate::remote::Action;
use crate::shutdown::Interrupted;
use std::time::Duration;

/// Abstraction over a music player that can report its state.
///
/// An implementation might talk to MPD over TCP, or it might be a scripted
/// stub used in tests.  Exactly one request is in flight at a time, hence
/// `&mut self`.
pub trait Player {
    /// The error type produced by this player.  Any error is treated as a
    /// lost connection by the supervisor.
    type Error: std::error::Error + Send + 'static;

    /// Current playback status.
    fn status(&mut self) -> Result<PlaybackStatus, Self::Error>;

    /// The currently loaded song, or `None` if the queue is empty / nothing
    /// is selected.  "No song" is not an error.
    fn current_song(&mut self) -> Result<Option<Song>, Self::Error>;

    /// Perform a playback control action.
    fn control(&mut self, action: Action) -> Result<(), Self::Error>;
}

/// A sink for user-facing notifications.
///
/// Delivery is fire-and-forget: implementations log failures themselves and
/// never report them back to the poller.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Source of the only two suspension points: the inter-poll sleep and the
/// reconnect delay.
///
/// The production clock wakes early when the process is asked to shut down;
/// test clocks record the requested durations instead of sleeping.
pub trait Clock {
    /// Block for `duration`, or return [`Interrupted`] as soon as shutdown is
    /// requested.
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}
