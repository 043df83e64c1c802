//! The state-diffing poll loop.
//!
//! [`Observer`] owns the previous [`Observation`] and turns each new sample
//! into zero or more [`Notification`]s.  [`Observer::run`] drives it against
//! a [`Player`], a [`Notifier`] and a [`Clock`] until the clock is
//! interrupted or the player fails.
//!
//! # Rules
//!
//! Nothing fires on the first cycle.  After that, per cycle:
//!
//! * **Status change** to anything other than playing/paused fires a
//!   "Stopped" notification.  Play/pause transitions are silent.
//! * **Track change** fires a now-playing notification when the track id
//!   changed to a non-empty value, *or* when the status changed to playing.
//!   Both conditions may hold at once; the notification is still sent once.
//!   It is dropped when there is no artist to show.
//!
//! A status and a track notification may both fire in the same cycle.

use crate::observation::{Notification, Observation, PlaybackStatus};
use crate::shutdown::Interrupted;
use crate::traits::{Clock, Notifier, Player};
use log::{debug, info};
use std::time::Duration;

/// Default time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Why [`Observer::run`] returned.
#[derive(Debug, thiserror::Error)]
pub enum ObserveError<E: std::error::Error + 'static> {
    /// The player failed; the connection should be considered dead.
    #[error("player error: {0}")]
    Player(#[source] E),
    /// Shutdown was requested while sleeping.
    #[error("interrupted")]
    Interrupted,
}

impl<E: std::error::Error + 'static> From<Interrupted> for ObserveError<E> {
    fn from(_: Interrupted) -> Self {
        ObserveError::Interrupted
    }
}

/// Diffs consecutive observations.
///
/// `last` is `None` until the first observation has been recorded; that
/// empty state is the "initial" sentinel and is never re-entered.
#[derive(Debug, Clone)]
pub struct Observer {
    last: Option<Observation>,
    polls: u64,
    interval: Duration,
    stop_icon: Option<String>,
}

impl Default for Observer {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Observer {
    /// Create an observer that polls every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            last: None,
            polls: 0,
            interval,
            stop_icon: Some("media-playback-stop".into()),
        }
    }

    /// Icon used for the "Stopped" notification.  `None` uses the server
    /// default.
    pub fn set_stop_icon(&mut self, icon: Option<String>) {
        self.stop_icon = icon;
    }

    /// The previous observation, `None` before the first cycle.
    pub fn last(&self) -> Option<&Observation> {
        self.last.as_ref()
    }

    /// Number of poll cycles that completed without a player error.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Record `current` and return the notifications it warrants relative to
    /// the previous observation.
    pub fn observe(&mut self, current: Observation) -> Vec<Notification> {
        let mut out = Vec::new();

        if let Some(last) = &self.last {
            let status_changed = current.status != last.status;

            if status_changed {
                match current.status {
                    PlaybackStatus::Playing | PlaybackStatus::Paused => {}
                    PlaybackStatus::Stopped | PlaybackStatus::Unknown => {
                        out.push(Notification::stopped(self.stop_icon.as_deref()));
                    }
                }
            }

            let track_changed = current.track_id != last.track_id && current.has_track();
            let resumed = status_changed && current.status == PlaybackStatus::Playing;
            if track_changed || resumed {
                match Notification::track(&current) {
                    Some(n) => out.push(n),
                    None => debug!("nothing to show for {:?}", current.track_id),
                }
            }

            debug!(
                "{} -> {}, track_changed={}, resumed={}, notifications={}",
                last.status,
                current.status,
                track_changed,
                resumed,
                out.len()
            );
        } else {
            debug!("first observation: {} {:?}", current.status, current.track_id);
        }

        self.last = Some(current);
        out
    }

    /// Run one poll cycle: sample the player, diff and dispatch.
    ///
    /// Returns the number of notifications sent.
    pub fn poll_once<P: Player, N: Notifier>(
        &mut self,
        player: &mut P,
        notifier: &N,
    ) -> Result<usize, P::Error> {
        let status = player.status()?;
        let song = player.current_song()?;
        self.polls += 1;
        let notifications = self.observe(Observation::new(status, song));
        for n in &notifications {
            info!("notify: {:?} / {:?}", n.summary, n.message);
            notifier.notify(n);
        }
        Ok(notifications.len())
    }

    /// Poll forever, sleeping `interval` between cycles.
    ///
    /// Only returns when the player fails or the clock is interrupted, and
    /// reports which of the two happened.  The previous observation is kept,
    /// so a reconnect does not count as a fresh start.
    pub fn run<P, N, C>(&mut self, player: &mut P, notifier: &N, clock: &C) -> ObserveError<P::Error>
    where
        P: Player,
        N: Notifier,
        C: Clock,
    {
        loop {
            if let Err(e) = self.cycle(player, notifier, clock) {
                return e;
            }
        }
    }

    fn cycle<P, N, C>(&mut self, player: &mut P, notifier: &N, clock: &C) -> Result<(), ObserveError<P::Error>>
    where
        P: Player,
        N: Notifier,
        C: Clock,
    {
        self.poll_once(player, notifier).map_err(ObserveError::Player)?;
        clock.sleep(self.interval)?;
        Ok(())
    }
}
