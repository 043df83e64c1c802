//! One-shot playback control for key bindings (`mpd-music <action>`).
//!
//! Performs a single [`Action`] and, if the player ends up playing, returns
//! a now-playing notification with the title as summary and the artist as
//! body.

use crate::observation::{Notification, Observation, PlaybackStatus};
use crate::traits::Player;
use std::fmt;
use std::str::FromStr;

/// A playback control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play,
    Pause,
    /// Pause when playing, play otherwise.
    Toggle,
    Next,
    Prev,
    Stop,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Play,
        Action::Pause,
        Action::Toggle,
        Action::Next,
        Action::Prev,
        Action::Stop,
    ];

    /// Resolve [`Action::Toggle`] against the current status.  Other actions
    /// are returned unchanged.
    pub fn resolve(self, status: PlaybackStatus) -> Action {
        match (self, status) {
            (Action::Toggle, PlaybackStatus::Playing) => Action::Pause,
            (Action::Toggle, _) => Action::Play,
            (other, _) => other,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play => write!(f, "play"),
            Action::Pause => write!(f, "pause"),
            Action::Toggle => write!(f, "toggle"),
            Action::Next => write!(f, "next"),
            Action::Prev => write!(f, "prev"),
            Action::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct UnknownAction(String);

impl FromStr for Action {
    type Err = UnknownAction;

    /// Case-insensitive; `previous` is accepted for `prev`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "play" => Ok(Action::Play),
            "pause" => Ok(Action::Pause),
            "toggle" => Ok(Action::Toggle),
            "next" => Ok(Action::Next),
            "prev" | "previous" => Ok(Action::Prev),
            "stop" => Ok(Action::Stop),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// Perform `action` and describe the resulting state.
///
/// Returns `None` when the player is not playing afterwards (paused,
/// stopped) or the song lacks an artist or title, in which case nothing
/// should be shown.
pub fn perform<P: Player>(player: &mut P, action: Action) -> Result<Option<Notification>, P::Error> {
    let action = match action {
        Action::Toggle => action.resolve(player.status()?),
        other => other,
    };
    player.control(action)?;

    let status = player.status()?;
    if status != PlaybackStatus::Playing {
        return Ok(None);
    }
    let obs = Observation::new(status, player.current_song()?);
    if !obs.has_track() {
        return Ok(None);
    }
    Ok(Some(Notification {
        summary: obs.title,
        message: obs.artist,
        icon: None,
    }))
}
