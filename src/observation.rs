//! Observations and notifications: the vocabulary shared by every
//! component.
//!
//! An [`Observation`] is one sample of the player taken during a poll cycle.
//! A [`Notification`] is what the [`Observer`](crate::observer::Observer)
//! decides to show the user in response to a change between two samples.

use std::fmt;

/// Playback state as reported by the player's `status` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    /// Anything the player reports that is not one of the above.
    Unknown,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Stopped => write!(f, "stopped"),
            PlaybackStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// The song currently loaded in the player, as returned by `currentsong`.
///
/// Only `file` is guaranteed by MPD; tags are absent for untagged files and
/// most streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    /// Song URI relative to the music directory (or a stream URL).
    pub file: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
}

/// One sample of the player, taken once per poll cycle.
///
/// Missing metadata is coerced to the empty string, so an observation never
/// carries "absent" values into a notification payload.  A song without an
/// artist or a title (untagged files, most streams) counts as no track at
/// all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub status: PlaybackStatus,
    /// Identifier of the loaded track (its `file`), empty when none.
    pub track_id: String,
    pub artist: String,
    pub album: String,
    pub title: String,
}

impl Observation {
    /// Build an observation from a status and the result of a `currentsong`
    /// query. `None` means no track is loaded.
    pub fn new(status: PlaybackStatus, song: Option<Song>) -> Self {
        let song = song
            .filter(|s| s.artist.is_some() && s.title.is_some())
            .unwrap_or_default();
        Self {
            status,
            track_id: song.file,
            artist: song.artist.unwrap_or_default(),
            album: song.album.unwrap_or_default(),
            title: song.title.unwrap_or_default(),
        }
    }

    /// `true` when a track is loaded.
    pub fn has_track(&self) -> bool {
        !self.track_id.is_empty()
    }
}

/// A request for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub summary: String,
    pub message: String,
    /// Freedesktop icon name, or `None` for the server default.
    pub icon: Option<String>,
}

impl Notification {
    /// Generic "playback stopped" notification.
    pub fn stopped(icon: Option<&str>) -> Self {
        Self {
            summary: "MPD".into(),
            message: "Stopped".into(),
            icon: icon.filter(|i| !i.is_empty()).map(str::to_owned),
        }
    }

    /// Now-playing notification: artist as summary, title as message.
    ///
    /// `None` when the artist is empty; notification servers refuse an
    /// empty summary.
    pub fn track(obs: &Observation) -> Option<Self> {
        if obs.artist.is_empty() {
            return None;
        }
        Some(Self {
            summary: obs.artist.clone(),
            message: obs.title.clone(),
            icon: None,
        })
    }
}
