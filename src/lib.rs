//! **mpd-notify**: desktop notifications for MPD.
//!
//! The daemon polls MPD's status twice a second, compares it with the
//! previous sample and shows a desktop notification when playback stops or
//! a new track starts.
//!
//! # Architecture
//!
//! The crate is organised around three traits in [`traits`]:
//!
//! * [`traits::Player`]: abstracts the music player so the diffing logic
//!   is not coupled to MPD's wire protocol.
//! * [`traits::Notifier`]: abstracts the notification sink.
//! * [`traits::Clock`]: abstracts sleeping so the loop can be interrupted
//!   and tested without real time passing.
//!
//! [`observer`] holds the diffing rules, [`supervisor`] reconnects when the
//! player goes away, and the concrete backends live in [`client`] (MPD,
//! through the `mpd` crate) and [`notifier`] (freedesktop notifications).  [`daemon`] and [`cli`]
//! are process glue used by the `mpd-notify` binary; [`remote`] backs the
//! `mpd-music` key-binding helper.

pub mod cli;
pub mod client;
pub mod config;
pub mod daemon;
pub mod notifier;
pub mod observation;
pub mod observer;
pub mod remote;
pub mod shutdown;
pub mod supervisor;
pub mod traits;
