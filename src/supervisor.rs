//! Connection supervision.
//!
//! [`Supervisor`] owns the reconnect loop: dial the player, hand the
//! connection to the [`Observer`], and when that fails drop the connection,
//! wait according to the [`Backoff`] policy and dial again.  Retries are
//! unbounded; only an interrupt from the [`Clock`] ends the loop.

use crate::config::RetryConfig;
use crate::observer::{ObserveError, Observer};
use crate::traits::{Clock, Notifier, Player};
use log::{info, warn};
use std::fmt;
use std::time::Duration;

/// Reconnect delay policy.
///
/// Starts at `base` and multiplies by `factor` after every failed attempt,
/// capped at `max`.  A factor of `1.0` gives a fixed delay.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    factor: f64,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, factor: f64, max: Duration) -> Self {
        // Shrinking or NaN factors would hot-loop; clamp to a fixed delay.
        let factor = if factor.is_finite() && factor >= 1.0 { factor } else { 1.0 };
        let max = max.max(base);
        Self {
            base,
            factor,
            max,
            current: base,
        }
    }

    /// A constant delay.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, 1.0, delay)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_ms),
            config.backoff_factor,
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay before the next attempt; advances the policy.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.factor)
            .unwrap_or(self.max)
            .min(self.max);
        delay
    }

    /// Back to `base`, once a connection has served at least one poll.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Keeps an [`Observer`] running across connection failures.
///
/// `connect` is called for every attempt and must return a fresh player
/// handle.  The handle is dropped (closing its socket) before the retry
/// delay starts.
pub struct Supervisor<F, N> {
    connect: F,
    notifier: N,
    observer: Observer,
    backoff: Backoff,
}

impl<F, N: Notifier> Supervisor<F, N> {
    pub fn new(connect: F, notifier: N, observer: Observer, backoff: Backoff) -> Self {
        Self {
            connect,
            notifier,
            observer,
            backoff,
        }
    }

    /// The observer, including its last observation.
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Connect, observe and reconnect until `clock` is interrupted.
    pub fn run<P, E, C>(&mut self, clock: &C)
    where
        F: FnMut() -> Result<P, E>,
        P: Player,
        E: fmt::Display,
        C: Clock,
    {
        loop {
            match (self.connect)() {
                Ok(mut player) => {
                    let polls = self.observer.polls();
                    let exit = self.observer.run(&mut player, &self.notifier, clock);
                    // A player that accepts the connection but fails every
                    // request must keep backing off.
                    if self.observer.polls() > polls {
                        self.backoff.reset();
                    }
                    match exit {
                        ObserveError::Interrupted => return,
                        ObserveError::Player(e) => warn!("lost connection to player: {}", e),
                    }
                }
                Err(e) => info!("cannot connect to player: {}", e),
            }

            let delay = self.backoff.next_delay();
            info!("reconnecting in {:.1}s", delay.as_secs_f64());
            if clock.sleep(delay).is_err() {
                return;
            }
        }
    }
}
