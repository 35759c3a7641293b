// SPDX-License-Identifier: MIT
//
// Debouncer: coalesce bursts of triggers into one delayed pass.
//
// Edits, scrolls and focus changes arrive in bursts. Each one calls
// `trigger`, which replaces whatever was pending and pushes the deadline
// out again. The host loop calls `poll` on every tick; once a full delay
// has passed with no new trigger, `poll` hands back the last value, once.
//
// The debouncer never reads a clock. Callers pass `now`, so the host loop
// owns time and tests can step it by hand.

use std::time::{Duration, Instant};

use tint_engine::config::DEFAULT_RENDER_DELAY;

/// A single pending value with a deadline.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay. A pending deadline keeps its old value.
    pub const fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `value` for `now + delay`, replacing anything pending.
    pub fn trigger(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    /// When the pending value fires, if any. Hosts sleep until then.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(d, _)| *d)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DELAY)
    }
}
