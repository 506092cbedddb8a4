#![forbid(unsafe_code)]

//! Trailing-edge debouncer for change-triggered reconciliation.
//!
//! Timestamps are host-supplied monotonic offsets (`performance.now()` in the
//! browser), so the debouncer never reads a clock itself and replaying the
//! same notification times yields the same firings.

use core::time::Duration;

/// Result of polling the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// Nothing pending, or the window has not elapsed yet.
    None,
    /// The window elapsed; reconcile now.
    Fire {
        /// Notifications coalesced into this firing.
        coalesced: u32,
        /// Time since the last notification.
        elapsed: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct ReconcileDebouncer {
    window: Duration,
    last_notified: Option<Duration>,
    coalesced: u32,
}

impl ReconcileDebouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_notified: None,
            coalesced: 0,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last_notified.is_some()
    }

    /// Record a notification at `now`, restarting the window.
    pub fn notify_at(&mut self, now: Duration) {
        // Hosts may hand us a clock that stepped backwards; never rewind.
        let at = match self.last_notified {
            Some(last) => last.max(now),
            None => now,
        };
        self.last_notified = Some(at);
        self.coalesced = self.coalesced.saturating_add(1);
    }

    /// Fire once `window` has elapsed since the last notification.
    pub fn tick_at(&mut self, now: Duration) -> DebounceAction {
        let Some(last) = self.last_notified else {
            return DebounceAction::None;
        };
        let elapsed = now.saturating_sub(last);
        if elapsed < self.window {
            return DebounceAction::None;
        }
        let coalesced = self.coalesced;
        self.cancel();
        DebounceAction::Fire { coalesced, elapsed }
    }

    /// Remaining wait before [`tick_at`](Self::tick_at) fires, if pending.
    #[must_use]
    pub fn time_until_fire(&self, now: Duration) -> Option<Duration> {
        let last = self.last_notified?;
        let elapsed = now.saturating_sub(last);
        Some(self.window.saturating_sub(elapsed))
    }

    /// Drop any pending notification.
    pub fn cancel(&mut self) {
        self.last_notified = None;
        self.coalesced = 0;
    }
}
