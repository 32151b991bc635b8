use crate::config::QuotaConfig;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Tracks remote calls against a fixed quota over a rolling window
///
/// The window ending at `now` covers the half-open interval
/// `(now - window, now]`. A call is admitted while fewer than `max_calls`
/// recorded timestamps fall inside it.
///
/// Entries that have left the window are evicted when a new call is
/// registered, so the history stays bounded by the calls made within one
/// window. Queries never mutate the history.
#[derive(Debug, Clone)]
pub struct CallWindowTracker {
    max_calls: usize,
    window: Duration,
    history: VecDeque<DateTime<Utc>>,
}

impl CallWindowTracker {
    /// Creates an empty tracker for the given quota
    pub fn new(quota: &QuotaConfig) -> Self {
        Self {
            max_calls: quota.max_calls as usize,
            window: quota.window(),
            history: VecDeque::new(),
        }
    }

    /// Rebuilds a tracker from persisted call timestamps
    ///
    /// Returns `None` if the timestamps are not in non-decreasing order.
    pub fn with_history<I>(quota: &QuotaConfig, calls: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut tracker = Self::new(quota);
        for call in calls {
            if tracker.history.back().is_some_and(|last| call < *last) {
                return None;
            }
            tracker.history.push_back(call);
        }
        Some(tracker)
    }

    /// Records a call made at `now`
    ///
    /// A timestamp earlier than the latest recorded call is clamped to it so
    /// the history stays ordered. Registering evicts calls that left the
    /// window ending at `now`, so later queries must not use an earlier `now`.
    pub fn register_call(&mut self, now: DateTime<Utc>) {
        let stamp = match self.history.back() {
            Some(last) if now < *last => {
                tracing::warn!(
                    "Call registered at {} precedes latest recorded call {}, clamping",
                    now,
                    last
                );
                *last
            }
            _ => now,
        };
        self.history.push_back(stamp);
        self.evict_expired(stamp);
    }

    /// Returns true if another call is allowed at `now`
    ///
    /// `now` must not precede the latest registered call; older queries may
    /// miss calls that were already evicted.
    pub fn can_make_call(&self, now: DateTime<Utc>) -> bool {
        self.calls_in_window(now) < self.max_calls
    }

    /// Counts the recorded calls that fall inside the window ending at `now`
    ///
    /// The window excludes its lower edge, so a call made exactly one window
    /// before `now` no longer counts and `next_available_at` is admissible.
    pub fn calls_in_window(&self, now: DateTime<Utc>) -> usize {
        let start = now - self.window;
        self.history.iter().filter(|&&t| t > start).count()
    }

    /// Earliest moment the oldest in-window call expires
    ///
    /// The search for the oldest in-window call starts from `now` itself, so
    /// an empty window yields `now + window` even though a call is already
    /// allowed. Callers deciding whether to wait should use
    /// [`can_make_call`](Self::can_make_call) or
    /// [`time_until_next_call`](Self::time_until_next_call).
    pub fn next_available_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = now - self.window;
        let oldest = self
            .history
            .iter()
            .copied()
            .filter(|&t| t > start && t < now)
            .min()
            .unwrap_or(now);
        oldest + self.window
    }

    /// How long until a call is allowed
    ///
    /// Returns `None` if a call can be made now, including when no call has
    /// ever been recorded.
    pub fn time_until_next_call(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        if self.can_make_call(now) {
            return None;
        }
        (self.next_available_at(now) - now).to_std().ok()
    }

    /// Recorded call timestamps, oldest first
    pub fn history(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.history.iter().copied()
    }

    /// Number of retained call timestamps
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        let start = now - self.window;
        while self.history.front().is_some_and(|&t| t <= start) {
            self.history.pop_front();
        }
    }
}

impl Default for CallWindowTracker {
    fn default() -> Self {
        Self::new(&QuotaConfig::default())
    }
}

/// Formats a wait as "M minutes and S seconds"
pub fn format_wait(wait: std::time::Duration) -> String {
    let total = wait.as_secs();
    format!("{} minutes and {} seconds", total / 60, total % 60)
}
