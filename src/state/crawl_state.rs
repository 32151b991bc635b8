use crate::config::QuotaConfig;
use crate::state::call_window::{format_wait, CallWindowTracker};
use crate::state::cursor::CrawlCursor;
use crate::state::target::TargetId;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::fmt;

/// The persisted unit of crawl progress for one target
///
/// Combines the target identity, the pagination position and the call-window
/// accounting. It is the sole owner of its history and cursor; everything
/// else reads and mutates them through these methods.
#[derive(Debug, Clone)]
pub struct CrawlState {
    target: TargetId,
    cursor: CrawlCursor,
    calls: CallWindowTracker,
    total_calls: u64,
}

/// Point-in-time summary of a [`CrawlState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSummary {
    pub subset: u32,
    pub target: TargetId,
    pub cursor: i64,
    pub recorded_calls: u64,
}

impl CrawlState {
    /// Creates a fresh state: subset 1, start cursor, no calls
    pub fn create(target: TargetId, quota: &QuotaConfig) -> Self {
        tracing::info!("Registering a new crawl state for target {}", target);
        Self {
            target,
            cursor: CrawlCursor::new(),
            calls: CallWindowTracker::new(quota),
            total_calls: 0,
        }
    }

    /// Rebuilds a state from persisted parts
    ///
    /// Fails with [`CrawlError::CorruptState`] if the parts break an invariant:
    /// a zero subset, unordered call timestamps, or a lifetime call count
    /// smaller than the retained history.
    pub fn restore<I>(
        target: TargetId,
        subset: u32,
        cursor: i64,
        calls: I,
        total_calls: u64,
        quota: &QuotaConfig,
    ) -> Result<Self, CrawlError>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let cursor = CrawlCursor::from_parts(subset, cursor).ok_or_else(|| {
            CrawlError::CorruptState(format!("target {} has subset {}", target, subset))
        })?;

        let calls = CallWindowTracker::with_history(quota, calls).ok_or_else(|| {
            CrawlError::CorruptState(format!("target {} has unordered call history", target))
        })?;

        if (calls.len() as u64) > total_calls {
            return Err(CrawlError::CorruptState(format!(
                "target {} retains {} calls but reports {} in total",
                target,
                calls.len(),
                total_calls
            )));
        }

        Ok(Self {
            target,
            cursor,
            calls,
            total_calls,
        })
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    // ===== Call Window =====

    /// Returns true if the quota allows another call at `now`
    pub fn can_make_call(&self, now: DateTime<Utc>) -> bool {
        let count = self.calls.calls_in_window(now);
        let allowed = count < self.calls.max_calls();

        if allowed {
            tracing::debug!(
                "Identified {} calls in the current window, able to make more calls",
                count
            );
        } else {
            let wait = self.calls.time_until_next_call(now).unwrap_or_default();
            tracing::info!(
                "Identified {} calls in the current window, unable to make more calls ({})",
                count,
                format_wait(wait)
            );
        }

        allowed
    }

    /// Records a call made at `now`
    pub fn register_call(&mut self, now: DateTime<Utc>) {
        self.calls.register_call(now);
        self.total_calls += 1;
    }

    /// See [`CallWindowTracker::next_available_at`]
    pub fn next_available_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.calls.next_available_at(now)
    }

    /// How long until a call is allowed, `None` if one is allowed now
    pub fn time_until_next_call(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.calls.time_until_next_call(now)
    }

    /// Retained call timestamps, oldest first
    pub fn call_history(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.calls.history()
    }

    /// Number of calls ever registered for this target
    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    // ===== Pagination =====

    pub fn advance_subset(&mut self) {
        self.cursor.advance_subset();
        tracing::info!(
            "Target {} advanced to subset {}",
            self.target,
            self.cursor.subset()
        );
    }

    pub fn set_cursor(&mut self, token: i64) {
        self.cursor.set_cursor(token);
    }

    pub fn cursor(&self) -> i64 {
        self.cursor.cursor()
    }

    pub fn subset(&self) -> u32 {
        self.cursor.subset()
    }

    /// Produces a diagnostic snapshot of this state
    pub fn describe(&self) -> StateSummary {
        StateSummary {
            subset: self.subset(),
            target: self.target,
            cursor: self.cursor(),
            recorded_calls: self.total_calls,
        }
    }
}

impl fmt::Display for StateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subsets: {}", self.subset)?;
        writeln!(f, "Target ID: {}", self.target)?;
        writeln!(f, "Cursor: {}", self.cursor)?;
        write!(f, "Access times: {}", self.recorded_calls)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe().fmt(f)
    }
}
