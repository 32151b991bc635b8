//! Shared crawl state and periodic checkpointing
//!
//! A crawl normally has one task driving its [`CrawlState`]. When a second
//! task needs to read it (a checkpoint writer, a status reporter), the state
//! is wrapped in a [`SharedCrawlState`]: every mutation and every snapshot
//! takes the same lock, so readers always see a consistent point in time.
//!
//! [`Checkpointer`] saves snapshots to storage on a fixed interval and once
//! more when asked to shut down.

use crate::state::{CrawlState, StateSummary};
use crate::storage::Storage;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// A crawl state shared between tasks
#[derive(Debug, Clone)]
pub struct SharedCrawlState {
    inner: Arc<Mutex<CrawlState>>,
}

impl SharedCrawlState {
    pub fn new(state: CrawlState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs `f` with exclusive access to the state
    pub fn with<T>(&self, f: impl FnOnce(&mut CrawlState) -> T) -> Result<T, CrawlError> {
        let mut state = self.inner.lock().map_err(|_| CrawlError::LockPoisoned)?;
        Ok(f(&mut state))
    }

    /// Clones the current state
    pub fn snapshot(&self) -> Result<CrawlState, CrawlError> {
        self.with(|state| state.clone())
    }

    pub fn describe(&self) -> Result<StateSummary, CrawlError> {
        self.with(|state| state.describe())
    }

    pub fn can_make_call(&self, now: DateTime<Utc>) -> Result<bool, CrawlError> {
        self.with(|state| state.can_make_call(now))
    }

    /// Registers a call at `now` only if the quota allows it
    ///
    /// The check and the registration happen under one lock, so two tasks
    /// cannot both claim the last free slot of the window.
    pub fn try_register_call(&self, now: DateTime<Utc>) -> Result<bool, CrawlError> {
        self.with(|state| {
            if state.can_make_call(now) {
                state.register_call(now);
                true
            } else {
                false
            }
        })
    }

    pub fn register_call(&self, now: DateTime<Utc>) -> Result<(), CrawlError> {
        self.with(|state| state.register_call(now))
    }

    pub fn set_cursor(&self, token: i64) -> Result<(), CrawlError> {
        self.with(|state| state.set_cursor(token))
    }

    pub fn advance_subset(&self) -> Result<(), CrawlError> {
        self.with(|state| state.advance_subset())
    }
}

/// Periodically saves a [`SharedCrawlState`] to storage
pub struct Checkpointer<S> {
    state: SharedCrawlState,
    storage: Arc<Mutex<S>>,
    interval: Duration,
}

impl<S> Checkpointer<S>
where
    S: Storage + Send + 'static,
{
    pub fn new(state: SharedCrawlState, storage: Arc<Mutex<S>>, interval: Duration) -> Self {
        Self {
            state,
            storage,
            interval,
        }
    }

    /// Saves one snapshot
    ///
    /// The state lock is released before the storage lock is taken.
    pub fn checkpoint(&self) -> Result<(), CrawlError> {
        let snapshot = self.state.snapshot()?;
        let mut storage = self.storage.lock().map_err(|_| CrawlError::LockPoisoned)?;
        storage.save_crawl_state(&snapshot)?;
        tracing::debug!(
            "Checkpointed target {} at subset {}, cursor {}",
            snapshot.target(),
            snapshot.subset(),
            snapshot.cursor()
        );
        Ok(())
    }

    /// Checkpoints every interval until `shutdown` flips to true or its sender
    /// is dropped, then saves a final snapshot
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of checkpoints written, including the final one
    /// * `Err(CrawlError)` - A save failed; the loop stops at the first failure
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<u64, CrawlError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        let mut written = 0u64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.checkpoint()?;
                    written += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.checkpoint()?;
        written += 1;
        tracing::info!("Checkpointer stopped after {} checkpoints", written);
        Ok(written)
    }
}
