//! State module for tracking crawl progress
//!
//! This module provides the in-memory state that is persisted between runs.
//!
//! # Components
//!
//! - `TargetId`: Validated identifier of the entity being crawled
//! - `CrawlCursor`: Pagination token and subset counter
//! - `CallWindowTracker`: Rolling-window call quota accounting
//! - `CrawlState`: The unit of persisted progress combining all of the above

mod call_window;
mod crawl_state;
mod cursor;
mod target;

// Re-export main types
pub use call_window::{format_wait, CallWindowTracker};
pub use crawl_state::{CrawlState, StateSummary};
pub use cursor::{CrawlCursor, START_CURSOR};
pub use target::TargetId;
