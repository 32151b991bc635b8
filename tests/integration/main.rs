//! Integration tests for crawl sessions
//!
//! These tests drive the public API the way an orchestrator would: a fake
//! remote service hands out paginated pages, a simulated clock advances, and
//! progress is checkpointed to an on-disk database between runs.

mod session_tests;
