//! Similarity heuristics for correlating crawled entities
//!
//! All functions in this module are pure and never fail. Degenerate inputs
//! (empty strings, empty or missing lists) map to defined outputs rather than
//! errors.
//!
//! # Components
//!
//! - `phonetic_code`: Soundex-style four character sound signature
//! - `longest_common_substring` / `string_similarity_ratio`: residual-based
//!   string comparison (lower ratio means more alike)
//! - `set_similarity_ratio`: overlap ratio between two lists
//! - `distinct_characters` / `relation_key`: small helpers used when keying
//!   and comparing records

mod overlap;
mod phonetic;
mod substring;

pub use overlap::{distinct_characters, relation_key, set_similarity_ratio};
pub use phonetic::{phonetic_code, EMPTY_PHONETIC_CODE};
pub use substring::{longest_common_substring, string_similarity_ratio};
