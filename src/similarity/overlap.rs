//! Set overlap and keying helpers

use std::collections::HashSet;
use std::hash::Hash;

/// Overlap ratio between two lists, in `[0, 1]`
///
/// Both lists are deduplicated. A running set is seeded with the elements of
/// `first`; each distinct element of `second` either counts as a hit (already
/// present) or is added to the set. The result is `hits / final set size`.
///
/// Returns `0.0` when either list is missing or when both are empty.
///
/// # Example
///
/// ```
/// use crawl_keeper::similarity::set_similarity_ratio;
///
/// let ratio = set_similarity_ratio(Some(&[1, 2, 3][..]), Some(&[2, 3, 4][..]));
/// assert_eq!(ratio, 0.5);
/// ```
pub fn set_similarity_ratio<T>(first: Option<&[T]>, second: Option<&[T]>) -> f64
where
    T: Eq + Hash,
{
    let (Some(first), Some(second)) = (first, second) else {
        return 0.0;
    };

    let mut seen: HashSet<&T> = first.iter().collect();
    let mut second_distinct: HashSet<&T> = HashSet::with_capacity(second.len());
    let mut hits = 0usize;

    for item in second {
        if !second_distinct.insert(item) {
            continue;
        }
        if seen.contains(item) {
            hits += 1;
        } else {
            seen.insert(item);
        }
    }

    if seen.is_empty() {
        return 0.0;
    }
    hits as f64 / seen.len() as f64
}

/// Returns the distinct characters of `s` in first-occurrence order
pub fn distinct_characters(s: &str) -> String {
    let mut seen = HashSet::new();
    s.chars().filter(|c| seen.insert(*c)).collect()
}

/// Canonical key for an undirected relation between two entities
///
/// The larger id comes first, so `relation_key(a, b) == relation_key(b, a)`.
pub fn relation_key(a: u64, b: u64) -> String {
    let (high, low) = if a >= b { (a, b) } else { (b, a) };
    format!("{}_{}", high, low)
}
