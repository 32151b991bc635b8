//! Longest-common-substring based string comparison

/// Byte offsets of every char boundary in `s`, including `s.len()`
fn char_boundaries(s: &str) -> Vec<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect()
}

/// Finds the longest contiguous substring shared by both strings
///
/// Substrings of `a` are scanned by start position ascending, then by length
/// ascending, and a candidate only replaces the current best when it is
/// strictly longer. Ties therefore resolve to the earliest start in `a`.
///
/// Returns an empty string when the inputs share no character.
///
/// # Example
///
/// ```
/// use crawl_keeper::similarity::longest_common_substring;
///
/// assert_eq!(longest_common_substring("ABCDEF", "ZCDQ"), "CD");
/// ```
pub fn longest_common_substring(a: &str, b: &str) -> String {
    let bounds = char_boundaries(a);
    let char_count = bounds.len() - 1;
    let mut longest: &str = "";
    let mut longest_chars = 0;

    for start in 0..char_count {
        for end in start..char_count {
            let section = &a[bounds[start]..bounds[end + 1]];
            if !b.contains(section) {
                // every longer section from this start contains this one
                break;
            }
            let section_chars = end + 1 - start;
            if section_chars > longest_chars {
                longest = section;
                longest_chars = section_chars;
            }
        }
    }

    longest.to_string()
}

/// Residual-based similarity ratio between two strings, in `[0, 0.5]`
///
/// Repeatedly finds the longest common substring of the working copies and
/// removes every occurrence of it from both, until nothing is shared. The
/// result is `(remaining_a + remaining_b) / (len_a + len_b) / 2`.
///
/// Lower values mean the strings are more alike: identical non-empty strings
/// score `0.0`. Two empty strings also score `0.0`.
pub fn string_similarity_ratio(a: &str, b: &str) -> f64 {
    let original = a.chars().count() + b.chars().count();
    if original == 0 {
        return 0.0;
    }

    let mut left = a.to_string();
    let mut right = b.to_string();
    loop {
        let common = longest_common_substring(&left, &right);
        if common.is_empty() {
            break;
        }
        left = left.replace(&common, "");
        right = right.replace(&common, "");
    }

    let remaining = left.chars().count() + right.chars().count();
    (remaining as f64 / original as f64) / 2.0
}
