//! Ordered subsequence matching.
//!
//! A pattern matches a candidate when every pattern character occurs in the
//! candidate in the same relative order, not necessarily adjacent. Matching is
//! case-sensitive and the empty pattern matches everything.

/// Check whether `pattern` is an ordered subsequence of `candidate`.
///
/// Each pattern character is searched for in the unconsumed suffix of the
/// candidate, and the cursor moves past the first occurrence found.
///
/// ```
/// use treefind::index::matcher::is_subsequence;
///
/// assert!(is_subsequence("abc", "xaybzc"));
/// assert!(!is_subsequence("cba", "xaybzc"));
/// ```
pub fn is_subsequence(pattern: &str, candidate: &str) -> bool {
    let mut rest = candidate;
    for ch in pattern.chars() {
        match rest.find(ch) {
            Some(pos) => rest = &rest[pos + ch.len_utf8()..],
            None => return false,
        }
    }
    true
}
