//! SQL `LIKE` matching and the index ranges derived from constant patterns.
//!
//! `_` matches exactly one character, `%` any run of characters including an
//! empty one. An escape character turns the character after it into a literal
//! and may only precede `_`, `%` or itself.

use crate::sql::collation::Collator;
use crate::{Result, TypeError};

const ANY_ONE: char = '_';
const ANY_RUN: char = '%';

/// Smallest character used to pad range keys.
const PAD: char = '\0';

/// Upper end of the range an optimised `LIKE` scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpperBound {
    /// Keys must be strictly less than this string.
    Bounded(String),
    /// The prefix cannot be incremented, every key above the lower bound
    /// is a candidate.
    Unbounded,
}

/// Matches `value` against `pattern`. A missing value or pattern is SQL
/// NULL and produces `None`.
pub fn like(
    value: Option<&[char]>,
    pattern: Option<&[char]>,
    escape: Option<char>,
    collator: Option<&dyn Collator>,
) -> Result<Option<bool>> {
    let (Some(value), Some(pattern)) = (value, pattern) else {
        return Ok(None);
    };

    matches(value, pattern, escape, collator).map(Some)
}

/// [`like`] over string slices.
pub fn like_str(
    value: &str,
    pattern: &str,
    escape: Option<char>,
    collator: Option<&dyn Collator>,
) -> Result<bool> {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    matches(&value, &pattern, escape, collator)
}

fn matches(
    value: &[char],
    pattern: &[char],
    escape: Option<char>,
    collator: Option<&dyn Collator>,
) -> Result<bool> {
    let (mut v, mut p) = (0, 0);

    loop {
        if let Some(result) = check_lengths(value, v, pattern, p, escape) {
            return Ok(result);
        }

        let current = pattern[p];

        if Some(current) == escape {
            let escaped = escaped_char(pattern, p, escape)?;
            if value[v] != escaped {
                return Ok(false);
            }
            v += 1;
            p += 2;
            continue;
        }

        match current {
            ANY_ONE => {
                v += 1;
                p += 1;
            }
            ANY_RUN => {
                let rest = &pattern[p + 1..];
                if only_wildcard_runs(rest, escape) {
                    return Ok(true);
                }

                let min_len = min_len(rest, escape);
                let remaining = value.len() - v;
                if remaining < min_len {
                    return Ok(false);
                }

                // longest suffix first
                for skip in 0..=remaining - min_len {
                    if matches(&value[v + skip..], rest, escape, collator)? {
                        return Ok(true);
                    }
                }

                return Ok(false);
            }
            literal => {
                if !chars_equal(value[v], literal, collator) {
                    return Ok(false);
                }
                v += 1;
                p += 1;
            }
        }
    }
}

/// Whether `pattern` is made of unescaped `%` only. An escaped `%` needs a
/// value character of its own.
fn only_wildcard_runs(pattern: &[char], escape: Option<char>) -> bool {
    pattern.iter().all(|c| *c == ANY_RUN && Some(*c) != escape)
}

/// Decides the match once either side is exhausted, `None` while both still
/// have characters left.
fn check_lengths(
    value: &[char],
    v: usize,
    pattern: &[char],
    p: usize,
    escape: Option<char>,
) -> Option<bool> {
    if v == value.len() {
        return Some(only_wildcard_runs(&pattern[p..], escape));
    }

    if p == pattern.len() {
        return Some(false);
    }

    None
}

/// The literal following the escape at `pattern[at]`.
fn escaped_char(pattern: &[char], at: usize, escape: Option<char>) -> Result<char> {
    match pattern.get(at + 1) {
        Some(&c) if c == ANY_ONE || c == ANY_RUN || Some(c) == escape => Ok(c),
        _ => Err(TypeError::InvalidEscapeSequence),
    }
}

fn chars_equal(lhs: char, rhs: char, collator: Option<&dyn Collator>) -> bool {
    lhs == rhs || collator.is_some_and(|collator| collator.chars_equal(lhs, rhs))
}

/// Least number of value characters `pattern` can match.
fn min_len(pattern: &[char], escape: Option<char>) -> usize {
    let mut len = 0;
    let mut i = 0;

    while i < pattern.len() {
        match pattern[i] {
            c if Some(c) == escape => i += 2,
            ANY_RUN => {
                i += 1;
                continue;
            }
            _ => i += 1,
        }
        len += 1;
    }

    len
}

/// Whether a `LIKE` with this constant pattern can be answered by a range
/// scan, which needs a literal prefix.
pub fn is_optimizable(pattern: Option<&str>) -> bool {
    match pattern {
        None => false,
        Some(pattern) => !matches!(pattern.chars().next(), Some(ANY_ONE | ANY_RUN)),
    }
}

/// Characters before the first wildcard, escapes removed.
fn literal_prefix(pattern: &str, escape: Option<char>) -> Result<Vec<char>> {
    let pattern: Vec<char> = pattern.chars().collect();
    let mut prefix = Vec::with_capacity(pattern.len());
    let mut i = 0;

    while i < pattern.len() {
        match pattern[i] {
            c if Some(c) == escape => {
                prefix.push(escaped_char(&pattern, i, escape)?);
                i += 2;
            }
            ANY_ONE | ANY_RUN => break,
            c => {
                prefix.push(c);
                i += 1;
            }
        }
    }

    Ok(prefix)
}

fn pad(mut key: String, chars: usize, width: usize) -> String {
    key.extend(std::iter::repeat(PAD).take(width.saturating_sub(chars)));
    key
}

/// Inclusive lower bound of the range matched by `pattern`, padded with
/// `'\0'` to `max_width` characters.
pub fn greater_equal_string(pattern: &str, escape: Option<char>, max_width: usize) -> Result<String> {
    let prefix = literal_prefix(pattern, escape)?;
    let len = prefix.len();

    Ok(pad(prefix.into_iter().collect(), len, max_width))
}

/// Exclusive upper bound of the range matched by `pattern`: the literal
/// prefix with its last character incremented.
pub fn less_than_string(pattern: &str, escape: Option<char>, max_width: usize) -> Result<UpperBound> {
    let mut prefix = literal_prefix(pattern, escape)?;

    let Some(last) = prefix.last_mut() else {
        return Ok(UpperBound::Unbounded);
    };

    let next = match *last {
        '\u{D7FF}' => Some('\u{E000}'),
        c => char::from_u32(c as u32 + 1),
    };

    let Some(next) = next else {
        return Ok(UpperBound::Unbounded);
    };
    *last = next;

    let len = prefix.len();
    Ok(UpperBound::Bounded(pad(prefix.into_iter().collect(), len, max_width)))
}

/// Whether the predicate still has to run after the range scan. Patterns
/// made of a literal prefix and a single trailing `%` are answered by the
/// range alone.
pub fn is_like_comparison_needed(pattern: &str, escape: Option<char>) -> bool {
    if escape.is_some_and(|escape| pattern.contains(escape)) {
        return true;
    }

    let Some(prefix) = pattern.strip_suffix(ANY_RUN) else {
        return true;
    };

    prefix.is_empty() || prefix.contains([ANY_ONE, ANY_RUN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::collation::CaseInsensitiveCollator;

    fn like(value: &str, pattern: &str) -> bool {
        like_str(value, pattern, None, None).unwrap()
    }

    fn like_escaped(value: &str, pattern: &str) -> Result<bool> {
        like_str(value, pattern, Some('\\'), None)
    }

    #[test]
    fn literals_and_wildcards() {
        assert!(like("abc", "abc"));
        assert!(like("abc", "a%c"));
        assert!(!like("ab", "a%c"));
        assert!(like("", "%"));
        assert!(!like("x", ""));
        assert!(like("", ""));
        assert!(!like("", "_"));
        assert!(like("abc", "___"));
        assert!(!like("abc", "__"));
        assert!(like("abc", "%%%"));
        assert!(like("abc", "a%"));
        assert!(!like("abc", "A%"));
    }

    #[test]
    fn backtracking() {
        assert!(like("Albert", "%er%"));
        assert!(like("Bernard", "%er%"));
        assert!(!like("Albert", "_er%"));
        assert!(like("Cheryl", "_her%"));
        assert!(like("abcbcd", "a%bcd"));
        assert!(like("mississippi", "m%iss%pi"));
        assert!(!like("mississippi", "m%iss%pix"));
        assert!(like("aaa", "%a%a%a%"));
        assert!(!like("aa", "%a%a%a%"));
        assert!(like("xyz", "%_"));
        assert!(like("xyz", "%%z"));
    }

    #[test]
    fn escapes() {
        assert_eq!(like_escaped("a_c", "a\\_c"), Ok(true));
        assert_eq!(like_escaped("axc", "a\\_c"), Ok(false));
        assert_eq!(like_escaped("100%", "100\\%"), Ok(true));
        assert_eq!(like_escaped("1000", "100\\%"), Ok(false));
        assert_eq!(like_escaped("a\\b", "a\\\\b"), Ok(true));
        assert_eq!(like_escaped("50% off", "%\\%%"), Ok(true));
    }

    #[test]
    fn invalid_escapes() {
        assert_eq!(like_escaped("ab", "a\\"), Err(TypeError::InvalidEscapeSequence));
        assert_eq!(like_escaped("ab", "a\\b"), Err(TypeError::InvalidEscapeSequence));
    }

    #[test]
    fn escape_may_be_a_wildcard() {
        assert_eq!(like_str("a%", "a%%", Some('%'), None), Ok(true));
        assert_eq!(like_str("ab", "a%%", Some('%'), None), Ok(false));
        // %% is a literal percent and needs a character to match
        assert_eq!(like_str("a", "a%%", Some('%'), None), Ok(false));
        assert_eq!(like_str("", "%%", Some('%'), None), Ok(false));
        assert_eq!(like_str("%", "%%", Some('%'), None), Ok(true));
    }

    #[test]
    fn collation() {
        let collator = CaseInsensitiveCollator;
        assert_eq!(like_str("ABC", "abc", None, Some(&collator)), Ok(true));
        assert_eq!(like_str("ABC", "abc", None, None), Ok(false));
        assert_eq!(like_str("Hello World", "h%WORLD", None, Some(&collator)), Ok(true));
        // escaped characters match exactly
        assert_eq!(like_str("A_", "a\\_", Some('\\'), Some(&collator)), Ok(true));
    }

    #[test]
    fn nulls() {
        let value: Vec<char> = "abc".chars().collect();
        assert_eq!(super::like(None, Some(&value), None, None), Ok(None));
        assert_eq!(super::like(Some(&value), None, None, None), Ok(None));
        assert_eq!(super::like(Some(&value), Some(&value), None, None), Ok(Some(true)));
    }

    #[test]
    fn minimum_length() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(min_len(&chars("a%b_"), None), 3);
        assert_eq!(min_len(&chars("%%"), None), 0);
        assert_eq!(min_len(&chars("\\%x"), Some('\\')), 2);
    }

    #[test]
    fn optimizable_patterns() {
        assert!(!is_optimizable(None));
        assert!(is_optimizable(Some("")));
        assert!(is_optimizable(Some("abc%")));
        assert!(!is_optimizable(Some("%abc")));
        assert!(!is_optimizable(Some("_bc")));
    }

    #[test]
    fn range_bounds() {
        assert_eq!(greater_equal_string("abc%", None, 5), Ok("abc\0\0".to_string()));
        assert_eq!(greater_equal_string("ab_d", None, 2), Ok("ab".to_string()));
        assert_eq!(
            greater_equal_string("a\\%b%", Some('\\'), 4),
            Ok("a%b\0".to_string())
        );

        assert_eq!(
            less_than_string("abc%", None, 4),
            Ok(UpperBound::Bounded("abd\0".to_string()))
        );
        assert_eq!(
            less_than_string("a\\_%", Some('\\'), 2),
            Ok(UpperBound::Bounded("a`".to_string()))
        );
        assert_eq!(less_than_string("%", None, 4), Ok(UpperBound::Unbounded));
        assert_eq!(
            less_than_string("a\u{10FFFF}%", None, 4),
            Ok(UpperBound::Unbounded)
        );
        assert_eq!(
            less_than_string("\u{D7FF}", None, 1),
            Ok(UpperBound::Bounded("\u{E000}".to_string()))
        );
        assert_eq!(
            less_than_string("ab\\", Some('\\'), 4),
            Err(TypeError::InvalidEscapeSequence)
        );
    }

    #[test]
    fn comparison_needed() {
        assert!(!is_like_comparison_needed("abc%", None));
        assert!(is_like_comparison_needed("abc", None));
        assert!(is_like_comparison_needed("%", None));
        assert!(is_like_comparison_needed("a_c%", None));
        assert!(is_like_comparison_needed("ab%%", None));
        assert!(is_like_comparison_needed("a\\%b%", Some('\\')));
    }
}
