//! Collation hooks used by character comparison and LIKE.
//!
//! Building collation tables is out of scope here. The value layer only needs
//! a total order over strings and the single-character equivalence LIKE
//! tests literals with; without a collator both fall back to code points.

use std::cmp::Ordering;

pub trait Collator {
    fn compare(&self, lhs: &str, rhs: &str) -> Ordering;

    /// Whether two characters collate as equal.
    fn chars_equal(&self, lhs: char, rhs: char) -> bool {
        if lhs == rhs {
            return true;
        }

        let (mut left, mut right) = ([0; 4], [0; 4]);
        self.compare(lhs.encode_utf8(&mut left), rhs.encode_utf8(&mut right))
            .is_eq()
    }
}

/// Orders by lowercase form, so `'A'` and `'a'` are equivalent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
        lhs.chars()
            .flat_map(char::to_lowercase)
            .cmp(rhs.chars().flat_map(char::to_lowercase))
    }

    fn chars_equal(&self, lhs: char, rhs: char) -> bool {
        lhs == rhs || lhs.to_lowercase().eq(rhs.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reversed;

    impl Collator for Reversed {
        fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
            rhs.cmp(lhs)
        }
    }

    #[test]
    fn case_insensitive() {
        let collator = CaseInsensitiveCollator;
        assert_eq!(collator.compare("ABC", "abc"), Ordering::Equal);
        assert_eq!(collator.compare("abc", "ABD"), Ordering::Less);
        assert!(collator.chars_equal('Ä', 'ä'));
        assert!(!collator.chars_equal('a', 'b'));
    }

    #[test]
    fn default_char_equality_goes_through_compare() {
        assert!(Reversed.chars_equal('x', 'x'));
        assert!(!Reversed.chars_equal('x', 'y'));
    }
}
