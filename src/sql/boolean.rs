//! Three-valued SQL booleans.

use std::fmt::{self, Display, Formatter};
use std::ops::Not;
use std::str::FromStr;

use crate::sql::types::TypeId;
use crate::{Result, TypeError};

/// `TRUE`, `FALSE` or `UNKNOWN`, the last one being a NULL boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SqlBool(Option<bool>);

impl SqlBool {
    pub const TRUE: Self = Self(Some(true));
    pub const FALSE: Self = Self(Some(false));
    pub const UNKNOWN: Self = Self(None);

    /// `UNKNOWN` when either operand was NULL, `truth` otherwise.
    pub const fn truth_value(left_null: bool, right_null: bool, truth: bool) -> Self {
        match left_null || right_null {
            true => Self::UNKNOWN,
            _ => Self(Some(truth)),
        }
    }

    pub const fn is_true(self) -> bool {
        matches!(self.0, Some(true))
    }

    pub const fn is_false(self) -> bool {
        matches!(self.0, Some(false))
    }

    pub const fn is_unknown(self) -> bool {
        self.0.is_none()
    }

    pub const fn get(self) -> Option<bool> {
        self.0
    }

    /// `FALSE` dominates `UNKNOWN`.
    pub const fn and(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Some(false), _) | (_, Some(false)) => Self::FALSE,
            (Some(true), Some(true)) => Self::TRUE,
            _ => Self::UNKNOWN,
        }
    }

    /// `TRUE` dominates `UNKNOWN`.
    pub const fn or(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Some(true), _) | (_, Some(true)) => Self::TRUE,
            (Some(false), Some(false)) => Self::FALSE,
            _ => Self::UNKNOWN,
        }
    }

    /// `x IS y`, which is never unknown.
    pub const fn is(self, other: Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Not for SqlBool {
    type Output = Self;

    fn not(self) -> Self {
        Self(self.0.map(|value| !value))
    }
}

impl From<bool> for SqlBool {
    fn from(value: bool) -> Self {
        Self(Some(value))
    }
}

impl From<Option<bool>> for SqlBool {
    fn from(value: Option<bool>) -> Self {
        Self(value)
    }
}

impl FromStr for SqlBool {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        [Self::TRUE, Self::FALSE, Self::UNKNOWN]
            .into_iter()
            .find(|value| value.to_string().eq_ignore_ascii_case(text))
            .ok_or_else(|| TypeError::invalid_format(TypeId::Boolean, s))
    }
}

impl Display for SqlBool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self.0 {
            Some(true) => "TRUE",
            Some(false) => "FALSE",
            None => "UNKNOWN",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SqlBool; 3] = [SqlBool::TRUE, SqlBool::FALSE, SqlBool::UNKNOWN];

    #[test]
    fn truth_tables() {
        use SqlBool as B;

        assert_eq!(B::TRUE.and(B::UNKNOWN), B::UNKNOWN);
        assert_eq!(B::FALSE.and(B::UNKNOWN), B::FALSE);
        assert_eq!(B::UNKNOWN.and(B::FALSE), B::FALSE);
        assert_eq!(B::TRUE.and(B::TRUE), B::TRUE);

        assert_eq!(B::TRUE.or(B::UNKNOWN), B::TRUE);
        assert_eq!(B::FALSE.or(B::UNKNOWN), B::UNKNOWN);
        assert_eq!(B::FALSE.or(B::FALSE), B::FALSE);

        assert_eq!(!B::TRUE, B::FALSE);
        assert_eq!(!B::UNKNOWN, B::UNKNOWN);
    }

    #[test]
    fn de_morgan() {
        for a in ALL {
            for b in ALL {
                assert_eq!(!(a.and(b)), (!a).or(!b), "{a} {b}");
                assert_eq!(!(a.or(b)), (!a).and(!b), "{a} {b}");
            }
        }
    }

    #[test]
    fn is_predicate() {
        assert!(SqlBool::UNKNOWN.is(SqlBool::UNKNOWN));
        assert!(!SqlBool::UNKNOWN.is(SqlBool::FALSE));
        assert!(SqlBool::TRUE.is(SqlBool::TRUE));
    }

    #[test]
    fn truth_value() {
        assert_eq!(SqlBool::truth_value(true, false, true), SqlBool::UNKNOWN);
        assert_eq!(SqlBool::truth_value(false, false, false), SqlBool::FALSE);
    }

    #[test]
    fn literals() {
        assert_eq!(" true ".parse(), Ok(SqlBool::TRUE));
        assert_eq!("False".parse(), Ok(SqlBool::FALSE));
        assert_eq!("unknown".parse(), Ok(SqlBool::UNKNOWN));
        assert_eq!(
            "yes".parse::<SqlBool>(),
            Err(TypeError::invalid_format(TypeId::Boolean, "yes"))
        );
    }
}
