//! Arithmetic for the fixed-width numeric types.
//!
//! Integer operations never wrap: any result outside the range of the operand
//! type is an [`TypeError::OutOfRange`]. REAL and DOUBLE are computed in
//! double precision and every result goes through [`normalize_real`] or
//! [`normalize_double`] before it can be stored.

use crate::config::FloatLimits;
use crate::sql::types::TypeId;
use crate::{Result, TypeError};

/// Overflow-checked arithmetic shared by TINYINT, SMALLINT, INTEGER and BIGINT.
pub trait FixedInteger: Sized + Copy + Ord + Default {
    const TYPE_ID: TypeId;

    fn plus(self, rhs: Self) -> Result<Self>;

    fn minus(self, rhs: Self) -> Result<Self>;

    fn times(self, rhs: Self) -> Result<Self>;

    /// Truncates toward zero.
    fn divide(self, rhs: Self) -> Result<Self>;

    /// Remainder with the sign of the dividend.
    fn modulo(self, rhs: Self) -> Result<Self>;

    fn negate(self) -> Result<Self>;

    fn absolute(self) -> Result<Self> {
        match self < Self::default() {
            true => self.negate(),
            _ => Ok(self),
        }
    }

    /// Base-10 literal with optional sign, surrounding blanks ignored.
    fn parse_sql(text: &str) -> Result<Self>;
}

macro_rules! impl_fixed_integer {
    ($($ty:ty => $type_id:expr),* $(,)?) => {
        $(
            impl FixedInteger for $ty {
                const TYPE_ID: TypeId = $type_id;

                fn plus(self, rhs: Self) -> Result<Self> {
                    self.checked_add(rhs).ok_or(TypeError::OutOfRange(Self::TYPE_ID))
                }

                fn minus(self, rhs: Self) -> Result<Self> {
                    self.checked_sub(rhs).ok_or(TypeError::OutOfRange(Self::TYPE_ID))
                }

                fn times(self, rhs: Self) -> Result<Self> {
                    self.checked_mul(rhs).ok_or(TypeError::OutOfRange(Self::TYPE_ID))
                }

                fn divide(self, rhs: Self) -> Result<Self> {
                    if rhs == 0 {
                        return Err(TypeError::DivideByZero);
                    }
                    // only MIN / -1 overflows
                    self.checked_div(rhs).ok_or(TypeError::OutOfRange(Self::TYPE_ID))
                }

                fn modulo(self, rhs: Self) -> Result<Self> {
                    if rhs == 0 {
                        return Err(TypeError::DivideByZero);
                    }
                    Ok(self.wrapping_rem(rhs))
                }

                fn negate(self) -> Result<Self> {
                    self.checked_neg().ok_or(TypeError::OutOfRange(Self::TYPE_ID))
                }

                fn parse_sql(text: &str) -> Result<Self> {
                    text.trim()
                        .parse()
                        .map_err(|_| TypeError::invalid_format(Self::TYPE_ID, text))
                }
            }
        )*
    };
}

impl_fixed_integer! {
    i8 => TypeId::TinyInt,
    i16 => TypeId::SmallInt,
    i32 => TypeId::Integer,
    i64 => TypeId::BigInt,
}

/// Narrows a BIGINT into a smaller integer type.
pub fn narrow<T: FixedInteger + TryFrom<i64>>(value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| TypeError::OutOfRange(T::TYPE_ID))
}

/// Magnitude bounds a REAL or DOUBLE value must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatBounds {
    pub max: f64,
    pub min_positive: f64,
}

const DB2_REAL: FloatBounds = FloatBounds {
    max: 3.402e38_f32 as f64,
    min_positive: 1.175e-37_f32 as f64,
};

const DB2_DOUBLE: FloatBounds = FloatBounds {
    max: 1.79769e308,
    min_positive: 2.225e-307,
};

const IEEE_REAL: FloatBounds = FloatBounds {
    max: f32::MAX as f64,
    min_positive: f32::MIN_POSITIVE as f64,
};

const IEEE_DOUBLE: FloatBounds = FloatBounds {
    max: f64::MAX,
    min_positive: f64::MIN_POSITIVE,
};

/// Bounds for `type_id`, which must be REAL or DOUBLE. The negative bounds
/// mirror the positive ones.
pub const fn float_bounds(type_id: TypeId, limits: FloatLimits) -> FloatBounds {
    match (type_id, limits) {
        (TypeId::Real, FloatLimits::Db2) => DB2_REAL,
        (TypeId::Real, FloatLimits::Ieee) => IEEE_REAL,
        (_, FloatLimits::Db2) => DB2_DOUBLE,
        (_, FloatLimits::Ieee) => IEEE_DOUBLE,
    }
}

/// Rejects NaN, infinities and magnitudes outside the bounds of `type_id`,
/// and turns `-0.0` into `0.0`.
pub fn normalize(value: f64, type_id: TypeId, limits: FloatLimits) -> Result<f64> {
    if !value.is_finite() {
        return Err(TypeError::OutOfRange(type_id));
    }

    if value == 0.0 {
        return Ok(0.0);
    }

    let bounds = float_bounds(type_id, limits);
    let magnitude = value.abs();
    if magnitude > bounds.max || magnitude < bounds.min_positive {
        return Err(TypeError::OutOfRange(type_id));
    }

    Ok(value)
}

pub fn normalize_real(value: f64, limits: FloatLimits) -> Result<f32> {
    normalize(value, TypeId::Real, limits).map(|value| value as f32)
}

pub fn normalize_double(value: f64, limits: FloatLimits) -> Result<f64> {
    normalize(value, TypeId::Double, limits)
}

/// Sign test that treats `-0.0` as non-negative.
pub fn is_negative(value: f64) -> bool {
    value < 0.0
}

// The sum or difference of two normalised values can't underflow to zero
// unless the operands are equal, so only times and divide check for it.

pub fn float_plus(type_id: TypeId, lhs: f64, rhs: f64, limits: FloatLimits) -> Result<f64> {
    normalize(lhs + rhs, type_id, limits)
}

pub fn float_minus(type_id: TypeId, lhs: f64, rhs: f64, limits: FloatLimits) -> Result<f64> {
    normalize(lhs - rhs, type_id, limits)
}

pub fn float_times(type_id: TypeId, lhs: f64, rhs: f64, limits: FloatLimits) -> Result<f64> {
    let result = lhs * rhs;
    if result == 0.0 && lhs != 0.0 && rhs != 0.0 {
        return Err(TypeError::OutOfRange(type_id));
    }

    normalize(result, type_id, limits)
}

pub fn float_divide(type_id: TypeId, lhs: f64, rhs: f64, limits: FloatLimits) -> Result<f64> {
    if rhs == 0.0 {
        return Err(TypeError::DivideByZero);
    }

    let result = lhs / rhs;
    if result.is_nan() {
        return Err(TypeError::DivideByZero);
    }
    if result == 0.0 && lhs != 0.0 {
        return Err(TypeError::OutOfRange(type_id));
    }

    normalize(result, type_id, limits)
}

pub fn float_negate(value: f64) -> f64 {
    match value == 0.0 {
        true => 0.0,
        _ => -value,
    }
}

pub fn float_abs(value: f64) -> f64 {
    match is_negative(value) {
        true => -value,
        // -0.0 + 0.0 is 0.0
        _ => value + 0.0,
    }
}

pub fn sqrt(value: f64) -> Result<f64> {
    if is_negative(value) {
        return Err(TypeError::SqrtOfNegative(value));
    }

    match value == 0.0 {
        true => Ok(0.0),
        _ => Ok(value.sqrt()),
    }
}

/// Parses a REAL or DOUBLE literal and normalises it.
pub fn parse_float(text: &str, type_id: TypeId, limits: FloatLimits) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| TypeError::invalid_format(type_id, text))?;

    normalize(value, type_id, limits)
}
