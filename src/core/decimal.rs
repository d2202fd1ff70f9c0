//! Exact variable-precision decimal type backing SQL `DECIMAL`/`NUMERIC`.
//!
//! A value is an unscaled arbitrary-precision integer together with a
//! non-negative scale: `unscaled * 10^-scale`. Precision is derived from the
//! digit count of the unscaled integer and is never stored.
//!
//! Values read from storage keep their two's-complement bytes and are only
//! decoded into a [`BigInt`] the first time an operation needs the number.
//!
//! # Binary format
//!
//! `[scale: u8] [length: u8] [two's-complement unscaled value: length bytes]`

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use super::codec;
use crate::config::DecimalConfig;
use crate::sql::types::TypeId;
use crate::{Result, TypeError};

/// Largest scale a stored decimal can carry, the scale byte of the
/// binary format.
pub const MAX_STORED_SCALE: u32 = u8::MAX as u32;

/// Lower bound for the default scale of a division result.
pub const MIN_DIVIDE_SCALE: u32 = 4;

/// Exponents that would append more zeros than this are rejected.
const MAX_EXPONENT_SHIFT: u64 = 1024;

#[derive(Debug, Clone)]
pub struct Decimal {
    scale: u32,
    /// Stored two's-complement bytes, present when read from disk.
    raw: Option<Box<[u8]>>,
    unscaled: OnceCell<BigInt>,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        Self {
            scale,
            raw: None,
            unscaled: OnceCell::from(unscaled),
        }
    }

    /// Wraps stored two's-complement bytes without decoding them.
    pub fn from_raw(bytes: impl Into<Box<[u8]>>, scale: u32) -> Self {
        Self {
            scale,
            raw: Some(bytes.into()),
            unscaled: OnceCell::new(),
        }
    }

    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    /// The unscaled integer, decoding stored bytes on first use.
    pub fn unscaled(&self) -> &BigInt {
        self.unscaled.get_or_init(|| {
            let raw = self.raw.as_deref().unwrap_or_default();
            tracing::trace!(scale = self.scale, len = raw.len(), "materialising stored decimal");
            codec::from_twos_complement(raw)
        })
    }

    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Whether the unscaled integer has been decoded yet.
    pub fn is_materialized(&self) -> bool {
        self.unscaled.get().is_some()
    }

    pub fn is_zero(&self) -> bool {
        match (self.unscaled.get(), &self.raw) {
            (Some(unscaled), _) => unscaled.is_zero(),
            (None, Some(raw)) => raw.iter().all(|b| *b == 0),
            (None, None) => true,
        }
    }

    pub fn is_negative(&self) -> bool {
        match (self.unscaled.get(), &self.raw) {
            (Some(unscaled), _) => unscaled.is_negative(),
            (None, Some(raw)) => raw.first().is_some_and(|b| b & 0x80 != 0),
            (None, None) => false,
        }
    }

    /// Total number of significant digits, never less than the scale.
    pub fn precision(&self) -> u32 {
        digit_count(self.unscaled().magnitude()).max(self.scale)
    }

    /// Digits to the left of the decimal point, zero for values below one.
    pub fn whole_digits(&self) -> u32 {
        let magnitude = self.unscaled().magnitude();
        if *magnitude < pow10(self.scale).into_parts().1 {
            return 0;
        }
        digit_count(magnitude) - self.scale
    }

    /// Moves the value to `scale`, appending zeros when growing and
    /// truncating toward zero when shrinking.
    pub fn rescale(&self, scale: u32) -> Self {
        match scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => Self::new(self.unscaled() * pow10(scale - self.scale), scale),
            Ordering::Less => Self::new(self.unscaled() / pow10(self.scale - scale), scale),
        }
    }

    /// Both unscaled values brought to the larger of the two scales.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        let widen = |value: &Self| match value.scale < scale {
            true => value.unscaled() * pow10(scale - value.scale),
            _ => value.unscaled().clone(),
        };

        (widen(self), widen(other), scale)
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled().cmp(other.unscaled());
        }

        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }

    pub fn plus(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a + b, scale)
    }

    pub fn minus(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a - b, scale)
    }

    /// Scales add up: `(u1 * 10^-s1) * (u2 * 10^-s2) = (u1 * u2) * 10^-(s1 + s2)`.
    pub fn times(&self, other: &Self) -> Result<Self> {
        let scale = checked_scale(self.scale.checked_add(other.scale))?;
        Ok(Self::new(self.unscaled() * other.unscaled(), scale))
    }

    /// Truncating division.
    ///
    /// Without an explicit `scale` the result scale is
    /// `max(dividend scale + divisor whole digits + 1, 4)`.
    pub fn divide(&self, divisor: &Self, scale: Option<u32>) -> Result<Self> {
        self.divide_with(divisor, scale, MIN_DIVIDE_SCALE)
    }

    /// [`Decimal::divide`] with the minimum default scale taken from `config`.
    pub fn divide_configured(
        &self,
        divisor: &Self,
        scale: Option<u32>,
        config: &DecimalConfig,
    ) -> Result<Self> {
        self.divide_with(divisor, scale, config.min_divide_scale)
    }

    fn divide_with(&self, divisor: &Self, scale: Option<u32>, min_scale: u32) -> Result<Self> {
        if divisor.is_zero() {
            return Err(TypeError::DivideByZero);
        }

        let target = match scale {
            Some(scale) => scale,
            None => checked_scale(
                self.scale
                    .checked_add(divisor.whole_digits())
                    .and_then(|scale| scale.checked_add(1)),
            )?
            .max(min_scale),
        };

        // the quotient scale is dividend scale minus divisor scale, so the
        // dividend has to carry at least target + divisor scale digits
        let needed = checked_scale(target.checked_add(divisor.scale))?;
        let dividend = match self.scale < needed {
            true => self.rescale(needed),
            _ => self.clone(),
        };

        let quotient = dividend.unscaled() / divisor.unscaled();
        let quotient = Self::new(quotient, dividend.scale - divisor.scale);

        Ok(quotient.rescale(target))
    }

    /// Fits the value into `DECIMAL(precision, scale)`, as done by CAST.
    ///
    /// The fraction is truncated, never rounded. A value with more whole
    /// digits than `precision - scale` is rejected before anything changes.
    /// `None` skips the precision check.
    pub fn set_width(&mut self, precision: Option<u32>, scale: u32) -> Result<()> {
        if let Some(precision) = precision {
            let allowed = precision as i64 - scale as i64;
            if allowed < self.whole_digits() as i64 {
                return Err(TypeError::OutOfRange(TypeId::Decimal));
            }
        }

        if scale != self.scale {
            *self = self.rescale(scale);
        }

        Ok(())
    }

    pub fn negate(&self) -> Self {
        Self::new(-self.unscaled(), self.scale)
    }

    pub fn abs(&self) -> Self {
        match self.is_negative() {
            true => self.negate(),
            _ => self.clone(),
        }
    }

    /// Integer part as a BIGINT, the fraction is discarded.
    pub fn to_i64(&self) -> Result<i64> {
        self.to_integer(TypeId::BigInt)
    }

    pub fn to_i32(&self) -> Result<i32> {
        let value = self.to_integer(TypeId::Integer)?;
        i32::try_from(value).map_err(|_| TypeError::OutOfRange(TypeId::Integer))
    }

    pub fn to_i16(&self) -> Result<i16> {
        let value = self.to_integer(TypeId::SmallInt)?;
        i16::try_from(value).map_err(|_| TypeError::OutOfRange(TypeId::SmallInt))
    }

    pub fn to_i8(&self) -> Result<i8> {
        let value = self.to_integer(TypeId::TinyInt)?;
        i8::try_from(value).map_err(|_| TypeError::OutOfRange(TypeId::TinyInt))
    }

    /// Drops one fractional digit at a time. Once the remaining value fits
    /// a machine word the rest of the scale is removed there, so a value is
    /// only out of range if it still does not fit after the last digit.
    fn to_integer(&self, target: TypeId) -> Result<i64> {
        let mut value = self.unscaled().clone();
        let mut remaining = self.scale;

        while remaining > 0 {
            if let Some(mut small) = value.to_i64() {
                while remaining > 0 && small != 0 {
                    small /= 10;
                    remaining -= 1;
                }
                return Ok(small);
            }

            value /= 10;
            remaining -= 1;
        }

        value.to_i64().ok_or(TypeError::OutOfRange(target))
    }

    /// Nearest DOUBLE. Range validation is left to the caller.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Exact decimal rendering of the shortest representation of `value`.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(TypeError::OutOfRange(TypeId::Decimal));
        }
        Self::from_str(&value.to_string())
    }

    /// Size of the stored form written by [`Decimal::encode`].
    pub fn encoded_len(&self) -> usize {
        let magnitude = match (&self.raw, self.unscaled.get()) {
            (Some(raw), _) => codec::minimal(raw).len(),
            (None, Some(unscaled)) => codec::to_twos_complement(unscaled).len(),
            (None, None) => 1,
        };
        2 + magnitude
    }

    /// Writes the stored form, reusing undecoded bytes when present.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let scale = u8::try_from(self.scale).map_err(|_| TypeError::OutOfRange(TypeId::Decimal))?;

        let encoded;
        let bytes = match (&self.raw, self.unscaled.get()) {
            (Some(raw), _) => codec::minimal(raw),
            (None, Some(unscaled)) => {
                encoded = codec::to_twos_complement(unscaled);
                &encoded[..]
            }
            (None, None) => &[0u8][..],
        };

        let len = u8::try_from(bytes.len()).map_err(|_| TypeError::OutOfRange(TypeId::Decimal))?;

        buf.reserve(2 + bytes.len());
        buf.push(scale);
        buf.push(len);
        buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Reads the stored form. Returns the value and the bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let [scale, len, ..] = *bytes else {
            return Err(TypeError::corrupted("truncated decimal header"));
        };

        let len = len as usize;
        let payload = bytes
            .get(2..2 + len)
            .ok_or_else(|| TypeError::corrupted("truncated decimal value"))?;

        Ok((Self::from_raw(payload, scale as u32), 2 + len))
    }
}

fn checked_scale(scale: Option<u32>) -> Result<u32> {
    scale.ok_or(TypeError::OutOfRange(TypeId::Decimal))
}

/// `10^exp` as a signed big integer.
fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

fn digit_count(magnitude: &BigUint) -> u32 {
    match magnitude.is_zero() {
        true => 1,
        _ => magnitude.to_str_radix(10).len() as u32,
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).is_eq()
    }
}

impl Eq for Decimal {}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

macro_rules! impl_decimal_op {
    ($trait:ident, $method:ident, $inner:ident) => {
        impl $trait for &Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Self) -> Decimal {
                self.$inner(rhs)
            }
        }

        impl $trait for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Self) -> Decimal {
                self.$inner(&rhs)
            }
        }
    };
}

impl_decimal_op!(Add, add, plus);
impl_decimal_op!(Sub, sub, minus);

impl Neg for Decimal {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Decimal {
                fn from(value: $ty) -> Self {
                    Self::new(BigInt::from(value), 0)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u64);

impl FromStr for Decimal {
    type Err = TypeError;

    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]` with surrounding blanks.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TypeError::invalid_format(TypeId::Decimal, s);
        let text = s.trim();
        let bytes = text.as_bytes();
        let mut pos = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };

        let digits_from = |pos: usize| {
            bytes[pos..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let int_len = digits_from(pos);
        let int_part = &text[pos..pos + int_len];
        pos += int_len;

        let mut fract_part = "";
        if bytes.get(pos) == Some(&b'.') {
            pos += 1;
            let fract_len = digits_from(pos);
            fract_part = &text[pos..pos + fract_len];
            pos += fract_len;
        }

        if int_part.is_empty() && fract_part.is_empty() {
            return Err(invalid());
        }

        let mut exponent = 0i64;
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            pos += 1;
            let exp_start = pos;
            if matches!(bytes.get(pos), Some(b'+' | b'-')) {
                pos += 1;
            }
            let exp_len = digits_from(pos);
            if exp_len == 0 {
                return Err(invalid());
            }
            pos += exp_len;
            exponent = text[exp_start..pos].parse().map_err(|_| invalid())?;
        }

        if pos != bytes.len() {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(int_part.len() + fract_part.len());
        digits.push_str(int_part);
        digits.push_str(fract_part);

        let mut scale = (fract_part.len() as i64)
            .checked_sub(exponent)
            .ok_or(TypeError::OutOfRange(TypeId::Decimal))?;
        if scale > MAX_STORED_SCALE as i64 {
            return Err(TypeError::OutOfRange(TypeId::Decimal));
        }
        if scale < 0 {
            if scale.unsigned_abs() > MAX_EXPONENT_SHIFT {
                return Err(TypeError::OutOfRange(TypeId::Decimal));
            }
            digits.push_str(&"0".repeat(scale.unsigned_abs() as usize));
            scale = 0;
        }
        let scale = u32::try_from(scale).map_err(|_| TypeError::OutOfRange(TypeId::Decimal))?;

        let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let sign = match negative {
            true => Sign::Minus,
            _ => Sign::Plus,
        };

        Ok(Self::new(BigInt::from_biguint(sign, magnitude), scale))
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let unscaled = self.unscaled();
        let digits = unscaled.magnitude().to_str_radix(10);
        let scale = self.scale as usize;

        if unscaled.is_negative() {
            f.write_str("-")?;
        }

        if scale == 0 {
            return f.write_str(&digits);
        }

        match digits.len() > scale {
            true => {
                let (int, fract) = digits.split_at(digits.len() - scale);
                write!(f, "{int}.{fract}")
            }
            _ => write!(f, "0.{digits:0>scale$}"),
        }
    }
}
