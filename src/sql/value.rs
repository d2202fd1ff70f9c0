//! SQL scalar values and their binary forms.
//!
//! [`Value`] is a closed sum type over every scalar kind. Mixed-type
//! comparison and arithmetic are resolved by [`TypeId::dominant`]: the
//! operand with the higher precedence decides which implementation runs and
//! the other operand is converted to it. When the governing operand is on
//! the right the comparison runs with the operands swapped and the result is
//! reversed.
//!
//! # Binary Serialisation Format
//!
//! Every non-NULL value has a fixed payload layout for its type:
//!
//! ┌──────────────────────┬───────────────────────────────────────────────┐
//! │ Type                 │ Payload                                       │
//! ├──────────────────────┼───────────────────────────────────────────────┤
//! │ BOOLEAN              │ 1 byte, 0 or 1                                │
//! │ TINYINT .. BIGINT    │ 1/2/4/8 bytes, big-endian                     │
//! │ REAL / DOUBLE        │ 4/8 bytes IEEE-754, big-endian                │
//! │ DECIMAL              │ [scale u8][len u8][two's-complement bytes]    │
//! │ CHAR / VARCHAR       │ length header + UTF-8 bytes                   │
//! │ BINARY / VARBINARY   │ length header + bytes                         │
//! │ DATE                 │ 4 bytes packed, 0 is NULL                     │
//! │ TIME                 │ 4 bytes packed + 4 zero bytes, -1 is NULL     │
//! └──────────────────────┴───────────────────────────────────────────────┘
//!
//! [`Value::serialise`] wraps a payload in a self-describing envelope for
//! callers that have no schema at hand:
//!
//! `[type tag: 1 byte] [payload]`, or `[0] [type tag]` for a NULL.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::config::{Config, FormatVersion};
use crate::core::codec;
use crate::core::date::{LocaleFormat, PatternLocale, SqlDate, SqlTime, NULL_DATE, NULL_TIME};
use crate::core::decimal::Decimal;
use crate::sql::binary::BinaryString;
use crate::sql::boolean::SqlBool;
use crate::sql::collation::Collator;
use crate::sql::types::TypeId;
use crate::vm::functions::compare_blank_padded;
use crate::vm::math::{self, FixedInteger};
use crate::{Result, TypeError};

/// Envelope tag of a NULL, followed by the tag of its type.
const NULL_TAG: u8 = 0;

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Char(String),
    VarChar(String),
    Binary(BinaryString),
    VarBinary(BinaryString),
    Date(SqlDate),
    Time(SqlTime),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    /// A NULL still knows which type it belongs to.
    Null(TypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
}

impl CompareOp {
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }
}

/// Integer conversion shared by every integer getter.
fn float_to_integer<T: FixedInteger + TryFrom<i64>>(value: f64) -> Result<T> {
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(TypeError::OutOfRange(T::TYPE_ID));
    }

    math::narrow(truncated as i64)
}

fn read_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| TypeError::corrupted(format!("expected {N} payload bytes")))
}

impl Value {
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::Boolean(_) => TypeId::Boolean,
            Self::Char(_) => TypeId::Char,
            Self::VarChar(_) => TypeId::VarChar,
            Self::Binary(_) => TypeId::Binary,
            Self::VarBinary(_) => TypeId::VarBinary,
            Self::Date(_) => TypeId::Date,
            Self::Time(_) => TypeId::Time,
            Self::TinyInt(_) => TypeId::TinyInt,
            Self::SmallInt(_) => TypeId::SmallInt,
            Self::Integer(_) => TypeId::Integer,
            Self::BigInt(_) => TypeId::BigInt,
            Self::Real(_) => TypeId::Real,
            Self::Double(_) => TypeId::Double,
            Self::Decimal(_) => TypeId::Decimal,
            Self::Null(type_id) => *type_id,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    fn mismatch(&self, other: TypeId) -> TypeError {
        TypeError::TypeMismatch {
            left: self.type_id(),
            right: other,
        }
    }

    /// Reads a literal of type `type_id`.
    pub fn parse(type_id: TypeId, text: &str, config: &Config) -> Result<Self> {
        Self::VarChar(text.to_string()).cast(type_id, config)
    }

    /// Integer getters. NULL reads as zero, fractions are truncated, and a
    /// value outside the target range is an error naming the target type.
    fn to_integer<T: FixedInteger + TryFrom<i64>>(&self) -> Result<T> {
        let wide = match self {
            Self::Null(_) => 0,
            Self::Boolean(value) => *value as i64,
            Self::TinyInt(value) => *value as i64,
            Self::SmallInt(value) => *value as i64,
            Self::Integer(value) => *value as i64,
            Self::BigInt(value) => *value,
            Self::Real(value) => return float_to_integer(*value as f64),
            Self::Double(value) => return float_to_integer(*value),
            Self::Decimal(value) => value
                .to_i64()
                .map_err(|_| TypeError::OutOfRange(T::TYPE_ID))?,
            Self::Char(text) | Self::VarChar(text) => return T::parse_sql(text),
            _ => return Err(self.mismatch(T::TYPE_ID)),
        };

        math::narrow(wide)
    }

    pub fn to_i64(&self) -> Result<i64> {
        self.to_integer()
    }

    pub fn to_i32(&self) -> Result<i32> {
        self.to_integer()
    }

    pub fn to_i16(&self) -> Result<i16> {
        self.to_integer()
    }

    pub fn to_i8(&self) -> Result<i8> {
        self.to_integer()
    }

    /// DOUBLE getter. NULL reads as zero.
    pub fn to_f64(&self) -> Result<f64> {
        let value = match self {
            Self::Null(_) => 0.0,
            Self::Boolean(value) => *value as u8 as f64,
            Self::TinyInt(value) => *value as f64,
            Self::SmallInt(value) => *value as f64,
            Self::Integer(value) => *value as f64,
            Self::BigInt(value) => *value as f64,
            Self::Real(value) => *value as f64,
            Self::Double(value) => *value,
            Self::Decimal(value) => value.to_f64(),
            Self::Char(text) | Self::VarChar(text) => text
                .trim()
                .parse()
                .map_err(|_| TypeError::invalid_format(TypeId::Double, text.as_str()))?,
            _ => return Err(self.mismatch(TypeId::Double)),
        };

        match value.is_finite() {
            true => Ok(value),
            _ => Err(TypeError::OutOfRange(TypeId::Double)),
        }
    }

    /// REAL getter. NULL reads as zero.
    pub fn to_f32(&self) -> Result<f32> {
        let value = self.to_f64()?;
        match value.abs() <= f32::MAX as f64 {
            true => Ok(value as f32),
            _ => Err(TypeError::OutOfRange(TypeId::Real)),
        }
    }

    /// DECIMAL getter. NULL reads as zero.
    pub fn to_decimal(&self) -> Result<Decimal> {
        match self {
            Self::Null(_) => Ok(Decimal::zero()),
            Self::Boolean(value) => Ok(Decimal::from(*value as i8)),
            Self::TinyInt(value) => Ok(Decimal::from(*value)),
            Self::SmallInt(value) => Ok(Decimal::from(*value)),
            Self::Integer(value) => Ok(Decimal::from(*value)),
            Self::BigInt(value) => Ok(Decimal::from(*value)),
            // shortest REAL rendering, not the widened DOUBLE
            Self::Real(value) if value.is_finite() => Decimal::from_str(&value.to_string()),
            Self::Real(_) => Err(TypeError::OutOfRange(TypeId::Decimal)),
            Self::Double(value) => Decimal::from_f64(*value),
            Self::Decimal(value) => Ok(value.clone()),
            Self::Char(text) | Self::VarChar(text) => Decimal::from_str(text),
            _ => Err(self.mismatch(TypeId::Decimal)),
        }
    }

    /// BOOLEAN getter. NULL is `UNKNOWN`, numbers are true when non-zero.
    pub fn to_bool(&self) -> Result<SqlBool> {
        Ok(match self {
            Self::Null(_) => SqlBool::UNKNOWN,
            Self::Boolean(value) => SqlBool::from(*value),
            Self::TinyInt(_) | Self::SmallInt(_) | Self::Integer(_) | Self::BigInt(_) => {
                SqlBool::from(self.to_i64()? != 0)
            }
            Self::Real(value) => SqlBool::from(*value != 0.0),
            Self::Double(value) => SqlBool::from(*value != 0.0),
            Self::Decimal(value) => SqlBool::from(!value.is_zero()),
            Self::Char(text) | Self::VarChar(text) => SqlBool::from_str(text)?,
            _ => return Err(self.mismatch(TypeId::Boolean)),
        })
    }

    fn to_date(&self, locale: Option<&dyn LocaleFormat>) -> Result<SqlDate> {
        match self {
            Self::Date(date) => Ok(*date),
            Self::Char(text) | Self::VarChar(text) => SqlDate::parse(text, locale),
            _ => Err(self.mismatch(TypeId::Date)),
        }
    }

    fn to_time(&self, locale: Option<&dyn LocaleFormat>) -> Result<SqlTime> {
        match self {
            Self::Time(time) => Ok(*time),
            Self::Char(text) | Self::VarChar(text) => SqlTime::parse(text, locale),
            _ => Err(self.mismatch(TypeId::Time)),
        }
    }

    /// Converts to `target`. NULL stays NULL with the target type.
    pub fn cast(&self, target: TypeId, config: &Config) -> Result<Self> {
        if self.is_null() {
            return Ok(Self::Null(target));
        }

        let limits = config.float_limits();

        Ok(match target {
            TypeId::Boolean => match self.to_bool()?.get() {
                Some(value) => Self::Boolean(value),
                None => Self::Null(TypeId::Boolean),
            },
            TypeId::TinyInt => Self::TinyInt(self.to_integer()?),
            TypeId::SmallInt => Self::SmallInt(self.to_integer()?),
            TypeId::Integer => Self::Integer(self.to_integer()?),
            TypeId::BigInt => Self::BigInt(self.to_integer()?),
            TypeId::Real => Self::Real(math::normalize_real(self.to_real_input()?, limits)?),
            TypeId::Double => Self::Double(math::normalize_double(self.to_double_input()?, limits)?),
            TypeId::Decimal => Self::Decimal(self.to_decimal()?),
            TypeId::Char | TypeId::VarChar => {
                if self.type_id().is_binary() {
                    return Err(self.mismatch(target));
                }
                let text = match self {
                    Self::Char(text) | Self::VarChar(text) => text.clone(),
                    other => other.to_string(),
                };
                match target {
                    TypeId::Char => Self::Char(text),
                    _ => Self::VarChar(text),
                }
            }
            TypeId::Binary | TypeId::VarBinary => {
                let (Self::Binary(bytes) | Self::VarBinary(bytes)) = self else {
                    return Err(self.mismatch(target));
                };
                match target {
                    TypeId::Binary => Self::Binary(bytes.clone()),
                    _ => Self::VarBinary(bytes.clone()),
                }
            }
            TypeId::Date | TypeId::Time => {
                let locale = (!config.locale.date_patterns.is_empty()
                    || !config.locale.time_patterns.is_empty())
                .then(|| PatternLocale::from_config(&config.locale));
                let locale = locale.as_ref().map(|locale| locale as &dyn LocaleFormat);

                match target {
                    TypeId::Date => Self::Date(self.to_date(locale)?),
                    _ => Self::Time(self.to_time(locale)?),
                }
            }
        })
    }

    /// Casts to `DECIMAL(precision, scale)`, truncating the fraction.
    pub fn cast_decimal(&self, precision: u32, scale: u32, config: &Config) -> Result<Self> {
        if precision == 0 || precision > config.decimal.max_precision || scale > precision {
            return Err(TypeError::OutOfRange(TypeId::Decimal));
        }

        if self.is_null() {
            return Ok(Self::Null(TypeId::Decimal));
        }

        let mut decimal = self.to_decimal()?;
        decimal.set_width(Some(precision), scale)?;
        Ok(Self::Decimal(decimal))
    }

    /// String literals parse without the range check, which the caller
    /// applies with the configured limits.
    fn to_double_input(&self) -> Result<f64> {
        match self {
            Self::Char(text) | Self::VarChar(text) => text
                .trim()
                .parse()
                .map_err(|_| TypeError::invalid_format(TypeId::Double, text.as_str())),
            other => other.to_f64(),
        }
    }

    fn to_real_input(&self) -> Result<f64> {
        self.to_double_input().map_err(|err| match err {
            TypeError::InvalidFormat { input, .. } => TypeError::InvalidFormat {
                type_id: TypeId::Real,
                input,
            },
            other => other,
        })
    }

    /// Total order used for sorting. NULLs sort after every other value.
    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        self.compare_with(other, None)
    }

    /// [`Value::compare`] with character values ordered by `collator`.
    pub fn compare_with(&self, other: &Self, collator: Option<&dyn Collator>) -> Result<Ordering> {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ok(Ordering::Equal),
            (true, false) => return Ok(Ordering::Greater),
            (false, true) => return Ok(Ordering::Less),
            _ => {}
        }

        let (left, right) = (self.type_id(), other.type_id());
        match left.dominant(right) == left {
            true => self.compare_governed(other, collator),
            _ => other
                .compare_governed(self, collator)
                .map(Ordering::reverse),
        }
    }

    /// Runs the comparison of `self`'s type, converting `other` into it.
    fn compare_governed(&self, other: &Self, collator: Option<&dyn Collator>) -> Result<Ordering> {
        let mismatch = || self.mismatch(other.type_id());

        match self {
            Self::Boolean(value) => match other {
                Self::Boolean(other) => Ok(value.cmp(other)),
                _ => Err(mismatch()),
            },
            Self::Char(value) | Self::VarChar(value) => {
                if other.type_id().is_binary() {
                    return Err(mismatch());
                }
                let other = match other {
                    Self::Char(text) | Self::VarChar(text) => text.clone(),
                    other => other.to_string(),
                };
                Ok(compare_blank_padded(value, &other, collator))
            }
            Self::Binary(value) | Self::VarBinary(value) => match other {
                Self::Binary(other) | Self::VarBinary(other) => Ok(value.compare(other)),
                _ => Err(mismatch()),
            },
            Self::Date(value) => match other {
                Self::Date(_) | Self::Char(_) | Self::VarChar(_) => Ok(value.cmp(&other.to_date(None)?)),
                _ => Err(mismatch()),
            },
            Self::Time(value) => match other {
                Self::Time(_) | Self::Char(_) | Self::VarChar(_) => Ok(value.cmp(&other.to_time(None)?)),
                _ => Err(mismatch()),
            },
            Self::TinyInt(_) | Self::SmallInt(_) | Self::Integer(_) | Self::BigInt(_) => {
                if !matches!(other.type_id(), ty if ty.is_numeric() || ty.is_character() || ty == TypeId::Boolean)
                {
                    return Err(mismatch());
                }
                Ok(self.to_i64()?.cmp(&other.to_i64()?))
            }
            Self::Real(_) | Self::Double(_) => {
                if !matches!(other.type_id(), ty if ty.is_numeric() || ty.is_character() || ty == TypeId::Boolean)
                {
                    return Err(mismatch());
                }
                // normalised values are never NaN, adding zero folds -0.0
                let (a, b) = (self.to_f64()? + 0.0, other.to_f64()? + 0.0);
                Ok(a.total_cmp(&b))
            }
            Self::Decimal(value) => Ok(value.compare(&other.to_decimal()?)),
            Self::Null(_) => Ok(Ordering::Greater),
        }
    }

    /// SQL comparison predicate, `UNKNOWN` when either side is NULL.
    pub fn compare_op(&self, op: CompareOp, other: &Self) -> Result<SqlBool> {
        if self.is_null() || other.is_null() {
            return Ok(SqlBool::UNKNOWN);
        }

        self.compare(other).map(|ordering| SqlBool::from(op.holds(ordering)))
    }

    pub fn equals(&self, other: &Self) -> Result<SqlBool> {
        self.compare_op(CompareOp::Eq, other)
    }

    pub fn less_than(&self, other: &Self) -> Result<SqlBool> {
        self.compare_op(CompareOp::Lt, other)
    }

    pub fn greater_than(&self, other: &Self) -> Result<SqlBool> {
        self.compare_op(CompareOp::Gt, other)
    }

    fn arithmetic(&self, op: ArithmeticOp, other: &Self, config: &Config) -> Result<Self> {
        let (left, right) = (self.type_id(), other.type_id());
        let governing = left.dominant(right);

        if !left.is_numeric() || !right.is_numeric() {
            return Err(TypeError::TypeMismatch { left, right });
        }

        if self.is_null() || other.is_null() {
            return Ok(Self::Null(governing));
        }

        fn integer<T: FixedInteger>(op: ArithmeticOp, a: T, b: T) -> Result<T> {
            match op {
                ArithmeticOp::Plus => a.plus(b),
                ArithmeticOp::Minus => a.minus(b),
                ArithmeticOp::Times => a.times(b),
                ArithmeticOp::Divide => a.divide(b),
                ArithmeticOp::Modulo => a.modulo(b),
            }
        }

        let float = |type_id: TypeId, a: f64, b: f64| {
            let limits = config.float_limits();
            match op {
                ArithmeticOp::Plus => math::float_plus(type_id, a, b, limits),
                ArithmeticOp::Minus => math::float_minus(type_id, a, b, limits),
                ArithmeticOp::Times => math::float_times(type_id, a, b, limits),
                ArithmeticOp::Divide => math::float_divide(type_id, a, b, limits),
                ArithmeticOp::Modulo => Err(TypeError::TypeMismatch { left, right }),
            }
        };

        Ok(match governing {
            TypeId::TinyInt => Self::TinyInt(integer(op, self.to_i8()?, other.to_i8()?)?),
            TypeId::SmallInt => Self::SmallInt(integer(op, self.to_i16()?, other.to_i16()?)?),
            TypeId::Integer => Self::Integer(integer(op, self.to_i32()?, other.to_i32()?)?),
            TypeId::BigInt => Self::BigInt(integer(op, self.to_i64()?, other.to_i64()?)?),
            TypeId::Real => {
                let result = float(TypeId::Real, self.to_f64()?, other.to_f64()?)?;
                Self::Real(math::normalize_real(result, config.float_limits())?)
            }
            TypeId::Double => Self::Double(float(TypeId::Double, self.to_f64()?, other.to_f64()?)?),
            _ => {
                let (a, b) = (self.to_decimal()?, other.to_decimal()?);
                Self::Decimal(match op {
                    ArithmeticOp::Plus => a.plus(&b),
                    ArithmeticOp::Minus => a.minus(&b),
                    ArithmeticOp::Times => a.times(&b)?,
                    ArithmeticOp::Divide => a.divide_configured(&b, None, &config.decimal)?,
                    ArithmeticOp::Modulo => return Err(TypeError::TypeMismatch { left, right }),
                })
            }
        })
    }

    pub fn plus(&self, other: &Self, config: &Config) -> Result<Self> {
        self.arithmetic(ArithmeticOp::Plus, other, config)
    }

    pub fn minus(&self, other: &Self, config: &Config) -> Result<Self> {
        self.arithmetic(ArithmeticOp::Minus, other, config)
    }

    pub fn times(&self, other: &Self, config: &Config) -> Result<Self> {
        self.arithmetic(ArithmeticOp::Times, other, config)
    }

    pub fn divide(&self, other: &Self, config: &Config) -> Result<Self> {
        self.arithmetic(ArithmeticOp::Divide, other, config)
    }

    /// Integer remainder, only defined for the integer types.
    pub fn modulo(&self, other: &Self, config: &Config) -> Result<Self> {
        self.arithmetic(ArithmeticOp::Modulo, other, config)
    }

    /// Unary minus.
    pub fn negate(&self) -> Result<Self> {
        Ok(match self {
            Self::Null(type_id) if type_id.is_numeric() => self.clone(),
            Self::TinyInt(value) => Self::TinyInt(value.negate()?),
            Self::SmallInt(value) => Self::SmallInt(value.negate()?),
            Self::Integer(value) => Self::Integer(value.negate()?),
            Self::BigInt(value) => Self::BigInt(value.negate()?),
            Self::Real(value) => Self::Real(math::float_negate(*value as f64) as f32),
            Self::Double(value) => Self::Double(math::float_negate(*value)),
            Self::Decimal(value) => Self::Decimal(value.negate()),
            other => return Err(other.mismatch(other.type_id())),
        })
    }

    pub fn abs(&self) -> Result<Self> {
        Ok(match self {
            Self::Null(type_id) if type_id.is_numeric() => self.clone(),
            Self::TinyInt(value) => Self::TinyInt(value.absolute()?),
            Self::SmallInt(value) => Self::SmallInt(value.absolute()?),
            Self::Integer(value) => Self::Integer(value.absolute()?),
            Self::BigInt(value) => Self::BigInt(value.absolute()?),
            Self::Real(value) => Self::Real(math::float_abs(*value as f64) as f32),
            Self::Double(value) => Self::Double(math::float_abs(*value)),
            Self::Decimal(value) => Self::Decimal(value.abs()),
            other => return Err(other.mismatch(other.type_id())),
        })
    }

    /// Square root as a DOUBLE.
    pub fn sqrt(&self) -> Result<Self> {
        if !self.type_id().is_numeric() {
            return Err(self.mismatch(TypeId::Double));
        }

        match self {
            Self::Null(_) => Ok(Self::Null(TypeId::Double)),
            other => math::sqrt(other.to_f64()?).map(Self::Double),
        }
    }

    /// Appends the payload of this value, without any type information.
    ///
    /// A NULL DATE or TIME is written as its sentinel. Other types have no
    /// stored NULL and write nothing, their nullness is tracked by the caller.
    pub fn encode(&self, buf: &mut Vec<u8>, version: FormatVersion) -> Result<()> {
        match self {
            Self::Null(TypeId::Date) => buf.extend_from_slice(&NULL_DATE.to_be_bytes()),
            Self::Null(TypeId::Time) => {
                buf.extend_from_slice(&NULL_TIME.to_be_bytes());
                buf.extend_from_slice(&0i32.to_be_bytes());
            }
            Self::Null(_) => {}
            Self::Boolean(value) => buf.push(*value as u8),
            Self::TinyInt(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::SmallInt(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::Integer(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::BigInt(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::Real(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::Double(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::Decimal(value) => value.encode(buf)?,
            Self::Char(text) | Self::VarChar(text) => {
                codec::write_prefixed(buf, text.as_bytes(), version)?
            }
            Self::Binary(bytes) | Self::VarBinary(bytes) => bytes.encode(buf, version)?,
            Self::Date(date) => date.encode(buf),
            Self::Time(time) => time.encode(buf),
        }

        Ok(())
    }

    /// Reads a payload written by [`Value::encode`] for a value of `type_id`.
    /// Returns the value and the number of bytes consumed.
    pub fn decode(type_id: TypeId, bytes: &[u8]) -> Result<(Self, usize)> {
        Ok(match type_id {
            TypeId::Boolean => match read_array::<1>(bytes)? {
                [0] => (Self::Boolean(false), 1),
                [1] => (Self::Boolean(true), 1),
                [other] => return Err(TypeError::corrupted(format!("invalid boolean byte {other}"))),
            },
            TypeId::TinyInt => (Self::TinyInt(i8::from_be_bytes(read_array(bytes)?)), 1),
            TypeId::SmallInt => (Self::SmallInt(i16::from_be_bytes(read_array(bytes)?)), 2),
            TypeId::Integer => (Self::Integer(i32::from_be_bytes(read_array(bytes)?)), 4),
            TypeId::BigInt => (Self::BigInt(i64::from_be_bytes(read_array(bytes)?)), 8),
            TypeId::Real => (Self::Real(f32::from_be_bytes(read_array(bytes)?)), 4),
            TypeId::Double => (Self::Double(f64::from_be_bytes(read_array(bytes)?)), 8),
            TypeId::Decimal => {
                let (value, consumed) = Decimal::decode(bytes)?;
                (Self::Decimal(value), consumed)
            }
            TypeId::Char | TypeId::VarChar => {
                let (payload, consumed) = codec::read_prefixed(bytes)?;
                let text = String::from_utf8(payload.to_vec())
                    .map_err(|_| TypeError::corrupted("character value is not UTF-8"))?;
                match type_id {
                    TypeId::Char => (Self::Char(text), consumed),
                    _ => (Self::VarChar(text), consumed),
                }
            }
            TypeId::Binary | TypeId::VarBinary => {
                let (value, consumed) = BinaryString::decode(bytes)?;
                match type_id {
                    TypeId::Binary => (Self::Binary(value), consumed),
                    _ => (Self::VarBinary(value), consumed),
                }
            }
            TypeId::Date => {
                let (date, consumed) = SqlDate::decode(bytes)?;
                (date.map_or(Self::Null(TypeId::Date), Self::Date), consumed)
            }
            TypeId::Time => {
                let (time, consumed) = SqlTime::decode(bytes)?;
                (time.map_or(Self::Null(TypeId::Time), Self::Time), consumed)
            }
        })
    }

    /// Serialises into the self-describing envelope.
    pub fn serialise(&self, version: FormatVersion) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.serialised_size_hint());

        match self {
            Self::Null(type_id) => {
                buf.push(NULL_TAG);
                buf.push(type_id.tag());
            }
            value => {
                buf.push(value.type_id().tag());
                value.encode(&mut buf, version)?;
            }
        }

        Ok(buf)
    }

    /// Reads a value written by [`Value::serialise`]. Returns the value and
    /// the number of bytes consumed.
    pub fn deserialise(data: &[u8]) -> Result<(Self, usize)> {
        let Some((&tag, content)) = data.split_first() else {
            return Err(TypeError::corrupted("empty value"));
        };

        let type_of = |tag: u8| {
            TypeId::from_tag(tag).ok_or_else(|| TypeError::corrupted(format!("unknown type tag {tag}")))
        };

        if tag == NULL_TAG {
            let &type_tag = content
                .first()
                .ok_or_else(|| TypeError::corrupted("missing NULL type tag"))?;
            return Ok((Self::Null(type_of(type_tag)?), 2));
        }

        let (value, consumed) = Self::decode(type_of(tag)?, content)?;
        Ok((value, consumed + 1))
    }

    fn serialised_size_hint(&self) -> usize {
        match self {
            Self::Null(_) => 2,
            Self::Boolean(_) | Self::TinyInt(_) => 2,
            Self::SmallInt(_) => 3,
            Self::Integer(_) | Self::Real(_) | Self::Date(_) => 5,
            Self::BigInt(_) | Self::Double(_) | Self::Time(_) => 9,
            Self::Decimal(value) => 1 + value.encoded_len(),
            Self::Char(text) | Self::VarChar(text) => 6 + text.len(),
            Self::Binary(bytes) | Self::VarBinary(bytes) => 6 + bytes.len(),
        }
    }
}

impl PartialEq for Value {
    /// Value equality across types, NULL equals NULL. Values that cannot be
    /// compared are not equal.
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null(_) => f.write_str("NULL"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Char(text) | Self::VarChar(text) => f.write_str(text),
            Self::Binary(bytes) | Self::VarBinary(bytes) => write!(f, "{bytes}"),
            Self::Date(date) => write!(f, "{date}"),
            Self::Time(time) => write!(f, "{time}"),
            Self::TinyInt(value) => write!(f, "{value}"),
            Self::SmallInt(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::BigInt(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Boolean,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    f32 => Real,
    f64 => Double,
    Decimal => Decimal,
    String => VarChar,
    BinaryString => VarBinary,
    SqlDate => Date,
    SqlTime => Time,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::VarChar(value.to_string())
    }
}

impl From<SqlBool> for Value {
    fn from(value: SqlBool) -> Self {
        match value.get() {
            Some(value) => Self::Boolean(value),
            None => Self::Null(TypeId::Boolean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FloatLimits;
    use crate::sql::collation::CaseInsensitiveCollator;

    fn dec(s: &str) -> Value {
        Value::Decimal(s.parse().unwrap())
    }

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn precedence_dispatch() {
        assert_eq!(Value::Integer(5).compare(&Value::BigInt(5)), Ok(Ordering::Equal));
        assert_eq!(Value::TinyInt(1).compare(&Value::Double(1.5)), Ok(Ordering::Less));
        assert_eq!(Value::Double(1.5).compare(&Value::TinyInt(1)), Ok(Ordering::Greater));
        assert_eq!(dec("2.50").compare(&Value::Real(2.5)), Ok(Ordering::Equal));
        assert_eq!(Value::Integer(3).compare(&dec("2.999")), Ok(Ordering::Greater));
    }

    #[test]
    fn swapped_operands_reverse() {
        let pairs = [
            (Value::SmallInt(7), dec("7.01")),
            (Value::Double(-1.0), Value::BigInt(-2)),
            (Value::VarChar("abc".into()), Value::Char("abd".into())),
        ];

        for (a, b) in pairs {
            let forward = a.compare(&b).unwrap();
            let backward = b.compare(&a).unwrap();
            assert_eq!(forward, backward.reverse(), "{a} vs {b}");
        }
    }

    #[test]
    fn nulls() {
        let null = Value::Null(TypeId::Integer);
        assert_eq!(null.compare(&Value::Integer(1)), Ok(Ordering::Greater));
        assert_eq!(Value::Integer(1).compare(&null), Ok(Ordering::Less));
        assert_eq!(null.equals(&Value::Integer(1)), Ok(SqlBool::UNKNOWN));
        assert_eq!(
            null.plus(&Value::Integer(i32::MAX), &config()),
            Ok(Value::Null(TypeId::Integer))
        );
        assert!(matches!(
            Value::Integer(1).plus(&Value::Null(TypeId::Decimal), &config()),
            Ok(Value::Null(TypeId::Decimal))
        ));
    }

    #[test]
    fn comparison_predicates() {
        let (one, two) = (Value::Integer(1), Value::BigInt(2));
        assert_eq!(one.less_than(&two), Ok(SqlBool::TRUE));
        assert_eq!(one.greater_than(&two), Ok(SqlBool::FALSE));
        assert_eq!(one.compare_op(CompareOp::Ne, &two), Ok(SqlBool::TRUE));
        assert_eq!(two.compare_op(CompareOp::Le, &two), Ok(SqlBool::TRUE));
    }

    #[test]
    fn incomparable_types() {
        let result = Value::Date(SqlDate::new(2024, 1, 1).unwrap()).compare(&Value::Integer(1));
        assert!(matches!(result, Err(TypeError::TypeMismatch { .. })));

        let result = Value::VarBinary(BinaryString::new(b"a".to_vec())).compare(&Value::VarChar("a".into()));
        assert!(matches!(result, Err(TypeError::TypeMismatch { .. })));
    }

    #[test]
    fn character_comparisons() {
        let a = Value::Char("abc  ".into());
        let b = Value::VarChar("abc".into());
        assert_eq!(a.compare(&b), Ok(Ordering::Equal));

        let upper = Value::VarChar("ABC".into());
        assert_eq!(upper.compare(&b), Ok(Ordering::Less));
        assert_eq!(
            upper.compare_with(&b, Some(&CaseInsensitiveCollator)),
            Ok(Ordering::Equal)
        );

        // strings are converted to the governing type
        assert_eq!(Value::Integer(10).compare(&Value::VarChar(" 9 ".into())), Ok(Ordering::Greater));
        let date = Value::Date(SqlDate::new(2024, 2, 29).unwrap());
        assert_eq!(date.compare(&Value::VarChar("02/29/2024".into())), Ok(Ordering::Equal));
    }

    #[test]
    fn integer_arithmetic() {
        let config = config();
        assert_eq!(
            Value::Integer(2).plus(&Value::TinyInt(3), &config),
            Ok(Value::Integer(5))
        );
        assert_eq!(
            Value::Integer(i32::MAX).plus(&Value::Integer(1), &config),
            Err(TypeError::OutOfRange(TypeId::Integer))
        );
        assert_eq!(
            Value::BigInt(i32::MAX as i64).plus(&Value::Integer(1), &config),
            Ok(Value::BigInt(i32::MAX as i64 + 1))
        );
        assert_eq!(
            Value::SmallInt(7).modulo(&Value::SmallInt(0), &config),
            Err(TypeError::DivideByZero)
        );
        assert!(matches!(
            Value::Integer(7).plus(&Value::VarChar("1".into()), &config),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn float_arithmetic() {
        let config = config();
        assert!(matches!(
            Value::Real(1.5).times(&Value::Integer(2), &config),
            Ok(Value::Real(v)) if v == 3.0
        ));
        assert_eq!(
            Value::Double(1.0).divide(&Value::Integer(0), &config),
            Err(TypeError::DivideByZero)
        );
        assert!(matches!(
            Value::Double(1.0).modulo(&Value::Double(2.0), &config),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn decimal_arithmetic() {
        let config = config();
        let sum = dec("1.5").plus(&Value::Integer(2), &config).unwrap();
        assert_eq!(sum.to_string(), "3.5");

        let quotient = Value::Integer(1).divide(&dec("3"), &config).unwrap();
        assert_eq!(quotient.to_string(), "0.3333");

        let product = dec("1.5").times(&Value::Double(0.5), &config).unwrap();
        assert_eq!(product.to_string(), "0.75");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(Value::Integer(5).negate(), Ok(Value::Integer(-5)));
        assert_eq!(
            Value::TinyInt(i8::MIN).abs(),
            Err(TypeError::OutOfRange(TypeId::TinyInt))
        );
        assert_eq!(dec("-1.5").abs().unwrap().to_string(), "1.5");
        assert_eq!(Value::Integer(16).sqrt(), Ok(Value::Double(4.0)));
        assert_eq!(Value::Double(-4.0).sqrt(), Err(TypeError::SqrtOfNegative(-4.0)));
        assert!(matches!(Value::Null(TypeId::Real).sqrt(), Ok(Value::Null(TypeId::Double))));
    }

    #[test]
    fn getters() {
        assert_eq!(dec("300.7").to_i16(), Ok(300));
        assert_eq!(dec("300.7").to_i8(), Err(TypeError::OutOfRange(TypeId::TinyInt)));
        assert_eq!(Value::Double(-2.9).to_i32(), Ok(-2));
        assert_eq!(Value::Double(1e19).to_i64(), Err(TypeError::OutOfRange(TypeId::BigInt)));
        assert_eq!(Value::VarChar(" 12 ".into()).to_i32(), Ok(12));
        assert_eq!(Value::Null(TypeId::Integer).to_i64(), Ok(0));
        assert_eq!(Value::Real(0.1).to_decimal().unwrap().to_string(), "0.1");
        assert_eq!(Value::Double(1e39).to_f32(), Err(TypeError::OutOfRange(TypeId::Real)));
        assert_eq!(Value::VarChar("unknown".into()).to_bool(), Ok(SqlBool::UNKNOWN));
        assert_eq!(Value::Integer(2).to_bool(), Ok(SqlBool::TRUE));
        assert!(matches!(
            Value::Date(SqlDate::new(2024, 1, 1).unwrap()).to_i64(),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn literals() {
        let config = config();
        assert_eq!(Value::parse(TypeId::Integer, " 42", &config), Ok(Value::Integer(42)));
        assert_eq!(
            Value::parse(TypeId::SmallInt, "4x", &config),
            Err(TypeError::invalid_format(TypeId::SmallInt, "4x"))
        );
        assert_eq!(
            Value::parse(TypeId::Boolean, "unknown", &config),
            Ok(Value::Null(TypeId::Boolean))
        );
        assert_eq!(
            Value::parse(TypeId::Double, "1e309", &config),
            Err(TypeError::OutOfRange(TypeId::Double))
        );
        assert_eq!(
            Value::parse(TypeId::Real, "abc", &config),
            Err(TypeError::invalid_format(TypeId::Real, "abc"))
        );
        assert_eq!(
            Value::parse(TypeId::Date, "15.01.2024", &config).unwrap().to_string(),
            "2024-01-15"
        );
        assert_eq!(
            Value::parse(TypeId::Time, "2 PM", &config).unwrap().to_string(),
            "14:00:00"
        );
    }

    #[test]
    fn configured_locale_and_limits() {
        let config = Config::from_toml_str(
            r#"
                float_limits = "db2"

                [locale]
                date_patterns = ["dd/MM/yyyy"]
            "#,
        )
        .unwrap();
        assert_eq!(config.float_limits(), FloatLimits::Db2);

        assert_eq!(
            Value::parse(TypeId::Date, "31/12/1999", &config).unwrap().to_string(),
            "1999-12-31"
        );
        assert_eq!(
            Value::parse(TypeId::Double, "1e-307", &config),
            Err(TypeError::OutOfRange(TypeId::Double))
        );
        assert!(Value::parse(TypeId::Double, "1e-307", &Config::default()).is_ok());
    }

    #[test]
    fn casts() {
        let config = config();
        assert_eq!(Value::Integer(7).cast(TypeId::Char, &config).unwrap().to_string(), "7");
        assert!(matches!(
            Value::Null(TypeId::Integer).cast(TypeId::Date, &config),
            Ok(Value::Null(TypeId::Date))
        ));
        assert!(matches!(
            Value::VarBinary(BinaryString::new(vec![1])).cast(TypeId::VarChar, &config),
            Err(TypeError::TypeMismatch { .. })
        ));

        let value = dec("123.456").cast_decimal(5, 2, &config).unwrap();
        assert_eq!(value.to_string(), "123.45");
        assert_eq!(
            dec("1234.5").cast_decimal(5, 2, &config),
            Err(TypeError::OutOfRange(TypeId::Decimal))
        );
        assert_eq!(
            dec("1").cast_decimal(32, 0, &config),
            Err(TypeError::OutOfRange(TypeId::Decimal))
        );
    }

    #[test]
    fn fixed_width_payloads() {
        let version = FormatVersion::Current;
        let cases = [
            (Value::Boolean(true), vec![1]),
            (Value::TinyInt(-2), vec![0xFE]),
            (Value::SmallInt(0x0102), vec![1, 2]),
            (Value::Integer(-1), vec![0xFF; 4]),
            (Value::BigInt(1), vec![0, 0, 0, 0, 0, 0, 0, 1]),
            (Value::Real(1.0), vec![0x3F, 0x80, 0, 0]),
            (Value::Double(-2.0), vec![0xC0, 0, 0, 0, 0, 0, 0, 0]),
        ];

        for (value, expected) in cases {
            let mut buf = Vec::new();
            value.encode(&mut buf, version).unwrap();
            assert_eq!(buf, expected, "{value:?}");

            let (decoded, consumed) = Value::decode(value.type_id(), &buf).unwrap();
            assert_eq!(consumed, expected.len());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn null_sentinels() {
        let mut buf = Vec::new();
        Value::Null(TypeId::Date).encode(&mut buf, FormatVersion::Current).unwrap();
        Value::Null(TypeId::Time).encode(&mut buf, FormatVersion::Current).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);

        let (date, consumed) = Value::decode(TypeId::Date, &buf).unwrap();
        assert!(matches!(date, Value::Null(TypeId::Date)));
        let (time, _) = Value::decode(TypeId::Time, &buf[consumed..]).unwrap();
        assert!(matches!(time, Value::Null(TypeId::Time)));
    }

    #[test]
    fn envelope() {
        let values = [
            Value::Null(TypeId::Decimal),
            Value::Boolean(false),
            Value::Integer(i32::MIN),
            Value::Double(f64::MAX),
            dec("-12.345"),
            Value::Char("héllo".into()),
            Value::VarChar(String::new()),
            Value::Binary(BinaryString::new(vec![0; 40])),
            Value::Date(SqlDate::new(1, 1, 1).unwrap()),
            Value::Time(SqlTime::new(24, 0, 0).unwrap()),
        ];

        for version in [FormatVersion::Current, FormatVersion::Legacy] {
            for value in &values {
                let bytes = value.serialise(version).unwrap();
                let (decoded, consumed) = Value::deserialise(&bytes).unwrap();
                assert_eq!(consumed, bytes.len(), "{value:?}");
                assert_eq!(decoded.type_id(), value.type_id());
                assert_eq!(&decoded, value);
            }
        }

        assert_eq!(
            Value::Null(TypeId::Decimal).serialise(FormatVersion::Current),
            Ok(vec![0, TypeId::Decimal.tag()])
        );
    }

    #[test]
    fn corrupted_envelopes() {
        assert!(matches!(Value::deserialise(&[]), Err(TypeError::Corrupted(_))));
        assert!(matches!(Value::deserialise(&[99]), Err(TypeError::Corrupted(_))));
        assert!(matches!(Value::deserialise(&[0]), Err(TypeError::Corrupted(_))));
        assert!(matches!(
            Value::deserialise(&[TypeId::Integer.tag(), 1, 2]),
            Err(TypeError::Corrupted(_))
        ));
        assert!(matches!(
            Value::deserialise(&[TypeId::Boolean.tag(), 2]),
            Err(TypeError::Corrupted(_))
        ));
    }
}
