//! The closed set of scalar type identifiers.

use std::fmt::{self, Display, Formatter};

/// Identifies a scalar SQL type.
///
/// When two operands of different types meet in a comparison or an
/// arithmetic operation, the one with the higher [precedence](TypeId::precedence)
/// decides which implementation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeId {
    Boolean,
    Char,
    VarChar,
    Binary,
    VarBinary,
    Date,
    Time,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
}

/// Every type identifier, lowest precedence first.
pub const ALL_TYPES: [TypeId; 14] = [
    TypeId::Boolean,
    TypeId::Char,
    TypeId::VarChar,
    TypeId::Binary,
    TypeId::VarBinary,
    TypeId::Date,
    TypeId::Time,
    TypeId::TinyInt,
    TypeId::SmallInt,
    TypeId::Integer,
    TypeId::BigInt,
    TypeId::Real,
    TypeId::Double,
    TypeId::Decimal,
];

impl TypeId {
    /// Position in the type-precedence total order. Higher wins.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Boolean => 0,
            Self::Char => 10,
            Self::VarChar => 20,
            Self::Binary => 30,
            Self::VarBinary => 40,
            Self::Date => 50,
            Self::Time => 60,
            Self::TinyInt => 70,
            Self::SmallInt => 80,
            Self::Integer => 90,
            Self::BigInt => 100,
            Self::Real => 110,
            Self::Double => 120,
            Self::Decimal => 130,
        }
    }

    /// The type whose logic governs a mixed operation between `self` and `other`.
    pub const fn dominant(self, other: Self) -> Self {
        match self.precedence() >= other.precedence() {
            true => self,
            _ => other,
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Real
                | Self::Double
                | Self::Decimal
        )
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    pub const fn is_character(self) -> bool {
        matches!(self, Self::Char | Self::VarChar)
    }

    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Binary | Self::VarBinary)
    }

    /// Tag byte used by the self-describing envelope.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Boolean => 1,
            Self::Char => 2,
            Self::VarChar => 3,
            Self::Binary => 4,
            Self::VarBinary => 5,
            Self::Date => 6,
            Self::Time => 7,
            Self::TinyInt => 8,
            Self::SmallInt => 9,
            Self::Integer => 10,
            Self::BigInt => 11,
            Self::Real => 12,
            Self::Double => 13,
            Self::Decimal => 14,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        ALL_TYPES.into_iter().find(|ty| ty.tag() == tag)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::Binary => "CHAR FOR BIT DATA",
            Self::VarBinary => "VARCHAR FOR BIT DATA",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
        }
    }

    /// Looks a type up by its SQL name, ignoring case. `INT`, `FLOAT`,
    /// `NUMERIC` and `DEC` are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let alias = match name.to_ascii_uppercase().as_str() {
            "INT" => Some(Self::Integer),
            "FLOAT" | "DOUBLE PRECISION" => Some(Self::Double),
            "NUMERIC" | "DEC" => Some(Self::Decimal),
            "CHARACTER" => Some(Self::Char),
            _ => None,
        };

        alias.or_else(|| {
            ALL_TYPES
                .into_iter()
                .find(|ty| ty.name().eq_ignore_ascii_case(name))
        })
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
