//! SQL scalar values: the typed data a query engine evaluates expressions
//! over and stores in rows.
//!
//! The crate covers the numeric family (fixed-width integers, REAL, DOUBLE
//! and an exact DECIMAL), character and binary strings, dates and times,
//! three-valued booleans and the byte layout every type is stored with.
//! Mixed-type operations are dispatched by [`TypeId`] precedence, see
//! [`sql::value`].

mod error;

pub mod config;
pub mod core;
pub mod sql;
pub mod vm;

pub use config::{Config, FormatVersion};
pub use error::{Result, TypeError};

pub use crate::core::date::{SqlDate, SqlTime};
pub use crate::core::decimal::Decimal;
pub use sql::{BinaryString, SqlBool, TypeId, Value};
