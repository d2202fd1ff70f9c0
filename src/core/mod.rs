//! Storage-level building blocks shared by the value types.

pub mod codec;
pub mod date;
pub mod decimal;
