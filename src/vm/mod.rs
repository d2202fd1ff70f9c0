//! Operations evaluated over values: checked arithmetic, pattern matching
//! and the scalar functions.

pub mod functions;
pub mod like;
pub mod math;
