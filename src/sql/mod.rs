//! The SQL-facing value model.

pub mod binary;
pub mod boolean;
pub mod collation;
pub mod types;
pub mod value;

pub use binary::BinaryString;
pub use boolean::SqlBool;
pub use collation::{CaseInsensitiveCollator, Collator};
pub use types::TypeId;
pub use value::{CompareOp, Value};
