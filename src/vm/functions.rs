//! SQL runtime functions over [`Value`]s.
//!
//! NULL operands never raise errors here, they produce a NULL (or
//! `UNKNOWN`) result of the type the function would have returned.

use std::cmp::Ordering;

use crate::sql::binary::substring_range;
use crate::sql::boolean::SqlBool;
use crate::sql::collation::Collator;
use crate::sql::types::TypeId;
use crate::sql::value::Value;
use crate::vm::like;
use crate::{Result, TypeError};

/// Orders two character values as if the shorter one were padded with
/// blanks. A collator sees both values with trailing blanks removed.
pub fn compare_blank_padded(lhs: &str, rhs: &str, collator: Option<&dyn Collator>) -> Ordering {
    if let Some(collator) = collator {
        return collator.compare(lhs.trim_end_matches(' '), rhs.trim_end_matches(' '));
    }

    let (mut left, mut right) = (lhs.chars(), rhs.chars());
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (a, b) => a.unwrap_or(' ').cmp(&b.unwrap_or(' ')),
        };

        if ordering.is_ne() {
            return ordering;
        }
    }
}

fn character(value: &Value, other: TypeId) -> Result<Option<&str>> {
    match value {
        Value::Char(text) | Value::VarChar(text) => Ok(Some(text)),
        Value::Null(type_id) if type_id.is_character() => Ok(None),
        _ => Err(TypeError::TypeMismatch {
            left: value.type_id(),
            right: other,
        }),
    }
}

/// `value LIKE pattern [ESCAPE escape]`.
pub fn like(
    value: &Value,
    pattern: &Value,
    escape: Option<&Value>,
    collator: Option<&dyn Collator>,
) -> Result<SqlBool> {
    let text = character(value, pattern.type_id())?;
    let pattern = character(pattern, value.type_id())?;

    let escape = match escape {
        None => None,
        Some(escape) => {
            let escape = character(escape, TypeId::VarChar)?.ok_or(TypeError::NullEscape)?;
            let mut chars = escape.chars();
            match (chars.next(), chars.next()) {
                (Some(escape), None) => Some(escape),
                _ => return Err(TypeError::InvalidEscapeCharacter(escape.to_string())),
            }
        }
    };

    let (Some(text), Some(pattern)) = (text, pattern) else {
        return Ok(SqlBool::UNKNOWN);
    };

    like::like_str(text, pattern, escape, collator).map(SqlBool::from)
}

/// `SUBSTR(value, start [, length])`, counted in characters for character
/// values and in bytes for binary ones. The result is variable length.
pub fn substr(value: &Value, start: &Value, length: Option<&Value>) -> Result<Value> {
    let result_type = match value.type_id() {
        ty if ty.is_character() => TypeId::VarChar,
        ty if ty.is_binary() => TypeId::VarBinary,
        ty => {
            return Err(TypeError::TypeMismatch {
                left: ty,
                right: TypeId::VarChar,
            })
        }
    };

    if value.is_null() || start.is_null() || length.is_some_and(Value::is_null) {
        return Ok(Value::Null(result_type));
    }

    let start = start.to_i64()?;
    let length = length.map(Value::to_i64).transpose()?;

    Ok(match value {
        Value::Char(text) | Value::VarChar(text) => {
            let chars: Vec<char> = text.chars().collect();
            let range = substring_range(chars.len(), start, length)?;
            Value::VarChar(chars[range].iter().collect())
        }
        Value::Binary(bytes) | Value::VarBinary(bytes) => {
            Value::VarBinary(bytes.substring(start, length)?)
        }
        _ => Value::Null(result_type),
    })
}

/// `lhs || rhs`. Two fixed-length operands give a fixed-length result.
pub fn concat(lhs: &Value, rhs: &Value) -> Result<Value> {
    let (left, right) = (lhs.type_id(), rhs.type_id());
    let fixed = left == right && matches!(left, TypeId::Char | TypeId::Binary);

    let result_type = match (left.is_character() && right.is_character(), left.is_binary() && right.is_binary()) {
        (true, _) if fixed => TypeId::Char,
        (true, _) => TypeId::VarChar,
        (_, true) if fixed => TypeId::Binary,
        (_, true) => TypeId::VarBinary,
        _ => return Err(TypeError::TypeMismatch { left, right }),
    };

    Ok(match (lhs, rhs) {
        (Value::Char(a) | Value::VarChar(a), Value::Char(b) | Value::VarChar(b)) => {
            let joined = format!("{a}{b}");
            match fixed {
                true => Value::Char(joined),
                _ => Value::VarChar(joined),
            }
        }
        (Value::Binary(a) | Value::VarBinary(a), Value::Binary(b) | Value::VarBinary(b)) => {
            match fixed {
                true => Value::Binary(a.concat(b)),
                _ => Value::VarBinary(a.concat(b)),
            }
        }
        _ => Value::Null(result_type),
    })
}
