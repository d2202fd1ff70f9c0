//! The one-line expression language evaluated by the shell.
//!
//! ```text
//! 1.50 * 3                        arithmetic, comparison or || between literals
//! like 'abc' 'a%' [escape '!']    LIKE, `ilike` ignores case
//! range 'abc%' [escape '!']       index range of a constant LIKE pattern
//! cast '12.5' as decimal(4,1)     conversions
//! date '15.01.2024'               shorthand for cast .. as date, same for time
//! substr 'abcdef' 2 [3]           SUBSTR
//! sqrt 2, abs -3, negate 4        unary functions
//! compare 1 1.0                   ordering of two values
//! encode 12.5 [as double]         stored bytes of a value
//! decode 0e020207e8               value of stored bytes
//! ```
//!
//! Literals are `'text'` (with `''` for a quote), `x'0aff'` for binary,
//! `true`, `false`, `null`, integers, decimals like `1.50` and doubles with
//! an exponent like `1e3`.

use std::fmt::{self, Display, Formatter};
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use sqlscalar::sql::{CaseInsensitiveCollator, Collator, CompareOp};
use sqlscalar::vm::like::{self, UpperBound};
use sqlscalar::vm::functions;
use sqlscalar::{BinaryString, Config, Decimal, SqlBool, TypeError, TypeId, Value};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}")]
    Syntax(String),
    #[error(transparent)]
    Value(#[from] TypeError),
}

type Result<T> = std::result::Result<T, ShellError>;

fn syntax(msg: impl Into<String>) -> ShellError {
    ShellError::Syntax(msg.into())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Quoted(String),
    Hex(Vec<u8>),
    Word(String),
}

enum Target {
    Type(TypeId),
    Decimal { precision: u32, scale: u32 },
}

#[derive(Debug)]
pub enum Outcome {
    Value(Value),
    Truth(SqlBool),
    Text(String),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value} ({})", value.type_id()),
            Self::Truth(truth) => write!(f, "{truth}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

fn quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut text = String::new();

    loop {
        match chars.next() {
            Some('\'') if chars.peek() == Some(&'\'') => {
                chars.next();
                text.push('\'');
            }
            Some('\'') => return Ok(text),
            Some(c) => text.push(c),
            None => return Err(syntax("unterminated string literal")),
        }
    }
}

fn hex(digits: &str) -> Result<Vec<u8>> {
    if digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(syntax(format!("invalid hex literal {digits:?}")));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| syntax(format!("invalid hex literal {digits:?}")))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn tokenize(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                tokens.push(Token::Quoted(quoted(&mut chars)?));
            }
            _ => {
                let word: String =
                    std::iter::from_fn(|| chars.next_if(|c| !c.is_whitespace() && *c != '\''))
                        .collect();

                if word.eq_ignore_ascii_case("x") && chars.peek() == Some(&'\'') {
                    chars.next();
                    tokens.push(Token::Hex(hex(&quoted(&mut chars)?)?));
                } else {
                    tokens.push(Token::Word(word));
                }
            }
        }
    }

    Ok(tokens)
}

fn literal(token: &Token, config: &Config) -> Result<Value> {
    let word = match token {
        Token::Quoted(text) => return Ok(Value::VarChar(text.clone())),
        Token::Hex(bytes) => return Ok(Value::VarBinary(BinaryString::new(bytes.clone()))),
        Token::Word(word) => word,
    };

    Ok(match word.to_ascii_lowercase().as_str() {
        "null" => Value::Null(TypeId::Integer),
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        lower if lower.contains('e') => Value::parse(TypeId::Double, word, config)?,
        _ => match (word.parse::<i32>(), word.parse::<i64>()) {
            (Ok(value), _) => Value::Integer(value),
            (_, Ok(value)) => Value::BigInt(value),
            _ => Decimal::from_str(word)
                .map(Value::Decimal)
                .map_err(|_| syntax(format!("unrecognised literal {word:?}")))?,
        },
    })
}

fn one<'a>(tokens: &'a [Token], usage: &str) -> Result<&'a Token> {
    match tokens {
        [token] => Ok(token),
        _ => Err(syntax(format!("usage: {usage}"))),
    }
}

/// Splits `tokens` at the first `keyword`, which is dropped.
fn split_keyword<'a>(tokens: &'a [Token], keyword: &str) -> (&'a [Token], Option<&'a [Token]>) {
    let position = tokens
        .iter()
        .position(|token| matches!(token, Token::Word(word) if word.eq_ignore_ascii_case(keyword)));

    match position {
        Some(at) => (&tokens[..at], Some(&tokens[at + 1..])),
        None => (tokens, None),
    }
}

fn target(tokens: &[Token]) -> Result<Target> {
    let words = tokens
        .iter()
        .map(|token| match token {
            Token::Word(word) => Ok(word.as_str()),
            _ => Err(syntax("expected a type name")),
        })
        .collect::<Result<Vec<_>>>()?;
    let name = words.join(" ");

    let Some((base, args)) = name.split_once('(') else {
        return TypeId::from_name(&name)
            .map(Target::Type)
            .ok_or_else(|| syntax(format!("unknown type {name}")));
    };

    if TypeId::from_name(base) != Some(TypeId::Decimal) {
        return Err(syntax(format!("only DECIMAL takes a precision, found {name}")));
    }

    let args = args
        .strip_suffix(')')
        .ok_or_else(|| syntax(format!("missing ')' in {name}")))?;
    let (precision, scale) = args.split_once(',').unwrap_or((args, "0"));

    let number = |text: &str| {
        text.trim()
            .parse::<u32>()
            .map_err(|_| syntax(format!("invalid precision or scale {text:?}")))
    };

    Ok(Target::Decimal {
        precision: number(precision)?,
        scale: number(scale)?,
    })
}

fn cast(value: &Value, target: Target, config: &Config) -> Result<Value> {
    Ok(match target {
        Target::Type(type_id) => value.cast(type_id, config)?,
        Target::Decimal { precision, scale } => value.cast_decimal(precision, scale, config)?,
    })
}

fn escape_char(tokens: Option<&[Token]>) -> Result<Option<char>> {
    let Some(tokens) = tokens else {
        return Ok(None);
    };

    match one(tokens, "escape '<char>'")? {
        Token::Quoted(text) if text.chars().count() == 1 => Ok(text.chars().next()),
        Token::Quoted(text) => Err(TypeError::InvalidEscapeCharacter(text.clone()).into()),
        _ => Err(syntax("the escape character must be quoted")),
    }
}

fn like_predicate(head: &str, rest: &[Token], config: &Config) -> Result<Outcome> {
    let (operands, escape) = split_keyword(rest, "escape");
    let [value, pattern] = operands else {
        return Err(syntax(format!("usage: {head} <value> <pattern> [escape '<char>']")));
    };

    let escape = escape
        .map(|tokens| one(tokens, "escape '<char>'").and_then(|token| literal(token, config)))
        .transpose()?;
    let collator = (head == "ilike").then_some(&CaseInsensitiveCollator as &dyn Collator);

    let truth = functions::like(
        &literal(value, config)?,
        &literal(pattern, config)?,
        escape.as_ref(),
        collator,
    )?;
    Ok(Outcome::Truth(truth))
}

fn like_range(rest: &[Token]) -> Result<Outcome> {
    let (operands, escape) = split_keyword(rest, "escape");
    let Token::Quoted(pattern) = one(operands, "range '<pattern>' [escape '<char>']")? else {
        return Err(syntax("the pattern must be quoted"));
    };
    let escape = escape_char(escape)?;

    if !like::is_optimizable(Some(pattern)) {
        return Ok(Outcome::Text("leading wildcard, no index range".to_string()));
    }

    let width = pattern.chars().count();
    let lower = like::greater_equal_string(pattern, escape, width)?;
    let upper = match like::less_than_string(pattern, escape, width)? {
        UpperBound::Bounded(upper) => format!("< {upper:?}"),
        UpperBound::Unbounded => "unbounded".to_string(),
    };
    let recheck = like::is_like_comparison_needed(pattern, escape);

    Ok(Outcome::Text(format!(">= {lower:?}\n{upper}\nrecheck: {recheck}")))
}

fn expression(tokens: &[Token], config: &Config) -> Result<Outcome> {
    let [lhs, Token::Word(op), rhs] = tokens else {
        return match tokens {
            [value] => Ok(Outcome::Value(literal(value, config)?)),
            _ => Err(syntax("expected <value> or <value> <operator> <value>, try /help")),
        };
    };

    let (lhs, rhs) = (literal(lhs, config)?, literal(rhs, config)?);
    let compare = |op| lhs.compare_op(op, &rhs).map(Outcome::Truth);

    Ok(match op.as_str() {
        "+" => Outcome::Value(lhs.plus(&rhs, config)?),
        "-" => Outcome::Value(lhs.minus(&rhs, config)?),
        "*" => Outcome::Value(lhs.times(&rhs, config)?),
        "/" => Outcome::Value(lhs.divide(&rhs, config)?),
        "%" => Outcome::Value(lhs.modulo(&rhs, config)?),
        "||" => Outcome::Value(functions::concat(&lhs, &rhs)?),
        "=" => compare(CompareOp::Eq)?,
        "<>" | "!=" => compare(CompareOp::Ne)?,
        "<" => compare(CompareOp::Lt)?,
        "<=" => compare(CompareOp::Le)?,
        ">" => compare(CompareOp::Gt)?,
        ">=" => compare(CompareOp::Ge)?,
        other => return Err(syntax(format!("unknown operator {other}"))),
    })
}

pub fn evaluate(line: &str, config: &Config) -> Result<Outcome> {
    let tokens = tokenize(line)?;

    let Some((Token::Word(head), rest)) = tokens.split_first() else {
        return match tokens.is_empty() {
            true => Err(syntax("nothing to evaluate")),
            _ => expression(&tokens, config),
        };
    };

    let head = head.to_ascii_lowercase();
    tracing::trace!(command = head.as_str(), tokens = rest.len(), "evaluating");

    Ok(match head.as_str() {
        "like" | "ilike" => like_predicate(&head, rest, config)?,
        "range" => like_range(rest)?,
        "cast" => {
            let (operand, to) = split_keyword(rest, "as");
            let (Some(to), [value]) = (to, operand) else {
                return Err(syntax("usage: cast <value> as <type>"));
            };
            Outcome::Value(cast(&literal(value, config)?, target(to)?, config)?)
        }
        "date" | "time" => {
            let value = literal(one(rest, "date|time '<text>'")?, config)?;
            let type_id = match head.as_str() {
                "date" => TypeId::Date,
                _ => TypeId::Time,
            };
            Outcome::Value(value.cast(type_id, config)?)
        }
        "substr" => {
            let (value, start, length) = match rest {
                [value, start] => (value, start, None),
                [value, start, length] => (value, start, Some(literal(length, config)?)),
                _ => return Err(syntax("usage: substr <value> <start> [length]")),
            };
            let (value, start) = (literal(value, config)?, literal(start, config)?);
            Outcome::Value(functions::substr(&value, &start, length.as_ref())?)
        }
        "sqrt" | "abs" | "negate" => {
            let value = literal(one(rest, "sqrt|abs|negate <value>")?, config)?;
            Outcome::Value(match head.as_str() {
                "sqrt" => value.sqrt()?,
                "abs" => value.abs()?,
                _ => value.negate()?,
            })
        }
        "compare" => {
            let [lhs, rhs] = rest else {
                return Err(syntax("usage: compare <value> <value>"));
            };
            let ordering = literal(lhs, config)?.compare(&literal(rhs, config)?)?;
            Outcome::Text(format!("{ordering:?}"))
        }
        "encode" => {
            let (operand, to) = split_keyword(rest, "as");
            let mut value = literal(one(operand, "encode <value> [as <type>]")?, config)?;
            if let Some(to) = to {
                value = cast(&value, target(to)?, config)?;
            }

            let bytes = value.serialise(config.format_version)?;
            Outcome::Text(format!("{} ({} bytes)", to_hex(&bytes), bytes.len()))
        }
        "decode" => {
            let bytes = match one(rest, "decode <hex>")? {
                Token::Hex(bytes) => bytes.clone(),
                Token::Word(digits) => hex(digits)?,
                Token::Quoted(_) => return Err(syntax("usage: decode <hex>")),
            };

            let (value, consumed) = Value::deserialise(&bytes)?;
            if consumed != bytes.len() {
                return Err(syntax(format!("{} trailing bytes", bytes.len() - consumed)));
            }
            Outcome::Value(value)
        }
        _ => expression(&tokens, config)?,
    })
}
