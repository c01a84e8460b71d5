//! Single comparisons between two values.
//!
//! Coercion rules:
//! - `==` / `!=` compare as integers when both sides are digit-only text,
//!   otherwise compare the raw values (text never equals an integer)
//! - `<`, `>`, `<=`, `>=` always coerce both sides with [`Value::to_int`],
//!   so non-numeric text counts as zero
//! - `+` adds integers and concatenates anything involving text; `-` is
//!   integer-only

use crate::error::{LensError, LensResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn from_option(value: Option<&str>) -> Self {
        value.map(Value::text).unwrap_or(Value::Null)
    }

    /// Digit-only text (integers do not count)
    fn is_digits(&self) -> bool {
        match self {
            Value::Text(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
            _ => false,
        }
    }

    /// Leading-integer conversion: `"12abc"` is 12, `"abc"` and null are 0
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Int(i) => *i,
            Value::Bool(b) => i64::from(*b),
            Value::Text(s) => {
                let trimmed = s.trim_start();
                let (sign, digits) = match trimmed.as_bytes().first() {
                    Some(b'-') => (-1, &trimmed[1..]),
                    Some(b'+') => (1, &trimmed[1..]),
                    _ => (1, trimmed),
                };
                let end = digits
                    .bytes()
                    .position(|b| !b.is_ascii_digit())
                    .unwrap_or(digits.len());
                digits[..end]
                    .bytes()
                    .fold(0i64, |acc, b| {
                        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
                    })
                    .saturating_mul(sign)
            }
        }
    }

    /// Only null and false are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Add,
    Sub,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl FromStr for Operator {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::NotEq),
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::LtEq),
            ">=" => Ok(Operator::GtEq),
            other => Err(LensError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Evaluate `left <op> right`
pub fn evaluate_expression(left: &Value, op: Operator, right: &Value) -> LensResult<Value> {

    let result = match op {
        Operator::Eq | Operator::NotEq => {
            let equal = match (significant_digits(left), significant_digits(right)) {
                (Some(l), Some(r)) => l == r,
                _ => left == right,
            };
            Value::Bool(if op == Operator::Eq { equal } else { !equal })
        }
        Operator::Add => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Value::Int(
                l.checked_add(*r)
                    .ok_or_else(|| LensError::argument(format!("{} + {} overflows", l, r)))?,
            ),
            (Value::Null, _) | (_, Value::Null) => {
                return Err(LensError::argument("cannot add a null value"));
            }
            (l, r) => Value::Text(format!("{}{}", l, r)),
        },
        Operator::Sub => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Value::Int(
                l.checked_sub(*r)
                    .ok_or_else(|| LensError::argument(format!("{} - {} overflows", l, r)))?,
            ),
            (l, r) => {
                return Err(LensError::argument(format!(
                    "subtraction needs integers, got '{}' and '{}'",
                    l, r
                )));
            }
        },
        Operator::Lt => Value::Bool(left.to_int() < right.to_int()),
        Operator::Gt => Value::Bool(left.to_int() > right.to_int()),
        Operator::LtEq => Value::Bool(left.to_int() <= right.to_int()),
        Operator::GtEq => Value::Bool(left.to_int() >= right.to_int()),
    };

    Ok(result)
}

/// Evaluate a comparison and reduce it to a boolean
pub fn compare(left: &Value, op: Operator, right: &Value) -> LensResult<bool> {
    Ok(evaluate_expression(left, op, right)?.is_truthy())
}

/// Digit-only text without its leading zeros; any length compares exactly
fn significant_digits(value: &Value) -> Option<&str> {
    match value {
        Value::Text(s) if value.is_digits() => Some(s.trim_start_matches('0')),
        _ => None,
    }
}
