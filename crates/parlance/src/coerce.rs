//! Scalar values and the type coercion used by tool-result arithmetic.
//!
//! Providers habitually return numbers as strings. [`coerce`] is the single
//! authority that unifies two scalars into a common type before an arithmetic
//! or comparison operator runs; no operator implements its own promotion.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AstError, AstResult};

/// A dynamically typed scalar produced by a tool invocation or carried as a
/// statement result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Anything that is not a plain scalar. Participates in coercion only as
    /// an incoercible "other".
    Json(Value),
}

impl Scalar {
    /// Runtime type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Text(_) => "str",
            Scalar::Json(_) => "json",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            // Whole floats keep their trailing ".0" so that a float never
            // stringifies identically to an int.
            Scalar::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        Scalar::Json(value)
    }
}

/// Promote a numeric-looking string: integer when it has no decimal point
/// and parses as one, float otherwise. Non-numeric strings pass through.
fn promote_numeric_text(value: Scalar) -> Scalar {
    if let Scalar::Text(s) = &value {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
            if !trimmed.contains('.') {
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Scalar::Int(i);
                }
            }
            if let Ok(x) = trimmed.parse::<f64>() {
                return Scalar::Float(x);
            }
        }
    }
    value
}

/// Unify two scalars into a common type, or fail.
///
/// Order-sensitive: `coerce(a, b)` keeps the operands in position, so callers
/// implementing reflected operators must swap the arguments themselves.
pub fn coerce(a: Scalar, b: Scalar) -> AstResult<(Scalar, Scalar)> {
    let a = promote_numeric_text(a);
    let b = promote_numeric_text(b);

    // A non-numeric string on either side pulls both operands into string
    // semantics (concatenation, lexicographic comparison).
    if matches!(a, Scalar::Text(_)) || matches!(b, Scalar::Text(_)) {
        return Ok((Scalar::Text(a.to_string()), Scalar::Text(b.to_string())));
    }

    match (a, b) {
        (Scalar::Int(x), Scalar::Float(y)) => Ok((Scalar::Float(x as f64), Scalar::Float(y))),
        (Scalar::Float(x), Scalar::Int(y)) => Ok((Scalar::Float(x), Scalar::Float(y as f64))),
        (a, b) if std::mem::discriminant(&a) == std::mem::discriminant(&b) => Ok((a, b)),
        (a, b) => Err(AstError::IncoercibleTypes {
            left: a.type_name().to_string(),
            right: b.type_name().to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    /// Coerce then apply. Division of two numbers is always a float, in the
    /// manner of true division. String `+` concatenates; other arithmetic on
    /// strings is rejected.
    pub fn apply(self, a: Scalar, b: Scalar) -> AstResult<Scalar> {
        let (a, b) = coerce(a, b)?;
        match (self, a, b) {
            (BinOp::Div, Scalar::Int(x), Scalar::Int(y)) => Ok(Scalar::Float(x as f64 / y as f64)),
            // Integer results that overflow i64 widen to float instead of
            // wrapping or panicking.
            (BinOp::Add, Scalar::Int(x), Scalar::Int(y)) => Ok(match x.checked_add(y) {
                Some(v) => Scalar::Int(v),
                None => Scalar::Float(x as f64 + y as f64),
            }),
            (BinOp::Sub, Scalar::Int(x), Scalar::Int(y)) => Ok(match x.checked_sub(y) {
                Some(v) => Scalar::Int(v),
                None => Scalar::Float(x as f64 - y as f64),
            }),
            (BinOp::Mul, Scalar::Int(x), Scalar::Int(y)) => Ok(match x.checked_mul(y) {
                Some(v) => Scalar::Int(v),
                None => Scalar::Float(x as f64 * y as f64),
            }),
            (op, Scalar::Float(x), Scalar::Float(y)) => Ok(Scalar::Float(match op {
                BinOp::Add => x + y,
                BinOp::Sub => x - y,
                BinOp::Mul => x * y,
                BinOp::Div => x / y,
            })),
            (BinOp::Add, Scalar::Text(x), Scalar::Text(y)) => Ok(Scalar::Text(x + &y)),
            (op, a, b) => Err(AstError::UnsupportedOperation(format!(
                "{} between {} and {}",
                op.symbol(),
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

/// Coerce then order. `Ok(None)` means the coerced pair has no ordering
/// (NaN, or an "other" type that coerced to itself).
pub fn compare(a: Scalar, b: Scalar) -> AstResult<Option<Ordering>> {
    let (a, b) = coerce(a, b)?;
    Ok(match (a, b) {
        (Scalar::Int(x), Scalar::Int(y)) => Some(x.cmp(&y)),
        (Scalar::Float(x), Scalar::Float(y)) => x.partial_cmp(&y),
        (Scalar::Text(x), Scalar::Text(y)) => Some(x.cmp(&y)),
        (Scalar::Bool(x), Scalar::Bool(y)) => Some(x.cmp(&y)),
        _ => None,
    })
}
