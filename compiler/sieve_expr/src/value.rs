//! Dynamic values.
//!
//! Four kinds only: boolean, 64-bit integer, 32-bit float and string.
//! Values are immutable; every operation produces a new one.

use std::cmp::Ordering;
use std::fmt;

use sieve_diagnostic::{parse_error, type_mismatch, Result};

/// Kind tag of a [`Value`], used by signatures and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Recognize a literal written in expression syntax.
    ///
    /// Accepts `true`/`false` (any case), decimal and `0x` hex integers,
    /// floats, and double-quoted strings with escapes. Returns `None` for
    /// anything else, including malformed quoted strings.
    pub fn recognize(text: &str) -> Option<Value> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            return Some(Value::Bool(true));
        }
        if text.eq_ignore_ascii_case("false") {
            return Some(Value::Bool(false));
        }
        if let Some(body) = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return unescape(body).ok().map(Value::Str);
        }
        parse_number(text)
    }

    /// Like [`Value::recognize`], but raw text that is not a literal
    /// becomes a string value instead of being rejected.
    pub fn from_raw(text: &str) -> Value {
        Value::recognize(text).unwrap_or_else(|| Value::string(text.trim()))
    }

    /// Boolean coercion.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) => Ok(*f != 0.0),
            Value::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            Value::Str(s) => Err(type_mismatch(format!(
                "cannot convert string \"{s}\" to bool"
            ))),
        }
    }

    /// Integer coercion. Floats truncate toward zero.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int conversion truncates by definition"
    )]
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i64),
            Value::Str(s) => match parse_number(s) {
                Some(Value::Int(i)) => Ok(i),
                Some(Value::Float(f)) => Ok(f as i64),
                _ => Err(type_mismatch(format!("cannot convert string \"{s}\" to int"))),
            },
            Value::Bool(_) => Err(type_mismatch("cannot convert bool to int")),
        }
    }

    /// Float coercion.
    #[expect(
        clippy::cast_precision_loss,
        reason = "integer promotion to float is lossy by definition"
    )]
    pub fn as_float(&self) -> Result<f32> {
        match self {
            Value::Int(i) => Ok(*i as f32),
            Value::Float(f) => Ok(*f),
            Value::Str(s) => match parse_number(s) {
                Some(Value::Int(i)) => Ok(i as f32),
                Some(Value::Float(f)) => Ok(f),
                _ => Err(type_mismatch(format!(
                    "cannot convert string \"{s}\" to float"
                ))),
            },
            Value::Bool(_) => Err(type_mismatch("cannot convert bool to float")),
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values, promoting Int to Float when kinds differ.
    ///
    /// Returns `None` for incomparable kinds (e.g. bool vs int) and for NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(_), Value::Float(b)) => self.as_float().ok()?.partial_cmp(b),
            (Value::Float(a), Value::Int(_)) => a.partial_cmp(&other.as_float().ok()?),
            (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps a fraction or exponent on every finite float
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Parse a numeric literal: decimal or `0x` hex integer, or a float.
///
/// Hex literals are read as 64-bit patterns, so `0xFFFFFFFFFFFFFFFF` is `-1`.
#[expect(
    clippy::cast_possible_wrap,
    reason = "hex literals denote raw 64-bit patterns"
)]
pub fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return u64::from_str_radix(hex, 16)
            .ok()
            .map(|v| Value::Int(v as i64));
    }

    let body = text.strip_prefix('-').unwrap_or(text);
    let starts_numeric = match body.as_bytes() {
        [b, ..] if b.is_ascii_digit() => true,
        [b'.', b, ..] if b.is_ascii_digit() => true,
        _ => false,
    };
    if !starts_numeric {
        return None;
    }

    if body.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().ok().map(Value::Int);
    }
    if body
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return text.parse::<f32>().ok().map(Value::Float);
    }
    None
}

/// Resolve backslash escapes inside a string literal body.
pub fn unescape(body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| parse_error(format!("invalid unicode escape '\\u{hex}'")))?
            }
            Some(other) => return Err(parse_error(format!("unknown escape '\\{other}'"))),
            None => return Err(parse_error("dangling '\\' at end of string")),
        };
        out.push(escaped);
    }
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
