//! Operator catalog and dispatch.
//!
//! The operator set is fixed, so dispatch is a `match` over the operand
//! kinds followed by a `match` over the operator. Any combination that
//! falls through is a type mismatch.
//!
//! Mixed Int/Float operands promote the integer to float before the
//! float rule runs. The only other mixed rule is `+` with a string on
//! either side, which concatenates the string forms.

use std::cmp::Ordering;
use std::fmt;

use sieve_diagnostic::{
    binary_type_mismatch, division_by_zero, modulo_by_zero, unary_type_mismatch, Result,
};

use crate::value::Value;

/// Binding strength of a token, loosest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Logical,
    Comparison,
    AddSub,
    MulDivMod,
    Not,
    Function,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,
    Not,
}

impl Operator {
    /// Every operator, longest keywords first so that a prefix scan over
    /// this list performs longest-match tokenization.
    pub const ALL: [Operator; 15] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::LtEq,
        Operator::GtEq,
        Operator::And,
        Operator::Or,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Lt,
        Operator::Gt,
        Operator::Xor,
        Operator::Not,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Xor => "^",
            Operator::Not => "!",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Operator::Not => 1,
            _ => 2,
        }
    }

    pub fn priority(self) -> Priority {
        match self {
            Operator::And | Operator::Or | Operator::Xor => Priority::Logical,
            Operator::Eq
            | Operator::NotEq
            | Operator::Lt
            | Operator::LtEq
            | Operator::Gt
            | Operator::GtEq => Priority::Comparison,
            Operator::Add | Operator::Sub => Priority::AddSub,
            Operator::Mul | Operator::Div | Operator::Mod => Priority::MulDivMod,
            Operator::Not => Priority::Not,
        }
    }

    /// Longest operator keyword at the start of `text`.
    pub fn match_prefix(text: &str) -> Option<Operator> {
        Self::ALL
            .into_iter()
            .find(|op| text.starts_with(op.keyword()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Apply a binary operator.
#[expect(
    clippy::cast_precision_loss,
    reason = "Int operands promote to Float when mixed with a Float"
)]
pub fn evaluate_binary(op: Operator, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => eval_float_binary(op, *a as f32, *b),
        (Value::Float(a), Value::Int(b)) => eval_float_binary(op, *a, *b as f32),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(op, *a, *b),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(op, a, b),
        (Value::Str(_), _) | (_, Value::Str(_)) if op == Operator::Add => {
            Ok(Value::Str(format!("{left}{right}")))
        }
        _ => Err(binary_type_mismatch(
            op.keyword(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// Apply a unary operator.
pub fn evaluate_unary(op: Operator, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (Operator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (Operator::Not, Value::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(unary_type_mismatch(op.keyword(), operand.type_name())),
    }
}

/// Integer rules. Arithmetic wraps; `&&`/`||`/`^` are bitwise.
fn eval_int_binary(op: Operator, a: i64, b: i64) -> Result<Value> {
    let value = match op {
        Operator::Add => Value::Int(a.wrapping_add(b)),
        Operator::Sub => Value::Int(a.wrapping_sub(b)),
        Operator::Mul => Value::Int(a.wrapping_mul(b)),
        Operator::Div if b == 0 => return Err(division_by_zero()),
        Operator::Div => Value::Int(a.wrapping_div(b)),
        Operator::Mod if b == 0 => return Err(modulo_by_zero()),
        Operator::Mod => Value::Int(a.wrapping_rem(b)),
        Operator::And => Value::Int(a & b),
        Operator::Or => Value::Int(a | b),
        Operator::Xor => Value::Int(a ^ b),
        _ => return compare(op, a.cmp(&b)),
    };
    Ok(value)
}

/// Float rules, IEEE semantics throughout (no trap on zero divisor).
fn eval_float_binary(op: Operator, a: f32, b: f32) -> Result<Value> {
    let value = match op {
        Operator::Add => Value::Float(a + b),
        Operator::Sub => Value::Float(a - b),
        Operator::Mul => Value::Float(a * b),
        Operator::Div => Value::Float(a / b),
        Operator::Mod => Value::Float(a % b),
        Operator::Eq | Operator::NotEq | Operator::Lt | Operator::LtEq | Operator::Gt
        | Operator::GtEq => {
            // NaN compares unequal to everything, including itself
            return match a.partial_cmp(&b) {
                Some(ordering) => compare(op, ordering),
                None => Ok(Value::Bool(op == Operator::NotEq)),
            };
        }
        _ => return Err(binary_type_mismatch(op.keyword(), "float", "float")),
    };
    Ok(value)
}

/// Boolean rules: equality and logic only.
fn eval_bool_binary(op: Operator, a: bool, b: bool) -> Result<Value> {
    match op {
        Operator::Eq => Ok(Value::Bool(a == b)),
        Operator::NotEq => Ok(Value::Bool(a != b)),
        Operator::And => Ok(Value::Bool(a && b)),
        Operator::Or => Ok(Value::Bool(a || b)),
        Operator::Xor => Ok(Value::Bool(a ^ b)),
        _ => Err(binary_type_mismatch(op.keyword(), "bool", "bool")),
    }
}

/// String rules: concatenation and lexicographic (code point) comparison.
fn eval_string_binary(op: Operator, a: &str, b: &str) -> Result<Value> {
    match op {
        Operator::Add => Ok(Value::Str(format!("{a}{b}"))),
        Operator::Eq | Operator::NotEq | Operator::Lt | Operator::LtEq | Operator::Gt
        | Operator::GtEq => compare(op, a.cmp(b)),
        _ => Err(binary_type_mismatch(op.keyword(), "str", "str")),
    }
}

/// Turn an ordering into the boolean result of a comparison operator.
fn compare(op: Operator, ordering: Ordering) -> Result<Value> {
    let result = match op {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::NotEq => ordering != Ordering::Equal,
        Operator::Lt => ordering == Ordering::Less,
        Operator::LtEq => ordering != Ordering::Greater,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::GtEq => ordering != Ordering::Less,
        _ => return Err(binary_type_mismatch(op.keyword(), "int", "int")),
    };
    Ok(Value::Bool(result))
}
