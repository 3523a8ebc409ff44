//! Tree evaluation.
//!
//! Evaluation is a post-order walk: operands and arguments are evaluated
//! left to right, then the operator or function is applied. Everything
//! the walk needs from the outside world comes through [`Environment`].

use std::path::PathBuf;

use smallvec::SmallVec;
use sieve_diagnostic::{parse_error, type_mismatch, Result};
use sieve_stack::ensure_sufficient_stack;

use crate::operator::{evaluate_binary, evaluate_unary};
use crate::resource::ResourceRegistry;
use crate::tree::{ExprNode, Expression};
use crate::value::Value;

/// What an expression can reach while it is evaluated.
pub trait Environment {
    /// Resolve a case-folded variable name.
    fn variable(&self, name: &str) -> Result<Value>;

    /// Whether a variable resolves, without failing when it does not.
    fn is_defined(&self, name: &str) -> bool;

    fn resources(&mut self) -> &mut ResourceRegistry;

    /// Resolve a path written in an expression against the current file.
    fn resolve_path(&self, path: &str) -> PathBuf;

    /// Call a `$name(...)` user function.
    fn call_user_function(&mut self, name: &str, args: &[Value]) -> Result<Value>;
}

type Args = SmallVec<[Value; 4]>;

impl ExprNode {
    pub fn evaluate(&self, env: &mut dyn Environment) -> Result<Value> {
        ensure_sufficient_stack(|| match self {
            ExprNode::Value(value) => Ok(value.clone()),
            ExprNode::Variable(name) => env.variable(name),
            ExprNode::Operator { op, operands } => match operands.as_slice() {
                [operand] => evaluate_unary(*op, &operand.evaluate(env)?),
                [left, right] => {
                    let left = left.evaluate(env)?;
                    let right = right.evaluate(env)?;
                    evaluate_binary(*op, &left, &right)
                }
                _ => Err(parse_error(format!(
                    "operator '{op}' has {} operand(s)",
                    operands.len()
                ))),
            },
            ExprNode::Function { function, args } => {
                let values = evaluate_args(args, env)?;
                function.call(&values, env)
            }
            ExprNode::UserFunction { name, args } => {
                let values = evaluate_args(args, env)?;
                env.call_user_function(name, &values)
            }
        })
    }
}

fn evaluate_args(args: &[ExprNode], env: &mut dyn Environment) -> Result<Args> {
    args.iter().map(|arg| arg.evaluate(env)).collect()
}

impl Expression {
    /// Evaluate the tree. An empty expression cannot produce a value.
    pub fn evaluate(&self, env: &mut dyn Environment) -> Result<Value> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| parse_error(format!("empty expression '{}'", self.text.trim())))?;
        root.evaluate(env)
    }

    /// Evaluate a condition; the result must be a boolean.
    pub fn evaluate_bool(&self, env: &mut dyn Environment) -> Result<bool> {
        match self.evaluate(env)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch(format!(
                "condition '{}' must be bool, found {}",
                self.text.trim(),
                other.type_name()
            ))),
        }
    }
}

/// Parse and evaluate in one step.
pub fn evaluate(text: &str, env: &mut dyn Environment) -> Result<Value> {
    Expression::parse(text)?.evaluate(env)
}

/// Parse and evaluate a condition in one step.
pub fn evaluate_bool(text: &str, env: &mut dyn Environment) -> Result<bool> {
    Expression::parse(text)?.evaluate_bool(env)
}
