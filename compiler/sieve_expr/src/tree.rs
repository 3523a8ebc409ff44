//! Expression tree and its builder.
//!
//! Building happens in two steps. First a folding pass turns a `-`
//! that has no left operand into the sign of the numeric literal after
//! it. Then a precedence-climbing parser assembles the tree; operators
//! of equal priority associate to the left, so `1-2-3` is `(1-2)-3`.

use std::fmt;

use sieve_diagnostic::{parse_error, Result};
use sieve_stack::ensure_sufficient_stack;

use crate::function::Builtin;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::operator::{Operator, Priority};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum ExprNode {
    Value(Value),
    /// Case-folded variable name.
    Variable(String),
    Operator {
        op: Operator,
        operands: Vec<ExprNode>,
    },
    Function {
        function: Builtin,
        args: Vec<ExprNode>,
    },
    /// Call routed to the registered extension.
    UserFunction {
        name: String,
        args: Vec<ExprNode>,
    },
}

impl fmt::Display for ExprNode {
    /// Fully parenthesized form, used by tests and debug logging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Value(Value::Str(s)) => write!(f, "{s:?}"),
            ExprNode::Value(v) => write!(f, "{v}"),
            ExprNode::Variable(name) => f.write_str(name),
            ExprNode::Operator { op, operands } => match operands.as_slice() {
                [operand] => write!(f, "({op}{operand})"),
                [left, right] => write!(f, "({left} {op} {right})"),
                _ => write!(f, "({op} ?)"),
            },
            ExprNode::Function { function, args } => {
                write!(f, "{}(", function.name())?;
                write_args(f, args)
            }
            ExprNode::UserFunction { name, args } => {
                write!(f, "${name}(")?;
                write_args(f, args)
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ExprNode]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

/// A parsed expression. `root` is `None` for `()` and for blank text.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub text: String,
    pub root: Option<ExprNode>,
}

impl Expression {
    pub fn parse(text: &str) -> Result<Expression> {
        let tokens = fold_negative_literals(tokenize(text)?)?;
        let root = if is_empty_group(&tokens) {
            None
        } else {
            let mut parser = Parser {
                tokens: &tokens,
                pos: 0,
            };
            let node = parser.parse_expression(Priority::Logical)?;
            if let Some(extra) = parser.peek() {
                return Err(parse_error(format!(
                    "unexpected {} at column {}",
                    describe(&extra.kind),
                    extra.offset + 1
                )));
            }
            Some(node)
        };
        tracing::trace!(text = %text, tree = ?root.as_ref().map(ToString::to_string), "parsed expression");
        Ok(Expression {
            text: text.to_string(),
            root,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

/// Blank input, or nothing but balanced parentheses: `()`, `(())`.
fn is_empty_group(tokens: &[Token]) -> bool {
    let depth = tokens.len() / 2;
    tokens.len() % 2 == 0
        && tokens[..depth].iter().all(|t| t.kind == TokenKind::LParen)
        && tokens[depth..].iter().all(|t| t.kind == TokenKind::RParen)
}

/// Fold a `-` with no left operand into the following numeric literal.
///
/// A `-` has no left operand at the start of the expression and right
/// after an operator, an opening bracket or an argument separator. In
/// that position it must be followed by a number.
fn fold_negative_literals(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let is_prefix_minus = token.kind == TokenKind::Operator(Operator::Sub)
            && out.last().map_or(true, |prev| {
                matches!(
                    prev.kind,
                    TokenKind::Operator(_) | TokenKind::LParen | TokenKind::Comma
                )
            });
        if !is_prefix_minus {
            out.push(token);
            continue;
        }

        let negated = match iter.peek().map(|t| &t.kind) {
            Some(TokenKind::Value(Value::Int(i))) => Value::Int(i.wrapping_neg()),
            Some(TokenKind::Value(Value::Float(f))) => Value::Float(-f),
            Some(TokenKind::IntMinMagnitude) => Value::Int(i64::MIN),
            _ => {
                return Err(parse_error(format!(
                    "'-' at column {} has no left operand and is not followed by a number",
                    token.offset + 1
                )))
            }
        };
        iter.next();
        out.push(Token {
            kind: TokenKind::Value(negated),
            offset: token.offset,
        });
    }
    Ok(out)
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Value(v) => format!("value '{v}'"),
        TokenKind::Ident(name) => format!("variable '{name}'"),
        TokenKind::Function(name) => format!("function '{name}'"),
        TokenKind::UserFunction(name) => format!("function '${name}'"),
        TokenKind::Operator(op) => format!("operator '{op}'"),
        TokenKind::IntMinMagnitude => format!(
            "integer literal '{}' (out of range unless negated)",
            i64::MIN.unsigned_abs()
        ),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::Comma => "','".to_string(),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        match self.advance() {
            Some(token) if token.kind == *kind => Ok(()),
            Some(token) => Err(parse_error(format!(
                "expected {what}, found {} at column {}",
                describe(&token.kind),
                token.offset + 1
            ))),
            None => Err(parse_error(format!("expected {what}, found end of expression"))),
        }
    }

    /// Binary operator at the cursor whose priority is at least `min`.
    fn binary_at_least(&self, min: Priority) -> Option<Operator> {
        match self.peek()?.kind {
            TokenKind::Operator(op) if op.arity() == 2 && op.priority() >= min => Some(op),
            _ => None,
        }
    }

    fn parse_expression(&mut self, min: Priority) -> Result<ExprNode> {
        ensure_sufficient_stack(|| {
            let mut left = self.parse_unary()?;
            while let Some(op) = self.binary_at_least(min) {
                self.pos += 1;
                let right = self.parse_expression(next_priority(op.priority()))?;
                left = ExprNode::Operator {
                    op,
                    operands: vec![left, right],
                };
            }
            Ok(left)
        })
    }

    fn parse_unary(&mut self) -> Result<ExprNode> {
        if let Some(Token {
            kind: TokenKind::Operator(Operator::Not),
            ..
        }) = self.peek()
        {
            self.pos += 1;
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(ExprNode::Operator {
                op: Operator::Not,
                operands: vec![operand],
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ExprNode> {
        let Some(token) = self.advance() else {
            return Err(parse_error("expected a value, found end of expression"));
        };
        match &token.kind {
            TokenKind::Value(v) => Ok(ExprNode::Value(v.clone())),
            TokenKind::Ident(name) => Ok(ExprNode::Variable(name.clone())),
            TokenKind::LParen => {
                let inner = self.parse_expression(Priority::Logical)?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Function(name) => {
                let function = Builtin::from_name(name).ok_or_else(|| {
                    parse_error(format!(
                        "unknown function '{name}' at column {}",
                        token.offset + 1
                    ))
                })?;
                let args = self.parse_arguments()?;
                Ok(ExprNode::Function { function, args })
            }
            TokenKind::UserFunction(name) => {
                let args = self.parse_arguments()?;
                Ok(ExprNode::UserFunction {
                    name: name.clone(),
                    args,
                })
            }
            other => Err(parse_error(format!(
                "expected a value, found {} at column {}",
                describe(other),
                token.offset + 1
            ))),
        }
    }

    /// `( )` or `( expr {, expr} )`.
    fn parse_arguments(&mut self) -> Result<Vec<ExprNode>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression(Priority::Logical)?);
            match self.advance() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(token) => {
                    return Err(parse_error(format!(
                        "expected ',' or ')', found {} at column {}",
                        describe(&token.kind),
                        token.offset + 1
                    )))
                }
                None => return Err(parse_error("unclosed argument list")),
            }
        }
    }
}

/// The next tighter binary priority; the right operand of a binary
/// operator binds tighter than the operator itself.
fn next_priority(priority: Priority) -> Priority {
    match priority {
        Priority::Logical => Priority::Comparison,
        Priority::Comparison => Priority::AddSub,
        Priority::AddSub => Priority::MulDivMod,
        Priority::MulDivMod | Priority::Not | Priority::Function => Priority::Not,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
