//! Expression engine for the sieve preprocessor.
//!
//! Directive arguments and inline macros are small expressions over four
//! value kinds (bool, int, float, str):
//!
//! ```text
//! text ──tokenize──▶ tokens ──fold/parse──▶ ExprNode ──evaluate(env)──▶ Value
//! ```
//!
//! - [`value`]: the value type, literal recognition and coercions
//! - [`operator`] and [`function`]: the fixed operator and built-in function
//!   catalogs with their dispatch rules
//! - [`lexer`] and [`tree`]: tokenizer and precedence parser
//! - [`eval`]: the evaluator and the [`Environment`] it reads from
//! - [`variables`]: local/global tables and the special namespaces
//! - [`resource`]: the arena behind XML handles
//! - [`scope`] and [`extension`]: run-scoped state and the host hook

pub mod eval;
pub mod extension;
pub mod function;
pub mod lexer;
pub mod operator;
pub mod resource;
pub mod scope;
pub mod tree;
pub mod value;
pub mod variables;

pub use eval::{evaluate, evaluate_bool, Environment};
pub use extension::Extension;
pub use function::Builtin;
pub use operator::{Operator, Priority};
pub use resource::{Handle, ResourceRegistry};
pub use scope::{Scope, ScopeAt};
pub use tree::{ExprNode, Expression};
pub use value::{Value, ValueKind};
pub use variables::{
    is_valid_name, EngineNamespace, EnvNamespace, FileNamespace, PropertyNamespace, Site,
    SpecialVariables, UnknownPolicy, Variables,
};
