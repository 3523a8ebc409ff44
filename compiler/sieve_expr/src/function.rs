//! Built-in function catalog.
//!
//! Every function declares its arity and one or more signatures. A call
//! first checks the argument count, then picks the first signature whose
//! parameter kinds match the argument kinds exactly, then runs.

use std::fmt;

use sieve_diagnostic::{no_matching_signature, type_mismatch, wrong_arg_count, Result};

use crate::eval::Environment;
use crate::value::{Value, ValueKind};

mod text;

pub use text::{escape_csv, escape_html, escape_json, trim_lines};

use ValueKind::{Bool, Float, Int, Str};

/// One accepted parameter list and the kind it produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [ValueKind],
    pub result: ValueKind,
}

const fn sig(params: &'static [ValueKind], result: ValueKind) -> Signature {
    Signature { params, result }
}

const INT_TO_INT: Signature = sig(&[Int], Int);
const FLOAT_TO_FLOAT: Signature = sig(&[Float], Float);
const FLOAT_TO_INT: Signature = sig(&[Float], Int);
const STR_TO_INT: Signature = sig(&[Str], Int);
const STR_TO_STR: Signature = sig(&[Str], Str);
const STR_TO_BOOL: Signature = sig(&[Str], Bool);
const STR_STR_TO_BOOL: Signature = sig(&[Str, Str], Bool);
const STR_STR_TO_STR: Signature = sig(&[Str, Str], Str);
const STR_INT_TO_STR: Signature = sig(&[Str, Int], Str);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Round,
    StrLen,
    Str2Int,
    Str2Web,
    Str2Csv,
    Str2Json,
    IsSubstr,
    TrimLines,
    Is,
    XmlOpen,
    XmlRoot,
    XmlName,
    XmlText,
    XmlAttr,
    XmlList,
    XmlSize,
    XmlGet,
}

impl Builtin {
    pub const ALL: [Builtin; 18] = [
        Builtin::Abs,
        Builtin::Round,
        Builtin::StrLen,
        Builtin::Str2Int,
        Builtin::Str2Web,
        Builtin::Str2Csv,
        Builtin::Str2Json,
        Builtin::IsSubstr,
        Builtin::TrimLines,
        Builtin::Is,
        Builtin::XmlOpen,
        Builtin::XmlRoot,
        Builtin::XmlName,
        Builtin::XmlText,
        Builtin::XmlAttr,
        Builtin::XmlList,
        Builtin::XmlSize,
        Builtin::XmlGet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Round => "round",
            Builtin::StrLen => "strlen",
            Builtin::Str2Int => "str2int",
            Builtin::Str2Web => "str2web",
            Builtin::Str2Csv => "str2csv",
            Builtin::Str2Json => "str2json",
            Builtin::IsSubstr => "issubstr",
            Builtin::TrimLines => "trimlines",
            Builtin::Is => "is",
            Builtin::XmlOpen => "xml_open",
            Builtin::XmlRoot => "xml_root",
            Builtin::XmlName => "xml_name",
            Builtin::XmlText => "xml_text",
            Builtin::XmlAttr => "xml_attr",
            Builtin::XmlList => "xml_list",
            Builtin::XmlSize => "xml_size",
            Builtin::XmlGet => "xml_get",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn signatures(self) -> &'static [Signature] {
        match self {
            Builtin::Abs => &[INT_TO_INT, FLOAT_TO_FLOAT],
            Builtin::Round => &[FLOAT_TO_INT, INT_TO_INT],
            Builtin::StrLen | Builtin::Str2Int | Builtin::XmlSize => &[STR_TO_INT],
            Builtin::Str2Web
            | Builtin::Str2Csv
            | Builtin::Str2Json
            | Builtin::TrimLines
            | Builtin::XmlOpen
            | Builtin::XmlRoot
            | Builtin::XmlName
            | Builtin::XmlText => &[STR_TO_STR],
            Builtin::IsSubstr => &[STR_STR_TO_BOOL],
            Builtin::Is => &[STR_TO_BOOL],
            Builtin::XmlAttr | Builtin::XmlList => &[STR_STR_TO_STR],
            Builtin::XmlGet => &[STR_INT_TO_STR],
        }
    }

    /// Number of arguments; the same for every signature of a function.
    pub fn arity(self) -> usize {
        self.signatures()
            .first()
            .map_or(0, |signature| signature.params.len())
    }

    /// Check arity and signature, then run.
    pub fn call(self, args: &[Value], env: &mut dyn Environment) -> Result<Value> {
        if args.len() != self.arity() {
            return Err(wrong_arg_count(self.name(), self.arity(), args.len()));
        }
        let matches = self.signatures().iter().any(|signature| {
            signature
                .params
                .iter()
                .zip(args)
                .all(|(kind, arg)| arg.kind() == *kind)
        });
        if !matches {
            let kinds: Vec<&str> = args.iter().map(Value::type_name).collect();
            return Err(no_matching_signature(self.name(), &kinds));
        }
        self.run(args, env)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "round() converts a float to int by definition"
    )]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "string and list lengths never approach i64::MAX"
    )]
    fn run(self, args: &[Value], env: &mut dyn Environment) -> Result<Value> {
        let value = match (self, args) {
            (Builtin::Abs, [Value::Int(i)]) => Value::Int(i.wrapping_abs()),
            (Builtin::Abs, [Value::Float(f)]) => Value::Float(f.abs()),
            (Builtin::Round, [Value::Float(f)]) => Value::Int(f.round() as i64),
            (Builtin::Round, [Value::Int(i)]) => Value::Int(*i),
            (Builtin::StrLen, [Value::Str(s)]) => Value::Int(s.chars().count() as i64),
            (Builtin::Str2Int, [value]) => Value::Int(value.as_int()?),
            (Builtin::Str2Web, [Value::Str(s)]) => Value::Str(escape_html(s)),
            (Builtin::Str2Csv, [Value::Str(s)]) => Value::Str(escape_csv(s)),
            (Builtin::Str2Json, [Value::Str(s)]) => Value::Str(escape_json(s)),
            (Builtin::IsSubstr, [Value::Str(needle), Value::Str(haystack)]) => Value::Bool(
                haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
            ),
            (Builtin::TrimLines, [Value::Str(s)]) => Value::Str(trim_lines(s)),
            (Builtin::Is, [Value::Str(name)]) => Value::Bool(env.is_defined(name)),
            (Builtin::XmlOpen, [Value::Str(path)]) => {
                let path = env.resolve_path(path);
                Value::Str(env.resources().open_xml(&path)?.to_string())
            }
            (Builtin::XmlRoot, [Value::Str(doc)]) => {
                Value::Str(env.resources().xml_root(doc)?.to_string())
            }
            (Builtin::XmlName, [Value::Str(element)]) => {
                Value::string(env.resources().xml_element(element)?.name.as_str())
            }
            (Builtin::XmlText, [Value::Str(element)]) => {
                Value::string(env.resources().xml_element(element)?.text.as_str())
            }
            (Builtin::XmlAttr, [Value::Str(element), Value::Str(name)]) => Value::string(
                env.resources()
                    .xml_element(element)?
                    .attributes
                    .iter()
                    .find(|(key, _)| key == name)
                    .map_or("", |(_, value)| value.as_str()),
            ),
            (Builtin::XmlList, [Value::Str(element), Value::Str(tag)]) => {
                Value::Str(env.resources().xml_list(element, tag)?.to_string())
            }
            (Builtin::XmlSize, [Value::Str(list)]) => {
                Value::Int(env.resources().xml_list_len(list)? as i64)
            }
            (Builtin::XmlGet, [Value::Str(list), Value::Int(position)]) => {
                Value::Str(env.resources().xml_list_get(list, *position)?.to_string())
            }
            _ => {
                return Err(type_mismatch(format!(
                    "function '{}' received arguments outside its signatures",
                    self.name()
                )))
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
