//! Expression tokenizer.
//!
//! Reads left to right from a [`CharSource`], which supports pushing
//! characters back so that two-character operators and the "identifier
//! followed by `(`" rule can be decided with one character of lookahead.

use std::str::Chars;

use sieve_diagnostic::{parse_error, Result};

use crate::operator::Operator;
use crate::value::{parse_number, unescape, Value};

/// Character source with unlimited pushback.
pub struct CharSource<'a> {
    chars: Chars<'a>,
    pushed: Vec<char>,
    offset: usize,
}

impl<'a> CharSource<'a> {
    pub fn new(text: &'a str) -> Self {
        CharSource {
            chars: text.chars(),
            pushed: Vec::new(),
            offset: 0,
        }
    }

    /// Character offset of the next character to be read.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.pushed.pop().or_else(|| self.chars.next())?;
        self.offset += 1;
        Some(c)
    }

    pub fn push_back(&mut self, c: char) {
        self.offset -= 1;
        self.pushed.push(c);
    }

    pub fn peek(&mut self) -> Option<char> {
        let c = self.next_char()?;
        self.push_back(c);
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.next_char() {
            if !c.is_whitespace() {
                self.push_back(c);
                break;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Value(Value),
    /// Variable reference, already case-folded.
    Ident(String),
    /// Built-in function name followed by `(`, case-folded.
    Function(String),
    /// `$name` user function followed by `(`, without the `$`.
    UserFunction(String),
    Operator(Operator),
    /// `9223372036854775808`, which fits an `i64` only after a prefix `-`.
    IntMinMagnitude,
    LParen,
    RParen,
    Comma,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the first character of the token.
    pub offset: usize,
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Split an expression into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut source = CharSource::new(text);
    let mut tokens = Vec::new();

    loop {
        source.skip_whitespace();
        let offset = source.offset();
        let Some(c) = source.next_char() else {
            break;
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '"' => TokenKind::Value(Value::Str(read_string(&mut source, offset)?)),
            '$' => {
                let name = read_word(&mut source, None);
                if name.is_empty() || source.peek() != Some('(') {
                    return Err(parse_error(format!(
                        "'$' at column {} must start a user function call like $name(...)",
                        offset + 1
                    )));
                }
                TokenKind::UserFunction(name.to_lowercase())
            }
            c if c.is_ascii_digit() || (c == '.' && source.peek().is_some_and(|n| n.is_ascii_digit())) => {
                read_number(&mut source, c, offset)?
            }
            c if is_ident_start(c) => {
                let word = read_word(&mut source, Some(c));
                if word.eq_ignore_ascii_case("true") {
                    TokenKind::Value(Value::Bool(true))
                } else if word.eq_ignore_ascii_case("false") {
                    TokenKind::Value(Value::Bool(false))
                } else {
                    source.skip_whitespace();
                    if source.peek() == Some('(') {
                        TokenKind::Function(word.to_lowercase())
                    } else {
                        TokenKind::Ident(word.to_lowercase())
                    }
                }
            }
            c => TokenKind::Operator(read_operator(&mut source, c, offset)?),
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn read_word(source: &mut CharSource<'_>, first: Option<char>) -> String {
    let mut word: String = first.into_iter().collect();
    while let Some(c) = source.next_char() {
        if is_ident_continue(c) {
            word.push(c);
        } else {
            source.push_back(c);
            break;
        }
    }
    word
}

/// Read a string body after the opening quote, honouring backslash escapes.
fn read_string(source: &mut CharSource<'_>, start: usize) -> Result<String> {
    let mut raw = String::new();
    loop {
        match source.next_char() {
            Some('"') => return unescape(&raw),
            Some('\\') => {
                raw.push('\\');
                match source.next_char() {
                    Some(c) => raw.push(c),
                    None => break,
                }
            }
            Some(c) => raw.push(c),
            None => break,
        }
    }
    Err(parse_error(format!(
        "unterminated string starting at column {}",
        start + 1
    )))
}

fn read_number(source: &mut CharSource<'_>, first: char, start: usize) -> Result<TokenKind> {
    let mut text = String::from(first);
    let hex = first == '0' && matches!(source.peek(), Some('x' | 'X'));
    if hex {
        text.extend(source.next_char());
    }

    let mut previous = first;
    while let Some(c) = source.next_char() {
        let accepted = if hex {
            c.is_ascii_hexdigit()
        } else {
            c.is_ascii_digit()
                || c == '.'
                || matches!(c, 'e' | 'E')
                || (matches!(c, '+' | '-') && matches!(previous, 'e' | 'E'))
        };
        if !accepted {
            source.push_back(c);
            break;
        }
        text.push(c);
        previous = c;
    }

    if source.peek().is_some_and(is_ident_start) {
        return Err(parse_error(format!(
            "malformed number '{text}' at column {}",
            start + 1
        )));
    }
    if !hex && text.parse::<u64>() == Ok(i64::MIN.unsigned_abs()) {
        return Ok(TokenKind::IntMinMagnitude);
    }
    parse_number(&text).map(TokenKind::Value).ok_or_else(|| {
        parse_error(format!("malformed number '{text}' at column {}", start + 1))
    })
}

fn read_operator(source: &mut CharSource<'_>, first: char, start: usize) -> Result<Operator> {
    let mut candidate = String::from(first);
    let second = source.next_char();
    candidate.extend(second);

    let op = Operator::match_prefix(&candidate).ok_or_else(|| {
        parse_error(format!(
            "unexpected character '{first}' at column {}",
            start + 1
        ))
    })?;
    // Give back the lookahead character if only one was used
    if op.keyword().chars().count() == 1 {
        if let Some(c) = second {
            source.push_back(c);
        }
    }
    Ok(op)
}
