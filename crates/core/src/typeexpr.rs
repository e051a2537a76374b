//! Type-expression mini-language.
//!
//! Attr specs constrain their value with a small type-constructor language:
//!
//! ```text
//! any | string | number | bool
//! list(T) | set(T) | map(T)
//! object({name1 = T1, name2 = T2, ...})
//! tuple([T1, T2, ...])
//! ```
//!
//! Expressions are parsed once, at spec construction time, into a
//! [`TypeExpr`] descriptor. Conversion of a runtime value into a descriptor
//! lives in the eval crate; this module only covers the grammar.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;

// ──────────────────────────────────────────────
// Descriptor
// ──────────────────────────────────────────────

/// A parsed type expression.
///
/// `Any` is the dynamic pseudo-type: every value conforms to it. `null` is
/// a valid value of every type and is not a type itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Any,
    String,
    Number,
    Bool,
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>),
    /// Fixed attribute set; extra input keys are a conversion error,
    /// missing keys convert to null.
    Object(BTreeMap<String, TypeExpr>),
    /// Fixed positional element types; length mismatch is a conversion error.
    Tuple(Vec<TypeExpr>),
}

impl TypeExpr {
    /// Parse a type expression from its source form.
    pub fn parse(expr: &str) -> Result<TypeExpr, SchemaError> {
        let tokens = lex(expr).map_err(|message| SchemaError::MalformedTypeExpression {
            expr: expr.to_string(),
            message,
        })?;
        let mut parser = Parser { tokens, pos: 0 };
        let ty = parser
            .parse_type()
            .and_then(|ty| {
                parser.expect(&Token::Eof)?;
                Ok(ty)
            })
            .map_err(|message| SchemaError::MalformedTypeExpression {
                expr: expr.to_string(),
                message,
            })?;
        Ok(ty)
    }
}

impl fmt::Display for TypeExpr {
    /// Renders the canonical source form. `parse(ty.to_string())` is the
    /// identity for every descriptor.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Number => write!(f, "number"),
            TypeExpr::Bool => write!(f, "bool"),
            TypeExpr::List(t) => write!(f, "list({})", t),
            TypeExpr::Set(t) => write!(f, "set({})", t),
            TypeExpr::Map(t) => write!(f, "map({})", t),
            TypeExpr::Object(fields) => {
                write!(f, "object({{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, ty)?;
                }
                write!(f, "}})")
            }
            TypeExpr::Tuple(types) => {
                write!(f, "tuple([")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, "])")
            }
        }
    }
}

// Serialized as the canonical source string, so the interchange form of an
// Attr spec carries `"type": "list(string)"` rather than a nested tree.
impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TypeExpr::parse(&s).map_err(D::Error::custom)
    }
}

// ──────────────────────────────────────────────
// Lexer
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Eq,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{}'", w),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Eq => write!(f, "'='"),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

fn lex(src: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Token::Word(chars[start..pos].iter().collect()));
            continue;
        }

        let tok = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '=' => Token::Eq,
            other => return Err(format!("unexpected character '{}'", other)),
        };
        tokens.push(tok);
        pos += 1;
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn next(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &Token) -> Result<(), String> {
        let got = self.next();
        if &got == want {
            Ok(())
        } else {
            Err(format!("expected {}, found {}", want, got))
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, String> {
        let word = match self.next() {
            Token::Word(w) => w,
            other => return Err(format!("expected a type name, found {}", other)),
        };
        match word.as_str() {
            "any" => Ok(TypeExpr::Any),
            "string" => Ok(TypeExpr::String),
            "number" => Ok(TypeExpr::Number),
            "bool" => Ok(TypeExpr::Bool),
            "list" => Ok(TypeExpr::List(Box::new(self.parse_unary_arg()?))),
            "set" => Ok(TypeExpr::Set(Box::new(self.parse_unary_arg()?))),
            "map" => Ok(TypeExpr::Map(Box::new(self.parse_unary_arg()?))),
            "object" => self.parse_object(),
            "tuple" => self.parse_tuple(),
            other => Err(format!("unknown type name '{}'", other)),
        }
    }

    /// `( T )` — the single argument of list/set/map.
    fn parse_unary_arg(&mut self) -> Result<TypeExpr, String> {
        self.expect(&Token::LParen)?;
        let ty = self.parse_type()?;
        self.expect(&Token::RParen)?;
        Ok(ty)
    }

    /// `({name = T, ...})` after the `object` keyword.
    fn parse_object(&mut self) -> Result<TypeExpr, String> {
        self.expect(&Token::LParen)?;
        self.expect(&Token::LBrace)?;
        let mut fields = BTreeMap::new();
        if self.peek() != &Token::RBrace {
            loop {
                let name = match self.next() {
                    Token::Word(w) => w,
                    other => return Err(format!("expected an attribute name, found {}", other)),
                };
                self.expect(&Token::Eq)?;
                let ty = self.parse_type()?;
                if fields.insert(name.clone(), ty).is_some() {
                    return Err(format!("duplicate attribute '{}' in object type", name));
                }
                if self.peek() == &Token::Comma {
                    self.next();
                    // Trailing comma before the closing brace is accepted.
                    if self.peek() == &Token::RBrace {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        self.expect(&Token::RParen)?;
        Ok(TypeExpr::Object(fields))
    }

    /// `([T, ...])` after the `tuple` keyword.
    fn parse_tuple(&mut self) -> Result<TypeExpr, String> {
        self.expect(&Token::LParen)?;
        self.expect(&Token::LBracket)?;
        let mut types = Vec::new();
        if self.peek() != &Token::RBracket {
            loop {
                types.push(self.parse_type()?);
                if self.peek() == &Token::Comma {
                    self.next();
                    if self.peek() == &Token::RBracket {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(&Token::RBracket)?;
        self.expect(&Token::RParen)?;
        Ok(TypeExpr::Tuple(types))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
