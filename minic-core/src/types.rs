//! Type system for minic.
//!
//! Types are checked structurally by name; there is no subtyping beyond
//! the implicit numeric conversions captured by [`compatible`].

use core::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Float,
    Double,
    Char,
    String,
    Bool,
    /// No type could be inferred (e.g. a nested expression or an
    /// undeclared name).
    Unknown,
}

impl Type {
    /// Type named by a declaration keyword.
    pub fn from_keyword(keyword: &str) -> Option<Type> {
        match keyword {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "double" => Some(Type::Double),
            "char" => Some(Type::Char),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Double => "double",
            Type::Char => "char",
            Type::String => "string",
            Type::Bool => "bool",
            Type::Unknown => "unknown",
        }
    }

    /// `int`, `float` and `double`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Double)
    }

    /// Operand types accepted by `+ - * / %`.
    pub fn is_arithmetic(self) -> bool {
        self.is_numeric() || self == Type::Char
    }

    pub fn is_unknown(self) -> bool {
        self == Type::Unknown
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Infer the type of a literal from its source text.
///
/// `1.2.3` and `1.` are not valid numbers and infer as `Unknown`.
pub fn literal_type(text: &str) -> Type {
    if text == "true" || text == "false" {
        return Type::Bool;
    }
    if text.starts_with('"') {
        return Type::String;
    }
    if text.len() >= 3 && text.starts_with('\'') && text.ends_with('\'') {
        return Type::Char;
    }
    if is_digits(text) {
        return Type::Int;
    }
    if let Some((whole, fraction)) = text.split_once('.') {
        if is_digits(whole) && is_digits(fraction) {
            return Type::Float;
        }
    }
    Type::Unknown
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a value of type `a` may meet a value of type `b`.
///
/// * identical types are compatible
/// * any two numeric types are compatible
/// * `char` and `int` are compatible
pub fn compatible(a: Type, b: Type) -> bool {
    if a == b {
        return true;
    }
    if a.is_numeric() && b.is_numeric() {
        return true;
    }
    matches!((a, b), (Type::Char, Type::Int) | (Type::Int, Type::Char))
}
