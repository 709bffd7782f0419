//! Literal values
//!
//! Literals are the values the parser folds into the tree as-is: numbers,
//! strings, symbols, characters, booleans, `nil`, and literal arrays of
//! those. Hex and radix integers arrive already converted to `Integer`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A compile-time constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Literal {
    /// 42, 16r2A, -7
    Integer(i64),

    /// 3.14, 1.0e10
    Float(f64),

    /// 'hello'
    String(String),

    /// #foo, #at:put:
    Symbol(String),

    /// $a
    Character(char),

    /// #(1 $a 'str' #sym)
    Array(Vec<Literal>),

    /// true, false
    Boolean(bool),

    /// nil
    Nil,
}

impl Literal {
    pub fn is_nil(&self) -> bool {
        matches!(self, Literal::Nil)
    }

    /// Short name of the literal kind, used by the IR printer
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::Symbol(_) => "symbol",
            Literal::Character(_) => "character",
            Literal::Array(_) => "array",
            Literal::Boolean(_) => "boolean",
            Literal::Nil => "nil",
        }
    }
}

/// Smalltalk source notation for the literal
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Symbol(s) => write!(f, "#{}", s),
            Literal::Character(c) => write!(f, "${}", c),
            Literal::Array(items) => {
                write!(f, "#(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_source_notation() {
        assert_eq!(Literal::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Literal::Symbol("at:put:".into()).to_string(), "#at:put:");
        assert_eq!(
            Literal::Array(vec![Literal::Integer(1), Literal::Character('a'), Literal::Nil])
                .to_string(),
            "#(1 $a nil)"
        );
    }

    #[test]
    fn test_deserialize_adjacent_tag() {
        let lit: Literal = serde_json::from_str(r#"{"kind": "Integer", "value": 255}"#).unwrap();
        assert_eq!(lit, Literal::Integer(255));

        let lit: Literal = serde_json::from_str(r#"{"kind": "Nil"}"#).unwrap();
        assert!(lit.is_nil());

        let lit: Literal = serde_json::from_str(r#"{"kind": "Character", "value": "x"}"#).unwrap();
        assert_eq!(lit, Literal::Character('x'));
    }
}
