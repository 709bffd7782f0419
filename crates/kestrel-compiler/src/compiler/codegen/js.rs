//! JavaScript naming and literal helpers

use std::fmt::Write;

use crate::ast::{ClassContext, Literal};

/// Words JavaScript does not accept as identifiers
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// `name`, or `name_` when it collides with a reserved word
pub fn safe_identifier(name: &str) -> String {
    if is_reserved_word(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn binary_char_name(c: char) -> Option<&'static str> {
    Some(match c {
        '+' => "plus",
        '-' => "minus",
        '*' => "star",
        '/' => "slash",
        '>' => "gt",
        '<' => "lt",
        '=' => "eq",
        ',' => "comma",
        '@' => "at",
        '%' => "percent",
        '&' => "and",
        '|' => "or",
        '~' => "tild",
        '\\' => "backslash",
        _ => return None,
    })
}

/// Property name a selector is installed under.
///
/// ```text
/// foo      -> _foo
/// at:put:  -> _at_put_
/// >=       -> _gt_eq
/// ```
pub fn mangle_selector(selector: &str) -> String {
    let mut mangled = String::with_capacity(selector.len() + 1);
    if selector.chars().next().map_or(false, |c| binary_char_name(c).is_some()) {
        for c in selector.chars() {
            mangled.push('_');
            match binary_char_name(c) {
                Some(name) => mangled.push_str(name),
                None => mangled.push(c),
            }
        }
    } else {
        mangled.push('_');
        mangled.extend(selector.chars().map(|c| if c == ':' { '_' } else { c }));
    }
    mangled
}

/// Double-quoted JavaScript string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `["a", "b"]`
pub fn string_array<'s>(values: impl IntoIterator<Item = &'s String>) -> String {
    let items: Vec<String> = values.into_iter().map(|v| string_literal(v)).collect();
    format!("[{}]", items.join(", "))
}

/// Render a literal value
pub fn literal(runtime: &str, value: &Literal) -> String {
    match value {
        Literal::Integer(n) if *n < 0 => format!("({})", n),
        Literal::Integer(n) => n.to_string(),
        Literal::Float(f) if f.is_sign_negative() => format!("({})", f),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => string_literal(s),
        Literal::Symbol(s) => format!("{}.symbolFor({})", runtime, string_literal(s)),
        Literal::Character(c) => string_literal(&c.to_string()),
        Literal::Array(items) => {
            let items: Vec<String> = items.iter().map(|item| literal(runtime, item)).collect();
            format!("[{}]", items.join(", "))
        }
        Literal::Boolean(b) => b.to_string(),
        Literal::Nil => "nil".to_string(),
    }
}

/// Runtime path of a class
pub fn class_path(runtime: &str, name: &str, metaclass: bool) -> String {
    if metaclass {
        format!("{}.{}.klass", runtime, name)
    } else {
        format!("{}.{}", runtime, name)
    }
}

pub fn class_context_path(runtime: &str, class: &ClassContext) -> String {
    class_path(runtime, &class.name, class.metaclass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle_selector() {
        assert_eq!(mangle_selector("foo"), "_foo");
        assert_eq!(mangle_selector("at:put:"), "_at_put_");
        assert_eq!(mangle_selector("+"), "_plus");
        assert_eq!(mangle_selector(">="), "_gt_eq");
        assert_eq!(mangle_selector("~="), "_tild_eq");
        assert_eq!(mangle_selector("->"), "_minus_gt");
        assert_eq!(mangle_selector("\\\\"), "_backslash_backslash");
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(safe_identifier("class"), "class_");
        assert_eq!(safe_identifier("function"), "function_");
        assert_eq!(safe_identifier("count"), "count");
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal("smalltalk", &Literal::Integer(-3)), "(-3)");
        assert_eq!(literal("smalltalk", &Literal::Integer(42)), "42");
        assert_eq!(literal("smalltalk", &Literal::Float(1.5)), "1.5");
        assert_eq!(
            literal("smalltalk", &Literal::Symbol("foo:".into())),
            "smalltalk.symbolFor(\"foo:\")"
        );
        assert_eq!(literal("st", &Literal::Character('a')), "\"a\"");
        assert_eq!(
            literal(
                "st",
                &Literal::Array(vec![
                    Literal::Integer(1),
                    Literal::String("x".into()),
                    Literal::Nil
                ])
            ),
            "[1, \"x\", nil]"
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(string_literal("line\nnext"), "\"line\\nnext\"");
        assert_eq!(string_literal("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(string_literal("\u{1}"), "\"\\u0001\"");
    }

    #[test]
    fn test_class_path() {
        assert_eq!(class_path("smalltalk", "Point", false), "smalltalk.Point");
        assert_eq!(class_path("smalltalk", "Point", true), "smalltalk.Point.klass");
    }
}
