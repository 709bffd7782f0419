//! End-to-end compilation of whole methods and units

mod common;

use common::*;
use kestrel_compiler::ast::Node;
use kestrel_compiler::diagnostic::create_files;
use kestrel_compiler::{
    ClassContext, CompilationUnit, CompileError, Compiler, Diagnostic, SequenceNode, Span,
    DO_IT_SELECTOR,
};
use termcolor::NoColor;

#[test]
fn test_max_with() {
    // max: x with: y ^ x > y ifTrue: [x] ifFalse: [y]
    let node = method(
        "max:with:",
        &["x", "y"],
        &[],
        vec![ret(keyword(
            binary(var("x"), ">", var("y")),
            "ifTrue:ifFalse:",
            vec![block(vec![var("x")]), block(vec![var("y")])],
        ))],
    );
    let compiled = Compiler::new(without_context())
        .compile_method(&node, &ClassContext::new("Math"))
        .unwrap();

    let expected = "fn: function(x,y){\n\
                    var self=this;\n\
                    var $1;\n\
                    $1=smalltalk.send(x,\"_gt\",[y]);\n\
                    if(smalltalk.assert($1)){\n\
                    return x;\n\
                    } else {\n\
                    return y;\n\
                    };\n\
                    }";
    assert!(compiled.js.contains(expected), "{}", compiled.js);
    assert_eq!(compiled.arguments, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(compiled.message_sends, vec![">".to_string(), "ifTrue:ifFalse:".to_string()]);
}

#[test]
fn test_unknown_variable_diagnostic() {
    let source = "foo ^ zork";
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(var("zork").with_span(Span::new(6, 10, 1, 7)))],
    )
    .with_source(source);

    let err = compile_err(&node);
    assert_eq!(err.span(), Some(Span::new(6, 10, 1, 7)));

    let files = create_files("Foo>>foo", source);
    let diag = Diagnostic::from_compile_error(&err, 0, source);
    let mut out = NoColor::new(Vec::new());
    diag.emit_to(&mut out, &files).unwrap();
    let text = String::from_utf8(out.into_inner()).unwrap();
    assert!(text.contains("E1002"), "{}", text);
    assert!(text.contains("zork"), "{}", text);

    let json = diag.to_json(&files).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["code"], "E1002");
    assert_eq!(value["labels"][0]["start_column"], 7);
}

#[test]
fn test_compile_unit_from_json() {
    let json = r#"{
        "class": {"name": "Point", "superclass": "Object", "instance-variables": ["x", "y"]},
        "methods": [
            {
                "selector": "x",
                "source": "x ^ x",
                "body": {"statements": [
                    {"type": "Return", "value": {"type": "Variable", "name": "x"}}
                ]}
            },
            {
                "selector": "+",
                "arguments": ["other"],
                "source": "+ other ^ (x + other x) @ (y + other y)",
                "body": {"statements": [
                    {"type": "Return", "value": {
                        "type": "Send",
                        "selector": "@",
                        "receiver": {
                            "type": "Send", "selector": "+",
                            "receiver": {"type": "Variable", "name": "x"},
                            "arguments": [{"type": "Send", "selector": "x",
                                "receiver": {"type": "Variable", "name": "other"}}]
                        },
                        "arguments": [{
                            "type": "Send", "selector": "+",
                            "receiver": {"type": "Variable", "name": "y"},
                            "arguments": [{"type": "Send", "selector": "y",
                                "receiver": {"type": "Variable", "name": "other"}}]
                        }]
                    }}
                ]}
            }
        ]
    }"#;
    let unit: CompilationUnit = serde_json::from_str(json).unwrap();
    let methods = Compiler::new(without_context()).compile_class(&unit).unwrap();

    assert_eq!(methods.len(), 2);
    assert!(methods[0].js.contains("return self[\"@x\"];"));
    assert!(methods[0].js.contains("source: \"x ^ x\""));
    assert!(methods[1].js.contains("fn: function(other){"));
    assert!(methods[1].js.contains("\"_at\""));
    assert_eq!(methods[1].class_path, "smalltalk.Point");
}

#[test]
fn test_unit_stops_at_first_error() {
    let json = r#"{
        "class": {"name": "Point"},
        "methods": [
            {"selector": "a", "body": {"statements": [{"type": "Variable", "name": "zork"}]}},
            {"selector": "b", "body": {"statements": []}}
        ]
    }"#;
    let unit: CompilationUnit = serde_json::from_str(json).unwrap();
    let err = Compiler::default().compile_class(&unit).unwrap_err();
    assert!(matches!(err, CompileError::UnknownVariable { .. }));
}

#[test]
fn test_literal_nodes_from_json() {
    let json = r#"{
        "selector": "foo",
        "body": {"statements": [
            {"type": "Return", "value": {
                "type": "Literal",
                "value": {"kind": "Symbol", "value": "bar"}
            }}
        ]}
    }"#;
    let node = serde_json::from_str(json).unwrap();
    assert!(js(&node).contains("return smalltalk.symbolFor(\"bar\");"));
}

#[test]
fn test_expression_compiles_as_do_it() {
    let expression = SequenceNode::statements(vec![binary(int(3), "+", int(4))]);
    let compiled = Compiler::new(without_context())
        .compile_expression(expression, &ClassContext::new("UndefinedObject"))
        .unwrap();
    assert_eq!(compiled.selector, DO_IT_SELECTOR);
    let expected = "return smalltalk.send((function(){\n\
                    return smalltalk.send(3,\"_plus\",[4]);\n\
                    }),\"_value\",[]);";
    assert!(compiled.js.contains(expected), "{}", compiled.js);
}

#[test]
fn test_install_source() {
    let node = method("foo", &[], &[], vec![ret(Node::nil())]);
    let compiled = compile_with(without_context(), &node).unwrap();
    let install = compiled.install_source("smalltalk");
    assert!(install.starts_with("smalltalk.addMethod(smalltalk.method({\nselector: \"foo\","));
    assert!(install.ends_with("}), smalltalk.Foo);"));
}
