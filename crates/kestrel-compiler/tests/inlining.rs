//! Closure inlining and non-local return handling

mod common;

use common::*;
use kestrel_compiler::ast::Node;
use kestrel_compiler::{CompileError, CompilerConfig, PrettyPrint};

#[test]
fn test_inlined_non_local_return_needs_no_unwinding() {
    // foo ^ true ifTrue: [^ 1]
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(var("true"), "ifTrue:", vec![block(vec![ret(int(1))])]))],
    );
    let js = js(&node);
    assert!(!js.contains("try"), "{}", js);
    assert!(!js.contains("$early"), "{}", js);
    assert!(
        js.contains("if(smalltalk.assert(true)){\nreturn 1;\n} else {\nreturn nil;\n}"),
        "{}",
        js
    );
}

#[test]
fn test_dispatched_block_keeps_unwinding() {
    // foo self doIt: [^ 1]. ^ 2
    let node = method(
        "foo",
        &[],
        &[],
        vec![
            keyword(var("self"), "doIt:", vec![block(vec![ret(int(1))])]),
            ret(int(2)),
        ],
    );
    let js = js(&node);
    assert!(js.contains("var $early={};\ntry {\n"), "{}", js);
    assert!(js.contains("throw $early=[1];"), "{}", js);
    assert!(js.contains("} catch(e) {if(e===$early)return e[0]; throw e}"), "{}", js);
    assert!(js.contains("return 2;"));
}

#[test]
fn test_nested_inlined_returns_are_downgraded() {
    // foo a ifTrue: [b ifTrue: [^ 1]]. ^ 2
    let node = method(
        "foo",
        &[],
        &[],
        vec![
            keyword(
                var("a"),
                "ifTrue:",
                vec![block(vec![keyword(var("b"), "ifTrue:", vec![block(vec![ret(int(1))])])])],
            ),
            ret(int(2)),
        ],
    );
    let method = ir(&node, true);
    assert!(!method.has_non_local_return());

    let js = js(&node);
    assert!(!js.contains("try"), "{}", js);
    assert!(js.contains("return 1;"));
}

#[test]
fn test_return_inside_dispatched_block_inside_inlined_block() {
    // foo a ifTrue: [self do: [^ 1]]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(
            var("a"),
            "ifTrue:",
            vec![block(vec![keyword(var("self"), "do:", vec![block(vec![ret(int(1))])])])],
        )],
    );
    let js = js(&node);
    assert!(js.contains("try {"), "{}", js);
    assert!(js.contains("throw $early=[1];"), "{}", js);
}

#[test]
fn test_return_of_conditional_in_dispatched_block() {
    // foo self do: [^ a ifTrue: [1] ifFalse: [2]]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(
            var("self"),
            "do:",
            vec![block(vec![ret(keyword(
                var("a"),
                "ifTrue:ifFalse:",
                vec![block(vec![int(1)]), block(vec![int(2)])],
            ))])],
        )],
    );
    let method = ir(&node, true);
    assert!(method.pretty_print().contains("inlined-non-local-return"));
    assert!(method.has_non_local_return());

    let js = js(&node);
    assert!(js.contains("throw $early=[1];"), "{}", js);
    assert!(js.contains("throw $early=[2];"), "{}", js);
    assert!(js.contains("try {"), "{}", js);
}

#[test]
fn test_block_value_of_conditional() {
    // foo ^ self collect: [a ifTrue: [1] ifFalse: [2]]
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(
            var("self"),
            "collect:",
            vec![block(vec![keyword(
                var("a"),
                "ifTrue:ifFalse:",
                vec![block(vec![int(1)]), block(vec![int(2)])],
            )])],
        ))],
    );
    let js = js(&node);
    let expected = "$1=self[\"@a\"];\n\
                    if(smalltalk.assert($1)){\n\
                    return 1;\n\
                    } else {\n\
                    return 2;\n\
                    };";
    assert!(js.contains(expected), "{}", js);
    assert!(!js.contains("_ifTrue_ifFalse_\""));
}

#[test]
fn test_if_false_statement() {
    // foo a ifFalse: [self bar]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(var("a"), "ifFalse:", vec![block(vec![unary(var("self"), "bar")])])],
    );
    let js = js(&node);
    assert!(
        js.contains("if(!smalltalk.assert($1)){\nsmalltalk.send(self,\"_bar\",[]);\n};"),
        "{}",
        js
    );
}

#[test]
fn test_if_false_if_true_swaps_arms() {
    // foo | x | x := a ifFalse: [1] ifTrue: [2]
    let node = method(
        "foo",
        &[],
        &["x"],
        vec![assign(
            "x",
            keyword(var("a"), "ifFalse:ifTrue:", vec![block(vec![int(1)]), block(vec![int(2)])]),
        )],
    );
    let js = js(&node);
    assert!(js.contains("if(smalltalk.assert($1)){\nx=2;\n} else {\nx=1;\n};"), "{}", js);
}

#[test]
fn test_one_armed_assignment_yields_nil() {
    // foo | x | x := a ifTrue: [1]
    let node = method(
        "foo",
        &[],
        &["x"],
        vec![assign("x", keyword(var("a"), "ifTrue:", vec![block(vec![int(1)])]))],
    );
    let js = js(&node);
    assert!(js.contains("if(smalltalk.assert($1)){\nx=1;\n} else {\nx=nil;\n};"), "{}", js);
}

#[test]
fn test_if_nil_if_not_nil() {
    // foo ^ a ifNil: [0] ifNotNil: [1]
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(
            var("a"),
            "ifNil:ifNotNil:",
            vec![block(vec![int(0)]), block(vec![int(1)])],
        ))],
    );
    let js = js(&node);
    assert!(
        js.contains("if(($2 = $1) == nil || $2 == null){\nreturn 0;\n} else {\nreturn 1;\n};"),
        "{}",
        js
    );
    assert!(js.contains("var $1,$2;"));
}

#[test]
fn test_if_not_nil_value_answers_receiver() {
    // foo ^ a ifNotNil: [1]
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(var("a"), "ifNotNil:", vec![block(vec![int(1)])]))],
    );
    let js = js(&node);
    assert!(
        js.contains("if(($2 = $1) == nil || $2 == null){\nreturn $2;\n} else {\nreturn 1;\n};"),
        "{}",
        js
    );
}

#[test]
fn test_if_not_nil_statement_is_negated_test() {
    // foo a ifNotNil: [self bar]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(var("a"), "ifNotNil:", vec![block(vec![unary(var("self"), "bar")])])],
    );
    let js = js(&node);
    assert!(js.contains("if(!(($2 = $1) == nil || $2 == null)){\n"), "{}", js);
}

#[test]
fn test_inlined_block_temps_are_hoisted_and_reset() {
    // foo a ifTrue: [| t | t := 1. self bar: t]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(
            var("a"),
            "ifTrue:",
            vec![block_with(
                &[],
                &["t"],
                vec![assign("t", int(1)), keyword(var("self"), "bar:", vec![var("t")])],
            )],
        )],
    );
    let js = js(&node);
    assert!(js.contains("var self=this;\nvar t=nil;\n"), "{}", js);
    assert!(js.contains("){\nt=nil;\nt=1;\n"), "{}", js);
}

#[test]
fn test_while_true_loop() {
    // foo [a] whileTrue: [self step]
    let node = method(
        "foo",
        &[],
        &[],
        vec![keyword(
            block(vec![var("a")]),
            "whileTrue:",
            vec![block(vec![unary(var("self"), "step")])],
        )],
    );
    let js = js(&node);
    let expected = "while(true){\n\
                    $1=self[\"@a\"];\n\
                    if(!smalltalk.assert($1)) break;\n\
                    smalltalk.send(self,\"_step\",[]);\n\
                    };";
    assert!(js.contains(expected), "{}", js);
}

#[test]
fn test_unary_while_false_loop() {
    // foo [self done] whileFalse
    let node = method(
        "foo",
        &[],
        &[],
        vec![unary(block(vec![unary(var("self"), "done")]), "whileFalse")],
    );
    let js = js(&node);
    let expected = "while(true){\n\
                    $1=smalltalk.send(self,\"_done\",[]);\n\
                    if(smalltalk.assert($1)) break;\n\
                    };";
    assert!(js.contains(expected), "{}", js);
}

#[test]
fn test_loop_in_value_position_is_dispatched() {
    // foo ^ [a] whileTrue
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(unary(block(vec![var("a")]), "whileTrue"))],
    );
    let js = js(&node);
    assert!(js.contains("\"_whileTrue\""), "{}", js);
    assert!(!js.contains("while(true)"));
}

#[test]
fn test_non_block_argument_is_rejected() {
    // foo a ifTrue: b
    let err = compile_err(&method(
        "foo",
        &[],
        &[],
        vec![keyword(var("a"), "ifTrue:", vec![var("b")])],
    ));
    assert!(matches!(err, CompileError::Inlining { .. }));
    assert!(err.to_string().contains("ifTrue:"));
    assert!(!err.is_scope_error());
}

#[test]
fn test_block_with_parameters_is_rejected() {
    // foo a ifTrue: [:x | x]
    let err = compile_err(&method(
        "foo",
        &[],
        &[],
        vec![keyword(var("a"), "ifTrue:", vec![block_with(&["x"], &[], vec![var("x")])])],
    ));
    assert_eq!(err.code(), "E1004");
}

#[test]
fn test_inlining_disabled_dispatches_everything() {
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(var("true"), "ifTrue:", vec![block(vec![ret(int(1))])]))],
    );
    let config = CompilerConfig {
        inline: false,
        ..without_context()
    };
    let js = compile_with(config, &node).unwrap().js;
    let expected = "return smalltalk.send(true,\"_ifTrue_\",[(function(){\n\
                    throw $early=[1];\n\
                    })]);";
    assert!(js.contains(expected), "{}", js);
    assert!(js.contains("try {"));
}

#[test]
fn test_non_boolean_receiver_goes_through_assert() {
    // The runtime's assert raises the same error a dispatched ifTrue: would
    let node = method(
        "foo",
        &[],
        &[],
        vec![ret(keyword(Node::integer(3), "ifTrue:", vec![block(vec![int(1)])]))],
    );
    assert!(js(&node).contains("if(smalltalk.assert(3)){"));
}
