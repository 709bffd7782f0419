//! AST builders shared by the integration tests
#![allow(dead_code)]

use kestrel_compiler::ast::{MessageNode, Node, SequenceNode};
use kestrel_compiler::{
    ClassContext, CompileError, CompiledMethod, Compiler, CompilerConfig, IrMethod, MethodNode,
};

pub fn var(name: &str) -> Node {
    Node::variable(name)
}

pub fn int(value: i64) -> Node {
    Node::integer(value)
}

pub fn unary(receiver: Node, selector: &str) -> Node {
    Node::send(receiver, selector, vec![])
}

pub fn binary(receiver: Node, selector: &str, argument: Node) -> Node {
    Node::send(receiver, selector, vec![argument])
}

pub fn keyword(receiver: Node, selector: &str, arguments: Vec<Node>) -> Node {
    Node::send(receiver, selector, arguments)
}

pub fn message(selector: &str, arguments: Vec<Node>) -> MessageNode {
    MessageNode::new(selector, arguments)
}

/// Parameterless block
pub fn block(statements: Vec<Node>) -> Node {
    Node::block(vec![], SequenceNode::statements(statements))
}

pub fn block_with(parameters: &[&str], temps: &[&str], statements: Vec<Node>) -> Node {
    Node::block(
        parameters.iter().map(|p| p.to_string()).collect(),
        SequenceNode::new(temps.iter().map(|t| t.to_string()).collect(), statements),
    )
}

pub fn ret(value: Node) -> Node {
    Node::returning(value)
}

pub fn assign(name: &str, value: Node) -> Node {
    Node::assign(name, value)
}

pub fn method(
    selector: &str,
    arguments: &[&str],
    temps: &[&str],
    statements: Vec<Node>,
) -> MethodNode {
    MethodNode::new(
        selector,
        arguments.iter().map(|a| a.to_string()).collect(),
        SequenceNode::new(temps.iter().map(|t| t.to_string()).collect(), statements),
    )
}

/// `Foo` subclass of `Object` with instance variables `a` and `b`
pub fn class() -> ClassContext {
    ClassContext::new("Foo")
        .with_superclass("Object")
        .with_instance_variables(["a", "b"])
}

pub fn without_context() -> CompilerConfig {
    CompilerConfig {
        context: false,
        ..CompilerConfig::default()
    }
}

pub fn compile_with(
    config: CompilerConfig,
    node: &MethodNode,
) -> Result<CompiledMethod, CompileError> {
    Compiler::new(config).compile_method(node, &class())
}

/// JavaScript for `node`, without context instrumentation
pub fn js(node: &MethodNode) -> String {
    compile_with(without_context(), node)
        .expect("compilation failed")
        .js
}

pub fn compile_err(node: &MethodNode) -> CompileError {
    compile_with(CompilerConfig::default(), node).expect_err("compilation should fail")
}

pub fn ir(node: &MethodNode, inline: bool) -> IrMethod {
    let config = CompilerConfig {
        inline,
        ..CompilerConfig::default()
    };
    Compiler::new(config)
        .compile_ir(node, &class())
        .expect("compilation failed")
}
