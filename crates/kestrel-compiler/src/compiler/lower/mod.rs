//! AST to IR translation
//!
//! Converts an analyzed method into an [`IrMethod`]. Statements are appended
//! to the sequence currently being built; expressions that must be evaluated
//! early (see [`alias`](Translator::alias)) are hoisted into that sequence as
//! assignments to compiler temporaries before the statement that uses them.

mod alias;
mod expr;

use log::debug;

use crate::ast::{ClassContext, Literal, MethodNode, Node};
use crate::compiler::ir::{InstrId, IrKind, IrMethod};
use crate::compiler::semantic::{ScopeId, ScopeVar, SemanticAnalysis};
use crate::error::{CompileError, CompileResult};

/// Translate an analyzed method to IR
pub fn translate(
    node: &MethodNode,
    analysis: SemanticAnalysis,
    class: &ClassContext,
) -> CompileResult<IrMethod> {
    let method = IrMethod::new(
        node.selector.clone(),
        node.source.clone(),
        node.arguments.clone(),
        analysis,
    );
    let mut translator = Translator::new(class, method);
    translator.translate_method(node)?;
    Ok(translator.finish())
}

/// AST to IR translator
pub struct Translator<'a> {
    class: &'a ClassContext,
    method: IrMethod,
    /// Sequence receiving hoisted statements
    sequence: InstrId,
}

impl<'a> Translator<'a> {
    pub fn new(class: &'a ClassContext, method: IrMethod) -> Self {
        let sequence = method.root();
        Self {
            class,
            method,
            sequence,
        }
    }

    pub fn finish(self) -> IrMethod {
        self.method
    }

    pub fn translate_method(&mut self, node: &MethodNode) -> CompileResult<()> {
        debug!("translating {}>>{}", self.class.name, node.selector);

        let root = self.method.root();
        let scope = node
            .scope
            .ok_or_else(|| CompileError::internal("method was not analyzed"))?;
        self.add_temp_declarations(root, scope);

        let sequence = self.method.add(root, IrKind::Sequence);
        self.with_sequence(sequence, |t| {
            for statement in &node.body.statements {
                t.translate_statement(statement)?;
            }
            Ok(())
        })?;

        let has_local_return = self
            .method
            .scopes
            .method_data(scope)
            .map(|data| data.local_return)
            .unwrap_or(false);
        if !has_local_return {
            let ret = self.method.add(sequence, IrKind::Return { scope });
            self.method
                .add(ret, IrKind::Variable(ScopeVar::pseudo("self")));
        }
        Ok(())
    }

    /// Run `f` with `sequence` as the target for hoisted statements
    fn with_sequence<F>(&mut self, sequence: InstrId, f: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let outer = std::mem::replace(&mut self.sequence, sequence);
        let result = f(self);
        self.sequence = outer;
        result
    }

    /// Append a statement to the current sequence. A bare variable has no
    /// effect as a statement and is dropped.
    fn translate_statement(&mut self, statement: &Node) -> CompileResult<()> {
        let instruction = self.visit(statement)?;
        if !self.method.kind(instruction).is_variable() {
            self.method.append(self.sequence, instruction);
        }
        Ok(())
    }

    fn add_temp_declarations(&mut self, parent: InstrId, scope: ScopeId) {
        let names: Vec<String> = self
            .method
            .scopes
            .get(scope)
            .temps
            .iter()
            .map(|temp| temp.name.clone())
            .collect();
        for name in names {
            self.method
                .add(parent, IrKind::TempDeclaration { name, scope });
        }
    }

    fn nil(&mut self) -> InstrId {
        self.method.create(IrKind::Value(Literal::Nil))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SequenceNode;
    use crate::compiler::ir::PrettyPrint;
    use crate::compiler::semantic::SemanticAnalyzer;
    use crate::globals::NoGlobals;

    fn lower(mut node: MethodNode) -> IrMethod {
        let class = ClassContext::new("Foo")
            .with_superclass("Object")
            .with_instance_variables(["count"]);
        let analysis = SemanticAnalyzer::new(&class, &[], &NoGlobals)
            .analyze(&mut node)
            .unwrap();
        translate(&node, analysis, &class).unwrap()
    }

    #[test]
    fn test_implicit_return_self() {
        let method = lower(MethodNode::new(
            "foo",
            vec![],
            SequenceNode::statements(vec![Node::send(Node::variable("self"), "bar", vec![])]),
        ));
        let text = method.pretty_print();
        let expected = "  sequence\n\
                        \x20   send #bar [1]\n\
                        \x20     var pseudo:self\n\
                        \x20   return scope0\n\
                        \x20     var pseudo:self\n";
        assert!(text.contains(expected), "{}", text);
    }

    #[test]
    fn test_bare_variable_statement_is_dropped() {
        let method = lower(MethodNode::new(
            "foo",
            vec![],
            SequenceNode::statements(vec![
                Node::variable("count"),
                Node::returning(Node::variable("count")),
            ]),
        ));
        let sequence = method.last_child(method.root()).unwrap();
        assert_eq!(method.children(sequence).len(), 1);
    }

    #[test]
    fn test_temp_declarations_precede_sequence() {
        let method = lower(MethodNode::new(
            "foo",
            vec![],
            SequenceNode::new(vec!["a".into(), "b".into()], vec![]),
        ));
        let kinds: Vec<&str> = method
            .children(method.root())
            .iter()
            .map(|c| method.kind(*c).name())
            .collect();
        assert_eq!(kinds, vec!["temp", "temp", "sequence"]);
    }
}
