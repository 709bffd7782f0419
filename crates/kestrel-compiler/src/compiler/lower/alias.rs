//! Evaluation-order aliasing
//!
//! Operands of a send are evaluated left to right. When one operand has to
//! be computed ahead of the send (it is an assignment, a cascade, or it will
//! be inlined into native control flow), every operand before it is computed ahead too,
//! each into a fresh `$N` temporary, so the hoisted code runs in source order.

use super::Translator;
use crate::ast::Node;
use crate::compiler::ir::{InstrId, IrKind};
use crate::error::CompileResult;

impl<'a> Translator<'a> {
    /// Evaluate `node` into a temporary now and return a reference to it.
    /// Immutable nodes are returned as they are, and cascades already
    /// lower to a temporary.
    pub(super) fn alias(&mut self, node: &Node) -> CompileResult<InstrId> {
        if node.is_immutable() || node.is_cascade() {
            return self.visit(node);
        }

        let alias = self.method.new_alias();
        let value = self.visit(node)?;
        let assignment = self.method.create(IrKind::Assignment);
        self.method.add(assignment, IrKind::Variable(alias.clone()));
        self.method.append(assignment, value);
        self.method.append(self.sequence, assignment);

        Ok(self.method.create(IrKind::Variable(alias)))
    }

    /// Hoist an already lowered instruction into a temporary
    pub(super) fn alias_instruction(&mut self, value: InstrId) -> InstrId {
        let alias = self.method.new_alias();
        let assignment = self.method.create(IrKind::Assignment);
        self.method.add(assignment, IrKind::Variable(alias.clone()));
        self.method.append(assignment, value);
        self.method.append(self.sequence, assignment);

        self.method.create(IrKind::Variable(alias))
    }

    /// Lower `nodes` in order, aliasing every node up to and including the
    /// last one whose subtree needs aliasing.
    pub(super) fn alias_temporally(&mut self, nodes: &[&Node]) -> CompileResult<Vec<InstrId>> {
        let threshold = nodes.iter().rposition(|node| node.subtree_needs_aliasing());

        let mut values = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            let value = match threshold {
                Some(last) if i <= last => self.alias(node)?,
                _ => self.visit(node)?,
            };
            values.push(value);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ClassContext, MethodNode, Node, SequenceNode};
    use crate::compiler::ir::{IrKind, IrMethod};
    use crate::compiler::lower::translate;
    use crate::compiler::semantic::SemanticAnalyzer;
    use crate::globals::NoGlobals;

    fn lower(statements: Vec<Node>) -> IrMethod {
        let class = ClassContext::new("Foo");
        let mut node = MethodNode::new(
            "foo",
            vec![],
            SequenceNode::new(vec!["x".into(), "y".into()], statements),
        );
        let analysis = SemanticAnalyzer::new(&class, &[], &NoGlobals)
            .analyze(&mut node)
            .unwrap();
        translate(&node, analysis, &class).unwrap()
    }

    fn statement_names(method: &IrMethod) -> Vec<&'static str> {
        let sequence = method.last_child(method.root()).unwrap();
        method
            .children(sequence)
            .iter()
            .map(|c| method.kind(*c).name())
            .collect()
    }

    #[test]
    fn test_no_alias_without_need() {
        // y := x + 1
        let method = lower(vec![Node::assign(
            "y",
            Node::send(Node::variable("x"), "+", vec![Node::integer(1)]),
        )]);
        assert!(method.internal_variables().is_empty());
        assert_eq!(statement_names(&method), vec!["assign", "return"]);
    }

    #[test]
    fn test_nested_assignment_aliases_preceding_receiver() {
        // y := x + (x := 2)
        let method = lower(vec![Node::assign(
            "y",
            Node::send(Node::variable("x"), "+", vec![Node::assign("x", Node::integer(2))]),
        )]);
        assert_eq!(method.internal_variables(), &["$1".to_string(), "$2".to_string()]);
        // $1 := x. x := 2. $2 := x. y := $1 + $2. ^ self
        assert_eq!(
            statement_names(&method),
            vec!["assign", "assign", "assign", "assign", "return"]
        );

        let sequence = method.last_child(method.root()).unwrap();
        let first = method.children(sequence)[0];
        let source = method.children(first)[1];
        match method.kind(source) {
            IrKind::Variable(var) => assert_eq!(var.name, "x"),
            other => panic!("expected x, got {:?}", other),
        }
    }

    #[test]
    fn test_immutable_operands_are_not_aliased() {
        // y := 3 + (x := 2)
        let method = lower(vec![Node::assign(
            "y",
            Node::send(Node::integer(3), "+", vec![Node::assign("x", Node::integer(2))]),
        )]);
        // x := 2. $1 := x. y := 3 + $1
        assert_eq!(method.internal_variables(), &["$1".to_string()]);
    }
}
