//! Mutable AST visitor
//!
//! Passes that annotate the tree in place (the semantic analyzer) implement
//! [`VisitorMut`]. Every visit method has a default implementation that calls
//! the corresponding walk function, so an implementor only overrides the node
//! kinds it cares about and calls `walk_*` to keep descending.
//!
//! Visits are fallible: the first error returned stops the traversal.

use super::node::*;
use super::span::Span;

pub trait VisitorMut: Sized {
    type Error;

    fn visit_method(&mut self, method: &mut MethodNode) -> Result<(), Self::Error> {
        walk_method(self, method)
    }

    fn visit_sequence(&mut self, sequence: &mut SequenceNode) -> Result<(), Self::Error> {
        walk_sequence(self, sequence)
    }

    fn visit_node(&mut self, node: &mut Node) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    fn visit_block(&mut self, block: &mut BlockNode, _span: Span) -> Result<(), Self::Error> {
        walk_block(self, block)
    }

    fn visit_send(&mut self, send: &mut SendNode, _span: Span) -> Result<(), Self::Error> {
        walk_send(self, send)
    }

    fn visit_cascade(&mut self, cascade: &mut CascadeNode, _span: Span) -> Result<(), Self::Error> {
        walk_cascade(self, cascade)
    }

    fn visit_message(&mut self, message: &mut MessageNode) -> Result<(), Self::Error> {
        walk_message(self, message)
    }

    fn visit_assignment(
        &mut self,
        assignment: &mut AssignmentNode,
        _span: Span,
    ) -> Result<(), Self::Error> {
        walk_assignment(self, assignment)
    }

    fn visit_return(&mut self, ret: &mut ReturnNode, _span: Span) -> Result<(), Self::Error> {
        walk_return(self, ret)
    }

    fn visit_variable(&mut self, _var: &mut VariableNode, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_class_reference(
        &mut self,
        _var: &mut VariableNode,
        _span: Span,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_dynamic_array(
        &mut self,
        array: &mut DynamicArrayNode,
        _span: Span,
    ) -> Result<(), Self::Error> {
        walk_dynamic_array(self, array)
    }

    fn visit_dynamic_dictionary(
        &mut self,
        dict: &mut DynamicDictionaryNode,
        _span: Span,
    ) -> Result<(), Self::Error> {
        walk_dynamic_dictionary(self, dict)
    }

    fn visit_literal(&mut self, _lit: &mut LiteralNode, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_verbatim(
        &mut self,
        _verbatim: &mut VerbatimNode,
        _span: Span,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Walk functions
// ============================================================================

pub fn walk_method<V: VisitorMut>(
    visitor: &mut V,
    method: &mut MethodNode,
) -> Result<(), V::Error> {
    visitor.visit_sequence(&mut method.body)
}

pub fn walk_sequence<V: VisitorMut>(
    visitor: &mut V,
    sequence: &mut SequenceNode,
) -> Result<(), V::Error> {
    for statement in &mut sequence.statements {
        visitor.visit_node(statement)?;
    }
    Ok(())
}

pub fn walk_node<V: VisitorMut>(visitor: &mut V, node: &mut Node) -> Result<(), V::Error> {
    let span = node.span;
    match &mut node.kind {
        NodeKind::Block(block) => visitor.visit_block(block, span),
        NodeKind::Send(send) => visitor.visit_send(send, span),
        NodeKind::Cascade(cascade) => visitor.visit_cascade(cascade, span),
        NodeKind::Assignment(assignment) => visitor.visit_assignment(assignment, span),
        NodeKind::Return(ret) => visitor.visit_return(ret, span),
        NodeKind::Variable(var) => visitor.visit_variable(var, span),
        NodeKind::ClassReference(var) => visitor.visit_class_reference(var, span),
        NodeKind::DynamicArray(array) => visitor.visit_dynamic_array(array, span),
        NodeKind::DynamicDictionary(dict) => visitor.visit_dynamic_dictionary(dict, span),
        NodeKind::Literal(lit) => visitor.visit_literal(lit, span),
        NodeKind::Verbatim(verbatim) => visitor.visit_verbatim(verbatim, span),
    }
}

pub fn walk_block<V: VisitorMut>(visitor: &mut V, block: &mut BlockNode) -> Result<(), V::Error> {
    visitor.visit_sequence(&mut block.body)
}

pub fn walk_send<V: VisitorMut>(visitor: &mut V, send: &mut SendNode) -> Result<(), V::Error> {
    visitor.visit_node(&mut send.receiver)?;
    visitor.visit_message(&mut send.message)
}

pub fn walk_cascade<V: VisitorMut>(
    visitor: &mut V,
    cascade: &mut CascadeNode,
) -> Result<(), V::Error> {
    visitor.visit_node(&mut cascade.receiver)?;
    for message in &mut cascade.messages {
        visitor.visit_message(message)?;
    }
    Ok(())
}

pub fn walk_message<V: VisitorMut>(
    visitor: &mut V,
    message: &mut MessageNode,
) -> Result<(), V::Error> {
    for argument in &mut message.arguments {
        visitor.visit_node(argument)?;
    }
    Ok(())
}

pub fn walk_assignment<V: VisitorMut>(
    visitor: &mut V,
    assignment: &mut AssignmentNode,
) -> Result<(), V::Error> {
    visitor.visit_node(&mut assignment.value)?;
    visitor.visit_node(&mut assignment.target)
}

pub fn walk_return<V: VisitorMut>(visitor: &mut V, ret: &mut ReturnNode) -> Result<(), V::Error> {
    visitor.visit_node(&mut ret.value)
}

pub fn walk_dynamic_array<V: VisitorMut>(
    visitor: &mut V,
    array: &mut DynamicArrayNode,
) -> Result<(), V::Error> {
    for element in &mut array.elements {
        visitor.visit_node(element)?;
    }
    Ok(())
}

pub fn walk_dynamic_dictionary<V: VisitorMut>(
    visitor: &mut V,
    dict: &mut DynamicDictionaryNode,
) -> Result<(), V::Error> {
    for (key, value) in &mut dict.entries {
        visitor.visit_node(key)?;
        visitor.visit_node(value)?;
    }
    Ok(())
}
