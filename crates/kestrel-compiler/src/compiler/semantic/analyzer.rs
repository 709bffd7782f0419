//! Semantic analyzer
//!
//! A single top-down pass over a method that allocates scopes, binds every
//! identifier, numbers message sends and flags the sends the inliner and the
//! translator must treat specially. This is the only stage that raises scope
//! errors, and it stops at the first one.

use std::collections::BTreeSet;

use log::trace;
use rustc_hash::FxHashMap;

use super::scope::{ScopeId, ScopeTable, ScopeVar};
use crate::ast::{
    walk_assignment, walk_block, walk_cascade, walk_dynamic_array, walk_dynamic_dictionary,
    walk_method, walk_return, walk_send, walk_sequence, AssignmentNode, BlockNode, CascadeNode,
    ClassContext, DynamicArrayNode, DynamicDictionaryNode, MessageNode, MethodNode, Node,
    NodeKind, ReturnNode, SendNode, SequenceNode, Span, VariableNode, VisitorMut,
};
use crate::compiler::optimize::is_inlinable_selector;
use crate::error::{CompileError, CompileResult};
use crate::globals::GlobalResolver;

/// Facts collected about one method
#[derive(Debug, Clone)]
pub struct SemanticAnalysis {
    pub scopes: ScopeTable,
    pub method_scope: ScopeId,
    pub class_references: BTreeSet<String>,
    /// Every distinct selector sent, super sends included
    pub message_sends: BTreeSet<String>,
    pub super_sends: BTreeSet<String>,
}

impl SemanticAnalysis {
    pub fn unknown_variables(&self) -> BTreeSet<String> {
        self.scopes
            .method_data(self.method_scope)
            .map(|data| data.unknown_variables.clone())
            .unwrap_or_default()
    }

    pub fn has_local_return(&self) -> bool {
        self.scopes
            .method_data(self.method_scope)
            .map(|data| data.local_return)
            .unwrap_or(false)
    }

    pub fn has_non_local_return(&self) -> bool {
        self.scopes.has_non_local_return(self.method_scope)
    }
}

pub struct SemanticAnalyzer<'a> {
    class: &'a ClassContext,
    host_globals: &'a [String],
    resolver: &'a dyn GlobalResolver,
    scopes: ScopeTable,
    current: Option<ScopeId>,
    /// Span of the method or block whose declarations are being registered
    declaration_span: Span,
    class_references: BTreeSet<String>,
    send_counts: FxHashMap<String, usize>,
    super_sends: BTreeSet<String>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(
        class: &'a ClassContext,
        host_globals: &'a [String],
        resolver: &'a dyn GlobalResolver,
    ) -> Self {
        Self {
            class,
            host_globals,
            resolver,
            scopes: ScopeTable::new(),
            current: None,
            declaration_span: Span::default(),
            class_references: BTreeSet::new(),
            send_counts: FxHashMap::default(),
            super_sends: BTreeSet::new(),
        }
    }

    /// Annotate `method` in place and return the collected scope facts
    pub fn analyze(mut self, method: &mut MethodNode) -> CompileResult<SemanticAnalysis> {
        self.visit_method(method)?;
        let method_scope = method
            .scope
            .ok_or_else(|| CompileError::internal("method scope was not allocated"))?;

        Ok(SemanticAnalysis {
            scopes: self.scopes,
            method_scope,
            class_references: self.class_references,
            message_sends: self.send_counts.into_keys().collect(),
            super_sends: self.super_sends,
        })
    }

    fn current_scope(&self) -> CompileResult<ScopeId> {
        self.current
            .ok_or_else(|| CompileError::internal("node visited outside of any scope"))
    }

    /// Declaring a name that already resolves is an error, whatever it resolves to
    fn validate_variable_scope(&self, name: &str) -> CompileResult<()> {
        let scope = self.current_scope()?;
        if self.scopes.lookup(scope, name).is_some() {
            return Err(CompileError::ShadowingVariable {
                name: name.to_string(),
                span: self.declaration_span,
            });
        }
        Ok(())
    }

    fn resolve_unknown(&mut self, name: &str, span: Span) -> CompileResult<ScopeVar> {
        let accepted = self.host_globals.iter().any(|global| global == name)
            || self.resolver.is_global_defined(name);
        if !accepted {
            return Err(CompileError::UnknownVariable {
                name: name.to_string(),
                span,
            });
        }

        trace!("'{}' accepted as a host global", name);
        let scope = self.current_scope()?;
        if let Some(data) = self.scopes.method_data_mut(scope) {
            data.unknown_variables.insert(name.to_string());
        }
        Ok(ScopeVar::unknown(name))
    }

    fn register_send(&mut self, message: &mut MessageNode) {
        let count = self.send_counts.entry(message.selector.clone()).or_insert(0);
        *count += 1;
        message.index = *count;
    }

    fn mark_super_send(&mut self, message: &mut MessageNode) {
        message.super_send = true;
        self.super_sends.insert(message.selector.clone());
    }
}

fn is_super(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::Variable(var) if var.name == "super")
}

/// `super` dispatches from the superclass but still evaluates to the receiver
fn rewrite_super_to_self(node: &mut Node) {
    if let NodeKind::Variable(var) = &mut node.kind {
        var.name = "self".to_string();
    }
}

/// Assignments used as values must run before their siblings are evaluated
fn alias_if_assignment(node: &mut Node) {
    if node.is_assignment() {
        node.should_be_aliased = true;
    }
}

impl VisitorMut for SemanticAnalyzer<'_> {
    type Error = CompileError;

    fn visit_method(&mut self, method: &mut MethodNode) -> CompileResult<()> {
        let scope = self.scopes.push_method(&self.class.instance_variables);
        self.current = Some(scope);
        self.declaration_span = method.span;
        method.scope = Some(scope);

        for argument in &method.arguments {
            self.validate_variable_scope(argument)?;
            self.scopes.add_arg(scope, argument);
        }

        walk_method(self, method)?;
        self.current = None;
        Ok(())
    }

    fn visit_sequence(&mut self, sequence: &mut SequenceNode) -> CompileResult<()> {
        let scope = self.current_scope()?;
        for temp in &sequence.temps {
            self.validate_variable_scope(temp)?;
            self.scopes.add_temp(scope, temp);
        }
        walk_sequence(self, sequence)
    }

    fn visit_block(&mut self, block: &mut BlockNode, span: Span) -> CompileResult<()> {
        let outer = self.current_scope()?;
        let scope = self.scopes.push_block(outer);
        let outer_span = std::mem::replace(&mut self.declaration_span, span);
        self.current = Some(scope);
        block.scope = Some(scope);

        for parameter in &block.parameters {
            self.validate_variable_scope(parameter)?;
            self.scopes.add_arg(scope, parameter);
        }
        walk_block(self, block)?;

        self.current = Some(outer);
        self.declaration_span = outer_span;
        Ok(())
    }

    fn visit_send(&mut self, send: &mut SendNode, _span: Span) -> CompileResult<()> {
        if is_super(&send.receiver) {
            rewrite_super_to_self(&mut send.receiver);
            self.mark_super_send(&mut send.message);
        } else if is_inlinable_selector(&send.message.selector) {
            send.message.should_be_inlined = true;
            send.receiver.should_be_aliased = true;
        }
        self.register_send(&mut send.message);

        alias_if_assignment(&mut send.receiver);
        send.message.arguments.iter_mut().for_each(alias_if_assignment);

        walk_send(self, send)
    }

    fn visit_cascade(&mut self, cascade: &mut CascadeNode, _span: Span) -> CompileResult<()> {
        let super_receiver = is_super(&cascade.receiver);
        if super_receiver {
            rewrite_super_to_self(&mut cascade.receiver);
        }

        for message in &mut cascade.messages {
            if super_receiver {
                self.mark_super_send(message);
            } else if is_inlinable_selector(&message.selector) {
                message.should_be_inlined = true;
            }
            self.register_send(message);
            message.arguments.iter_mut().for_each(alias_if_assignment);
        }
        alias_if_assignment(&mut cascade.receiver);

        walk_cascade(self, cascade)
    }

    fn visit_assignment(
        &mut self,
        assignment: &mut AssignmentNode,
        _span: Span,
    ) -> CompileResult<()> {
        walk_assignment(self, assignment)?;

        let target_span = assignment.target.span;
        match &assignment.target.kind {
            NodeKind::Variable(var) | NodeKind::ClassReference(var) => match &var.binding {
                Some(binding) => binding.validate_assignment(target_span),
                None => Err(CompileError::internal(format!(
                    "assignment target '{}' was not bound",
                    var.name
                ))),
            },
            _ => Err(CompileError::internal("assignment target is not a variable")),
        }
    }

    fn visit_return(&mut self, ret: &mut ReturnNode, _span: Span) -> CompileResult<()> {
        let scope = self.current_scope()?;
        ret.scope = Some(scope);

        if self.scopes.get(scope).is_method_scope() {
            if let Some(data) = self.scopes.method_data_mut(scope) {
                data.local_return = true;
            }
        } else {
            self.scopes.add_non_local_return(scope);
        }

        walk_return(self, ret)
    }

    fn visit_variable(&mut self, var: &mut VariableNode, span: Span) -> CompileResult<()> {
        let scope = self.current_scope()?;
        let binding = match self.scopes.lookup(scope, &var.name) {
            Some(binding) => binding,
            None => self.resolve_unknown(&var.name, span)?,
        };
        var.binding = Some(binding);
        Ok(())
    }

    fn visit_class_reference(&mut self, var: &mut VariableNode, _span: Span) -> CompileResult<()> {
        self.class_references.insert(var.name.clone());
        var.binding = Some(ScopeVar::class_ref(var.name.clone()));
        Ok(())
    }

    fn visit_dynamic_array(
        &mut self,
        array: &mut DynamicArrayNode,
        _span: Span,
    ) -> CompileResult<()> {
        array.elements.iter_mut().for_each(alias_if_assignment);
        walk_dynamic_array(self, array)
    }

    fn visit_dynamic_dictionary(
        &mut self,
        dict: &mut DynamicDictionaryNode,
        _span: Span,
    ) -> CompileResult<()> {
        for (key, value) in &mut dict.entries {
            alias_if_assignment(key);
            alias_if_assignment(value);
        }
        walk_dynamic_dictionary(self, dict)
    }
}
