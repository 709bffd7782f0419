//! IR arena for one compiled method
//!
//! Nodes are addressed by [`InstrId`]. Tree surgery (append, replace, remove)
//! keeps parent links and child lists consistent; detached nodes simply stay
//! unreachable in the arena until the method is dropped.

use std::collections::BTreeSet;

use log::trace;

use super::instr::{InstrId, IrKind, IrNode};
use crate::compiler::semantic::{ScopeId, ScopeTable, ScopeVar, SemanticAnalysis};
use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone)]
pub struct IrMethod {
    pub selector: String,
    pub source: String,
    pub arguments: Vec<String>,
    pub scopes: ScopeTable,
    /// The method scope
    pub scope: ScopeId,
    pub class_references: BTreeSet<String>,
    pub message_sends: BTreeSet<String>,
    pub super_sends: BTreeSet<String>,
    /// Compiler aliases in creation order
    internal_variables: Vec<String>,
    nodes: Vec<IrNode>,
    root: InstrId,
    next_alias: u32,
}

impl IrMethod {
    pub fn new(
        selector: impl Into<String>,
        source: impl Into<String>,
        arguments: Vec<String>,
        analysis: SemanticAnalysis,
    ) -> Self {
        let mut method = Self {
            selector: selector.into(),
            source: source.into(),
            arguments,
            scopes: analysis.scopes,
            scope: analysis.method_scope,
            class_references: analysis.class_references,
            message_sends: analysis.message_sends,
            super_sends: analysis.super_sends,
            internal_variables: Vec::new(),
            nodes: Vec::new(),
            root: InstrId(0),
            next_alias: 0,
        };
        method.root = method.create(IrKind::Method);
        let scope = method.scope;
        method.scopes.get_mut(scope).instruction = Some(method.root);
        method
    }

    pub fn root(&self) -> InstrId {
        self.root
    }

    pub fn kind(&self, id: InstrId) -> &IrKind {
        &self.nodes[id.as_usize()].kind
    }

    pub fn children(&self, id: InstrId) -> &[InstrId] {
        &self.nodes[id.as_usize()].children
    }

    pub fn child(&self, id: InstrId, index: usize) -> Option<InstrId> {
        self.children(id).get(index).copied()
    }

    pub fn last_child(&self, id: InstrId) -> Option<InstrId> {
        self.children(id).last().copied()
    }

    pub fn parent(&self, id: InstrId) -> Option<InstrId> {
        self.nodes[id.as_usize()].parent
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: IrKind) -> InstrId {
        let id = InstrId(self.nodes.len() as u32);
        self.nodes.push(IrNode::new(kind));
        id
    }

    /// Allocate a node as the last child of `parent`
    pub fn add(&mut self, parent: InstrId, kind: IrKind) -> InstrId {
        let id = self.create(kind);
        self.append(parent, id);
        id
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append(&mut self, parent: InstrId, child: InstrId) {
        self.detach(child);
        self.nodes[child.as_usize()].parent = Some(parent);
        self.nodes[parent.as_usize()].children.push(child);
    }

    /// Put `new` where `old` is in its parent; `old` ends up detached
    pub fn replace(&mut self, old: InstrId, new: InstrId) -> CompileResult<()> {
        self.detach(new);
        let parent = self.parent(old).ok_or_else(|| {
            CompileError::internal(format!("cannot replace detached node {}", old))
        })?;
        let position = self
            .children(parent)
            .iter()
            .position(|c| *c == old)
            .ok_or_else(|| {
                CompileError::internal(format!("{} is not a child of {}", old, parent))
            })?;

        self.nodes[parent.as_usize()].children[position] = new;
        self.nodes[new.as_usize()].parent = Some(parent);
        self.nodes[old.as_usize()].parent = None;
        Ok(())
    }

    /// Detach `id` from its parent, if any
    pub fn remove(&mut self, id: InstrId) {
        self.detach(id);
    }

    fn detach(&mut self, id: InstrId) {
        if let Some(parent) = self.nodes[id.as_usize()].parent.take() {
            self.nodes[parent.as_usize()].children.retain(|c| *c != id);
        }
    }

    /// Deep copy of the subtree at `id`, detached
    pub fn copy(&mut self, id: InstrId) -> InstrId {
        let kind = self.kind(id).clone();
        let children = self.children(id).to_vec();
        let copy = self.create(kind);
        for child in children {
            let child_copy = self.copy(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Fresh compiler temporary `$N`, declared by the method
    pub fn new_alias(&mut self) -> ScopeVar {
        self.next_alias += 1;
        let name = format!("${}", self.next_alias);
        trace!("{}: new alias {}", self.selector, name);
        self.internal_variables.push(name.clone());
        ScopeVar::alias(name)
    }

    pub fn internal_variables(&self) -> &[String] {
        &self.internal_variables
    }

    pub fn has_non_local_return(&self) -> bool {
        self.scopes.has_non_local_return(self.scope)
    }

    /// Whether the instruction built for `scope` was produced by the inliner
    pub fn is_scope_inlined(&self, scope: ScopeId) -> bool {
        self.scopes
            .get(scope)
            .instruction
            .map(|id| self.kind(id).is_inlined())
            .unwrap_or(false)
    }

    /// A `^` in `scope` can become a local return when every scope between it
    /// and the method has been inlined, so no block activation sits between
    /// the return and the method.
    pub fn can_inline_non_local_returns(&self, scope: ScopeId) -> bool {
        let mut current = scope;
        loop {
            let lexical = self.scopes.get(current);
            match lexical.outer {
                None => return lexical.is_method_scope(),
                Some(outer) => {
                    if !self.is_scope_inlined(current) {
                        return false;
                    }
                    current = outer;
                }
            }
        }
    }

    /// Depth of the JS function that hosts `scope`; inlined scopes share
    /// their outer scope's function
    pub fn scope_level(&self, scope: ScopeId) -> usize {
        match self.scopes.get(scope).outer {
            None => 1,
            Some(outer) if self.is_scope_inlined(scope) => self.scope_level(outer),
            Some(outer) => self.scope_level(outer) + 1,
        }
    }

    /// Name of the context parameter for `scope`
    pub fn context_alias(&self, scope: ScopeId) -> String {
        format!("$ctx{}", self.scope_level(scope))
    }
}
