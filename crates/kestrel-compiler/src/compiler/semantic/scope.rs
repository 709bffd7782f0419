//! Lexical scopes and variable bindings
//!
//! Scopes live in a [`ScopeTable`] arena and refer to their enclosing scope
//! by [`ScopeId`]. The chain from any scope ends at the method scope, which
//! additionally owns instance variables and non-local-return bookkeeping.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::ast::Span;
use crate::compiler::ir::InstrId;
use crate::error::{CompileError, CompileResult};

/// The reserved identifiers, resolved before any declared name
pub const PSEUDO_VARIABLES: &[&str] = &["self", "super", "nil", "true", "false", "thisContext"];

/// Index into the scope arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// Storage class of a bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Method or block parameter
    Arg,
    Temp,
    /// Field of the receiver
    Instance,
    /// self, super, nil, true, false, thisContext
    Pseudo,
    /// Global class name
    ClassRef,
    /// Free identifier resolved in the host's global scope
    Unknown,
    /// Compiler-synthesized temporary (`$1`, `$2`, ...)
    Alias,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Arg => "arg",
            VarKind::Temp => "temp",
            VarKind::Instance => "ivar",
            VarKind::Pseudo => "pseudo",
            VarKind::ClassRef => "class",
            VarKind::Unknown => "unknown",
            VarKind::Alias => "alias",
        }
    }
}

/// A name bound to a storage location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeVar {
    pub name: String,
    pub kind: VarKind,
    /// Declaring scope; `None` for pseudo, class, unknown and alias variables
    pub scope: Option<ScopeId>,
}

impl ScopeVar {
    pub fn new(name: impl Into<String>, kind: VarKind, scope: Option<ScopeId>) -> Self {
        Self {
            name: name.into(),
            kind,
            scope,
        }
    }

    pub fn pseudo(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::Pseudo, None)
    }

    pub fn class_ref(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::ClassRef, None)
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::Unknown, None)
    }

    pub fn alias(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::Alias, None)
    }

    /// Reading it twice always yields the same value
    pub fn is_immutable(&self) -> bool {
        matches!(
            self.kind,
            VarKind::Arg | VarKind::Pseudo | VarKind::ClassRef | VarKind::Alias
        )
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind == VarKind::Pseudo
    }

    pub fn is_this_context(&self) -> bool {
        self.is_pseudo() && self.name == "thisContext"
    }

    /// Reject user assignments to read-only bindings
    pub fn validate_assignment(&self, span: Span) -> CompileResult<()> {
        match self.kind {
            VarKind::Arg | VarKind::Pseudo | VarKind::ClassRef => {
                Err(CompileError::InvalidAssignment {
                    name: self.name.clone(),
                    span,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ScopeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.name)
    }
}

/// State only the method scope carries
#[derive(Debug, Clone, Default)]
pub struct MethodScopeData {
    pub instance_vars: FxHashMap<String, ScopeVar>,
    /// The body contains a `^` outside of any block
    pub local_return: bool,
    /// Every block scope holding a `^`, once per site
    pub non_local_returns: Vec<ScopeId>,
    /// Free identifiers accepted as host globals
    pub unknown_variables: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub enum ScopeKind {
    Method(MethodScopeData),
    Block,
}

#[derive(Debug, Clone)]
pub struct LexicalScope {
    pub id: ScopeId,
    pub outer: Option<ScopeId>,
    pub args: Vec<ScopeVar>,
    pub temps: Vec<ScopeVar>,
    pub kind: ScopeKind,
    /// IR node built for this scope: the method, a closure, or an inlined closure
    pub instruction: Option<InstrId>,
}

impl LexicalScope {
    pub fn is_method_scope(&self) -> bool {
        matches!(self.kind, ScopeKind::Method(_))
    }

    /// Own binding for `name`: pseudo-variables, then arguments, then
    /// temporaries, then (method scope only) instance variables.
    pub fn binding_for(&self, name: &str) -> Option<ScopeVar> {
        if PSEUDO_VARIABLES.contains(&name) {
            return Some(ScopeVar::pseudo(name));
        }
        if let Some(var) = self.args.iter().find(|v| v.name == name) {
            return Some(var.clone());
        }
        if let Some(var) = self.temps.iter().find(|v| v.name == name) {
            return Some(var.clone());
        }
        match &self.kind {
            ScopeKind::Method(data) => data.instance_vars.get(name).cloned(),
            ScopeKind::Block => None,
        }
    }

    /// Names of arguments followed by temporaries
    pub fn locals(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .chain(self.temps.iter())
            .map(|v| v.name.as_str())
    }
}

/// Arena of all scopes of one method
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: Vec<LexicalScope>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_method(&mut self, instance_variables: &[String]) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let instance_vars = instance_variables
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    ScopeVar::new(name.clone(), VarKind::Instance, Some(id)),
                )
            })
            .collect();
        self.scopes.push(LexicalScope {
            id,
            outer: None,
            args: Vec::new(),
            temps: Vec::new(),
            kind: ScopeKind::Method(MethodScopeData {
                instance_vars,
                ..MethodScopeData::default()
            }),
            instruction: None,
        });
        id
    }

    pub fn push_block(&mut self, outer: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(LexicalScope {
            id,
            outer: Some(outer),
            args: Vec::new(),
            temps: Vec::new(),
            kind: ScopeKind::Block,
            instruction: None,
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &LexicalScope {
        &self.scopes[id.as_usize()]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut LexicalScope {
        &mut self.scopes[id.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LexicalScope> {
        self.scopes.iter()
    }

    pub fn add_arg(&mut self, scope: ScopeId, name: &str) {
        let var = ScopeVar::new(name, VarKind::Arg, Some(scope));
        self.get_mut(scope).args.push(var);
    }

    pub fn add_temp(&mut self, scope: ScopeId, name: &str) {
        let var = ScopeVar::new(name, VarKind::Temp, Some(scope));
        self.get_mut(scope).temps.push(var);
    }

    /// Resolve `name` starting at `scope` and walking outward.
    /// First match wins.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<ScopeVar> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(var) = scope.binding_for(name) {
                return Some(var);
            }
            current = scope.outer;
        }
        None
    }

    /// The method scope at the root of `scope`'s chain
    pub fn method_scope(&self, scope: ScopeId) -> ScopeId {
        let mut id = scope;
        while let Some(outer) = self.get(id).outer {
            id = outer;
        }
        id
    }

    pub fn method_data(&self, scope: ScopeId) -> Option<&MethodScopeData> {
        match &self.get(self.method_scope(scope)).kind {
            ScopeKind::Method(data) => Some(data),
            ScopeKind::Block => None,
        }
    }

    pub fn method_data_mut(&mut self, scope: ScopeId) -> Option<&mut MethodScopeData> {
        let id = self.method_scope(scope);
        match &mut self.get_mut(id).kind {
            ScopeKind::Method(data) => Some(data),
            ScopeKind::Block => None,
        }
    }

    pub fn has_non_local_return(&self, scope: ScopeId) -> bool {
        self.method_data(scope)
            .map(|data| !data.non_local_returns.is_empty())
            .unwrap_or(false)
    }

    /// Register a non-local-return site in `scope`
    pub fn add_non_local_return(&mut self, scope: ScopeId) {
        if let Some(data) = self.method_data_mut(scope) {
            data.non_local_returns.push(scope);
        }
    }

    /// Drop one registered non-local-return site of `scope`
    pub fn remove_non_local_return(&mut self, scope: ScopeId) -> bool {
        match self.method_data_mut(scope) {
            Some(data) => match data.non_local_returns.iter().position(|s| *s == scope) {
                Some(pos) => {
                    data.non_local_returns.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        }
    }
}
