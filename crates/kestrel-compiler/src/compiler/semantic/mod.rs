//! Scope construction and name binding

mod analyzer;
mod scope;

pub use analyzer::{SemanticAnalysis, SemanticAnalyzer};
pub use scope::{
    LexicalScope, MethodScopeData, ScopeId, ScopeKind, ScopeTable, ScopeVar, VarKind,
    PSEUDO_VARIABLES,
};
