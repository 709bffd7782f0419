//! Compilation errors

use crate::ast::Span;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that abort the compilation of a method or expression.
///
/// Scope errors come only from semantic analysis and inlining errors only
/// from the inliner. No partial output is produced once one is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A temporary or parameter re-declares a name already visible
    #[error("Variable shadowing: '{name}' is already defined")]
    ShadowingVariable {
        /// The re-declared name
        name: String,
        /// Location of the declaring node
        span: Span,
    },

    /// An identifier that is neither declared nor a known global
    #[error("Unknown variable: '{name}'")]
    UnknownVariable { name: String, span: Span },

    /// Assignment to an argument, pseudo-variable or class reference
    #[error("Invalid assignment to '{name}'")]
    InvalidAssignment { name: String, span: Span },

    /// An inlinable selector used with something other than a literal
    /// zero-argument block
    #[error("Inlining error: {message}")]
    Inlining { message: String, span: Span },

    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::ShadowingVariable { span, .. }
            | CompileError::UnknownVariable { span, .. }
            | CompileError::InvalidAssignment { span, .. }
            | CompileError::Inlining { span, .. } => Some(*span),
            CompileError::Internal { .. } => None,
        }
    }

    /// Stable error code, shown in diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::ShadowingVariable { .. } => "E1001",
            CompileError::UnknownVariable { .. } => "E1002",
            CompileError::InvalidAssignment { .. } => "E1003",
            CompileError::Inlining { .. } => "E1004",
            CompileError::Internal { .. } => "E1005",
        }
    }

    /// The offending variable for scope errors
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            CompileError::ShadowingVariable { name, .. }
            | CompileError::UnknownVariable { name, .. }
            | CompileError::InvalidAssignment { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_scope_error(&self) -> bool {
        self.variable_name().is_some()
    }
}
