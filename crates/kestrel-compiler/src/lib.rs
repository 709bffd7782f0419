//! Kestrel Compiler - Smalltalk AST to JavaScript
//!
//! This crate compiles methods of a message-passing language, given as an
//! already parsed AST, into JavaScript for a host runtime. Sends of the
//! conditional and loop selectors with literal block arguments are inlined
//! into native `if`/`while` code instead of being dispatched.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod globals;

pub use ast::{ClassContext, CompilationUnit, Literal, MethodNode, Node, SequenceNode, Span};
pub use compiler::ir::{IrMethod, PrettyPrint};
pub use compiler::optimize::{OptLevel, OptStats};
pub use compiler::semantic::SemanticAnalysis;
pub use compiler::{expression_method, CompiledMethod, Compiler, DO_IT_SELECTOR};
pub use config::{CompilerConfig, ConfigError, CONFIG_FILE_NAME};
pub use diagnostic::Diagnostic;
pub use error::{CompileError, CompileResult};
pub use globals::{GlobalResolver, KnownGlobals, NoGlobals};
