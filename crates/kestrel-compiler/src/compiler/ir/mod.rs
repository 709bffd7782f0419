//! Intermediate Representation
//!
//! A tree of instructions sitting between the annotated AST and the emitted
//! JavaScript. The translator builds it, the inliner rewrites it in place and
//! the code generator renders it.

mod instr;
mod method;
mod pretty;

pub use instr::{InlinedSendKind, InstrId, IrKind, IrNode};
pub use method::IrMethod;
pub use pretty::PrettyPrint;
