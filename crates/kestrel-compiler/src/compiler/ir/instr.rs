//! IR instructions
//!
//! The IR is a tree. Each [`IrNode`] has a kind, an ordered child list and a
//! parent link, all expressed as [`InstrId`] indices into the owning
//! [`IrMethod`](super::IrMethod) arena. The meaning of the children depends
//! on the kind and is listed on each variant.

use std::fmt;

use crate::ast::{Literal, Span};
use crate::compiler::semantic::{ScopeId, ScopeVar};

/// Index of a node in the IR arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub u32);

impl InstrId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// IR instruction kinds
#[derive(Debug, Clone, PartialEq)]
pub enum IrKind {
    /// Root. Children: temp declarations, then one `Sequence`
    Method,

    /// Block literal. Children: temp declarations, then one `BlockSequence`
    Closure {
        arguments: Vec<String>,
        scope: ScopeId,
    },

    /// Method body statements
    Sequence,

    /// Block body statements
    BlockSequence,

    /// Children: target variable, value
    Assignment,

    /// Local return from the method. Children: value
    Return { scope: ScopeId },

    /// Implicit value of a block's last statement. Children: value
    BlockReturn,

    /// `^` inside a block, returning from the home method. Children: value
    NonLocalReturn { scope: ScopeId },

    /// Message send. Children: receiver, then arguments
    Send {
        selector: String,
        /// Class the lookup starts from, for super sends
        class_send: Option<String>,
        index: usize,
        /// Source location, for inlining errors
        span: Span,
    },

    TempDeclaration { name: String, scope: ScopeId },

    Variable(ScopeVar),

    Value(Literal),

    /// Target code passed through unchanged
    Verbatim(String),

    /// Children: elements
    DynamicArray,

    /// Children: key, value, key, value, ...
    DynamicDictionary,

    /// An assignment whose value is an inlined send. Children: target, inlined send
    InlinedAssignment,

    /// A return whose value is an inlined send. Children: inlined send
    InlinedReturn,

    /// A non-local return whose value is an inlined send. Children: inlined send
    InlinedNonLocalReturn,

    /// A block spliced into its enclosing code. Children: temp declarations,
    /// then one `InlinedSequence`
    InlinedClosure { scope: ScopeId },

    InlinedSequence,

    /// Native control flow replacing a send
    InlinedSend(InlinedSendKind),
}

/// Control construct an inlined send turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlinedSendKind {
    /// Children: condition, closure
    IfTrue,
    /// Children: condition, closure
    IfFalse,
    /// Children: condition, true closure, false closure
    IfTrueIfFalse,
    /// Children: receiver, nil closure, not-nil closure. The receiver is
    /// stored in `receiver` before testing.
    IfNilIfNotNil { receiver: String },
    /// Children: condition closure, optional body closure. The condition
    /// closure assigns its value to `condition`.
    WhileTrue { condition: String },
    WhileFalse { condition: String },
}

impl InlinedSendKind {
    pub fn name(&self) -> &'static str {
        match self {
            InlinedSendKind::IfTrue => "ifTrue",
            InlinedSendKind::IfFalse => "ifFalse",
            InlinedSendKind::IfTrueIfFalse => "ifTrueIfFalse",
            InlinedSendKind::IfNilIfNotNil { .. } => "ifNilIfNotNil",
            InlinedSendKind::WhileTrue { .. } => "whileTrue",
            InlinedSendKind::WhileFalse { .. } => "whileFalse",
        }
    }
}

impl IrKind {
    /// Produced by the inliner
    pub fn is_inlined(&self) -> bool {
        matches!(
            self,
            IrKind::InlinedAssignment
                | IrKind::InlinedReturn
                | IrKind::InlinedNonLocalReturn
                | IrKind::InlinedClosure { .. }
                | IrKind::InlinedSequence
                | IrKind::InlinedSend(_)
        )
    }

    pub fn is_return(&self) -> bool {
        matches!(
            self,
            IrKind::Return { .. }
                | IrKind::BlockReturn
                | IrKind::NonLocalReturn { .. }
                | IrKind::InlinedReturn
                | IrKind::InlinedNonLocalReturn
        )
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            IrKind::Sequence | IrKind::BlockSequence | IrKind::InlinedSequence
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, IrKind::Variable(_))
    }

    /// Scope owned or targeted by this instruction
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            IrKind::Closure { scope, .. }
            | IrKind::Return { scope }
            | IrKind::NonLocalReturn { scope }
            | IrKind::TempDeclaration { scope, .. }
            | IrKind::InlinedClosure { scope } => Some(*scope),
            _ => None,
        }
    }

    /// Mnemonic used by the IR printer
    pub fn name(&self) -> &'static str {
        match self {
            IrKind::Method => "method",
            IrKind::Closure { .. } => "closure",
            IrKind::Sequence => "sequence",
            IrKind::BlockSequence => "block-sequence",
            IrKind::Assignment => "assign",
            IrKind::Return { .. } => "return",
            IrKind::BlockReturn => "block-return",
            IrKind::NonLocalReturn { .. } => "non-local-return",
            IrKind::Send { .. } => "send",
            IrKind::TempDeclaration { .. } => "temp",
            IrKind::Variable(_) => "var",
            IrKind::Value(_) => "value",
            IrKind::Verbatim(_) => "verbatim",
            IrKind::DynamicArray => "dynamic-array",
            IrKind::DynamicDictionary => "dynamic-dictionary",
            IrKind::InlinedAssignment => "inlined-assign",
            IrKind::InlinedReturn => "inlined-return",
            IrKind::InlinedNonLocalReturn => "inlined-non-local-return",
            IrKind::InlinedClosure { .. } => "inlined-closure",
            IrKind::InlinedSequence => "inlined-sequence",
            IrKind::InlinedSend(_) => "inlined-send",
        }
    }
}

/// A node in the IR arena
#[derive(Debug, Clone, PartialEq)]
pub struct IrNode {
    pub kind: IrKind,
    pub parent: Option<InstrId>,
    pub children: Vec<InstrId>,
}

impl IrNode {
    pub fn new(kind: IrKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}
