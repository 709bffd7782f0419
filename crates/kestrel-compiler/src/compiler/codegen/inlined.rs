//! Rendering of inlined sends as native control flow

use super::emit::JsEmitter;
use super::js::safe_identifier;
use super::stream::JsStream;
use super::EmitStrategy;
use crate::compiler::ir::{InlinedSendKind, InstrId, IrKind};
use crate::error::{CompileError, CompileResult};

/// Renderer for methods that went through the inliner
#[derive(Debug, Clone, Copy, Default)]
pub struct InliningStrategy;

impl EmitStrategy for InliningStrategy {
    fn name(&self) -> &'static str {
        "inlining"
    }

    fn emit_inlined(
        &self,
        emitter: &JsEmitter<'_>,
        id: InstrId,
        out: &mut JsStream,
    ) -> CompileResult<()> {
        match emitter.method().kind(id) {
            // The arms assign or return themselves
            IrKind::InlinedAssignment => self.emit_send(emitter, emitter.operand(id, 1)?, out),
            IrKind::InlinedReturn | IrKind::InlinedNonLocalReturn => {
                self.emit_send(emitter, emitter.operand(id, 0)?, out)
            }
            IrKind::InlinedSend(_) => self.emit_send(emitter, id, out),
            other => Err(CompileError::internal(format!(
                "{} outside of an inlined send",
                other.name()
            ))),
        }
    }
}

impl InliningStrategy {
    fn emit_send(
        &self,
        emitter: &JsEmitter<'_>,
        id: InstrId,
        out: &mut JsStream,
    ) -> CompileResult<()> {
        let kind = match emitter.method().kind(id) {
            IrKind::InlinedSend(kind) => kind,
            other => {
                return Err(CompileError::internal(format!(
                    "expected an inlined send, got a {}",
                    other.name()
                )))
            }
        };
        let runtime = emitter.runtime();

        match kind {
            InlinedSendKind::IfTrue | InlinedSendKind::IfFalse => {
                let receiver = emitter.render_value(emitter.operand(id, 0)?)?;
                let arm = emitter.operand(id, 1)?;
                let negation = if matches!(kind, InlinedSendKind::IfFalse) { "!" } else { "" };
                let condition = format!("{}{}.assert({})", negation, runtime, receiver);
                out.put_if(&condition, |out| self.emit_arm(emitter, arm, out))
            }
            InlinedSendKind::IfTrueIfFalse => {
                let receiver = emitter.render_value(emitter.operand(id, 0)?)?;
                let then = emitter.operand(id, 1)?;
                let otherwise = emitter.operand(id, 2)?;
                let condition = format!("{}.assert({})", runtime, receiver);
                if self.is_empty_arm(emitter, otherwise) {
                    out.put_if(&condition, |out| self.emit_arm(emitter, then, out))
                } else {
                    out.put_if_else(
                        &condition,
                        |out| self.emit_arm(emitter, then, out),
                        |out| self.emit_arm(emitter, otherwise, out),
                    )
                }
            }
            InlinedSendKind::IfNilIfNotNil { receiver: alias } => {
                let receiver = emitter.render_value(emitter.operand(id, 0)?)?;
                let if_nil = emitter.operand(id, 1)?;
                let if_not_nil = emitter.operand(id, 2)?;
                let test = format!("({} = {}) == nil || {} == null", alias, receiver, alias);

                if self.is_empty_arm(emitter, if_not_nil) {
                    out.put_if(&test, |out| self.emit_arm(emitter, if_nil, out))
                } else if self.is_empty_arm(emitter, if_nil) {
                    out.put_if(&format!("!({})", test), |out| {
                        self.emit_arm(emitter, if_not_nil, out)
                    })
                } else {
                    out.put_if_else(
                        &test,
                        |out| self.emit_arm(emitter, if_nil, out),
                        |out| self.emit_arm(emitter, if_not_nil, out),
                    )
                }
            }
            InlinedSendKind::WhileTrue { condition }
            | InlinedSendKind::WhileFalse { condition } => {
                let test = emitter.operand(id, 0)?;
                let body = emitter.method().child(id, 1);
                let exit = if matches!(kind, InlinedSendKind::WhileTrue { .. }) {
                    format!("if(!{}.assert({})) break;", runtime, condition)
                } else {
                    format!("if({}.assert({})) break;", runtime, condition)
                };
                out.put_loop(|out| {
                    self.emit_arm(emitter, test, out)?;
                    out.put_line(&exit);
                    match body {
                        Some(body) => self.emit_arm(emitter, body, out),
                        None => Ok(()),
                    }
                })
            }
        }
    }

    /// Temporaries of an inlined block start from `nil` on every entry
    fn emit_arm(
        &self,
        emitter: &JsEmitter<'_>,
        arm: InstrId,
        out: &mut JsStream,
    ) -> CompileResult<()> {
        let method = emitter.method();
        let mut temps = Vec::new();
        let mut sequence = None;
        for child in method.children(arm) {
            match method.kind(*child) {
                IrKind::TempDeclaration { name, .. } => temps.push(safe_identifier(name)),
                IrKind::InlinedSequence => sequence = Some(*child),
                other => {
                    return Err(CompileError::internal(format!(
                        "unexpected {} in an inlined block",
                        other.name()
                    )))
                }
            }
        }
        let sequence =
            sequence.ok_or_else(|| CompileError::internal("inlined block without body"))?;

        out.put_temp_resets(&temps);
        emitter.emit_sequence(sequence, out)
    }

    fn is_empty_arm(&self, emitter: &JsEmitter<'_>, arm: InstrId) -> bool {
        let method = emitter.method();
        method.children(arm).iter().all(|child| match method.kind(*child) {
            IrKind::InlinedSequence => method.children(*child).is_empty(),
            _ => false,
        })
    }
}
