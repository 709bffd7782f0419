//! Expression lowering

use super::Translator;
use crate::ast::{
    AssignmentNode, BlockNode, CascadeNode, DynamicArrayNode, DynamicDictionaryNode, MessageNode,
    Node, NodeKind, ReturnNode, SendNode, Span, VariableNode,
};
use crate::compiler::ir::{InstrId, IrKind};
use crate::error::{CompileError, CompileResult};

impl<'a> Translator<'a> {
    /// Lower `node` to a detached instruction. Statements it depends on are
    /// appended to the current sequence first.
    pub(super) fn visit(&mut self, node: &Node) -> CompileResult<InstrId> {
        match &node.kind {
            NodeKind::Block(block) => self.visit_block(block),
            NodeKind::Send(send) => self.visit_send(send, node.span),
            NodeKind::Cascade(cascade) => self.visit_cascade(cascade, node.span),
            NodeKind::Assignment(assignment) => self.visit_assignment(assignment),
            NodeKind::Return(ret) => self.visit_return(ret),
            NodeKind::Variable(var) | NodeKind::ClassReference(var) => self.visit_variable(var),
            NodeKind::DynamicArray(array) => self.visit_dynamic_array(array),
            NodeKind::DynamicDictionary(dict) => self.visit_dynamic_dictionary(dict),
            NodeKind::Literal(lit) => Ok(self.method.create(IrKind::Value(lit.value.clone()))),
            NodeKind::Verbatim(verbatim) => {
                Ok(self.method.create(IrKind::Verbatim(verbatim.source.clone())))
            }
        }
    }

    fn visit_variable(&mut self, var: &VariableNode) -> CompileResult<InstrId> {
        let binding = var.binding.clone().ok_or_else(|| {
            CompileError::internal(format!("variable '{}' was not bound", var.name))
        })?;
        Ok(self.method.create(IrKind::Variable(binding)))
    }

    /// A block becomes a closure whose last statement yields the block value
    fn visit_block(&mut self, block: &BlockNode) -> CompileResult<InstrId> {
        let scope = block
            .scope
            .ok_or_else(|| CompileError::internal("block was not analyzed"))?;
        let closure = self.method.create(IrKind::Closure {
            arguments: block.parameters.clone(),
            scope,
        });
        self.method.scopes.get_mut(scope).instruction = Some(closure);
        self.add_temp_declarations(closure, scope);

        let sequence = self.method.add(closure, IrKind::BlockSequence);
        self.with_sequence(sequence, |t| match block.body.statements.split_last() {
            None => {
                let ret = t.method.add(sequence, IrKind::BlockReturn);
                let nil = t.nil();
                t.method.append(ret, nil);
                Ok(())
            }
            Some((last, rest)) => {
                for statement in rest {
                    t.translate_statement(statement)?;
                }
                let value = t.visit(last)?;
                if last.is_return() {
                    t.method.append(sequence, value);
                } else {
                    let ret = t.method.add(sequence, IrKind::BlockReturn);
                    t.method.append(ret, value);
                }
                Ok(())
            }
        })?;

        Ok(closure)
    }

    fn visit_send(&mut self, send: &SendNode, span: Span) -> CompileResult<InstrId> {
        let mut operands: Vec<&Node> = Vec::with_capacity(send.message.arguments.len() + 1);
        operands.push(&send.receiver);
        operands.extend(send.message.arguments.iter());

        let values = self.alias_temporally(&operands)?;
        let instruction = self.create_send(&send.message, span);
        for value in values {
            self.method.append(instruction, value);
        }
        Ok(instruction)
    }

    fn create_send(&mut self, message: &MessageNode, span: Span) -> InstrId {
        let class_send = if message.super_send {
            Some(
                self.class
                    .superclass
                    .clone()
                    .unwrap_or_else(|| "nil".to_string()),
            )
        } else {
            None
        };
        self.method.create(IrKind::Send {
            selector: message.selector.clone(),
            class_send,
            index: message.index,
            span,
        })
    }

    /// The receiver is evaluated once; every message but the last becomes a
    /// statement and the last one yields the cascade value.
    fn visit_cascade(&mut self, cascade: &CascadeNode, span: Span) -> CompileResult<InstrId> {
        let receiver_alias = if cascade.receiver.is_immutable() {
            None
        } else {
            Some(self.alias(&cascade.receiver)?)
        };

        let count = cascade.messages.len();
        let mut last = None;
        for (i, message) in cascade.messages.iter().enumerate() {
            let receiver = match receiver_alias {
                Some(alias) => self.method.copy(alias),
                None => self.visit(&cascade.receiver)?,
            };
            let arguments: Vec<&Node> = message.arguments.iter().collect();
            let values = self.alias_temporally(&arguments)?;

            let send = self.create_send(message, span);
            self.method.append(send, receiver);
            for value in values {
                self.method.append(send, value);
            }

            if i + 1 < count {
                self.method.append(self.sequence, send);
            } else {
                last = Some(send);
            }
        }

        match last {
            Some(send) => Ok(self.alias_instruction(send)),
            None => Err(CompileError::internal("cascade without messages")),
        }
    }

    /// The assignment is hoisted into the sequence; its value is the target
    fn visit_assignment(&mut self, assignment: &AssignmentNode) -> CompileResult<InstrId> {
        let value = self.visit(&assignment.value)?;
        let target = self.visit(&assignment.target)?;

        let instruction = self.method.create(IrKind::Assignment);
        self.method.append(instruction, target);
        self.method.append(instruction, value);
        self.method.append(self.sequence, instruction);

        Ok(self.method.copy(target))
    }

    /// The value is not aliased so an inlinable send stays directly under
    /// the return and can be inlined together with it.
    fn visit_return(&mut self, ret: &ReturnNode) -> CompileResult<InstrId> {
        let scope = ret
            .scope
            .ok_or_else(|| CompileError::internal("return was not analyzed"))?;
        let value = self.visit(&ret.value)?;

        let kind = if self.method.scopes.get(scope).is_method_scope() {
            IrKind::Return { scope }
        } else {
            IrKind::NonLocalReturn { scope }
        };
        let instruction = self.method.create(kind);
        self.method.append(instruction, value);
        Ok(instruction)
    }

    fn visit_dynamic_array(&mut self, array: &DynamicArrayNode) -> CompileResult<InstrId> {
        let elements: Vec<&Node> = array.elements.iter().collect();
        let values = self.alias_temporally(&elements)?;

        let instruction = self.method.create(IrKind::DynamicArray);
        for value in values {
            self.method.append(instruction, value);
        }
        Ok(instruction)
    }

    fn visit_dynamic_dictionary(&mut self, dict: &DynamicDictionaryNode) -> CompileResult<InstrId> {
        let elements: Vec<&Node> = dict
            .entries
            .iter()
            .flat_map(|(key, value)| [key, value])
            .collect();
        let values = self.alias_temporally(&elements)?;

        let instruction = self.method.create(IrKind::DynamicDictionary);
        for value in values {
            self.method.append(instruction, value);
        }
        Ok(instruction)
    }
}
