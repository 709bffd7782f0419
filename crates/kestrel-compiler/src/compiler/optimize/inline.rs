//! Closure inlining
//!
//! Walks the IR top-down and rewrites sends of the conditional and loop
//! selectors into [`IrKind::InlinedSend`] nodes whose arms are the argument
//! blocks spliced in as [`IrKind::InlinedClosure`]s. When the send is the
//! value of an assignment or a return, the assignment or return is inlined
//! with it and pushed down into the tail of every arm.
//!
//! Because parents are rewritten before their children, a `^` is reached only
//! after every block around it has had the chance to be inlined, which is
//! when it can be decided whether it still needs to unwind.

use log::trace;

use super::{is_conditional_selector, is_loop_selector, OptStats};
use crate::ast::{Literal, Span};
use crate::compiler::ir::{InlinedSendKind, InstrId, IrKind, IrMethod};
use crate::compiler::semantic::{ScopeId, ScopeVar};
use crate::error::{CompileError, CompileResult};

/// How the last statement of an inlined block is terminated
#[derive(Debug, Clone)]
enum Tail {
    /// The value is dropped
    Statement,
    /// The value is stored in the variable
    Assign(ScopeVar),
    /// The value is returned
    Return(ReturnKind),
}

#[derive(Debug, Clone, Copy)]
enum ReturnKind {
    Local(ScopeId),
    Block,
    NonLocal(ScopeId),
}

impl ReturnKind {
    fn instruction(self) -> IrKind {
        match self {
            ReturnKind::Local(scope) => IrKind::Return { scope },
            ReturnKind::Block => IrKind::BlockReturn,
            ReturnKind::NonLocal(scope) => IrKind::NonLocalReturn { scope },
        }
    }
}

/// Closure inliner for one method
pub struct Inliner<'m> {
    method: &'m mut IrMethod,
    stats: OptStats,
}

impl<'m> Inliner<'m> {
    pub fn new(method: &'m mut IrMethod) -> Self {
        Self {
            method,
            stats: OptStats::default(),
        }
    }

    pub fn run(mut self) -> CompileResult<OptStats> {
        let root = self.method.root();
        self.visit(root)?;
        Ok(self.stats)
    }

    fn visit(&mut self, id: InstrId) -> CompileResult<()> {
        match self.method.kind(id).clone() {
            IrKind::Assignment => {
                if let Some(value) = self.method.child(id, 1) {
                    if self.is_inlinable_conditional(value) {
                        return self.inline_assignment(id, value);
                    }
                }
            }
            IrKind::Return { scope } => {
                if let Some(value) = self.inlinable_value(id) {
                    return self.inline_return(
                        id,
                        value,
                        IrKind::InlinedReturn,
                        ReturnKind::Local(scope),
                    );
                }
            }
            IrKind::BlockReturn => {
                if let Some(value) = self.inlinable_value(id) {
                    return self.inline_return(id, value, IrKind::InlinedReturn, ReturnKind::Block);
                }
            }
            IrKind::NonLocalReturn { scope } => {
                if self.method.can_inline_non_local_returns(scope) {
                    return self.downgrade_non_local_return(id, scope);
                }
                if let Some(value) = self.inlinable_value(id) {
                    // The return moves into the arms, which register their own sites
                    self.method.scopes.remove_non_local_return(scope);
                    return self.inline_return(
                        id,
                        value,
                        IrKind::InlinedNonLocalReturn,
                        ReturnKind::NonLocal(scope),
                    );
                }
            }
            IrKind::Send {
                selector,
                class_send: None,
                ..
            } if self.is_statement(id) => {
                if is_conditional_selector(&selector) {
                    self.inline_send(id, Tail::Statement)?;
                    return Ok(());
                }
                if is_loop_selector(&selector) && self.loop_operands_are_blocks(id) {
                    return self.inline_loop(id);
                }
                if is_loop_selector(&selector) {
                    trace!(
                        "{}: #{} dispatched, operands are not literal blocks",
                        self.method.selector,
                        selector
                    );
                }
            }
            _ => {}
        }
        self.visit_children(id)
    }

    /// Children are visited by position since visiting may replace them
    fn visit_children(&mut self, id: InstrId) -> CompileResult<()> {
        let mut index = 0;
        while let Some(child) = self.method.child(id, index) {
            self.visit(child)?;
            index += 1;
        }
        Ok(())
    }

    fn is_statement(&self, id: InstrId) -> bool {
        self.method
            .parent(id)
            .map(|parent| self.method.kind(parent).is_sequence())
            .unwrap_or(false)
    }

    fn is_inlinable_conditional(&self, id: InstrId) -> bool {
        matches!(
            self.method.kind(id),
            IrKind::Send { selector, class_send: None, .. } if is_conditional_selector(selector)
        )
    }

    /// The value of a return, when it is an inlinable conditional
    fn inlinable_value(&self, ret: InstrId) -> Option<InstrId> {
        self.method
            .child(ret, 0)
            .filter(|value| self.is_inlinable_conditional(*value))
    }

    fn loop_operands_are_blocks(&self, send: InstrId) -> bool {
        self.method.children(send).iter().all(|operand| {
            matches!(
                self.method.kind(*operand),
                IrKind::Closure { arguments, .. } if arguments.is_empty()
            )
        })
    }

    fn inline_assignment(&mut self, assignment: InstrId, value: InstrId) -> CompileResult<()> {
        let target = self
            .method
            .child(assignment, 0)
            .ok_or_else(|| CompileError::internal("assignment without target"))?;
        let var = match self.method.kind(target) {
            IrKind::Variable(var) => var.clone(),
            other => {
                return Err(CompileError::internal(format!(
                    "assignment target is a {}",
                    other.name()
                )))
            }
        };

        let inlined = self.method.create(IrKind::InlinedAssignment);
        self.method.replace(assignment, inlined)?;
        self.method.append(inlined, target);
        self.method.append(inlined, value);
        self.inline_send(value, Tail::Assign(var))?;
        Ok(())
    }

    fn inline_return(
        &mut self,
        ret: InstrId,
        value: InstrId,
        kind: IrKind,
        return_kind: ReturnKind,
    ) -> CompileResult<()> {
        let inlined = self.method.create(kind);
        self.method.replace(ret, inlined)?;
        self.method.append(inlined, value);
        self.inline_send(value, Tail::Return(return_kind))?;
        Ok(())
    }

    /// Every block between the `^` and the method was inlined, so a plain
    /// return leaves the method directly.
    fn downgrade_non_local_return(&mut self, id: InstrId, scope: ScopeId) -> CompileResult<()> {
        self.method.scopes.remove_non_local_return(scope);
        let ret = self.method.create(IrKind::Return { scope });
        self.method.replace(id, ret)?;
        for child in self.method.children(id).to_vec() {
            self.method.append(ret, child);
        }

        self.stats.non_local_returns_downgraded += 1;
        trace!(
            "{}: non-local return in {} is now local",
            self.method.selector,
            scope
        );
        self.visit(ret)
    }

    /// Replace a conditional send with its inlined form
    fn inline_send(&mut self, send: InstrId, tail: Tail) -> CompileResult<InstrId> {
        let (selector, span) = match self.method.kind(send) {
            IrKind::Send { selector, span, .. } => (selector.clone(), *span),
            other => {
                return Err(CompileError::internal(format!(
                    "cannot inline a {}",
                    other.name()
                )))
            }
        };
        let operands = self.method.children(send).to_vec();
        let (receiver, arguments) = operands
            .split_first()
            .ok_or_else(|| CompileError::internal(format!("#{} without receiver", selector)))?;
        let template = match arguments.first() {
            Some(argument) => self.block_scope(&selector, span, *argument)?,
            None => return Err(CompileError::internal(format!("#{} without argument", selector))),
        };
        for argument in &arguments[1..] {
            self.block_scope(&selector, span, *argument)?;
        }
        let argument = |index: usize| {
            arguments.get(index).copied().ok_or_else(|| {
                CompileError::internal(format!("#{} is missing argument {}", selector, index + 1))
            })
        };

        let value_context = !matches!(tail, Tail::Statement);
        let (kind, arms) = match selector.as_str() {
            "ifTrue:" if value_context => {
                let otherwise = self.synthesize_block(template, IrKind::Value(Literal::Nil));
                (InlinedSendKind::IfTrueIfFalse, vec![argument(0)?, otherwise])
            }
            "ifTrue:" => (InlinedSendKind::IfTrue, vec![argument(0)?]),
            "ifFalse:" if value_context => {
                let otherwise = self.synthesize_block(template, IrKind::Value(Literal::Nil));
                (InlinedSendKind::IfTrueIfFalse, vec![otherwise, argument(0)?])
            }
            "ifFalse:" => (InlinedSendKind::IfFalse, vec![argument(0)?]),
            "ifTrue:ifFalse:" => (
                InlinedSendKind::IfTrueIfFalse,
                vec![argument(0)?, argument(1)?],
            ),
            "ifFalse:ifTrue:" => (
                InlinedSendKind::IfTrueIfFalse,
                vec![argument(1)?, argument(0)?],
            ),
            "ifNil:" | "ifNotNil:" | "ifNil:ifNotNil:" | "ifNotNil:ifNil:" => {
                let alias = self.method.new_alias();
                // A missing arm answers the receiver
                let fallback = if value_context {
                    IrKind::Variable(alias.clone())
                } else {
                    IrKind::Value(Literal::Nil)
                };
                let arms = match selector.as_str() {
                    "ifNil:" => vec![argument(0)?, self.synthesize_block(template, fallback)],
                    "ifNotNil:" => vec![self.synthesize_block(template, fallback), argument(0)?],
                    "ifNil:ifNotNil:" => vec![argument(0)?, argument(1)?],
                    _ => vec![argument(1)?, argument(0)?],
                };
                (
                    InlinedSendKind::IfNilIfNotNil {
                        receiver: alias.name,
                    },
                    arms,
                )
            }
            _ => {
                return Err(CompileError::internal(format!(
                    "#{} is not an inlinable selector",
                    selector
                )))
            }
        };

        trace!(
            "{}: inlining #{} as {}",
            self.method.selector,
            selector,
            kind.name()
        );
        let inlined = self.method.create(IrKind::InlinedSend(kind));
        self.method.replace(send, inlined)?;
        self.method.append(inlined, *receiver);

        let mut bodies = Vec::with_capacity(arms.len());
        for arm in arms {
            let body = self.inline_closure(arm, &tail)?;
            self.method.append(inlined, body);
            bodies.push(body);
        }
        self.stats.sends_inlined += 1;

        self.visit(*receiver)?;
        for body in bodies {
            self.visit_children(body)?;
        }
        Ok(inlined)
    }

    fn inline_loop(&mut self, send: InstrId) -> CompileResult<()> {
        let selector = match self.method.kind(send) {
            IrKind::Send { selector, .. } => selector.clone(),
            other => {
                return Err(CompileError::internal(format!(
                    "cannot inline a {} as a loop",
                    other.name()
                )))
            }
        };
        let operands = self.method.children(send).to_vec();
        let (condition, body) = match operands.as_slice() {
            [condition] => (*condition, None),
            [condition, body] => (*condition, Some(*body)),
            _ => {
                return Err(CompileError::internal(format!(
                    "#{} with {} operands",
                    selector,
                    operands.len()
                )))
            }
        };

        let alias = self.method.new_alias();
        let kind = if selector.starts_with("whileTrue") {
            InlinedSendKind::WhileTrue {
                condition: alias.name.clone(),
            }
        } else {
            InlinedSendKind::WhileFalse {
                condition: alias.name.clone(),
            }
        };
        trace!("{}: inlining loop #{}", self.method.selector, selector);

        let inlined = self.method.create(IrKind::InlinedSend(kind));
        self.method.replace(send, inlined)?;
        let condition = self.inline_closure(condition, &Tail::Assign(alias))?;
        self.method.append(inlined, condition);
        let body = match body {
            Some(body) => {
                let body = self.inline_closure(body, &Tail::Statement)?;
                self.method.append(inlined, body);
                Some(body)
            }
            None => None,
        };
        self.stats.loops_inlined += 1;

        self.visit_children(condition)?;
        if let Some(body) = body {
            self.visit_children(body)?;
        }
        Ok(())
    }

    /// Scope of a literal block argument. Anything else is rejected.
    fn block_scope(&self, selector: &str, span: Span, argument: InstrId) -> CompileResult<ScopeId> {
        match self.method.kind(argument) {
            IrKind::Closure { arguments, scope } if arguments.is_empty() => Ok(*scope),
            IrKind::Closure { .. } => Err(CompileError::Inlining {
                message: format!("block argument of '{}' should have no parameters", selector),
                span,
            }),
            _ => Err(CompileError::Inlining {
                message: format!("argument of '{}' should be a literal block", selector),
                span,
            }),
        }
    }

    /// A parameterless block answering `value`, sibling of the block in `template`
    fn synthesize_block(&mut self, template: ScopeId, value: IrKind) -> InstrId {
        let outer = self.method.scopes.get(template).outer.unwrap_or(template);
        let scope = self.method.scopes.push_block(outer);
        let closure = self.method.create(IrKind::Closure {
            arguments: Vec::new(),
            scope,
        });
        self.method.scopes.get_mut(scope).instruction = Some(closure);

        let sequence = self.method.add(closure, IrKind::BlockSequence);
        let ret = self.method.add(sequence, IrKind::BlockReturn);
        self.method.add(ret, value);
        closure
    }

    /// Splice a closure's temps and statements into an inlined closure and
    /// terminate its last statement according to `tail`
    fn inline_closure(&mut self, closure: InstrId, tail: &Tail) -> CompileResult<InstrId> {
        let scope = match self.method.kind(closure) {
            IrKind::Closure { scope, .. } => *scope,
            other => {
                return Err(CompileError::internal(format!(
                    "expected a closure, got a {}",
                    other.name()
                )))
            }
        };
        let inlined = self.method.create(IrKind::InlinedClosure { scope });
        self.method.scopes.get_mut(scope).instruction = Some(inlined);

        let children = self.method.children(closure).to_vec();
        let (body, temps) = children
            .split_last()
            .ok_or_else(|| CompileError::internal("closure without body"))?;
        for temp in temps {
            self.method.append(inlined, *temp);
        }
        let sequence = self.method.add(inlined, IrKind::InlinedSequence);
        for statement in self.method.children(*body).to_vec() {
            self.method.append(sequence, statement);
        }

        let last = match self.method.last_child(sequence) {
            Some(last) if matches!(self.method.kind(last), IrKind::BlockReturn) => {
                let value = self
                    .method
                    .child(last, 0)
                    .ok_or_else(|| CompileError::internal("block return without value"))?;
                self.method.replace(last, value)?;
                value
            }
            Some(last) => last,
            None => self.method.add(sequence, IrKind::Value(Literal::Nil)),
        };
        self.terminate(last, tail)?;

        Ok(inlined)
    }

    fn terminate(&mut self, last: InstrId, tail: &Tail) -> CompileResult<()> {
        if self.method.kind(last).is_return() {
            return Ok(());
        }

        match tail {
            Tail::Statement => {
                if matches!(self.method.kind(last), IrKind::Variable(_) | IrKind::Value(_)) {
                    self.method.remove(last);
                }
            }
            Tail::Assign(var) => {
                let assignment = self.method.create(IrKind::Assignment);
                self.method.replace(last, assignment)?;
                self.method.add(assignment, IrKind::Variable(var.clone()));
                self.method.append(assignment, last);
            }
            Tail::Return(kind) => {
                let ret = self.method.create(kind.instruction());
                self.method.replace(last, ret)?;
                self.method.append(ret, last);
                if let ReturnKind::NonLocal(scope) = kind {
                    self.method.scopes.add_non_local_return(*scope);
                }
            }
        }
        Ok(())
    }
}
