//! IR to JavaScript emitter
//!
//! Renders everything that exists without inlining: the method record, the
//! context instrumentation, closures, sends and values. Inlined nodes are
//! handed to the [`EmitStrategy`] the emitter was built with.

use std::collections::BTreeSet;

use super::js::{
    class_context_path, class_path, literal, mangle_selector, safe_identifier, string_array,
    string_literal,
};
use super::stream::JsStream;
use super::EmitStrategy;
use crate::ast::ClassContext;
use crate::compiler::ir::{InlinedSendKind, InstrId, IrKind, IrMethod};
use crate::compiler::semantic::{ScopeVar, VarKind};
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};

pub struct JsEmitter<'a> {
    method: &'a IrMethod,
    class: &'a ClassContext,
    config: &'a CompilerConfig,
    strategy: &'a dyn EmitStrategy,
}

/// Variables declared by one JavaScript function
struct FunctionLocals {
    temps: Vec<String>,
    aliases: Vec<String>,
}

impl<'a> JsEmitter<'a> {
    pub fn new(
        method: &'a IrMethod,
        class: &'a ClassContext,
        config: &'a CompilerConfig,
        strategy: &'a dyn EmitStrategy,
    ) -> Self {
        Self {
            method,
            class,
            config,
            strategy,
        }
    }

    pub fn method(&self) -> &IrMethod {
        self.method
    }

    pub fn runtime(&self) -> &str {
        &self.config.runtime
    }

    /// The method record, `<rt>.method({...})`
    pub fn emit(&self) -> CompileResult<String> {
        let mut out = JsStream::new();
        self.emit_method(&mut out)?;
        Ok(out.into_string())
    }

    fn emit_method(&self, out: &mut JsStream) -> CompileResult<()> {
        let method = self.method;
        let arguments: Vec<String> = method.arguments.iter().map(|a| safe_identifier(a)).collect();

        out.put(self.runtime());
        out.put(".method({\n");
        out.put(&format!("selector: {},\n", string_literal(&method.selector)));
        out.put(&format!("source: {},\n", string_literal(&method.source)));
        out.put("fn: ");
        out.put_function(&arguments, |out| self.emit_method_body(&arguments, out))?;
        out.put(",\n");
        out.put(&format!("args: {},\n", string_array(&method.arguments)));
        out.put(&format!("messageSends: {},\n", string_array(&method.message_sends)));
        out.put(&format!(
            "referencedClasses: {},\n",
            string_array(&method.class_references)
        ));
        out.put(&format!("superSends: {}\n", string_array(&method.super_sends)));
        out.put("})");
        Ok(())
    }

    fn emit_method_body(&self, arguments: &[String], out: &mut JsStream) -> CompileResult<()> {
        let root = self.method.root();
        let sequence = self
            .method
            .last_child(root)
            .ok_or_else(|| CompileError::internal("method without body"))?;
        let locals = self.function_locals(root);

        out.put_line("var self=this;");
        out.put_temps(&locals.temps);

        let body = |out: &mut JsStream| -> CompileResult<()> {
            out.put_vars(&locals.aliases);
            if self.method.has_non_local_return() {
                out.put_non_local_return_handling(|out| self.emit_sequence(sequence, out))
            } else {
                self.emit_sequence(sequence, out)
            }
        };

        if self.config.context {
            let fill = format!(
                "fill(self,{},{},{})",
                string_literal(&self.method.selector),
                locals_object(arguments, &locals.temps),
                class_context_path(self.runtime(), self.class)
            );
            let context = self.method.context_alias(self.method.scope);
            out.put_context_for(self.runtime(), &context, &fill, body)?;
            out.put(";\n");
            Ok(())
        } else {
            body(out)
        }
    }

    fn emit_closure(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        let (arguments, scope) = match self.method.kind(id) {
            IrKind::Closure { arguments, scope } => (arguments, *scope),
            other => {
                return Err(CompileError::internal(format!(
                    "expected a closure, got a {}",
                    other.name()
                )))
            }
        };
        let arguments: Vec<String> = arguments.iter().map(|a| safe_identifier(a)).collect();
        let sequence = self
            .method
            .last_child(id)
            .ok_or_else(|| CompileError::internal("closure without body"))?;
        let locals = self.function_locals(id);

        out.put("(");
        out.put_function(&arguments, |out| {
            out.put_temps(&locals.temps);
            if !self.config.context {
                out.put_vars(&locals.aliases);
                return self.emit_sequence(sequence, out);
            }

            let outer = self
                .method
                .scopes
                .get(scope)
                .outer
                .ok_or_else(|| {
                    CompileError::internal(format!("block {} has no outer scope", scope))
                })?;
            let fill = format!(
                "fillBlock({},{})",
                locals_object(&arguments, &locals.temps),
                self.method.context_alias(outer)
            );
            let context = self.method.context_alias(scope);
            out.put_context_for(self.runtime(), &context, &fill, |out| {
                out.put_vars(&locals.aliases);
                self.emit_sequence(sequence, out)
            })?;
            out.put(";\n");
            Ok(())
        })?;
        out.put(")");
        Ok(())
    }

    pub fn emit_sequence(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        for statement in self.method.children(id) {
            self.emit_statement(*statement, out)?;
        }
        Ok(())
    }

    fn emit_statement(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        let kind = self.method.kind(id);
        if kind.is_inlined() {
            return out.put_statement(|out| self.strategy.emit_inlined(self, id, out));
        }

        match kind {
            IrKind::Assignment => out.put_statement(|out| self.emit_assignment(id, out)),
            IrKind::Return { .. } | IrKind::BlockReturn => out.put_statement(|out| {
                out.put_return(|out| self.emit_value(self.operand(id, 0)?, out))
            }),
            IrKind::NonLocalReturn { .. } => out.put_statement(|out| {
                out.put_non_local_return(|out| self.emit_value(self.operand(id, 0)?, out))
            }),
            IrKind::TempDeclaration { .. } => Ok(()),
            _ => out.put_statement(|out| self.emit_value(id, out)),
        }
    }

    pub fn emit_assignment(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        let target = match self.method.kind(self.operand(id, 0)?) {
            IrKind::Variable(var) => self.variable(var),
            other => {
                return Err(CompileError::internal(format!(
                    "cannot assign to a {}",
                    other.name()
                )))
            }
        };
        out.put_assignment(&target, |out| self.emit_value(self.operand(id, 1)?, out))
    }

    /// Render an expression
    pub fn emit_value(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        match self.method.kind(id) {
            IrKind::Variable(var) => {
                out.put(&self.variable(var));
                Ok(())
            }
            IrKind::Value(value) => {
                out.put(&literal(self.runtime(), value));
                Ok(())
            }
            IrKind::Verbatim(source) => {
                out.put(source);
                Ok(())
            }
            IrKind::Send { .. } => self.emit_send(id, out),
            IrKind::Closure { .. } => self.emit_closure(id, out),
            IrKind::DynamicArray => {
                out.put("[");
                out.put_list(self.method.children(id), |out, element| {
                    self.emit_value(*element, out)
                })?;
                out.put("]");
                Ok(())
            }
            IrKind::DynamicDictionary => {
                out.put(self.runtime());
                out.put(".HashedCollection._newFromPairs_([");
                out.put_list(self.method.children(id), |out, element| {
                    self.emit_value(*element, out)
                })?;
                out.put("])");
                Ok(())
            }
            other => Err(CompileError::internal(format!(
                "{} cannot be used as a value",
                other.name()
            ))),
        }
    }

    /// Render an expression into a string
    pub fn render_value(&self, id: InstrId) -> CompileResult<String> {
        let mut out = JsStream::new();
        self.emit_value(id, &mut out)?;
        Ok(out.into_string())
    }

    fn emit_send(&self, id: InstrId, out: &mut JsStream) -> CompileResult<()> {
        let (selector, class_send) = match self.method.kind(id) {
            IrKind::Send {
                selector,
                class_send,
                ..
            } => (selector, class_send),
            other => {
                return Err(CompileError::internal(format!(
                    "expected a send, got a {}",
                    other.name()
                )))
            }
        };
        let (receiver, arguments) = self
            .method
            .children(id)
            .split_first()
            .ok_or_else(|| CompileError::internal(format!("#{} without receiver", selector)))?;

        out.put(self.runtime());
        out.put(".send(");
        self.emit_value(*receiver, out)?;
        out.put(",");
        out.put(&string_literal(&mangle_selector(selector)));
        out.put(",[");
        out.put_list(arguments, |out, argument| self.emit_value(*argument, out))?;
        out.put("]");
        if let Some(class) = class_send {
            out.put(",");
            if class == "nil" {
                out.put("nil");
            } else {
                out.put(&class_path(self.runtime(), class, self.class.metaclass));
            }
        }
        out.put(")");
        Ok(())
    }

    /// JavaScript expression reading `var`
    pub fn variable(&self, var: &ScopeVar) -> String {
        match var.kind {
            VarKind::Instance => format!("self[\"@{}\"]", var.name),
            VarKind::ClassRef => format!("({}.{} || {})", self.runtime(), var.name, var.name),
            VarKind::Pseudo => match var.name.as_str() {
                "thisContext" => format!("{}.getThisContext()", self.runtime()),
                "super" => "self".to_string(),
                name => name.to_string(),
            },
            VarKind::Alias => var.name.clone(),
            VarKind::Arg | VarKind::Temp | VarKind::Unknown => safe_identifier(&var.name),
        }
    }

    pub fn operand(&self, id: InstrId, index: usize) -> CompileResult<InstrId> {
        self.method.child(id, index).ok_or_else(|| {
            CompileError::internal(format!(
                "{} is missing operand {}",
                self.method.kind(id).name(),
                index
            ))
        })
    }

    /// Temporaries and aliases living in the function rendered for `id`:
    /// its own, plus those of every block inlined into it.
    fn function_locals(&self, id: InstrId) -> FunctionLocals {
        let mut temps: Vec<String> = Vec::new();
        let mut aliases = BTreeSet::new();
        let mut stack: Vec<InstrId> = self.method.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            match self.method.kind(current) {
                IrKind::Closure { .. } => continue,
                IrKind::TempDeclaration { name, .. } => {
                    let name = safe_identifier(name);
                    if !temps.contains(&name) {
                        temps.push(name);
                    }
                }
                IrKind::Variable(var) if var.kind == VarKind::Alias => {
                    aliases.insert(var.name.clone());
                }
                IrKind::InlinedSend(InlinedSendKind::IfNilIfNotNil { receiver }) => {
                    aliases.insert(receiver.clone());
                }
                IrKind::InlinedSend(
                    InlinedSendKind::WhileTrue { condition }
                    | InlinedSendKind::WhileFalse { condition },
                ) => {
                    aliases.insert(condition.clone());
                }
                _ => {}
            }
            stack.extend(self.method.children(current).iter().rev());
        }

        let aliases = self
            .method
            .internal_variables()
            .iter()
            .filter(|name| aliases.contains(*name))
            .cloned()
            .collect();
        FunctionLocals { temps, aliases }
    }
}

/// `{a:a,t:t}`
fn locals_object(arguments: &[String], temps: &[String]) -> String {
    let entries: Vec<String> = arguments
        .iter()
        .chain(temps.iter())
        .map(|name| format!("{}:{}", name, name))
        .collect();
    format!("{{{}}}", entries.join(","))
}
