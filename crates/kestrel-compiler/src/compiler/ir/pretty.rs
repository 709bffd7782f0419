//! Pretty-printing for IR
//!
//! Provides an indented, human-readable dump of an IR tree for debugging.

use super::instr::{InlinedSendKind, InstrId, IrKind};
use super::method::IrMethod;
use std::fmt::Write;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for IrMethod {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        writeln!(output, "; method {}", self.selector).unwrap();
        if !self.arguments.is_empty() {
            writeln!(output, ";   args: {}", self.arguments.join(", ")).unwrap();
        }
        if !self.internal_variables().is_empty() {
            writeln!(output, ";   aliases: {}", self.internal_variables().join(", ")).unwrap();
        }
        if !self.message_sends.is_empty() {
            let sends: Vec<&str> = self.message_sends.iter().map(String::as_str).collect();
            writeln!(output, ";   sends: {}", sends.join(", ")).unwrap();
        }
        if self.has_non_local_return() {
            writeln!(output, ";   non-local return").unwrap();
        }

        write_node(&mut output, self, self.root(), 0);
        output
    }
}

fn write_node(output: &mut String, method: &IrMethod, id: InstrId, depth: usize) {
    let kind = method.kind(id);
    write!(output, "{:indent$}{}", "", kind.name(), indent = depth * 2).unwrap();

    match kind {
        IrKind::Method => write!(output, " {}", method.selector).unwrap(),
        IrKind::Closure { arguments, scope } => {
            write!(output, " [{}] {}", arguments.join(" "), scope).unwrap()
        }
        IrKind::Return { scope } | IrKind::NonLocalReturn { scope } => {
            write!(output, " {}", scope).unwrap()
        }
        IrKind::Send {
            selector,
            class_send,
            index,
            ..
        } => {
            write!(output, " #{} [{}]", selector, index).unwrap();
            if let Some(class) = class_send {
                write!(output, " super {}", class).unwrap();
            }
        }
        IrKind::TempDeclaration { name, scope } => write!(output, " {} {}", name, scope).unwrap(),
        IrKind::Variable(var) => write!(output, " {}", var).unwrap(),
        IrKind::Value(literal) => write!(output, " {} {}", literal.kind_name(), literal).unwrap(),
        IrKind::Verbatim(source) => write!(output, " {:?}", source).unwrap(),
        IrKind::InlinedClosure { scope } => write!(output, " {}", scope).unwrap(),
        IrKind::InlinedSend(inlined) => {
            write!(output, " {}", inlined.name()).unwrap();
            match inlined {
                InlinedSendKind::IfNilIfNotNil { receiver } => {
                    write!(output, " ({})", receiver).unwrap()
                }
                InlinedSendKind::WhileTrue { condition }
                | InlinedSendKind::WhileFalse { condition } => {
                    write!(output, " ({})", condition).unwrap()
                }
                _ => {}
            }
        }
        _ => {}
    }
    writeln!(output).unwrap();

    for child in method.children(id) {
        write_node(output, method, *child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassContext, Literal, MethodNode, SequenceNode};
    use crate::compiler::semantic::{ScopeVar, SemanticAnalyzer};
    use crate::globals::NoGlobals;

    #[test]
    fn test_pretty_print_nesting() {
        let class = ClassContext::new("Foo");
        let mut node = MethodNode::new("answer", vec![], SequenceNode::default());
        let analysis = SemanticAnalyzer::new(&class, &[], &NoGlobals)
            .analyze(&mut node)
            .unwrap();
        let mut method = IrMethod::new("answer", "answer ^ 42", vec![], analysis);

        let seq = method.add(method.root(), IrKind::Sequence);
        let scope = method.scope;
        let ret = method.add(seq, IrKind::Return { scope });
        method.add(ret, IrKind::Value(Literal::Integer(42)));
        method.add(seq, IrKind::Variable(ScopeVar::pseudo("self")));

        let text = method.pretty_print();
        assert!(text.starts_with("; method answer\n"));
        assert!(
            text.contains("method answer\n  sequence\n    return scope0\n      value integer 42\n")
        );
        assert!(text.contains("    var pseudo:self\n"));
    }
}
