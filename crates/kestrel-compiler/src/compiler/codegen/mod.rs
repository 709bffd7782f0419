//! JavaScript code generation
//!
//! # Pipeline
//!
//! ```text
//! IrMethod → JsEmitter (+ EmitStrategy) → JsStream → method record source
//! ```
//!
//! The emitter renders sends, closures and values. What it does with the
//! nodes produced by the inliner is up to the strategy: the plain strategy
//! refuses them (its input never went through the inliner), the inlining
//! strategy renders them as `if`/`while` constructs.

mod emit;
mod inlined;
pub mod js;
mod stream;

pub use emit::JsEmitter;
pub use inlined::InliningStrategy;
pub use stream::JsStream;

use crate::ast::ClassContext;
use crate::compiler::ir::{InstrId, IrMethod};
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};

/// Rendering of the nodes the inliner creates
pub trait EmitStrategy {
    fn name(&self) -> &'static str;

    /// Render an inlined statement: an inlined send, or an assignment or
    /// return inlined together with one
    fn emit_inlined(
        &self,
        emitter: &JsEmitter<'_>,
        id: InstrId,
        out: &mut JsStream,
    ) -> CompileResult<()>;
}

/// Every send is a dispatch and every block a function
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStrategy;

impl EmitStrategy for PlainStrategy {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn emit_inlined(
        &self,
        emitter: &JsEmitter<'_>,
        id: InstrId,
        _out: &mut JsStream,
    ) -> CompileResult<()> {
        Err(CompileError::internal(format!(
            "plain renderer cannot emit {}",
            emitter.method().kind(id).name()
        )))
    }
}

/// Render a method record with the strategy matching `config.inline`
pub fn generate(
    method: &IrMethod,
    class: &ClassContext,
    config: &CompilerConfig,
) -> CompileResult<String> {
    let strategy: &dyn EmitStrategy = if config.inline {
        &InliningStrategy
    } else {
        &PlainStrategy
    };
    log::debug!("{}: emitting with the {} renderer", method.selector, strategy.name());
    JsEmitter::new(method, class, config, strategy).emit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MethodNode, Node, SequenceNode};
    use crate::compiler::lower::translate;
    use crate::compiler::optimize::Optimizer;
    use crate::compiler::semantic::SemanticAnalyzer;
    use crate::globals::NoGlobals;

    fn render(node: MethodNode, config: &CompilerConfig) -> String {
        let class = ClassContext::new("Foo")
            .with_superclass("Object")
            .with_instance_variables(["count"]);
        let mut node = node;
        let analysis = SemanticAnalyzer::new(&class, &config.host_globals, &NoGlobals)
            .analyze(&mut node)
            .unwrap();
        let mut method = translate(&node, analysis, &class).unwrap();
        if config.inline {
            Optimizer::default().optimize(&mut method).unwrap();
        }
        generate(&method, &class, config).unwrap()
    }

    fn no_context() -> CompilerConfig {
        CompilerConfig {
            context: false,
            ..CompilerConfig::default()
        }
    }

    #[test]
    fn test_method_record() {
        let js = render(
            MethodNode::new(
                "count",
                vec![],
                SequenceNode::statements(vec![Node::returning(Node::variable("count"))]),
            )
            .with_source("count ^ count"),
            &CompilerConfig::default(),
        );
        assert_eq!(
            js,
            "smalltalk.method({\n\
             selector: \"count\",\n\
             source: \"count ^ count\",\n\
             fn: function(){\n\
             var self=this;\n\
             return smalltalk.withContext(function($ctx1) {\n\
             return self[\"@count\"];\n\
             }, function($ctx1) {$ctx1.fill(self,\"count\",{},smalltalk.Foo)});\n\
             },\n\
             args: [],\n\
             messageSends: [],\n\
             referencedClasses: [],\n\
             superSends: []\n\
             })"
        );
    }

    #[test]
    fn test_super_send_passes_superclass() {
        let js = render(
            MethodNode::new(
                "initialize",
                vec![],
                SequenceNode::statements(vec![Node::send(
                    Node::variable("super"),
                    "initialize",
                    vec![],
                )]),
            ),
            &no_context(),
        );
        assert!(
            js.contains("smalltalk.send(self,\"_initialize\",[],smalltalk.Object);\n"),
            "{}",
            js
        );
        assert!(js.contains("superSends: [\"initialize\"]"));
    }

    #[test]
    fn test_plain_renderer_dispatches_conditionals() {
        let config = CompilerConfig {
            inline: false,
            ..no_context()
        };
        let js = render(
            MethodNode::new(
                "foo",
                vec![],
                SequenceNode::statements(vec![Node::send(
                    Node::variable("count"),
                    "ifTrue:",
                    vec![Node::block(vec![], SequenceNode::statements(vec![Node::integer(1)]))],
                )]),
            ),
            &config,
        );
        assert!(
            js.contains("smalltalk.send($1,\"_ifTrue_\",[(function(){\nreturn 1;\n})]);\n"),
            "{}",
            js
        );
        assert!(!js.contains("assert"));
    }

    #[test]
    fn test_block_context_refers_to_outer() {
        let js = render(
            MethodNode::new(
                "foo",
                vec![],
                SequenceNode::statements(vec![Node::send(
                    Node::variable("self"),
                    "do:",
                    vec![Node::block(
                        vec!["each".into()],
                        SequenceNode::statements(vec![Node::variable("each")]),
                    )],
                )]),
            ),
            &CompilerConfig::default(),
        );
        let expected = "(function(each){\n\
                        return smalltalk.withContext(function($ctx2) {\n\
                        return each;\n\
                        }, function($ctx2) {$ctx2.fillBlock({each:each},$ctx1)});\n\
                        })";
        assert!(js.contains(expected), "{}", js);
    }
}
