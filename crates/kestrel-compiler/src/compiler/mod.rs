//! Compilation pipeline
//!
//! ```text
//! MethodNode ─ semantic ─▶ annotated AST ─ lower ─▶ IrMethod
//!            ─ optimize ─▶ IrMethod ─ codegen ─▶ JS
//! ```
//!
//! Each stage is a synchronous tree traversal owning the data of one method.
//! The first error aborts the method and nothing is emitted for it.

pub mod codegen;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod semantic;

use log::debug;
use serde::Serialize;

use crate::ast::{ClassContext, CompilationUnit, MethodNode, Node, SequenceNode};
use crate::config::CompilerConfig;
use crate::error::CompileResult;
use crate::globals::{GlobalResolver, KnownGlobals};
use ir::IrMethod;
use optimize::{OptLevel, Optimizer};
use semantic::{SemanticAnalysis, SemanticAnalyzer};

/// Selector top-level expressions are compiled under
pub const DO_IT_SELECTOR: &str = "xxxDoIt";

/// Main compiler entry point
pub struct Compiler {
    config: CompilerConfig,
    resolver: Box<dyn GlobalResolver>,
}

impl Compiler {
    /// The global resolver knows the configured `known-globals`
    pub fn new(config: CompilerConfig) -> Self {
        let resolver = Box::new(KnownGlobals::new(config.known_globals.iter().cloned()));
        Self { config, resolver }
    }

    pub fn with_resolver(mut self, resolver: impl GlobalResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Semantic analysis only. Annotates `node` in place.
    pub fn analyze(
        &self,
        node: &mut MethodNode,
        class: &ClassContext,
    ) -> CompileResult<SemanticAnalysis> {
        debug!("analyzing {}>>{}", class.name, node.selector);
        SemanticAnalyzer::new(class, &self.config.host_globals, self.resolver.as_ref())
            .analyze(node)
    }

    /// Analyze, translate and, when enabled, inline
    pub fn compile_ir(&self, node: &MethodNode, class: &ClassContext) -> CompileResult<IrMethod> {
        let mut node = node.clone();
        let analysis = self.analyze(&mut node, class)?;
        let mut method = lower::translate(&node, analysis, class)?;

        let level = if self.config.inline {
            OptLevel::Inline
        } else {
            OptLevel::None
        };
        Optimizer::new(level).optimize(&mut method)?;
        Ok(method)
    }

    pub fn compile_method(
        &self,
        node: &MethodNode,
        class: &ClassContext,
    ) -> CompileResult<CompiledMethod> {
        let method = self.compile_ir(node, class)?;
        let js = codegen::generate(&method, class, &self.config)?;
        debug!("compiled {}>>{} ({} bytes)", class.name, method.selector, js.len());

        Ok(CompiledMethod {
            selector: method.selector.clone(),
            source: method.source.clone(),
            arguments: method.arguments.clone(),
            message_sends: method.message_sends.iter().cloned().collect(),
            referenced_classes: method.class_references.iter().cloned().collect(),
            super_sends: method.super_sends.iter().cloned().collect(),
            class_path: codegen::js::class_context_path(&self.config.runtime, class),
            js,
        })
    }

    /// Compile a top-level statement sequence as `xxxDoIt ^ [ ... ] value`
    pub fn compile_expression(
        &self,
        sequence: SequenceNode,
        class: &ClassContext,
    ) -> CompileResult<CompiledMethod> {
        self.compile_method(&expression_method(sequence), class)
    }

    /// Compile every method of `unit`, stopping at the first error
    pub fn compile_class(&self, unit: &CompilationUnit) -> CompileResult<Vec<CompiledMethod>> {
        unit.methods
            .iter()
            .map(|method| self.compile_method(method, &unit.class))
            .collect()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// The method a top-level expression is compiled as
pub fn expression_method(sequence: SequenceNode) -> MethodNode {
    let block = Node::block(Vec::new(), sequence);
    let body =
        SequenceNode::statements(vec![Node::returning(Node::send(block, "value", Vec::new()))]);
    MethodNode::new(DO_IT_SELECTOR, Vec::new(), body).with_source(DO_IT_SELECTOR)
}

/// JavaScript for one method, plus the metadata recorded with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledMethod {
    pub selector: String,
    pub source: String,
    pub arguments: Vec<String>,
    pub message_sends: Vec<String>,
    pub referenced_classes: Vec<String>,
    pub super_sends: Vec<String>,
    /// Runtime path of the class the method belongs to
    pub class_path: String,
    /// The `<rt>.method({...})` record
    pub js: String,
}

impl CompiledMethod {
    /// Statement installing the method in its class
    pub fn install_source(&self, runtime: &str) -> String {
        format!("{}.addMethod({}, {});", runtime, self.js, self.class_path)
    }
}
