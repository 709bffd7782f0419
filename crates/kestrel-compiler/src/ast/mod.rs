//! Abstract syntax tree consumed by the compiler
//!
//! The parser lives outside this crate; its output arrives as serde data
//! (JSON in the CLI). A [`CompilationUnit`] bundles the class being compiled
//! with its methods and any top-level expressions.

mod literal;
mod node;
mod span;
mod visitor;

pub use literal::Literal;
pub use node::*;
pub use span::Span;
pub use visitor::*;

use serde::{Deserialize, Serialize};

/// The class a method is compiled for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassContext {
    pub name: String,

    #[serde(default)]
    pub superclass: Option<String>,

    /// All instance variable names, inherited ones included
    #[serde(default)]
    pub instance_variables: Vec<String>,

    /// Compiling for the class side (`Foo class`)
    #[serde(default)]
    pub metaclass: bool,
}

impl ClassContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_instance_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instance_variables = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn metaclass(mut self) -> Self {
        self.metaclass = true;
        self
    }
}

/// One input file: a class with the methods and doits to compile against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub class: ClassContext,

    #[serde(default)]
    pub methods: Vec<MethodNode>,

    #[serde(default)]
    pub expressions: Vec<SequenceNode>,
}
