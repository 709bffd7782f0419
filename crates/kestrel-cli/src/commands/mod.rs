//! Subcommands and the state they share

pub mod check;
pub mod compile;
pub mod ir;

use std::path::Path;

use anyhow::Context;
use kestrel_compiler::{
    expression_method, ClassContext, CompilationUnit, CompileError, CompilerConfig, MethodNode,
    CONFIG_FILE_NAME,
};
use log::debug;
use termcolor::ColorChoice;

use crate::output::{self, Format};

/// Configuration and output settings for one invocation
pub struct Session {
    pub config: CompilerConfig,
    pub format: Format,
    pub color: ColorChoice,
}

impl Session {
    /// Load `config_path`, or `./kestrel.toml` when it exists, or the defaults
    pub fn new(
        config_path: Option<&Path>,
        format: Format,
        color: ColorChoice,
    ) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => CompilerConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None if Path::new(CONFIG_FILE_NAME).is_file() => {
                CompilerConfig::load(Path::new(CONFIG_FILE_NAME))
                    .with_context(|| format!("failed to load {}", CONFIG_FILE_NAME))?
            }
            None => CompilerConfig::default(),
        };
        debug!("configuration: {:?}", config);

        Ok(Self {
            config,
            format,
            color,
        })
    }

    pub fn report(&self, error: &CompileError, method: &Unit) -> anyhow::Result<()> {
        output::report_error(error, &method.name, &method.node.source, self.format, self.color)
    }
}

/// A method to compile, with the display name used in diagnostics
pub struct Unit {
    pub name: String,
    pub node: MethodNode,
}

pub fn read_input(path: &Path) -> anyhow::Result<CompilationUnit> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid compilation unit", path.display()))
}

/// Methods of `unit` followed by its expressions, as doit methods
pub fn units(input: &CompilationUnit) -> Vec<Unit> {
    let methods = input.methods.iter().map(|method| Unit {
        name: method_name(&input.class, &method.selector),
        node: method.clone(),
    });
    let expressions = input.expressions.iter().enumerate().map(|(i, sequence)| Unit {
        name: format!("{}>>expression {}", input.class.name, i + 1),
        node: expression_method(sequence.clone()),
    });
    methods.chain(expressions).collect()
}

/// `Foo>>bar` or `Foo class>>bar`
pub fn method_name(class: &ClassContext, selector: &str) -> String {
    if class.metaclass {
        format!("{} class>>{}", class.name, selector)
    } else {
        format!("{}>>{}", class.name, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_compiler::SequenceNode;

    #[test]
    fn test_method_name() {
        let class = ClassContext::new("Foo");
        assert_eq!(method_name(&class, "bar:"), "Foo>>bar:");
        assert_eq!(method_name(&class.metaclass(), "new"), "Foo class>>new");
    }

    #[test]
    fn test_units_order() {
        let input = CompilationUnit {
            class: ClassContext::new("Foo"),
            methods: vec![MethodNode::new("a", vec![], SequenceNode::default())],
            expressions: vec![SequenceNode::default()],
        };
        let names: Vec<String> = units(&input).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Foo>>a", "Foo>>expression 1"]);
    }
}
