//! `kestrel compile`: Compile a unit to JavaScript.

use std::path::PathBuf;

use anyhow::Context;
use kestrel_compiler::Compiler;
use log::info;

use super::{read_input, units, Session};

pub struct CompileOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub no_inline: bool,
    pub no_context: bool,
    pub globals: Vec<String>,
    pub install: bool,
}

/// Returns `false` when a method failed to compile; nothing is written then.
pub fn execute(session: &Session, options: CompileOptions) -> anyhow::Result<bool> {
    let mut config = session.config.clone();
    if options.no_inline {
        config.inline = false;
    }
    if options.no_context {
        config.context = false;
    }
    config.known_globals.extend(options.globals);

    let input = read_input(&options.input)?;
    let runtime = config.runtime.clone();
    let compiler = Compiler::new(config);

    let mut js = String::new();
    for unit in units(&input) {
        match compiler.compile_method(&unit.node, &input.class) {
            Ok(compiled) => {
                if options.install {
                    js.push_str(&compiled.install_source(&runtime));
                } else {
                    js.push_str(&compiled.js);
                    js.push(';');
                }
                js.push('\n');
            }
            Err(error) => {
                session.report(&error, &unit)?;
                return Ok(false);
            }
        }
    }

    match options.output {
        Some(path) => {
            std::fs::write(&path, &js)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => print!("{}", js),
    }
    Ok(true)
}
