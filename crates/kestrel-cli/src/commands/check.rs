//! `kestrel check`: Scope analysis without code generation.

use std::path::Path;

use kestrel_compiler::Compiler;

use super::{read_input, units, Session};
use crate::output::StyledOutput;

pub fn execute(session: &Session, input: &Path, globals: Vec<String>) -> anyhow::Result<bool> {
    let mut config = session.config.clone();
    config.known_globals.extend(globals);

    let input = read_input(input)?;
    let compiler = Compiler::new(config);
    let mut out = StyledOutput::new(session.color);
    let mut failed = false;

    for mut unit in units(&input) {
        match compiler.analyze(&mut unit.node, &input.class) {
            Ok(analysis) => {
                out.bold(&unit.name);
                let free = analysis.unknown_variables();
                if free.is_empty() {
                    out.plain(" ");
                    out.success("ok");
                } else {
                    out.plain(" ");
                    out.warning("free:");
                    out.plain(&format!(" {}", free.into_iter().collect::<Vec<_>>().join(", ")));
                }
                out.newline();
            }
            Err(error) => {
                session.report(&error, &unit)?;
                failed = true;
            }
        }
    }

    Ok(!failed)
}
