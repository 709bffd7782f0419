//! `kestrel ir`: Dump the intermediate representation.

use std::path::Path;

use kestrel_compiler::{Compiler, PrettyPrint};

use super::{read_input, units, Session};

pub fn execute(session: &Session, input: &Path, no_inline: bool) -> anyhow::Result<bool> {
    let mut config = session.config.clone();
    if no_inline {
        config.inline = false;
    }

    let input = read_input(input)?;
    let compiler = Compiler::new(config);

    for unit in units(&input) {
        match compiler.compile_ir(&unit.node, &input.class) {
            Ok(method) => {
                println!("{}", unit.name);
                println!("{}", method.pretty_print());
            }
            Err(error) => {
                session.report(&error, &unit)?;
                return Ok(false);
            }
        }
    }
    Ok(true)
}
