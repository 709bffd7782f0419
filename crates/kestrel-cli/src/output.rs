//! Colored terminal output and error reporting shared by the commands.
//!
//! Uses `termcolor` for cross-platform colored output and respects the
//! `NO_COLOR` environment variable.

use std::io::Write;

use clap::ValueEnum;
use kestrel_compiler::diagnostic::create_files;
use kestrel_compiler::{CompileError, Diagnostic};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// How compile errors are written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Annotated source snippets
    Pretty,
    /// One JSON object per error
    Json,
}

/// Resolve `ColorChoice` from the `--color` flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Report `error`, raised while compiling the method called `name`
pub fn report_error(
    error: &CompileError,
    name: &str,
    source: &str,
    format: Format,
    choice: ColorChoice,
) -> anyhow::Result<()> {
    let files = create_files(name, source);
    let diagnostic = Diagnostic::from_compile_error(error, 0, source);

    match format {
        Format::Pretty => {
            let mut stderr = StandardStream::stderr(choice);
            diagnostic.emit_to(&mut stderr, &files)?;
        }
        Format::Json => {
            eprintln!("{}", diagnostic.to_json(&files)?);
        }
    }
    Ok(())
}

/// Styled writer for command summaries on stdout
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Yellow), true);
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }
}
