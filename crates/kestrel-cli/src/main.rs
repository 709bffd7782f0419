//! Kestrel command-line tool
//!
//! Reads serialized Smalltalk ASTs (JSON), compiles them to JavaScript and
//! reports compile errors as diagnostics.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{check, compile, ir, Session};
use output::Format;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Smalltalk to JavaScript compiler", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./kestrel.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Error output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    format: Format,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every method and expression of an input file to JavaScript
    Compile {
        /// Input file (JSON compilation unit)
        input: PathBuf,
        /// Write the JavaScript here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Dispatch every send, including conditionals and loops
        #[arg(long)]
        no_inline: bool,
        /// Omit call-stack context instrumentation
        #[arg(long)]
        no_context: bool,
        /// Treat NAME as a defined global (repeatable)
        #[arg(long = "global", value_name = "NAME")]
        globals: Vec<String>,
        /// Wrap each method record in an addMethod call
        #[arg(long)]
        install: bool,
    },

    /// Run scope analysis only and list free variables per method
    Check {
        /// Input file (JSON compilation unit)
        input: PathBuf,
        /// Treat NAME as a defined global (repeatable)
        #[arg(long = "global", value_name = "NAME")]
        globals: Vec<String>,
    },

    /// Print the intermediate representation of every method
    Ir {
        /// Input file (JSON compilation unit)
        input: PathBuf,
        /// Show the IR before inlining
        #[arg(long)]
        no_inline: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let session = Session::new(
        cli.config.as_deref(),
        cli.format,
        output::resolve_color_choice(cli.color.as_deref()),
    )?;

    match cli.command {
        Commands::Compile {
            input,
            output,
            no_inline,
            no_context,
            globals,
            install,
        } => compile::execute(
            &session,
            compile::CompileOptions {
                input,
                output,
                no_inline,
                no_context,
                globals,
                install,
            },
        ),

        Commands::Check { input, globals } => check::execute(&session, &input, globals),

        Commands::Ir { input, no_inline } => ir::execute(&session, &input, no_inline),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
