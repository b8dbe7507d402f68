//! Tally toolchain
//!
//! Tokenizer, parser and tree-walking interpreter for a small language.
//! Every stage can run on its own, talking to the next one through a
//! line-oriented text format on stdin/stdout.

mod feedback;
mod frontend;
mod interpreter;
mod middle;
mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use feedback::Diagnostic;
use frontend::lexer::{tokenize, tokenize_files};
use frontend::parser::parse;
use frontend::token::decode_tokens;
use interpreter::Interpreter;
use middle::{decode_statement, encode_statement, print_tree};
use utils::{Error, Limits, DEFAULT_MAX_DEPTH};

/// Tally toolchain
#[derive(Parser, Debug)]
#[command(name = "tallyc")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Tally toolchain - tokenizer, parser and interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Deepest nesting the parser, AST decoder and interpreter accept
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// How errors are reported on stderr
    #[arg(long, global = true, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenize source files (or stdin), one token per line
    Lex {
        /// Source files; stdin when none are given
        files: Vec<PathBuf>,

        /// Print a JSON array instead of token lines
        #[arg(long)]
        json: bool,
    },
    /// Parse a token stream into the canonical AST encoding
    Parse {
        /// Token stream file; stdin when omitted
        input: Option<PathBuf>,

        /// Print an indented tree instead of the encoding
        #[arg(long)]
        tree: bool,
    },
    /// Execute a canonical AST encoding
    Interpret {
        /// Encoded AST file; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Tokenize, parse and execute a source file in one go
    Run {
        /// Source file; stdin when omitted
        input: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorFormat {
    Human,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let limits = Limits::with_max_depth(cli.max_depth);

    if let Err(err) = dispatch(&cli.command, limits) {
        report(&err, cli.error_format);
        process::exit(1);
    }
}

fn dispatch(command: &Commands, limits: Limits) -> anyhow::Result<()> {
    match command {
        Commands::Lex { files, json } => lex_files(files, *json),
        Commands::Parse { input, tree } => {
            let (name, text) = read_input(input.as_deref())?;
            let tokens = decode_tokens(&text).with_context(|| format!("invalid token stream in {}", name))?;
            let program = parse(tokens, limits)?;

            let rendered = if *tree { print_tree(&program) } else { encode_statement(&program) + "\n" };
            io::stdout().lock().write_all(rendered.as_bytes())?;
            Ok(())
        }
        Commands::Interpret { input } => {
            let (name, text) = read_input(input.as_deref())?;
            let program = decode_statement(&text, limits)
                .with_context(|| format!("invalid AST encoding in {}", name))?;
            execute(&program, limits)
        }
        Commands::Run { input } => {
            let (name, source) = read_input(input.as_deref())?;
            let tokens = tokenize(&source, &name)?;
            let program = parse(tokens, limits)?;
            execute(&program, limits)
        }
    }
}

fn lex_files(files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let inputs = if files.is_empty() {
        vec![read_input(None)?]
    } else {
        files
            .iter()
            .map(|path| read_input(Some(path)))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let tokens = tokenize_files(&inputs)?;

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &tokens)?;
        writeln!(out)?;
    } else {
        for token in &tokens {
            writeln!(out, "{}", token.to_wire())?;
        }
    }
    Ok(())
}

fn execute(program: &frontend::ast::Stmt, limits: Limits) -> anyhow::Result<()> {
    let mut interpreter = Interpreter::new(io::stdout().lock()).with_limits(limits);
    interpreter.run(program)?;
    Ok(())
}

/// Read a whole file, or stdin when no path is given. Returns the name
/// recorded in token locations along with the text.
fn read_input(path: Option<&Path>) -> anyhow::Result<(String, String)> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            debug!("read {} bytes from {}", text.len(), path.display());
            Ok((path.display().to_string(), text))
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
            Ok(("stdin".to_string(), text))
        }
    }
}

fn report(err: &anyhow::Error, format: ErrorFormat) {
    match format {
        ErrorFormat::Human => eprintln!("error: {:#}", err),
        ErrorFormat::Json => {
            let diagnostic = match err.downcast_ref::<Error>() {
                Some(error) => Diagnostic::from_error(error),
                None => Diagnostic::other(format!("{:#}", err)),
            };
            eprintln!("{}", diagnostic.to_json());
        }
    }
}
