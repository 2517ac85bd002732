use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use gstr_lexer::{Lexer, TokenKind};
use gstr_parser::{
    DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_INTERPOLATION_DEPTH, ParserConfig, parse_with,
};

mod diagnostics;
mod json;

/// Inspect and check source files containing interpolated string literals.
#[derive(Parser)]
#[command(name = "gstr", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Deepest allowed nesting of string literals inside injections
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INTERPOLATION_DEPTH)]
    max_interpolation_depth: usize,

    /// Deepest allowed nesting of expressions
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_EXPRESSION_DEPTH)]
    max_expression_depth: usize,

    /// Print progress and timings to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show lexer output (tokens)
    Lex { file: PathBuf },
    /// Show the syntax tree and any diagnostics
    Parse {
        file: PathBuf,
        /// Print the tree and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report diagnostics only; exits with status 1 if there are any
    Check { file: PathBuf },
    /// Print a shell completion script
    Completions { shell: Shell },
}

impl Cli {
    fn config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_max_interpolation_depth(self.max_interpolation_depth)
            .with_max_expression_depth(self.max_expression_depth)
    }
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Command::Lex { file } => run_lexer(&cli, file),
        Command::Parse { file, json } => run_parser(&cli, file, *json),
        Command::Check { file } => run_check(&cli, file),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "gstr", &mut io::stdout());
        }
    }
}

fn read_source(file: &Path) -> String {
    match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_lexer(cli: &Cli, file: &Path) {
    let source = read_source(file);
    let started = Instant::now();
    let tokens = Lexer::tokenize(&source);
    if cli.verbose {
        eprintln!("[gstr] lexed {} tokens in {:?}", tokens.len(), started.elapsed());
    }

    println!("=== Lexer Output for {} ===\n", file.display());
    println!("{:<10} {:<8} {:<16} {}", "SPAN", "LENGTH", "TOKEN TYPE", "TEXT");
    println!("{}", "-".repeat(60));

    for token in &tokens {
        let span = format!("{}..{}", token.span.start, token.span.end);
        let kind = format!("{:?}", token.kind);
        println!(
            "{:<10} {:<8} {:<16} {:?}",
            span,
            token.span.len(),
            kind,
            token.text(&source)
        );
    }

    println!("\n=== Summary ===");
    println!("Total tokens: {}", tokens.len());
    let strings = tokens.iter().filter(|t| t.kind == TokenKind::GStringBegin).count();
    let injections = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::DollarBrace | TokenKind::Dollar))
        .count();
    let string_tokens = tokens.iter().filter(|t| t.kind.is_gstring_part()).count();
    let invalid = tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
    println!("  Interpolated strings: {}", strings);
    println!("  String tokens:        {}", string_tokens);
    println!("  Injections:           {}", injections);
    println!("  Invalid tokens:       {}", invalid);
}

fn run_parser(cli: &Cli, file: &Path, as_json: bool) {
    let source = read_source(file);
    let path = file.display().to_string();
    let started = Instant::now();
    let parse = parse_with(&source, cli.config());
    let errors = diagnostics::collect(&parse, &source);
    if cli.verbose {
        eprintln!(
            "[gstr] parsed {} in {:?} ({} diagnostics)",
            path,
            started.elapsed(),
            errors.len()
        );
    }

    if as_json {
        match json::to_json(&parse.root, &errors, &source) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error formatting tree: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("=== Syntax Tree for {} ===\n", path);
    print!("{}", parse.debug_dump(&source));
    diagnostics::report_all(&errors, &path, &source);
}

fn run_check(cli: &Cli, file: &Path) {
    let source = read_source(file);
    let path = file.display().to_string();
    let parse = parse_with(&source, cli.config());
    let errors = diagnostics::collect(&parse, &source);
    if cli.verbose {
        let strings = parse.source_file().map_or(0, |f| f.gstrings().len());
        eprintln!("[gstr] checked {} interpolated strings in {}", strings, path);
    }

    if errors.is_empty() {
        println!("{}: no errors", path);
        return;
    }

    diagnostics::report_all(&errors, &path, &source);
    eprintln!("{}: {} error(s)", path, errors.len());
    std::process::exit(1);
}
