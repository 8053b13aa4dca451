//! devcard CLI - Parse, validate, and inspect devcard profile documents
//!
//! Usage:
//!   devcard [OPTIONS] <COMMAND> <FILE>
//!
//! Commands:
//!   validate  Check a card against the schema (JSON report, exit 1 if invalid)
//!   parse     Print the parsed document tree as JSON
//!   card      Print the typed card as JSON, only if the card is valid
//!   stats     Show document statistics

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser as ClapParser, Subcommand};
use devcard_core::{
    admit, Document, Node, ParseResult, ParseWarnings, Parser, ValidationError, Validator,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Parser and validator for devcard profile documents.
#[derive(ClapParser, Debug)]
#[command(name = "devcard", version, about)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins
    /// when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a card and print a JSON report.
    Validate(ValidateArgs),
    /// Print the parsed document tree as JSON.
    Parse(FileArgs),
    /// Print the typed card as JSON if the card is valid.
    Card(FileArgs),
    /// Show document statistics.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Card file, conventionally `cards/@<username>.yaml`.
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    input: FileArgs,

    /// Add machine-readable error codes to the report.
    #[arg(long)]
    codes: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    input: FileArgs,

    /// Output in JSON format.
    #[arg(short, long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Validate(args) => cmd_validate(&args),
        Command::Parse(args) => cmd_parse(&args.file),
        Command::Card(args) => cmd_card(&args.file),
        Command::Stats(args) => cmd_stats(&args.input.file, args.json),
    }
}

fn read_card(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

/// Parse `input`, logging every skipped line.
fn parse_logged<'a>(input: &'a str, path: &Path) -> ParseResult<'a> {
    let result = Parser::new().parse_with_warnings(input);
    log_warnings(&result.warnings, path);
    result
}

fn log_warnings(warnings: &ParseWarnings, path: &Path) {
    for warning in warnings.iter() {
        warn!(
            file = %path.display(),
            line = warning.line(),
            kind = warning.kind.as_str(),
            "{}",
            warning.message
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

/// The report printed by `validate` and by a rejected `card`.
#[derive(Serialize)]
struct Report {
    valid: bool,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    codes: Option<Vec<&'static str>>,
}

impl Report {
    fn from_errors(errors: &[ValidationError], with_codes: bool) -> Self {
        Self {
            valid: errors.is_empty(),
            errors: errors.iter().map(|e| e.message.clone()).collect(),
            codes: with_codes.then(|| errors.iter().map(|e| e.code.as_str()).collect()),
        }
    }

    /// The report for a card that could not be read at all.
    fn unreadable(err: &std::io::Error, with_codes: bool) -> Self {
        Self {
            valid: false,
            errors: vec![format!("Cannot read file: {}", err)],
            codes: with_codes.then(|| vec!["io_error"]),
        }
    }

    fn exit_code(&self) -> ExitCode {
        if self.valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(args: &ValidateArgs) -> anyhow::Result<ExitCode> {
    let path = &args.input.file;

    // Unreadable files still produce a report.
    let input = match fs::read_to_string(path) {
        Ok(input) => input,
        Err(e) => {
            warn!(file = %path.display(), "{}", e);
            let report = Report::unreadable(&e, args.codes);
            print_json(&report)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = parse_logged(&input, path);
    let origin = path.to_string_lossy();
    let errors = Validator::default().validate(&result.document, &origin);
    info!(file = %path.display(), errors = errors.len(), "validated");

    let report = Report::from_errors(&errors, args.codes);
    print_json(&report)?;
    Ok(report.exit_code())
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(path: &Path) -> anyhow::Result<ExitCode> {
    let input = read_card(path)?;
    let result = parse_logged(&input, path);
    print_json(&result.document)?;
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// Card Command
// =============================================================================

fn cmd_card(path: &Path) -> anyhow::Result<ExitCode> {
    let input = read_card(path)?;
    let result = parse_logged(&input, path);
    let origin = path.to_string_lossy();

    match admit(&result.document, &origin, &Validator::default()) {
        Ok(card) => {
            print_json(&card)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!(file = %path.display(), "{}", e);
            let report = Report::from_errors(e.errors(), false);
            print_json(&report)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

#[derive(Debug, Default, Serialize)]
struct DocumentStats {
    top_level_fields: usize,
    scalars: usize,
    lists: usize,
    maps: usize,
    projects: usize,
    experience: usize,
    interests: usize,
    warnings: usize,
    chars: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_parse(result: &ParseResult<'_>, input: &str) -> Self {
        let doc: &Document<'_> = &result.document;
        let list_len = |key: &str| doc.get(key).and_then(Node::as_list).map_or(0, <[_]>::len);

        let mut stats = Self {
            top_level_fields: doc.root.len(),
            projects: list_len("projects"),
            experience: list_len("experience"),
            interests: list_len("interests"),
            warnings: result.warnings.len(),
            chars: input.chars().count(),
            lines: input.lines().count(),
            ..Self::default()
        };

        for (_, node) in doc.root.iter() {
            stats.count_nodes(node);
        }
        stats
    }

    fn count_nodes(&mut self, node: &Node<'_>) {
        match node {
            Node::Scalar(_) => self.scalars += 1,
            Node::List(items) => {
                self.lists += 1;
                for item in items {
                    self.count_nodes(item);
                }
            }
            Node::Map(map) => {
                self.maps += 1;
                for (_, value) in map.iter() {
                    self.count_nodes(value);
                }
            }
        }
    }
}

fn cmd_stats(path: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let input = read_card(path)?;
    let result = parse_logged(&input, path);
    let stats = DocumentStats::from_parse(&result, &input);

    if json {
        print_json(&stats)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Document Statistics");
    println!("-------------------");
    println!("Top-level fields: {}", stats.top_level_fields);
    println!();
    println!("Content:");
    println!("  Scalars:        {}", stats.scalars);
    println!("  Lists:          {}", stats.lists);
    println!("  Maps:           {}", stats.maps);
    println!("  Projects:       {}", stats.projects);
    println!("  Experience:     {}", stats.experience);
    println!("  Interests:      {}", stats.interests);
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Warnings:         {}", stats.warnings);

    Ok(ExitCode::SUCCESS)
}
