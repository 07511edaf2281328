//! CLI binary for netspace.

use std::path::PathBuf;

use clap::Parser;
use colored::*;
use netspace::app::{self, Destination, QueryRequest};
use netspace::config::AppConfig;
use netspace::error::{AppError, Result};
use netspace::{input, interactive};
use netspace_search::{PageRequest, QueryType};
use tracing_subscriber::EnvFilter;

/// Aggregate asset search across FOFA, Hunter and Quake.
///
/// Without --type and --query, or with --interactive, starts an
/// interactive session.
#[derive(Parser)]
#[command(name = "netspace", version, about)]
struct Cli {
    /// Sources to query: fofa, hunter, quake, comma separated, or all.
    #[arg(short, long, default_value = "all")]
    source: String,

    /// Query type shared by every target: ip, domain or company.
    #[arg(short = 't', long = "type")]
    query_type: Option<QueryType>,

    /// Targets, comma separated, or a .txt file with one target per line.
    #[arg(short, long)]
    query: Option<String>,

    /// Result page to fetch, starting at 1.
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Results per page (Hunter always uses 10).
    #[arg(long, default_value_t = 100)]
    size: u32,

    /// Export file (.csv or .txt). Multiple targets get one file each.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force interactive mode.
    #[arg(short, long)]
    interactive: bool,

    /// Path to a TOML (or JSON) configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("netspace=debug,netspace_search=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("netspace=warn,netspace_search=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) | Err(AppError::Cancelled) => Ok(()),
        Err(e) if e.is_usage_error() => {
            eprintln!("{}", format!("Error: {e}").red());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// What the parsed flags ask for.
#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    Batch { query_type: QueryType, query: &'a str },
    Interactive,
}

/// Interactive with `-i` or when neither `-t` nor `-q` is given; a batch
/// when both are. One without the other is a usage error.
fn mode(cli: &Cli) -> Result<Mode<'_>> {
    if cli.interactive {
        return Ok(Mode::Interactive);
    }
    match (cli.query_type, cli.query.as_deref()) {
        (Some(query_type), Some(query)) => Ok(Mode::Batch { query_type, query }),
        (None, None) => Ok(Mode::Interactive),
        _ => Err(AppError::Input(
            "-t/--type and -q/--query must be given together unless --interactive".into(),
        )),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mode = mode(&cli)?;
    let config = AppConfig::load(cli.config.as_deref())?;

    match mode {
        Mode::Batch { query_type, query } => run_once(&cli, query_type, query, &config).await,
        Mode::Interactive => interactive::run(&config).await,
    }
}

async fn run_once(cli: &Cli, query_type: QueryType, query: &str, config: &AppConfig) -> Result<()> {
    let mut session = app::open_session(config)?;

    let selection = input::parse_sources(&cli.source, session.registry());
    for name in &selection.unknown {
        println!("{}", format!("Unknown source '{name}' ignored").yellow());
    }
    if selection.sources.is_empty() {
        return Err(AppError::Input(
            "no known source given; use fofa, hunter, quake or all".into(),
        ));
    }

    let request = QueryRequest {
        sources: selection.sources,
        query_type,
        targets: input::parse_targets(query)?,
        page: PageRequest::new(cli.page, cli.size)?,
        destination: cli
            .output
            .clone()
            .map_or(Destination::Console, Destination::File),
    };
    app::execute(&mut session, &request).await?;
    Ok(())
}
