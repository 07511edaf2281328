//! Interactive mode: probe every source once, then prompt for batches until
//! the user leaves.

use std::fmt;

use colored::*;
use inquire::{Confirm, Select, Text};
use netspace_search::{Batch, PageRequest, QueryType, SearchError, Session, Source, classify};

use crate::app::{self, Destination, QueryRequest};
use crate::config::AppConfig;
use crate::console::{self, ConsoleSink};
use crate::error::{AppError, Result};
use crate::export::ExportFormat;
use crate::input;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_SIZE: u32 = 100;

/// A menu entry, or the exit entry appended to top-level menus.
#[derive(Debug)]
enum Choice<T> {
    Pick(T),
    Exit,
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pick(value) => value.fmt(f),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Which of the available sources a round queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePick {
    One(Source),
    All,
}

impl SourcePick {
    /// The sources to pass to the orchestrator.
    pub fn resolve(self, available: &[Source]) -> Vec<Source> {
        match self {
            Self::One(source) => vec![source],
            Self::All => available.to_vec(),
        }
    }
}

impl fmt::Display for SourcePick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(source) => source.fmt(f),
            Self::All => f.write_str("all"),
        }
    }
}

/// Query types at least one available source can answer, in menu order.
pub fn query_type_options(available: &[Source]) -> Vec<QueryType> {
    QueryType::all()
        .iter()
        .copied()
        .filter(|qt| available.iter().any(|s| s.supports(*qt)))
        .collect()
}

/// Sources offered for `query_type`. `all` is offered when more than one
/// source is available.
pub fn source_options(available: &[Source], query_type: QueryType) -> Vec<SourcePick> {
    let mut options: Vec<SourcePick> = available
        .iter()
        .copied()
        .filter(|s| s.supports(query_type))
        .map(SourcePick::One)
        .collect();
    if available.len() > 1 {
        options.push(SourcePick::All);
    }
    options
}

/// A positive integer answer, or `None` for anything else.
pub fn parse_count(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn default_target(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Domain => "example.com",
        QueryType::Ip => "1.1.1.1",
        QueryType::Company => "",
    }
}

/// Run the interactive session.
///
/// Leaving a prompt with Esc or Ctrl-C ends the session normally.
///
/// # Errors
///
/// [`SearchError::Configuration`] when no source passes its probe.
pub async fn run(config: &AppConfig) -> Result<()> {
    println!(
        "{}",
        "Interactive mode (run with --help for command-line flags)"
            .cyan()
            .bold()
    );

    let mut session = app::open_session(config)?;
    console::print_credential_header();
    let statuses = session.probe(Source::all(), &ConsoleSink::default()).await;
    let available: Vec<Source> = statuses
        .iter()
        .filter(|s| s.available)
        .map(|s| s.source)
        .collect();
    if available.is_empty() {
        return Err(SearchError::Configuration(
            "no source is available; check the API keys in the configuration file".into(),
        )
        .into());
    }

    loop {
        println!();
        println!("{}", "New query".cyan().bold());
        match round(&mut session, config, &available).await {
            Ok(true) => {}
            Ok(false) | Err(AppError::Cancelled) => break,
            Err(e) => {
                println!("{}", format!("Error: {e}").red());
                match Confirm::new("Continue?").with_default(true).prompt() {
                    Ok(true) => {}
                    _ => break,
                }
            }
        }
    }
    println!("{}", "Bye.".green());
    Ok(())
}

/// One round of prompts and a batch. `Ok(false)` ends the session.
async fn round(session: &mut Session, config: &AppConfig, available: &[Source]) -> Result<bool> {
    let Some(query_type) = select("Query type", query_type_options(available))? else {
        return Ok(false);
    };
    let targets = prompt_targets(query_type)?;
    let Some(pick) = select("Source", source_options(available, query_type))? else {
        return Ok(false);
    };
    let page = PageRequest::new(
        prompt_count("Page", DEFAULT_PAGE)?,
        prompt_count("Page size", DEFAULT_SIZE)?,
    )?;

    let destination = if Confirm::new("Export results?").with_default(false).prompt()? {
        let format = Select::new("Export format", vec![ExportFormat::Csv, ExportFormat::Txt])
            .prompt()?;
        Destination::Directory(config.output.directory.clone(), format)
    } else {
        Destination::Console
    };

    let request = QueryRequest {
        sources: pick.resolve(available),
        query_type,
        targets,
        page,
        destination,
    };
    app::execute(session, &request).await?;

    println!();
    Ok(Confirm::new("Run another query?").with_default(true).prompt()?)
}

fn select<T: fmt::Display>(message: &str, options: Vec<T>) -> Result<Option<T>> {
    let mut choices: Vec<Choice<T>> = options.into_iter().map(Choice::Pick).collect();
    choices.push(Choice::Exit);
    Ok(match Select::new(message, choices).prompt()? {
        Choice::Pick(value) => Some(value),
        Choice::Exit => None,
    })
}

fn prompt_targets(query_type: QueryType) -> Result<Vec<String>> {
    let message = format!("{query_type} targets (comma separated, or a .txt file)");
    let mut last = default_target(query_type).to_string();
    loop {
        let answer = Text::new(&message).with_default(&last).prompt()?;
        last = answer.clone();

        let targets = match input::parse_targets(&answer) {
            Ok(targets) => targets,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };
        if targets.is_empty() {
            println!("{}", "No targets given, try again".red());
            continue;
        }

        let from_file = input::is_target_file(&answer);
        if let Err(e) = Batch::new(query_type, &targets) {
            println!("{}", e.to_string().red());
            if from_file {
                println!(
                    "{}",
                    "Check the file: every target must be of the same type".yellow()
                );
            }
            continue;
        }
        if from_file {
            print_preview(answer.trim(), &targets);
        }
        return Ok(targets);
    }
}

fn print_preview(file: &str, targets: &[String]) {
    println!("{}", format!("Targets in {file}").bold());
    let rows: Vec<Vec<String>> = targets
        .iter()
        .enumerate()
        .map(|(i, t)| vec![(i + 1).to_string(), t.clone(), classify(t).to_string()])
        .collect();
    console::print_table(&console::render_table(&["#", "Target", "Type"], &rows));
}

fn prompt_count(message: &str, default: u32) -> Result<u32> {
    let answer = Text::new(message)
        .with_default(&default.to_string())
        .prompt()?;
    Ok(parse_count(&answer).unwrap_or_else(|| {
        println!(
            "{}",
            format!("'{}' is not a positive number, using {default}", answer.trim()).yellow()
        );
        default
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_offered_only_with_hunter_or_quake() {
        assert_eq!(
            query_type_options(&[Source::Fofa]),
            vec![QueryType::Domain, QueryType::Ip]
        );
        assert_eq!(
            query_type_options(&[Source::Fofa, Source::Quake]),
            vec![QueryType::Domain, QueryType::Ip, QueryType::Company]
        );
    }

    #[test]
    fn all_offered_with_more_than_one_source() {
        assert_eq!(
            source_options(&[Source::Hunter], QueryType::Domain),
            vec![SourcePick::One(Source::Hunter)]
        );
        assert_eq!(
            source_options(&[Source::Fofa, Source::Hunter], QueryType::Ip),
            vec![
                SourcePick::One(Source::Fofa),
                SourcePick::One(Source::Hunter),
                SourcePick::All
            ]
        );
    }

    #[test]
    fn fofa_not_offered_alone_for_company() {
        let options = source_options(&[Source::Fofa, Source::Hunter], QueryType::Company);
        assert_eq!(options, vec![SourcePick::One(Source::Hunter), SourcePick::All]);
        assert_eq!(
            SourcePick::All.resolve(&[Source::Fofa, Source::Hunter]),
            vec![Source::Fofa, Source::Hunter]
        );
    }

    #[test]
    fn counts_fall_back_on_bad_input() {
        assert_eq!(parse_count(" 3 "), Some(3));
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("ten"), None);
    }

    #[test]
    fn menu_labels() {
        assert_eq!(Choice::Pick(SourcePick::All).to_string(), "all");
        assert_eq!(Choice::<QueryType>::Exit.to_string(), "exit");
        assert_eq!(SourcePick::One(Source::Quake).to_string(), "quake");
        assert_eq!(ExportFormat::Txt.to_string(), "txt");
    }
}
