//! Crawl Keeper main entry point
//!
//! A small operator CLI over the crawl state database: inspect stored
//! progress, register calls against the quota, move cursors, and compare
//! names with the similarity heuristics.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use crawl_keeper::config::{load_config_or_default, Config};
use crawl_keeper::input::{prompt_target, LineSource};
use crawl_keeper::similarity::{
    distinct_characters, longest_common_substring, phonetic_code, set_similarity_ratio,
    string_similarity_ratio,
};
use crawl_keeper::state::{format_wait, TargetId};
use crawl_keeper::storage::{load_or_create_state, open_storage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Crawl Keeper: progress and quota bookkeeping for rate-limited crawls
#[derive(Parser, Debug)]
#[command(name = "crawl-keeper")]
#[command(version = "1.0.0")]
#[command(about = "Progress and quota bookkeeping for rate-limited crawls", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored state of a target, or list all stored targets
    Status { target: Option<TargetId> },

    /// Read a target id from stdin and create or restore its state
    Init,

    /// Register one call for a target if the quota allows it
    Call { target: TargetId },

    /// Store a new pagination cursor for a target
    Cursor {
        target: TargetId,

        /// Token returned by the last successful fetch (-1 restarts the subset)
        #[arg(allow_negative_numbers = true)]
        token: i64,

        /// Move on to the next subset before storing the token
        #[arg(long)]
        next_subset: bool,
    },

    /// Drop the stored state of an abandoned target
    Forget { target: TargetId },

    /// Compare two names with the similarity heuristics
    Compare { first: String, second: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "invalid default configuration".to_string(),
        }
    })?;
    tracing::debug!("Using database at {}", config.storage.database_path);

    match cli.command {
        Command::Status { target } => handle_status(&config, target),
        Command::Init => handle_init(&config),
        Command::Call { target } => handle_call(&config, target),
        Command::Cursor {
            target,
            token,
            next_subset,
        } => handle_cursor(&config, target, token, next_subset),
        Command::Forget { target } => handle_forget(&config, target),
        Command::Compare { first, second } => {
            handle_compare(&first, &second);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_keeper=info,warn"),
            1 => EnvFilter::new("crawl_keeper=debug,info"),
            2 => EnvFilter::new("crawl_keeper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    open_storage(path).with_context(|| format!("failed to open database {}", path.display()))
}

fn handle_status(config: &Config, target: Option<TargetId>) -> anyhow::Result<()> {
    let storage = open(config)?;

    let Some(target) = target else {
        let targets = storage.list_targets()?;
        println!("Stored targets ({}):", targets.len());
        for target in targets {
            println!("  - {}", target);
        }
        return Ok(());
    };

    match storage.load_crawl_state(target, &config.quota)? {
        Some(state) => {
            println!("{}", state);
            let now = Utc::now();
            match state.time_until_next_call(now) {
                None => println!("Calls: available now"),
                Some(wait) => println!("Calls: available in {}", format_wait(wait)),
            }
        }
        None => println!("No stored state for target {}", target),
    }
    Ok(())
}

fn handle_init(config: &Config) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut source =
        LineSource::new(stdin.lock()).with_prompt("What is the ID of the user you wish to target?");
    let target = prompt_target(&mut source)?;

    let mut storage = open(config)?;
    let state = load_or_create_state(&mut storage, target, &config.quota)?;
    println!("{}", state);
    Ok(())
}

fn handle_call(config: &Config, target: TargetId) -> anyhow::Result<()> {
    let mut storage = open(config)?;
    let mut state = load_or_create_state(&mut storage, target, &config.quota)?;
    let now = Utc::now();

    if state.can_make_call(now) {
        state.register_call(now);
        storage.save_crawl_state(&state)?;
        println!("Call registered for target {}", target);
    } else {
        let wait = state.time_until_next_call(now).unwrap_or_default();
        println!(
            "Quota exhausted for target {}, next call in {} (at {})",
            target,
            format_wait(wait),
            state.next_available_at(now).to_rfc3339()
        );
    }
    Ok(())
}

fn handle_cursor(
    config: &Config,
    target: TargetId,
    token: i64,
    next_subset: bool,
) -> anyhow::Result<()> {
    let mut storage = open(config)?;
    let mut state = load_or_create_state(&mut storage, target, &config.quota)?;

    if next_subset {
        state.advance_subset();
    }
    state.set_cursor(token);
    storage.save_crawl_state(&state)?;

    println!("{}", state);
    Ok(())
}

fn handle_forget(config: &Config, target: TargetId) -> anyhow::Result<()> {
    let mut storage = open(config)?;
    if storage.delete_crawl_state(target)? {
        tracing::info!("Dropped crawl state for target {}", target);
        println!("Forgot target {}", target);
    } else {
        println!("No stored state for target {}", target);
    }
    Ok(())
}

fn handle_compare(first: &str, second: &str) {
    let first_chars: Vec<char> = distinct_characters(first).chars().collect();
    let second_chars: Vec<char> = distinct_characters(second).chars().collect();

    println!("Phonetic codes: {} / {}", phonetic_code(first), phonetic_code(second));
    println!(
        "Longest common substring: '{}'",
        longest_common_substring(first, second)
    );
    println!(
        "Residual ratio (lower is closer): {:.4}",
        string_similarity_ratio(first, second)
    );
    println!(
        "Character overlap: {:.4}",
        set_similarity_ratio(Some(&first_chars[..]), Some(&second_chars[..]))
    );
}
