//! pus CLI
//!
//! Command-line interface for pus - a rapid personal journal of tasks,
//! events, notes and collections.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use pus_core::{Config, Environment, Options, StorageError, Store};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "pus")]
#[command(about = "pus - a rapid journal for tasks, events and notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - short hashes only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Journal to use (default or test)
    #[arg(long, global = true, value_name = "ENV")]
    env: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit a task, an event or a note
    #[command(alias = "ci")]
    Commit {
        /// Entry text
        text: String,
        /// Commit as a task
        #[arg(short, long)]
        task: bool,
        /// Commit as an event
        #[arg(short = 'o', long)]
        event: bool,
        /// Commit as a note
        #[arg(short, long)]
        note: bool,
        /// Link the entry to a collection
        #[arg(short, long, value_name = "HASH")]
        collection: Option<String>,
        #[command(flatten)]
        common: CommitArgs,
    },
    /// Commit a collection
    #[command(alias = "c")]
    Collection {
        /// Collection name
        text: String,
        #[command(flatten)]
        common: CommitArgs,
    },
    /// Show the journal
    Log {
        #[command(flatten)]
        filter: ListArgs,
    },
    /// Search the journal with a regular expression
    Grep {
        /// Expression matched against entry text
        exp: String,
        #[command(flatten)]
        filter: ListArgs,
    },
    /// Show open tasks
    #[command(alias = "st")]
    Status {
        /// Limit number of results, default 100
        #[arg(short, long)]
        limit: Option<String>,
        /// Show tasks since date, format YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Mark a task as done using its hash
    Done {
        /// Task hash, at least 7 characters
        hash: String,
        /// Completion date, format YYYY-MM-DD, default today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show an entry and the entries it follows from
    Show {
        /// Entry hash, at least 7 characters
        hash: String,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

#[derive(Args)]
struct CommitArgs {
    /// Force date, format YYYY-MM-DD, default today
    #[arg(short, long)]
    date: Option<String>,
    /// Extend characters limitation, default 59
    #[arg(short, long)]
    limit: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    /// Limit number of results, default 100
    #[arg(short, long)]
    limit: Option<String>,
    /// Show entries since date, format YYYY-MM-DD
    #[arg(short, long)]
    date: Option<String>,
    /// Show only tasks
    #[arg(short, long)]
    task: bool,
    /// Show only events
    #[arg(short = 'o', long)]
    event: bool,
    /// Show only notes
    #[arg(short, long)]
    note: bool,
    /// Show only done tasks
    #[arg(short = 'x', long)]
    done: bool,
    /// Show only collections
    #[arg(short, long)]
    collection: bool,
    /// Show only members of a collection
    #[arg(long = "in", value_name = "HASH")]
    in_collection: Option<String>,
}

impl From<ListArgs> for Options {
    fn from(args: ListArgs) -> Self {
        Options {
            task: args.task,
            event: args.event,
            note: args.note,
            done: args.done,
            collection: args.collection,
            in_collection: args.in_collection,
            date: args.date,
            limit: args.limit,
            ..Options::default()
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, environment, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let result = run(cli, &output);
    if let Err(ref e) = result {
        if let Some(hint) = storage_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Commands that don't need the store
    match command {
        Commands::Config { command } => {
            return handle_config_command(command, cli.config.as_ref(), output);
        }
        Commands::Unknown(args) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            output.message(&format!("unknown command \"{}\"", name));
            return Ok(());
        }
        _ => {}
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(env) = cli.env {
        config.environment = env
            .parse::<Environment>()
            .context("Invalid --env value")?;
    }

    init_logging(&config);

    let mut store = Store::open_with_config(&config)
        .with_context(|| format!("Failed to open journal {:?}", config.entries_path()))?;

    match command {
        Commands::Commit {
            text,
            task,
            event,
            note,
            collection,
            common,
        } => {
            let options = Options {
                task,
                event,
                note,
                collection_hash: collection,
                date: common.date,
                limit: common.limit,
                ..Options::default()
            };
            commands::entry::commit(&mut store, text, options, output)
        }
        Commands::Collection { text, common } => {
            let options = Options {
                date: common.date,
                limit: common.limit,
                ..Options::default()
            };
            commands::entry::collection(&mut store, text, options, output)
        }
        Commands::Log { filter } => commands::query::log(&store, filter.into(), output),
        Commands::Grep { exp, filter } => {
            commands::query::grep(&store, exp, filter.into(), output)
        }
        Commands::Status { limit, date } => {
            let options = Options {
                limit,
                date,
                ..Options::default()
            };
            commands::query::status(&store, options, output)
        }
        Commands::Done { hash, date } => {
            let options = Options {
                date,
                ..Options::default()
            };
            commands::entry::done(&mut store, hash, options, output)
        }
        Commands::Show { hash } => commands::entry::show(&mut store, hash, output),
        Commands::Config { .. } | Commands::Unknown(_) => Ok(()), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Install a tracing subscriber when PUS_LOG is set
///
/// Logs go to the configured log file, or stderr when none is set.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("PUS_LOG") else {
        return;
    };

    let writer = match &config.log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let env_filter = EnvFilter::new(format!("pus_core={},pus_cli={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(config.log_file.is_none())
        .with_writer(writer)
        .try_init();

    info!("logging initialized ({})", config.environment);
}

/// Recovery hint for storage failures anywhere in the error chain
fn storage_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(pus_core::Error::Persistence(e)) = cause.downcast_ref::<pus_core::Error>() {
            return e.recovery_suggestion();
        }
        cause
            .downcast_ref::<StorageError>()
            .and_then(StorageError::recovery_suggestion)
    })
}
