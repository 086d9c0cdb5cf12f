//! pus Core Library
//!
//! This crate provides the core functionality for pus, a rapid personal
//! journal kept from the command line.
//!
//! # Architecture
//!
//! - **Entries**: tasks, events, notes, done records and collections, each
//!   identified by a content hash
//! - **Journal file**: JSON lines, one document per line, appended on write
//!
//! All queries are served from the in-memory copy of the journal.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = Store::open_with_config(&config)?;
//!
//! // Commit a task
//! let options = Options { task: true, ..Options::default() };
//! let entry = Commit::new("Buy milk", &options)?.run(&mut store)?;
//!
//! // List open tasks
//! let open = Query::status(&Options::default())?.run(&store)?;
//! ```
//!
//! # Modules
//!
//! - `commands`: commit, collection, log, grep, status, done, show
//! - `store`: document store over the journal file (main entry point)
//! - `models`: entry and flag types
//! - `storage`: persistence, query primitives and storage errors
//! - `options`: option bag filled by the CLI
//! - `validation`: option checks shared by the commands
//! - `config`: application configuration

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod options;
pub mod storage;
pub mod store;
pub mod validation;

pub use commands::{Command, CommandKind, Commit, Done, Outcome, Query, Show};
pub use config::{Config, Environment};
pub use error::{Error, Result};
pub use models::{Entry, Flag};
pub use options::Options;
pub use storage::{StorageError, StorageResult};
pub use store::{DocumentStore, ErrorMode, Store};
