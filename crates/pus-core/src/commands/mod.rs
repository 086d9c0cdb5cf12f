//! Journal commands
//!
//! Commands are built from an [`Options`](crate::options::Options) bag,
//! validated at construction, and run against a [`DocumentStore`].
//!
//! - [`EntryComposer`]: commands that build and persist a document
//!   (commit, collection)
//! - [`FilterBuilder`]: commands that build a query (log, grep, status, done)

pub mod commit;
pub mod done;
pub mod query;
pub mod show;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Entry;
use crate::storage::{Filter, FindOptions};
use crate::store::DocumentStore;

pub use commit::{Commit, DEFAULT_TEXT_LIMIT};
pub use done::Done;
pub use query::Query;
pub use show::Show;

/// The commands the journal understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Commit,
    Collection,
    Log,
    Grep,
    Status,
    Done,
    Show,
}

impl CommandKind {
    /// Name used in messages and on the command line
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Commit => "commit",
            CommandKind::Collection => "collection",
            CommandKind::Log => "log",
            CommandKind::Grep => "grep",
            CommandKind::Status => "status",
            CommandKind::Done => "done",
            CommandKind::Show => "show",
        }
    }

    /// Option names this command recognizes
    pub fn options(self) -> &'static [&'static str] {
        match self {
            CommandKind::Commit => &["task", "event", "note", "collection", "date", "limit"],
            CommandKind::Collection => &["date", "limit"],
            CommandKind::Log | CommandKind::Grep => &[
                "limit",
                "date",
                "task",
                "event",
                "note",
                "done",
                "collection",
                "in",
            ],
            CommandKind::Status => &["limit", "date"],
            CommandKind::Done => &["date"],
            CommandKind::Show => &[],
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds the document a command persists
pub trait EntryComposer {
    /// Compose the entry as of `created_at`
    fn compose(&self, created_at: DateTime<Utc>) -> Entry;
}

/// Builds the query a command runs
pub trait FilterBuilder {
    /// Predicate over stored entries
    fn filter(&self) -> Filter;

    /// Sort and limit, store defaults unless overridden
    fn find_options(&self) -> FindOptions {
        FindOptions::default()
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new entry was committed
    Created(Entry),
    /// A task was completed; carries the new completion entry
    Completed(Entry),
    /// Query results in display order
    Entries(Vec<Entry>),
    /// Nothing matched the given hash
    NotFound,
}

/// A validated command, ready to run
#[derive(Debug, Clone)]
pub enum Command {
    Commit(Commit),
    Done(Done),
    Show(Show),
    Query(Query),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Commit(c) => c.kind(),
            Command::Done(_) => CommandKind::Done,
            Command::Show(_) => CommandKind::Show,
            Command::Query(q) => q.kind(),
        }
    }

    /// Execute against the store
    pub fn run<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<Outcome> {
        match self {
            Command::Commit(commit) => commit.run(store).map(Outcome::Created),
            Command::Done(done) => Ok(match done.run(store)? {
                Some(entry) => Outcome::Completed(entry),
                None => Outcome::NotFound,
            }),
            Command::Show(show) => show.run(&*store).map(Outcome::Entries),
            Command::Query(query) => query.run(&*store).map(Outcome::Entries),
        }
    }
}

impl From<Commit> for Command {
    fn from(c: Commit) -> Self {
        Command::Commit(c)
    }
}

impl From<Done> for Command {
    fn from(d: Done) -> Self {
        Command::Done(d)
    }
}

impl From<Show> for Command {
    fn from(s: Show) -> Self {
        Command::Show(s)
    }
}

impl From<Query> for Command {
    fn from(q: Query) -> Self {
        Command::Query(q)
    }
}
