//! Commit and collection commands
//!
//! Both create a new entry. A collection is a commit forced to flag `c`.

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;

use super::{CommandKind, EntryComposer};
use crate::error::{Error, Result};
use crate::models::{Entry, Flag};
use crate::options::Options;
use crate::store::DocumentStore;
use crate::validation::validate;

/// Maximum body length when no limit is given
pub const DEFAULT_TEXT_LIMIT: usize = 59;

/// A validated entry, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    kind: CommandKind,
    body: String,
    flag: Flag,
    date: NaiveDate,
    limit: usize,
    parent: Option<String>,
    collection: Option<String>,
}

impl Commit {
    /// A task, event or note
    ///
    /// Flag resolution: explicit flag, then `task`, then `event`, else note.
    pub fn new(body: impl Into<String>, options: &Options) -> Result<Self> {
        let flag = options.flag.unwrap_or(if options.task {
            Flag::Task
        } else if options.event {
            Flag::Event
        } else {
            Flag::Note
        });

        let mut commit = Self::build(CommandKind::Commit, body.into(), flag, options)?;
        commit.collection = options.collection_hash.clone().filter(|h| !h.is_empty());
        Ok(commit)
    }

    /// A named group other entries can reference
    pub fn collection(body: impl Into<String>, options: &Options) -> Result<Self> {
        Self::build(CommandKind::Collection, body.into(), Flag::Collection, options)
    }

    /// The `x` entry recording a finished task
    ///
    /// Skips body validation: the body was accepted when the task was committed.
    pub(crate) fn completion(task: &Entry, date: NaiveDate) -> Self {
        Self {
            kind: CommandKind::Done,
            body: task.body().to_string(),
            flag: Flag::Done,
            date,
            limit: DEFAULT_TEXT_LIMIT,
            parent: Some(task.content_hash.clone()),
            collection: None,
        }
    }

    fn build(kind: CommandKind, body: String, flag: Flag, options: &Options) -> Result<Self> {
        validate(kind.name(), kind.options(), options)?;

        let limit = options.parsed_limit().unwrap_or(DEFAULT_TEXT_LIMIT);
        let date = options.parsed_date().unwrap_or_else(today);

        if body.is_empty() {
            return Err(Error::invalid_option(kind.name(), "text", "Text is required."));
        }
        if body.chars().count() > limit {
            return Err(Error::invalid_option(
                kind.name(),
                "text",
                format!("Can't commit, you go over the limitation of {} characters.", limit),
            ));
        }
        if flag == Flag::Completing {
            return Err(Error::invalid_option(
                kind.name(),
                "flag",
                "Flag '~' is reserved for tasks being completed.",
            ));
        }
        if flag == Flag::Done {
            return Err(Error::invalid_option(
                kind.name(),
                "flag",
                "A done entry needs the task it completes, use 'pus done'.",
            ));
        }

        Ok(Self {
            kind,
            body,
            flag,
            date,
            limit,
            parent: None,
            collection: None,
        })
    }

    /// Link this entry to the one it continues from
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Insert the entry, returning it as stored
    pub fn run<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<Entry> {
        let count = store.count()?;
        let entry = self.compose(Utc::now());
        debug!(
            "Commit::run {} as entry #{} ({})",
            entry.short_hash(),
            count + 1,
            self.kind
        );

        Ok(store.insert(entry)?)
    }
}

impl EntryComposer for Commit {
    fn compose(&self, created_at: DateTime<Utc>) -> Entry {
        let mut entry = Entry::new(self.flag, &self.body, self.date, created_at);
        entry.parent = self.parent.clone();
        entry.collection = self.collection.clone();
        entry
    }
}

/// Today's local calendar date
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
