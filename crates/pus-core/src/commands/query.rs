//! Log, grep and status
//!
//! All three list stored entries. Log builds the base filter, grep adds a
//! regular expression over `text`, status narrows to open tasks.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use super::{CommandKind, FilterBuilder};
use crate::error::{Error, Result};
use crate::models::{Entry, Flag};
use crate::options::Options;
use crate::storage::{Condition, Field, Filter, FindOptions, Sort};
use crate::store::DocumentStore;
use crate::validation::validate;

/// Flags listed when no class option narrows the log
pub const LISTED_FLAGS: [Flag; 5] = [
    Flag::Task,
    Flag::Note,
    Flag::Event,
    Flag::Done,
    Flag::Collection,
];

/// A listing query
#[derive(Debug, Clone)]
pub struct Query {
    kind: CommandKind,
    flags: Vec<Flag>,
    since: Option<NaiveDate>,
    in_collection: Option<String>,
    pattern: Option<Regex>,
    limit: Option<usize>,
    sort: Option<Sort>,
}

impl Query {
    /// Every listed flag, or the single class picked by the options
    pub fn log(options: &Options) -> Result<Self> {
        Self::build(CommandKind::Log, options)
    }

    /// Log restricted to entries whose text matches `exp`
    pub fn grep(exp: &str, options: &Options) -> Result<Self> {
        let mut query = Self::build(CommandKind::Grep, options)?;
        let pattern = Regex::new(exp).map_err(|e| {
            Error::invalid_option(
                CommandKind::Grep.name(),
                "exp",
                format!("Invalid expression: {}.", e),
            )
        })?;
        query.pattern = Some(pattern);
        Ok(query)
    }

    /// Open tasks only, whatever class options were passed
    pub fn status(options: &Options) -> Result<Self> {
        let mut query = Self::build(CommandKind::Status, options)?;
        query.flags = vec![Flag::Task];
        Ok(query)
    }

    fn build(kind: CommandKind, options: &Options) -> Result<Self> {
        validate(kind.name(), kind.options(), options)?;

        Ok(Self {
            kind,
            flags: class_flags(options),
            since: options.parsed_date(),
            in_collection: options.in_collection_str().map(str::to_string),
            pattern: None,
            limit: options.parsed_limit(),
            sort: None,
        })
    }

    /// Override the store's default ordering
    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Matching entries in display order
    pub fn run<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<Vec<Entry>> {
        debug!("Query::run {} flags={:?}", self.kind, self.flags);
        Ok(store.find(&self.filter(), &self.find_options())?)
    }
}

impl FilterBuilder for Query {
    fn filter(&self) -> Filter {
        let mut filter = match self.flags.as_slice() {
            [flag] => Filter::new().flag(*flag),
            flags => Filter::new().flags(flags),
        };

        if let Some(since) = self.since {
            filter = filter.and(Condition::AtLeast(
                Field::Date,
                since.format("%Y-%m-%d").to_string(),
            ));
        }
        if let Some(hash) = &self.in_collection {
            filter = filter.and(Condition::StartsWith(Field::Collection, hash.clone()));
        }
        if let Some(pattern) = &self.pattern {
            filter = filter.and(Condition::Matches(Field::Text, pattern.clone()));
        }
        filter
    }

    fn find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort,
            limit: self.limit,
        }
    }
}

/// First class option set wins: task, event, note, done, collection
fn class_flags(options: &Options) -> Vec<Flag> {
    let picked = [
        (options.task, Flag::Task),
        (options.event, Flag::Event),
        (options.note, Flag::Note),
        (options.done, Flag::Done),
        (options.collection, Flag::Collection),
    ]
    .into_iter()
    .find_map(|(set, flag)| set.then_some(flag));

    match picked {
        Some(flag) => vec![flag],
        None => LISTED_FLAGS.to_vec(),
    }
}
