//! Query primitives for the document store
//!
//! A [`Filter`] is a conjunction of [`Condition`]s evaluated against entry
//! fields. Results are ordered by a [`Sort`] and capped by a limit.

use std::cmp::Ordering;

use regex::Regex;

use crate::models::{Entry, Flag};

/// Result cap applied when the caller supplies none
pub const DEFAULT_LIMIT: usize = 100;

/// Entry fields a filter can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    ContentHash,
    Date,
    Flag,
    Text,
    Collection,
}

impl Field {
    /// String view of the field on an entry, `None` when unset
    pub fn value(self, entry: &Entry) -> Option<String> {
        match self {
            Field::Id => entry.id.map(|id| id.to_string()),
            Field::ContentHash => Some(entry.content_hash.clone()),
            Field::Date => Some(entry.date.format("%Y-%m-%d").to_string()),
            Field::Flag => Some(entry.flag.to_string()),
            Field::Text => Some(entry.text.clone()),
            Field::Collection => entry.collection.clone(),
        }
    }
}

/// A single predicate on one field
#[derive(Debug, Clone)]
pub enum Condition {
    /// Exact match
    Equals(Field, String),
    /// Exact match against any of the values
    OneOf(Field, Vec<String>),
    /// Prefix match, used for short hash lookups
    StartsWith(Field, String),
    /// Regular expression match
    Matches(Field, Regex),
    /// Lexicographic `>=`, valid for ISO dates and timestamps
    AtLeast(Field, String),
}

impl Condition {
    /// The field this condition looks at
    pub fn field(&self) -> Field {
        match self {
            Condition::Equals(field, _)
            | Condition::OneOf(field, _)
            | Condition::StartsWith(field, _)
            | Condition::Matches(field, _)
            | Condition::AtLeast(field, _) => *field,
        }
    }

    /// Whether the entry satisfies this condition
    pub fn matches(&self, entry: &Entry) -> bool {
        let Some(value) = self.field().value(entry) else {
            return false;
        };

        match self {
            Condition::Equals(_, expected) => value == *expected,
            Condition::OneOf(_, options) => options.iter().any(|o| *o == value),
            Condition::StartsWith(_, prefix) => value.starts_with(prefix.as_str()),
            Condition::Matches(_, re) => re.is_match(&value),
            Condition::AtLeast(_, bound) => value.as_str() >= bound.as_str(),
        }
    }
}

/// Conjunction of conditions; an empty filter matches everything
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Replace every condition on `field` with `condition`
    pub fn replace(mut self, field: Field, condition: Condition) -> Self {
        self.conditions.retain(|c| c.field() != field);
        self.conditions.push(condition);
        self
    }

    /// Match a single flag
    pub fn flag(self, flag: Flag) -> Self {
        self.and(Condition::Equals(Field::Flag, flag.to_string()))
    }

    /// Match any of the flags
    pub fn flags(self, flags: &[Flag]) -> Self {
        let values = flags.iter().map(|f| f.to_string()).collect();
        self.and(Condition::OneOf(Field::Flag, values))
    }

    /// Match a content hash by prefix
    pub fn hash_prefix(self, prefix: impl Into<String>) -> Self {
        self.and(Condition::StartsWith(Field::ContentHash, prefix.into()))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the entry satisfies every condition
    pub fn matches(&self, entry: &Entry) -> bool {
        self.conditions.iter().all(|c| c.matches(entry))
    }
}

/// Primary sort key; `createdAt` is always the tiebreaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            order: SortOrder::Descending,
        }
    }
}

impl Sort {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Descending,
        }
    }

    /// Compare two entries under this ordering
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let primary = match self.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::CreatedAt => Ordering::Equal,
        };
        let ordering = primary.then_with(|| a.created_at.cmp(&b.created_at));
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Sort and limit for `find`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            sort: None,
            limit: Some(limit),
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Effective sort
    pub fn sort(&self) -> Sort {
        self.sort.unwrap_or_default()
    }

    /// Effective limit; zero falls back to the default
    pub fn limit(&self) -> usize {
        match self.limit {
            Some(0) | None => DEFAULT_LIMIT,
            Some(limit) => limit,
        }
    }
}

/// Partial update; only the done transition mutates stored entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub flag: Option<Flag>,
    pub text: Option<String>,
}

impl Update {
    /// Apply to an entry, returning whether anything changed
    pub fn apply(&self, entry: &mut Entry) -> bool {
        let mut changed = false;
        if let Some(flag) = self.flag {
            changed |= entry.flag != flag;
            entry.flag = flag;
        }
        if let Some(text) = &self.text {
            changed |= entry.text != *text;
            entry.text = text.clone();
        }
        changed
    }
}

/// Filter, sort and cap a set of entries
pub fn select<'a, I>(entries: I, filter: &Filter, options: &FindOptions) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut found: Vec<Entry> = entries
        .into_iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();
    let sort = options.sort();
    found.sort_by(|a, b| sort.compare(a, b));
    found.truncate(options.limit());
    found
}
