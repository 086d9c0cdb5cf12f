//! Data models for pus
//!
//! Defines the journal entry and its single-character flag.
//! Entries are stored one per line as camelCase JSON documents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use uuid::Uuid;

/// Length of the user-facing short hash
pub const SHORT_HASH_LEN: usize = 7;

/// Classification of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    /// Open task `.`
    #[serde(rename = ".")]
    Task,
    /// Event `o`
    #[serde(rename = "o")]
    Event,
    /// Note `-`
    #[serde(rename = "-")]
    Note,
    /// Completed task `x`
    #[serde(rename = "x")]
    Done,
    /// Collection `c`
    #[serde(rename = "c")]
    Collection,
    /// Task being marked done `~`
    #[serde(rename = "~")]
    Completing,
}

impl Flag {
    /// All flags, in display order
    pub const ALL: [Flag; 6] = [
        Flag::Task,
        Flag::Event,
        Flag::Note,
        Flag::Done,
        Flag::Collection,
        Flag::Completing,
    ];

    /// The character persisted for this flag
    pub fn as_char(self) -> char {
        match self {
            Flag::Task => '.',
            Flag::Event => 'o',
            Flag::Note => '-',
            Flag::Done => 'x',
            Flag::Collection => 'c',
            Flag::Completing => '~',
        }
    }

    /// Parse a flag from its character
    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_char() == c)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| format!("unknown flag '{}'", s)),
            _ => Err(format!("flag must be a single character, got '{}'", s)),
        }
    }
}

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Store-assigned identifier, `None` until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// SHA-1 hex digest of `{createdAt}|{date}|{body}`
    pub content_hash: String,
    /// Calendar day the entry belongs to
    pub date: NaiveDate,
    /// Classification
    pub flag: Flag,
    /// The flag character, a space, and the body
    pub text: String,
    /// When this entry was created
    pub created_at: DateTime<Utc>,
    /// Hash of the entry this one continues from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Hash of the collection this entry belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Entry {
    /// Build an entry, computing its content hash from `created_at`, `date` and `body`
    pub fn new(flag: Flag, body: &str, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            content_hash: content_hash(created_at, date, body),
            date,
            flag,
            text: format_text(flag, body),
            created_at,
            parent: None,
            collection: None,
        }
    }

    /// Attach a parent hash
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// The 7-character reference shown to users
    pub fn short_hash(&self) -> &str {
        self.content_hash
            .get(..SHORT_HASH_LEN)
            .unwrap_or(&self.content_hash)
    }

    /// The text without its two-character flag prefix
    pub fn body(&self) -> &str {
        self.text.get(2..).unwrap_or("")
    }

    /// Whether the store has assigned an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Persisted text: flag, space, body
pub fn format_text(flag: Flag, body: &str) -> String {
    format!("{} {}", flag, body)
}

/// Digest identifying an entry
///
/// The timestamp is rendered with nanosecond precision so identical
/// same-day bodies committed back to back still hash apart.
pub fn content_hash(created_at: DateTime<Utc>, date: NaiveDate, body: &str) -> String {
    let stamp = created_at.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let mut hasher = Sha1::new();
    hasher.update(format!("{}|{}|{}", stamp, date, body).as_bytes());
    hex::encode(hasher.finalize())
}
