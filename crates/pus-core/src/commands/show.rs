//! Show command
//!
//! Resolves a hash and walks its `parent` links back to the root,
//! returning every visited entry, newest first.

use std::collections::HashSet;

use tracing::debug;

use super::CommandKind;
use crate::error::Result;
use crate::models::Entry;
use crate::storage::{Filter, Sort, SortKey};
use crate::store::DocumentStore;
use crate::validation::require_hash;

/// Retrieves an entry together with its ancestors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    hash: String,
}

impl Show {
    pub fn new(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        require_hash(CommandKind::Show.name(), &hash)?;
        Ok(Self { hash })
    }

    /// The chain starting at the hash; empty when the hash matches nothing
    ///
    /// A missing parent ends the walk with what was collected so far.
    pub fn run<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<Vec<Entry>> {
        let mut chain: Vec<Entry> = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(self.hash.clone());

        while let Some(hash) = next.take() {
            debug!("Show::run resolving {}", hash);
            let Some(entry) = store.find_one(&Filter::new().hash_prefix(hash))? else {
                break;
            };
            if !seen.insert(entry.content_hash.clone()) {
                break;
            }
            next = entry.parent.clone();
            chain.push(entry);
        }

        let newest_first = Sort::descending(SortKey::CreatedAt);
        chain.sort_by(|a, b| newest_first.compare(a, b));
        Ok(chain)
    }
}
