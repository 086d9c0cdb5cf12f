//! Storage layer
//!
//! Handles the on-disk journal file and the query primitives the
//! document store evaluates against it.
//!
//! ## Architecture
//!
//! - **Journal file**: JSON lines, append-only until compacted
//! - **Query**: filters, sorting and partial updates over entries

pub mod error;
pub mod persistence;
pub mod query;

pub use error::{StorageError, StorageResult};
pub use persistence::JournalFile;
pub use query::{
    Condition, Field, Filter, FindOptions, Sort, SortKey, SortOrder, Update, DEFAULT_LIMIT,
};
