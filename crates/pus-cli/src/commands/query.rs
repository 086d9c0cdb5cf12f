//! Log, grep and status handlers

use anyhow::Result;

use pus_core::{DocumentStore, Options, Query};

use crate::output::Output;

/// List entries, newest first
pub fn log<S: DocumentStore + ?Sized>(store: &S, options: Options, output: &Output) -> Result<()> {
    let entries = Query::log(&options)?.run(store)?;
    output.print_entries(&entries)
}

/// List entries whose text matches a regular expression
pub fn grep<S: DocumentStore + ?Sized>(
    store: &S,
    exp: String,
    options: Options,
    output: &Output,
) -> Result<()> {
    let entries = Query::grep(&exp, &options)?.run(store)?;
    output.print_entries(&entries)
}

/// List open tasks
pub fn status<S: DocumentStore + ?Sized>(
    store: &S,
    options: Options,
    output: &Output,
) -> Result<()> {
    let entries = Query::status(&options)?.run(store)?;
    output.print_entries(&entries)
}
