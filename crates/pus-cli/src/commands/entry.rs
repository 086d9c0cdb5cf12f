//! Commit, collection, done and show handlers

use anyhow::{Context, Result};
use tracing::debug;

use pus_core::{Command, Commit, Done, DocumentStore, Options, Outcome, Show};

use crate::output::Output;

/// Message printed when `done` matches no open task
pub const TASK_NOT_FOUND: &str = "Task not found!";

/// Commit a task, event or note
pub fn commit<S: DocumentStore + ?Sized>(
    store: &mut S,
    text: String,
    options: Options,
    output: &Output,
) -> Result<()> {
    let command = Commit::new(text, &options)?;
    execute(store, command.into(), output)
}

/// Commit a collection
pub fn collection<S: DocumentStore + ?Sized>(
    store: &mut S,
    text: String,
    options: Options,
    output: &Output,
) -> Result<()> {
    let command = Commit::collection(text, &options)?;
    execute(store, command.into(), output)
}

/// Mark an open task as done
pub fn done<S: DocumentStore + ?Sized>(
    store: &mut S,
    hash: String,
    options: Options,
    output: &Output,
) -> Result<()> {
    let command = Done::new(hash, &options)?;
    execute(store, command.into(), output)
}

/// Show an entry and the entries it descends from
pub fn show<S: DocumentStore + ?Sized>(store: &mut S, hash: String, output: &Output) -> Result<()> {
    let command = Show::new(hash)?;
    execute(store, command.into(), output)
}

/// Run a command and render what it produced
pub fn execute<S: DocumentStore + ?Sized>(
    store: &mut S,
    command: Command,
    output: &Output,
) -> Result<()> {
    let kind = command.kind();
    debug!("executing {}", kind);

    let outcome = command
        .run(store)
        .with_context(|| format!("Failed to run '{}'", kind))?;

    match outcome {
        Outcome::Created(entry) | Outcome::Completed(entry) => output.print_entry(&entry),
        Outcome::Entries(entries) => output.print_entries(&entries),
        Outcome::NotFound => {
            output.not_found(TASK_NOT_FOUND);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use pus_core::storage::Filter;
    use pus_core::{ErrorMode, Flag, Store};

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_commit_persists() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let options = Options {
            task: true,
            ..Options::default()
        };

        commit(&mut store, "Buy milk".into(), options, &quiet()).unwrap();

        let entry = store.find_one(&Filter::new()).unwrap().unwrap();
        assert_eq!(entry.text, ". Buy milk");
    }

    #[test]
    fn test_collection_forces_flag() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        collection(&mut store, "Books".into(), Options::default(), &quiet()).unwrap();

        let entry = store.find_one(&Filter::new()).unwrap().unwrap();
        assert_eq!(entry.flag, Flag::Collection);
    }

    #[test]
    fn test_invalid_option_is_an_error() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let options = Options {
            date: Some("yesterday".into()),
            ..Options::default()
        };

        let err = commit(&mut store, "x".into(), options, &quiet()).unwrap_err();
        assert!(err.to_string().contains("See 'pus commit --help'"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_done_unknown_hash_is_not_an_error() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        done(&mut store, "abcdef1".into(), Options::default(), &quiet()).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_done_then_show() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let options = Options {
            task: true,
            ..Options::default()
        };
        commit(&mut store, "Call mom".into(), options, &quiet()).unwrap();
        let task = store.find_one(&Filter::new()).unwrap().unwrap();

        done(
            &mut store,
            task.short_hash().to_string(),
            Options::default(),
            &quiet(),
        )
        .unwrap();
        assert_eq!(store.count().unwrap(), 2);

        show(&mut store, task.short_hash().to_string(), &quiet()).unwrap();
        assert!(show(&mut store, "abc".into(), &quiet()).is_err());
    }
}
