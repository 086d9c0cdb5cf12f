//! Done command
//!
//! Completing a task takes two store calls that are not atomic:
//!
//! 1. the open task is rewritten in place to flag `~`
//! 2. a new `x` entry is inserted with `parent` set to the task's hash
//!
//! A failure between the two leaves a `~` task without its `x` record.

use chrono::NaiveDate;
use tracing::debug;

use super::commit::{today, Commit};
use super::{CommandKind, FilterBuilder};
use crate::error::Result;
use crate::models::{format_text, Entry, Flag};
use crate::options::Options;
use crate::storage::{Condition, Field, Filter, Update};
use crate::store::DocumentStore;
use crate::validation::{require_hash, validate};

/// Marks an open task as done
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Done {
    hash: String,
    date: NaiveDate,
}

impl Done {
    /// `hash` is a content hash prefix of at least 7 characters
    pub fn new(hash: impl Into<String>, options: &Options) -> Result<Self> {
        let kind = CommandKind::Done;
        let hash = hash.into();

        validate(kind.name(), kind.options(), options)?;
        require_hash(kind.name(), &hash)?;

        Ok(Self {
            hash,
            date: options.parsed_date().unwrap_or_else(today),
        })
    }

    /// Complete the task, returning the new `x` entry or `None` if no open task matched
    pub fn run<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<Option<Entry>> {
        debug!("Done::run {}", self.hash);

        let Some(task) = store.find_one(&self.filter())? else {
            debug!("no open task matches {}", self.hash);
            return Ok(None);
        };

        let rewrite = Update {
            flag: Some(Flag::Completing),
            text: Some(format_text(Flag::Completing, task.body())),
        };
        let by_hash = Filter::new().and(Condition::Equals(
            Field::ContentHash,
            task.content_hash.clone(),
        ));
        store.update(&by_hash, &rewrite)?;

        let completion = Commit::completion(&task, self.date).run(store)?;
        Ok(Some(completion))
    }
}

impl FilterBuilder for Done {
    fn filter(&self) -> Filter {
        Filter::new().hash_prefix(&self.hash).flag(Flag::Task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FindOptions;
    use crate::store::{ErrorMode, Store};

    fn open_task(store: &mut Store, body: &str) -> Entry {
        let options = Options {
            task: true,
            ..Options::default()
        };
        Commit::new(body, &options).unwrap().run(store).unwrap()
    }

    #[test]
    fn test_hash_is_required() {
        assert!(Done::new("", &Options::default()).is_err());
        let err = Done::new("abc", &Options::default()).unwrap_err();
        assert_eq!(err.field(), Some("hash"));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let options = Options {
            date: Some("not-a-date".into()),
            ..Options::default()
        };
        assert!(Done::new("abcdef1", &options).is_err());
    }

    #[test]
    fn test_done_rewrites_task_and_appends_completion() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let task = open_task(&mut store, "Write report");

        let completion = Done::new(task.short_hash(), &Options::default())
            .unwrap()
            .run(&mut store)
            .unwrap()
            .unwrap();

        assert_eq!(completion.flag, Flag::Done);
        assert_eq!(completion.text, "x Write report");
        assert_eq!(completion.parent.as_deref(), Some(task.content_hash.as_str()));
        assert_eq!(completion.date, today());

        let original = store
            .find_one(&Filter::new().and(Condition::Equals(
                Field::ContentHash,
                task.content_hash.clone(),
            )))
            .unwrap()
            .unwrap();
        assert_eq!(original.flag, Flag::Completing);
        assert_eq!(original.text, "~ Write report");
        assert_eq!(original.content_hash, task.content_hash);

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_done_uses_given_date() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let task = open_task(&mut store, "Backdated");
        let options = Options {
            date: Some("2021-07-04".into()),
            ..Options::default()
        };

        let completion = Done::new(task.short_hash(), &options)
            .unwrap()
            .run(&mut store)
            .unwrap()
            .unwrap();
        assert_eq!(completion.date, NaiveDate::from_ymd_opt(2021, 7, 4).unwrap());
    }

    #[test]
    fn test_done_twice_is_not_found() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let task = open_task(&mut store, "Once");
        let done = Done::new(task.short_hash(), &Options::default()).unwrap();

        assert!(done.run(&mut store).unwrap().is_some());
        assert!(done.run(&mut store).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_done_ignores_non_tasks() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let note = Commit::new("just a note", &Options::default())
            .unwrap()
            .run(&mut store)
            .unwrap();

        let result = Done::new(note.short_hash(), &Options::default())
            .unwrap()
            .run(&mut store)
            .unwrap();
        assert!(result.is_none());

        let all = store
            .find(&Filter::new(), &FindOptions::default())
            .unwrap();
        assert_eq!(all, vec![note]);
    }

    #[test]
    fn test_done_on_journal_without_ids() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let note = Entry::new(Flag::Note, "first", date, chrono::Utc::now());
        let task = Entry::new(Flag::Task, "second", date, chrono::Utc::now());
        let lines = format!(
            "{}\n{}\n",
            serde_json::to_string(&note).unwrap(),
            serde_json::to_string(&task).unwrap()
        );
        std::fs::write(&path, lines).unwrap();

        let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();
        Done::new(task.short_hash(), &Options::default())
            .unwrap()
            .run(&mut store)
            .unwrap()
            .unwrap();

        let texts = |store: &Store| -> Vec<String> {
            let mut texts: Vec<String> = store
                .find(&Filter::new(), &FindOptions::default())
                .unwrap()
                .into_iter()
                .map(|e| e.text)
                .collect();
            texts.sort();
            texts
        };
        let expected = vec!["- first", "x second", "~ second"];
        assert_eq!(texts(&store), expected);

        let reopened = Store::open(&path, ErrorMode::Fatal).unwrap();
        assert_eq!(texts(&reopened), expected);
        assert!(reopened
            .find_one(&Filter::new().flag(Flag::Task))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_long_task_body_survives_completion() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        let options = Options {
            task: true,
            limit: Some("200".into()),
            ..Options::default()
        };
        let body = "b".repeat(120);
        let task = Commit::new(body.as_str(), &options)
            .unwrap()
            .run(&mut store)
            .unwrap();

        let completion = Done::new(task.short_hash(), &Options::default())
            .unwrap()
            .run(&mut store)
            .unwrap()
            .unwrap();
        assert_eq!(completion.body(), body);
    }
}
