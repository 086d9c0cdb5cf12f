//! Document store
//!
//! The `Store` keeps every entry of one journal file in memory and
//! writes through to disk on insert and update.
//!
//! ## Error modes
//!
//! - [`ErrorMode::Fatal`]: every persistence failure is returned to the caller
//! - [`ErrorMode::Quiet`]: failures are logged and the operation yields an
//!   empty fallback, so test harnesses can keep going
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_with_config(&config)?;
//!
//! let entry = store.insert(entry)?;
//! let tasks = store.find(&Filter::new().flag(Flag::Task), &FindOptions::default())?;
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::Entry;
use crate::storage::query::select;
use crate::storage::{Filter, FindOptions, JournalFile, StorageResult, Update};

/// How persistence failures surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Return every error to the caller
    #[default]
    Fatal,
    /// Log errors and return fallbacks
    Quiet,
}

/// Operations the journal commands run against
pub trait DocumentStore {
    /// Persist a new entry, assigning its id
    fn insert(&mut self, entry: Entry) -> StorageResult<Entry>;

    /// Number of stored entries
    fn count(&self) -> StorageResult<usize>;

    /// Matching entries, sorted and capped
    fn find(&self, filter: &Filter, options: &FindOptions) -> StorageResult<Vec<Entry>>;

    /// Most recent matching entry under the default sort
    fn find_one(&self, filter: &Filter) -> StorageResult<Option<Entry>>;

    /// Apply a partial update to every match, returning how many were updated
    fn update(&mut self, filter: &Filter, update: &Update) -> StorageResult<usize>;
}

/// File-backed document store
pub struct Store {
    /// Live entries
    entries: Vec<Entry>,
    /// Backing file, `None` for in-memory stores
    file: Option<JournalFile>,
    /// How failures surface
    mode: ErrorMode,
}

impl Store {
    /// Open the journal at `path`, creating it if needed
    ///
    /// Superseded lines left behind by updates are compacted away.
    pub fn open(path: impl Into<PathBuf>, mode: ErrorMode) -> StorageResult<Self> {
        let path = path.into();
        info!("opening journal {:?} ({:?})", path, mode);

        let opened = JournalFile::open(&path).and_then(|file| {
            let loaded = file.load()?;
            Ok((file, loaded))
        });

        let (file, loaded) = match opened {
            Ok(opened) => opened,
            Err(e) if mode == ErrorMode::Quiet => {
                warn!("failed to open journal {:?}: {}", path, e);
                return Ok(Self {
                    entries: Vec::new(),
                    file: Some(JournalFile::unchecked(path)),
                    mode,
                });
            }
            Err(e) => return Err(e),
        };

        let needs_compaction = loaded.needs_compaction();
        let mut store = Self {
            entries: loaded.entries,
            file: Some(file),
            mode,
        };

        if needs_compaction {
            info!(
                "compacting journal ({} superseded, {} repaired)",
                loaded.superseded, loaded.repaired
            );
            store.compact()?;
        }

        Ok(store)
    }

    /// Open the journal selected by the configuration's environment
    pub fn open_with_config(config: &Config) -> StorageResult<Self> {
        Self::open(config.entries_path(), config.environment.error_mode())
    }

    /// A store that never touches disk (for testing)
    pub fn in_memory(mode: ErrorMode) -> Self {
        Self {
            entries: Vec::new(),
            file: None,
            mode,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Rewrite the backing file with only the live entries
    pub fn compact(&mut self) -> StorageResult<()> {
        let result = match &self.file {
            Some(file) => file.rewrite(&self.entries),
            None => Ok(()),
        };
        self.settle("compact", result, || ())
    }

    /// Resolve a failed operation according to the error mode
    fn settle<T>(
        &self,
        op: &str,
        result: StorageResult<T>,
        fallback: impl FnOnce() -> T,
    ) -> StorageResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => match self.mode {
                ErrorMode::Fatal => Err(e),
                ErrorMode::Quiet => {
                    warn!("error while trying to {}: {}", op, e);
                    Ok(fallback())
                }
            },
        }
    }
}

impl DocumentStore for Store {
    fn insert(&mut self, mut entry: Entry) -> StorageResult<Entry> {
        debug!("Store::insert {}", entry.short_hash());

        let unsaved = entry.clone();
        entry.id = Some(Uuid::new_v4());

        let result = match &self.file {
            Some(file) => file.append(&entry),
            None => Ok(()),
        };
        let persisted = result.is_ok();
        let entry = self.settle("insert", result.map(|_| entry), || unsaved)?;

        if persisted {
            self.entries.push(entry.clone());
        }
        Ok(entry)
    }

    fn count(&self) -> StorageResult<usize> {
        debug!("Store::count");
        Ok(self.entries.len())
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> StorageResult<Vec<Entry>> {
        debug!("Store::find {:?}", options);
        Ok(select(&self.entries, filter, options))
    }

    fn find_one(&self, filter: &Filter) -> StorageResult<Option<Entry>> {
        debug!("Store::find_one");
        let found = select(&self.entries, filter, &FindOptions::with_limit(1));
        Ok(found.into_iter().next())
    }

    fn update(&mut self, filter: &Filter, update: &Update) -> StorageResult<usize> {
        debug!("Store::update {:?}", update);

        let mut changed = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if filter.matches(entry) {
                let mut next = entry.clone();
                update.apply(&mut next);
                changed.push((index, next));
            }
        }

        if let Some(file) = &self.file {
            let written = changed.iter().try_for_each(|(_, e)| file.append(e));
            if let Err(e) = written {
                return self.settle("update", Err(e), || 0);
            }
        }

        let updated = changed.len();
        for (index, next) in changed {
            self.entries[index] = next;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flag;
    use crate::storage::{Condition, Field, StorageError};
    use chrono::{Local, NaiveDate, Utc};
    use tempfile::TempDir;

    fn note(body: &str) -> Entry {
        Entry::new(Flag::Note, body, Local::now().date_naive(), Utc::now())
    }

    fn completing(text: &str) -> Update {
        Update {
            flag: Some(Flag::Completing),
            text: Some(text.into()),
        }
    }

    fn dated(flag: Flag, body: &str, day: u32) -> Entry {
        Entry::new(
            flag,
            body,
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_open_creates_journal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".pus").join("commits.db");

        let store = Store::open(&path, ErrorMode::Fatal).unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_assigns_id_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");

        let hash;
        {
            let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();
            let entry = store.insert(note("Hello World")).unwrap();
            assert!(entry.is_persisted());
            hash = entry.content_hash.clone();
        }

        let store = Store::open(&path, ErrorMode::Fatal).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let found = store
            .find_one(&Filter::new().hash_prefix(&hash[..7]))
            .unwrap()
            .unwrap();
        assert_eq!(found.text, "- Hello World");
    }

    #[test]
    fn test_find_filters_sorts_and_limits() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        store.insert(dated(Flag::Task, "early task", 1)).unwrap();
        store.insert(dated(Flag::Note, "note", 2)).unwrap();
        store.insert(dated(Flag::Task, "late task", 3)).unwrap();

        let tasks = store
            .find(&Filter::new().flag(Flag::Task), &FindOptions::default())
            .unwrap();
        let bodies: Vec<_> = tasks.iter().map(|e| e.body()).collect();
        assert_eq!(bodies, vec!["late task", "early task"]);

        let capped = store
            .find(&Filter::new(), &FindOptions::with_limit(2))
            .unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_find_one_returns_most_recent() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        store.insert(dated(Flag::Task, "older", 1)).unwrap();
        store.insert(dated(Flag::Task, "newer", 9)).unwrap();

        let found = store
            .find_one(&Filter::new().flag(Flag::Task))
            .unwrap()
            .unwrap();
        assert_eq!(found.body(), "newer");
    }

    #[test]
    fn test_update_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");

        {
            let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();
            let entry = store.insert(dated(Flag::Task, "Buy milk", 1)).unwrap();
            let id = entry.id.unwrap().to_string();

            let updated = store
                .update(
                    &Filter::new().and(Condition::Equals(Field::Id, id)),
                    &Update {
                        flag: Some(Flag::Completing),
                        text: Some("~ Buy milk".into()),
                    },
                )
                .unwrap();
            assert_eq!(updated, 1);
        }

        // two lines on disk until the reopen compacts them
        let store = Store::open(&path, ErrorMode::Fatal).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);

        let entry = store.find_one(&Filter::new()).unwrap().unwrap();
        assert_eq!(entry.flag, Flag::Completing);
        assert_eq!(entry.text, "~ Buy milk");
    }

    #[test]
    fn test_update_without_match() {
        let mut store = Store::in_memory(ErrorMode::Fatal);
        store.insert(note("x")).unwrap();

        let updated = store
            .update(
                &Filter::new().flag(Flag::Task),
                &Update {
                    flag: Some(Flag::Done),
                    text: None,
                },
            )
            .unwrap();
        assert_eq!(updated, 0);
    }

    #[test]
    fn test_fatal_mode_propagates_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");
        std::fs::write(&path, "garbage\nmore garbage\n").unwrap();

        let result = Store::open(&path, ErrorMode::Fatal);
        assert!(matches!(result, Err(StorageError::InvalidFormat { .. })));
    }

    #[test]
    fn test_quiet_mode_swallows_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits-test.db");
        std::fs::write(&path, "garbage\nmore garbage\n").unwrap();

        let store = Store::open(&path, ErrorMode::Quiet).unwrap();
        assert_eq!(store.mode(), ErrorMode::Quiet);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_quiet_mode_insert_failure_returns_unsaved_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits-test.db");
        let mut store = Store::open(&path, ErrorMode::Quiet).unwrap();

        // a directory where the file should be makes every append fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let entry = store.insert(note("lost")).unwrap();
        assert!(!entry.is_persisted());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_quiet_mode_update_failure_returns_zero() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits-test.db");
        let mut store = Store::open(&path, ErrorMode::Quiet).unwrap();
        store.insert(dated(Flag::Task, "Buy milk", 1)).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let updated = store
            .update(&Filter::new().flag(Flag::Task), &completing("~ Buy milk"))
            .unwrap();
        assert_eq!(updated, 0);

        let entry = store.find_one(&Filter::new()).unwrap().unwrap();
        assert_eq!(entry.flag, Flag::Task);
    }

    #[test]
    fn test_fatal_mode_update_failure_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");
        let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();
        store.insert(dated(Flag::Task, "Buy milk", 1)).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let result = store.update(&Filter::new().flag(Flag::Task), &completing("~ Buy milk"));
        assert!(result.is_err());

        let entry = store.find_one(&Filter::new()).unwrap().unwrap();
        assert_eq!(entry.flag, Flag::Task);
    }

    #[test]
    fn test_update_on_journal_without_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");
        let lines: Vec<String> = [dated(Flag::Note, "first", 1), dated(Flag::Task, "second", 2)]
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect();
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        {
            let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();
            let updated = store
                .update(&Filter::new().flag(Flag::Task), &completing("~ second"))
                .unwrap();
            assert_eq!(updated, 1);

            let note = store
                .find_one(&Filter::new().flag(Flag::Note))
                .unwrap()
                .unwrap();
            assert_eq!(note.text, "- first");
        }

        let store = Store::open(&path, ErrorMode::Fatal).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        let open = store
            .find(&Filter::new().flag(Flag::Task), &FindOptions::default())
            .unwrap();
        assert!(open.is_empty());
        let texts: Vec<_> = store
            .find(&Filter::new(), &FindOptions::default())
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["~ second", "- first"]);
    }

    #[test]
    fn test_fatal_mode_insert_failure_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commits.db");
        let mut store = Store::open(&path, ErrorMode::Fatal).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.insert(note("lost")).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }
}
