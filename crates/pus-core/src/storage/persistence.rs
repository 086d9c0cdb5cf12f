//! Journal file persistence
//!
//! Entries live in a JSON-lines file, one document per line. Inserts and
//! updates append; when an id appears more than once the last line wins.
//! Compaction rewrites the file atomically (temp file, fsync, rename).
//!
//! Lines without an id are given one on load. A torn final line, left by
//! an interrupted append, is dropped; a malformed line anywhere else is an
//! error.
//!
//! Storage location: `~/.pus/commits.db` (configurable via `Config`)

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Entry;
use crate::storage::error::{StorageError, StorageResult};

/// Entries read from disk
#[derive(Debug, Default)]
pub struct Loaded {
    /// Live entries in first-seen order
    pub entries: Vec<Entry>,
    /// Lines shadowed by a later line with the same id
    pub superseded: usize,
    /// Lines changed on load: missing ids assigned, torn tail dropped
    pub repaired: usize,
}

impl Loaded {
    /// Whether the file differs from the live entries
    pub fn needs_compaction(&self) -> bool {
        self.superseded > 0 || self.repaired > 0
    }
}

/// Append-oriented JSON-lines file
#[derive(Debug, Clone)]
pub struct JournalFile {
    path: PathBuf,
}

impl JournalFile {
    /// Open the file, creating it and its directory if needed
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if !path.exists() {
            File::create(&path).map_err(|e| StorageError::from_io(e, path.clone()))?;
            debug!("created journal file {:?}", path);
        }

        Ok(Self { path })
    }

    /// Handle to `path` without touching the filesystem
    pub(crate) fn unchecked(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry
    pub fn load(&self) -> StorageResult<Loaded> {
        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::ReadError {
            path: self.path.clone(),
            source,
        })?;

        let mut loaded = Loaded::default();
        let mut positions: HashMap<Uuid, usize> = HashMap::new();

        let lines: Vec<(usize, &str)> = content
            .lines()
            .map(str::trim)
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .collect();
        let last = lines.last().map(|(index, _)| *index);

        for (index, line) in lines {
            let mut entry: Entry = match serde_json::from_str(line) {
                Ok(entry) => entry,
                Err(e) if Some(index) == last => {
                    warn!(
                        "dropping torn last line {} of {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                    loaded.repaired += 1;
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::InvalidFormat {
                        path: self.path.clone(),
                        line: index + 1,
                        details: e.to_string(),
                    })
                }
            };

            if entry.id.is_none() {
                entry.id = Some(Uuid::new_v4());
                loaded.repaired += 1;
            }

            match entry.id.and_then(|id| positions.get(&id).copied()) {
                Some(pos) => {
                    loaded.entries[pos] = entry;
                    loaded.superseded += 1;
                }
                None => {
                    if let Some(id) = entry.id {
                        positions.insert(id, loaded.entries.len());
                    }
                    loaded.entries.push(entry);
                }
            }
        }

        Ok(loaded)
    }

    /// Append one entry as a new line
    pub fn append(&self, entry: &Entry) -> StorageResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::from_io(e, self.path.clone()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StorageError::from_io(e, self.path.clone()))?;

        Ok(())
    }

    /// Replace the file contents with exactly these entries
    pub fn rewrite(&self, entries: &[Entry]) -> StorageResult<()> {
        let mut data = String::new();
        for entry in entries {
            data.push_str(&serde_json::to_string(entry)?);
            data.push('\n');
        }
        atomic_write(&self.path, data.as_bytes())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
