//! Conversation persistence keyed by repository identifier.
//!
//! Each repository gets an independent, bounded log of question/answer
//! entries. The persistence medium is abstracted behind the [`Storage`]
//! key-value trait so the same store logic runs against a directory of
//! JSON files, an in-memory map, or anything else that can hold bytes
//! under a string key.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::{STORE_APPENDS, STORE_CORRUPTIONS, STORE_LOADS};
use crate::types::{ConversationEntry, ConversationLog};

/// Version tag written into every persisted log envelope.
const LOG_FORMAT_VERSION: u8 = 1;

/// A byte-oriented key-value store.
///
/// Keys are repository identifiers and may contain characters that are not
/// legal in file names; implementations must accept any string key.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Storage backed by one file per key under a root directory.
///
/// File names are the URL-safe base64 encoding of the key, so arbitrary
/// repository identifiers (slashes, colons, unicode) map to distinct
/// files without collisions.
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Creates a storage rooted at `root`. The directory is created on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        name.push_str(".json");
        self.root.join(name)
    }
}

impl Storage for DirStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io("failed to read conversation log", err)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|err| Error::io("failed to create storage directory", err))?;
        fs::write(self.path_for(key), value)
            .map_err(|err| Error::io("failed to write conversation log", err))
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Envelope persisted for each repository's log.
#[derive(Serialize, Deserialize)]
struct StoredLog {
    version: u8,
    entries: Vec<ConversationEntry>,
}

/// Maps repository identifiers to bounded conversation logs and keeps
/// them durable.
///
/// Appends for any identifier are serialized behind one mutex, so a
/// concurrent [`load`] observes either the pre-append or the post-append
/// log, never a partial write. Unreadable or malformed persisted data is
/// treated as an absent log; corruption never surfaces to the caller.
///
/// [`load`]: ConversationStore::load
pub struct ConversationStore {
    storage: Box<dyn Storage>,
    logs: Mutex<HashMap<String, ConversationLog>>,
}

impl ConversationStore {
    /// Creates a store over the given persistence medium.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the log for `repo_identifier`, or an empty log if none was
    /// ever persisted or the persisted bytes do not parse.
    pub fn load(&self, repo_identifier: &str) -> ConversationLog {
        STORE_LOADS.click();
        let mut logs = self.logs.lock().expect("store lock poisoned");
        if let Some(log) = logs.get(repo_identifier) {
            return log.clone();
        }
        let log = self.read_persisted(repo_identifier);
        logs.insert(repo_identifier.to_string(), log.clone());
        log
    }

    /// Appends `entry` to the log for `repo_identifier`, enforces the
    /// entry cap, and persists the result.
    ///
    /// The cache is only updated after the persist succeeds, so a failed
    /// write leaves the observable log unchanged.
    pub fn append(&self, repo_identifier: &str, entry: ConversationEntry) -> Result<()> {
        STORE_APPENDS.click();
        let mut logs = self.logs.lock().expect("store lock poisoned");
        let mut next = match logs.get(repo_identifier) {
            Some(log) => log.clone(),
            None => self.read_persisted(repo_identifier),
        };
        next.push(entry);

        let envelope = StoredLog {
            version: LOG_FORMAT_VERSION,
            entries: next.entries.clone(),
        };
        let payload = serde_json::to_vec(&envelope)?;
        self.storage.set(repo_identifier, &payload)?;

        logs.insert(repo_identifier.to_string(), next);
        Ok(())
    }

    fn read_persisted(&self, repo_identifier: &str) -> ConversationLog {
        let bytes = match self.storage.get(repo_identifier) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return ConversationLog::new(),
            Err(_) => {
                STORE_CORRUPTIONS.click();
                return ConversationLog::new();
            }
        };
        match serde_json::from_slice::<StoredLog>(&bytes) {
            Ok(stored) if stored.version == LOG_FORMAT_VERSION => ConversationLog {
                entries: stored.entries,
            },
            _ => {
                STORE_CORRUPTIONS.click();
                ConversationLog::new()
            }
        }
    }
}
