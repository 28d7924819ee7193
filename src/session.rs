//! Per-session language selection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{NarraiError, Result};
use crate::language::Language;

/// Keyed storage for the language each chat session selected.
pub trait SessionStore: Send + Sync {
    fn language(&self, session: &str) -> Option<Language>;
    fn set_language(&self, session: &str, language: Language) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    languages: RwLock<HashMap<String, Language>>,
}

impl SessionStore for MemorySessionStore {
    fn language(&self, session: &str) -> Option<Language> {
        self.languages
            .read()
            .ok()
            .and_then(|map| map.get(session).copied())
    }

    fn set_language(&self, session: &str, language: Language) -> Result<()> {
        let mut map = self
            .languages
            .write()
            .map_err(|_| NarraiError::config("session store lock poisoned"))?;
        map.insert(session.to_string(), language);
        Ok(())
    }
}

/// Session store persisted as a JSON object on disk.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: MemorySessionStore,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = MemorySessionStore::default();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, Language>>(&raw) {
                Ok(entries) => {
                    for (session, language) in entries {
                        cache.set_language(&session, language)?;
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unreadable session file"),
            }
        }

        debug!(path = %path.display(), "Opened session store");
        Ok(Self { path, cache })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let snapshot = self
            .cache
            .languages
            .read()
            .map_err(|_| NarraiError::config("session store lock poisoned"))?
            .clone();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn language(&self, session: &str) -> Option<Language> {
        self.cache.language(session)
    }

    fn set_language(&self, session: &str, language: Language) -> Result<()> {
        self.cache.set_language(session, language)?;
        self.persist()
    }
}
