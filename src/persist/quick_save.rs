//! Named parameter snapshots kept in a single JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schema::ParamsPatch;

use super::{PersistError, now_millis};

/// One named snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickSave {
    pub timestamp: u64,
    pub params: ParamsPatch,
}

/// Listing entry returned by [`QuickSaveStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickSaveEntry {
    pub name: String,
    pub timestamp: u64,
}

/// File-backed map of name to [`QuickSave`].
///
/// Every operation re-reads the file, so several stores may share a path.
#[derive(Debug, Clone)]
pub struct QuickSaveStore {
    path: PathBuf,
}

impl QuickSaveStore {
    /// Open a store at `path`. The file is created on first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, name: &str, params: ParamsPatch) -> Result<(), PersistError> {
        let mut saves = self.read_all()?;
        saves.insert(
            name.to_string(),
            QuickSave {
                timestamp: now_millis(),
                params,
            },
        );
        self.write_all(&saves)
    }

    pub fn load(&self, name: &str) -> Result<Option<QuickSave>, PersistError> {
        Ok(self.read_all()?.remove(name))
    }

    /// Names and timestamps, in name order.
    pub fn list(&self) -> Result<Vec<QuickSaveEntry>, PersistError> {
        Ok(self
            .read_all()?
            .into_iter()
            .map(|(name, save)| QuickSaveEntry {
                name,
                timestamp: save.timestamp,
            })
            .collect())
    }

    /// Remove a snapshot. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool, PersistError> {
        let mut saves = self.read_all()?;
        let existed = saves.remove(name).is_some();
        if existed {
            self.write_all(&saves)?;
        }
        Ok(existed)
    }

    fn read_all(&self) -> Result<BTreeMap<String, QuickSave>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, saves: &BTreeMap<String, QuickSave>) -> Result<(), PersistError> {
        let text = serde_json::to_string_pretty(saves)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
