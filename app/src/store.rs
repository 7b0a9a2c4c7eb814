//! Persistence of player progression between sessions.

use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};
use farm_royale_core::BattleRecord;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Everything persisted about a player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Trophies, arena, collection and deck.
    pub battle: BattleRecord,
    /// Coin balance.
    pub coins: u64,
    /// Gem balance.
    pub gems: u64,
    /// Player level.
    pub player_level: u32,
    /// Experience carried towards the next player level.
    pub experience: u64,
}

/// Backing storage for [`SaveData`].
pub trait GameStore {
    /// Reads the stored save, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<SaveData>>;

    /// Replaces the stored save.
    fn save(&mut self, data: &SaveData) -> Result<()>;
}

/// Store keeping the save as pretty-printed JSON in a single file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GameStore for JsonFileStore {
    fn load(&self) -> Result<Option<SaveData>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read save file {}", self.path.display()))?;
        let data = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse save file {}", self.path.display()))?;
        Ok(Some(data))
    }

    /// Stages the save in a sibling temporary file, then renames it into place.
    fn save(&mut self, data: &SaveData) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let raw = serde_json::to_string_pretty(data).context("failed to encode save data")?;
        let mut staged = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to stage save in {}", parent.display()))?;
        staged
            .write_all(raw.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .with_context(|| format!("failed to write staged save for {}", self.path.display()))?;
        let _ = staged
            .persist(&self.path)
            .with_context(|| format!("failed to replace save file {}", self.path.display()))?;
        Ok(())
    }
}

/// Store keeping the save in memory, for tests and throwaway sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<SaveData>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self) -> Result<Option<SaveData>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        self.data = Some(data.clone());
        Ok(())
    }
}
