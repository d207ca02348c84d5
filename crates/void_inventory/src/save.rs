//! Inventory snapshots and save backends

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Save system errors
#[derive(Debug, Error)]
pub enum SaveError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

fn default_weight_limit() -> f32 {
    100.0
}

/// Persisted state of one inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub inventory_name: String,
    /// Occupied slots only
    #[serde(default)]
    pub slots: Vec<SlotSnapshot>,
    #[serde(default)]
    pub unlocked_states_by_tab: Vec<TabUnlockSnapshot>,
    #[serde(default = "default_weight_limit")]
    pub current_weight_limit: f32,
}

/// One occupied slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub item_id: String,
    pub amount: u32,
    #[serde(default)]
    pub is_locked: bool,
    /// Position within the tab
    pub slot_index: usize,
    /// Tab the slot belongs to. Absent in older saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_name: Option<String>,
}

/// Unlock flags of one tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabUnlockSnapshot {
    pub tab_name: String,
    #[serde(default)]
    pub unlocked_states: Vec<UnlockStateSnapshot>,
}

/// Unlock flag of one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockStateSnapshot {
    pub state_id: String,
    pub unlocked: bool,
}

impl InventorySnapshot {
    pub fn new(inventory_name: impl Into<String>) -> Self {
        Self {
            inventory_name: inventory_name.into(),
            slots: Vec::new(),
            unlocked_states_by_tab: Vec::new(),
            current_weight_limit: default_weight_limit(),
        }
    }

    /// Saved unlock flags for a tab
    pub fn tab_states(&self, tab_name: &str) -> Option<&[UnlockStateSnapshot]> {
        self.unlocked_states_by_tab
            .iter()
            .find(|t| t.tab_name == tab_name)
            .map(|t| t.unlocked_states.as_slice())
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        serde_json::from_str(json).map_err(|e| SaveError::Deserialization(e.to_string()))
    }
}

/// Storage for inventory snapshots, keyed by inventory name
pub trait InventorySaveSystem: Send + Sync {
    fn save(&self, snapshot: &InventorySnapshot, inventory_name: &str) -> Result<(), SaveError>;

    /// `Ok(None)` when nothing was saved under this name
    fn load(&self, inventory_name: &str) -> Result<Option<InventorySnapshot>, SaveError>;
}

impl<T: InventorySaveSystem + ?Sized> InventorySaveSystem for Arc<T> {
    fn save(&self, snapshot: &InventorySnapshot, inventory_name: &str) -> Result<(), SaveError> {
        (**self).save(snapshot, inventory_name)
    }

    fn load(&self, inventory_name: &str) -> Result<Option<InventorySnapshot>, SaveError> {
        (**self).load(inventory_name)
    }
}

/// Writes `<dir>/<inventory name>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSaveSystem {
    save_dir: PathBuf,
}

impl JsonFileSaveSystem {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Save file path for an inventory
    pub fn path_for(&self, inventory_name: &str) -> PathBuf {
        self.save_dir.join(format!("{}.json", inventory_name))
    }

    /// Ensure save directory exists
    pub fn ensure_dir(&self) -> Result<(), SaveError> {
        fs::create_dir_all(&self.save_dir)?;
        Ok(())
    }

    /// Check if a save exists
    pub fn exists(&self, inventory_name: &str) -> bool {
        self.path_for(inventory_name).exists()
    }

    /// Delete a save
    pub fn delete(&self, inventory_name: &str) -> Result<(), SaveError> {
        let path = self.path_for(inventory_name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl InventorySaveSystem for JsonFileSaveSystem {
    fn save(&self, snapshot: &InventorySnapshot, inventory_name: &str) -> Result<(), SaveError> {
        self.ensure_dir()?;

        let path = self.path_for(inventory_name);
        fs::write(&path, snapshot.to_json()?)?;

        log::info!("Saved inventory '{}' to {}", inventory_name, path.display());
        Ok(())
    }

    fn load(&self, inventory_name: &str) -> Result<Option<InventorySnapshot>, SaveError> {
        let path = self.path_for(inventory_name);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        InventorySnapshot::from_json(&json).map(Some)
    }
}

/// Keeps snapshots in memory
#[derive(Debug, Default)]
pub struct MemorySaveSystem {
    saves: Mutex<HashMap<String, InventorySnapshot>>,
}

impl MemorySaveSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a save exists
    pub fn contains(&self, inventory_name: &str) -> bool {
        self.saves.lock().contains_key(inventory_name)
    }

    /// Copy of a stored snapshot
    pub fn get(&self, inventory_name: &str) -> Option<InventorySnapshot> {
        self.saves.lock().get(inventory_name).cloned()
    }

    /// Replace a stored snapshot directly
    pub fn insert(&self, inventory_name: impl Into<String>, snapshot: InventorySnapshot) {
        self.saves.lock().insert(inventory_name.into(), snapshot);
    }
}

impl InventorySaveSystem for MemorySaveSystem {
    fn save(&self, snapshot: &InventorySnapshot, inventory_name: &str) -> Result<(), SaveError> {
        self.saves
            .lock()
            .insert(inventory_name.to_string(), snapshot.clone());
        Ok(())
    }

    fn load(&self, inventory_name: &str) -> Result<Option<InventorySnapshot>, SaveError> {
        Ok(self.get(inventory_name))
    }
}
