//! Item definitions and the item catalog

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Item definition
///
/// Immutable once authored. Runtime containers share definitions through
/// `Arc` and compare them by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDefinition {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Whether several units can share one slot
    pub stackable: bool,
    /// Maximum units per slot (negative = unbounded)
    pub stack_limit: i32,
    /// At most one slot and one unit, overriding the inventory's multi-slot flag
    pub unique: bool,
    /// Weight per unit
    pub weight: f32,
    /// Names of the tabs this item can be stored in, in preference order
    pub tabs: Vec<String>,
}

impl ItemDefinition {
    /// Create a new item definition
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            stackable: true,
            stack_limit: -1,
            unique: false,
            weight: 0.0,
            tabs: Vec::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set stackable
    pub fn with_stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// Set stack limit (negative = unbounded)
    pub fn with_stack_limit(mut self, limit: i32) -> Self {
        self.stack_limit = limit;
        self
    }

    /// Make unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Add a tab
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.tabs.push(tab.into());
        self
    }

    /// Check if stackable. Unique items never stack.
    pub fn is_stackable(&self) -> bool {
        self.stackable && !self.unique
    }

    /// Stack limit, `None` when unbounded
    pub fn stack_limit(&self) -> Option<u32> {
        if self.unique {
            Some(1)
        } else {
            u32::try_from(self.stack_limit).ok()
        }
    }

    /// Check if item can go in a tab
    pub fn has_tab(&self, tab: &str) -> bool {
        self.tabs.iter().any(|t| t == tab)
    }

    /// Weight of `count` units
    pub fn weight_of(&self, count: u32) -> f32 {
        self.weight * count as f32
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for ItemDefinition {
    fn default() -> Self {
        Self::new("unknown", "Unknown Item")
    }
}

/// Resolves serialized item ids back to definitions
pub trait ItemCatalog {
    /// Find an item by id
    fn find_item(&self, id: &str) -> Option<Arc<ItemDefinition>>;
}

impl ItemCatalog for [Arc<ItemDefinition>] {
    fn find_item(&self, id: &str) -> Option<Arc<ItemDefinition>> {
        self.iter().find(|item| item.id == id).cloned()
    }
}

impl ItemCatalog for Vec<Arc<ItemDefinition>> {
    fn find_item(&self, id: &str) -> Option<Arc<ItemDefinition>> {
        self.as_slice().find_item(id)
    }
}

/// All known items, indexed by id
#[derive(Debug, Clone, Default)]
pub struct ItemDatabase {
    items: Vec<Arc<ItemDefinition>>,
    index: HashMap<String, usize>,
}

impl ItemDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from definitions. Duplicate ids keep the first definition.
    pub fn from_items(items: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut db = Self::new();
        for item in items {
            db.add_item(item);
        }
        db
    }

    /// Parse a JSON array of item definitions
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let items: Vec<ItemDefinition> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::from_items(items))
    }

    /// Load a JSON array of item definitions from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Add an item. Returns false and keeps the existing entry on duplicate id.
    pub fn add_item(&mut self, item: ItemDefinition) -> bool {
        if self.index.contains_key(&item.id) {
            log::warn!(
                "Duplicate item id found: {}. Please ensure all item ids are unique.",
                item.id
            );
            return false;
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(Arc::new(item));
        true
    }

    /// Remove an item by id
    pub fn remove_item(&mut self, id: &str) -> Option<Arc<ItemDefinition>> {
        let position = self.index.remove(id)?;
        let removed = self.items.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Get an item by id
    pub fn get(&self, id: &str) -> Option<&Arc<ItemDefinition>> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// All items in insertion order
    pub fn items(&self) -> &[Arc<ItemDefinition>] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemCatalog for ItemDatabase {
    fn find_item(&self, id: &str) -> Option<Arc<ItemDefinition>> {
        self.get(id).cloned()
    }
}
