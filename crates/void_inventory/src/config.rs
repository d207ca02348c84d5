//! Inventory configuration

use crate::tab::TabConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON
    #[error("Parse error: {0}")]
    Parse(String),
    /// Two tabs share a name
    #[error("Duplicate tab name: {0}")]
    DuplicateTab(String),
    /// Two unlock states of one tab share an id
    #[error("Duplicate unlock state '{state}' in tab '{tab}'")]
    DuplicateUnlockState { tab: String, state: String },
    /// Negative or non-finite weight cap
    #[error("Invalid max weight: {0}")]
    InvalidMaxWeight(f32),
}

/// Static description of one inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Save key
    pub name: String,
    /// Tabs in display order
    pub tabs: Vec<TabConfig>,
    /// Keep items at their slot index: no compaction, saved indices restored
    pub use_fixed_slots: bool,
    /// Let a full stack overflow into another slot
    pub use_same_item_in_multiple_slots: bool,
    /// Enforce `max_weight`
    pub use_weight: bool,
    /// Absolute weight cap; saved limits are clamped to it
    pub max_weight: f32,
}

impl InventoryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a tab
    pub fn with_tab(mut self, tab: TabConfig) -> Self {
        self.tabs.push(tab);
        self
    }

    /// Set fixed slots
    pub fn with_fixed_slots(mut self, fixed: bool) -> Self {
        self.use_fixed_slots = fixed;
        self
    }

    /// Set multi-slot stacking
    pub fn with_same_item_in_multiple_slots(mut self, enabled: bool) -> Self {
        self.use_same_item_in_multiple_slots = enabled;
        self
    }

    /// Enable weight tracking with a cap
    pub fn with_weight(mut self, max_weight: f32) -> Self {
        self.use_weight = true;
        self.max_weight = max_weight;
        self
    }

    /// Find a tab by name
    pub fn tab(&self, name: &str) -> Option<&TabConfig> {
        self.tabs.iter().find(|t| t.name == name)
    }

    /// Check name uniqueness and weight bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_weight.is_finite() || self.max_weight < 0.0 {
            return Err(ConfigError::InvalidMaxWeight(self.max_weight));
        }

        let mut tab_names = HashSet::new();
        for tab in &self.tabs {
            if !tab_names.insert(tab.name.as_str()) {
                return Err(ConfigError::DuplicateTab(tab.name.clone()));
            }

            let mut state_ids = HashSet::new();
            for state in &tab.unlock_states {
                if !state_ids.insert(state.id.as_str()) {
                    return Err(ConfigError::DuplicateUnlockState {
                        tab: tab.name.clone(),
                        state: state.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            name: "Inventory".to_string(),
            tabs: Vec::new(),
            use_fixed_slots: false,
            use_same_item_in_multiple_slots: false,
            use_weight: false,
            max_weight: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config = InventoryConfig::from_json_str(
            r#"{
                "name": "Player",
                "tabs": [{ "name": "Items", "unlock_states": [{ "id": "base", "additional_slots": 10 }] }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "Player");
        assert_eq!(config.max_weight, 100.0);
        assert!(!config.use_weight);
        assert_eq!(config.tab("Items").unwrap().total_slots(), 10);
    }

    #[test]
    fn test_duplicate_tab() {
        let config = InventoryConfig::new("Chest")
            .with_tab(TabConfig::new("Items"))
            .with_tab(TabConfig::new("Items"));

        assert!(matches!(config.validate(), Err(ConfigError::DuplicateTab(name)) if name == "Items"));
    }

    #[test]
    fn test_duplicate_unlock_state() {
        let config = InventoryConfig::new("Chest").with_tab(
            TabConfig::new("Items")
                .with_unlock_state("base", 2)
                .with_unlock_state("base", 2),
        );

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateUnlockState { .. })
        ));
    }

    #[test]
    fn test_invalid_weight() {
        let config = InventoryConfig::new("Chest").with_weight(-1.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxWeight(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = InventoryConfig::from_path("/nonexistent/inventory.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
