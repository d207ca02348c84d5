//! Tab configuration and per-tab unlock tracking

use crate::save::UnlockStateSnapshot;
use serde::{Deserialize, Serialize};

/// A capacity tier that contributes slots to a tab while unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUnlockState {
    /// Unique within its tab
    pub id: String,
    /// Slots contributed while unlocked
    #[serde(default)]
    pub additional_slots: u32,
}

impl SlotUnlockState {
    pub fn new(id: impl Into<String>, additional_slots: u32) -> Self {
        Self {
            id: id.into(),
            additional_slots,
        }
    }
}

/// A named category of slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabConfig {
    /// Unique key, also used to correlate save data
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unlock tiers in declaration order. The first one starts unlocked.
    #[serde(default)]
    pub unlock_states: Vec<SlotUnlockState>,
}

impl TabConfig {
    /// Create a tab with no unlock states
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unlock_states: Vec::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Append an unlock tier
    pub fn with_unlock_state(mut self, id: impl Into<String>, additional_slots: u32) -> Self {
        self.unlock_states.push(SlotUnlockState::new(id, additional_slots));
        self
    }

    /// Capacity with every tier unlocked
    pub fn total_slots(&self) -> usize {
        self.unlock_states
            .iter()
            .map(|s| s.additional_slots as usize)
            .sum()
    }
}

/// Runtime unlock state of one tab
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeTabConfig {
    tab_name: String,
    /// Declaration order is preserved
    states: Vec<(SlotUnlockState, bool)>,
}

impl RuntimeTabConfig {
    /// Only the first declared state starts unlocked
    pub fn new(tab: &TabConfig) -> Self {
        let states = tab
            .unlock_states
            .iter()
            .enumerate()
            .map(|(i, state)| (state.clone(), i == 0))
            .collect();

        Self {
            tab_name: tab.name.clone(),
            states,
        }
    }

    /// Default initialization, then overlay whatever the save data mentions
    pub fn from_save_data(tab: &TabConfig, saved: Option<&[UnlockStateSnapshot]>) -> Self {
        let mut config = Self::new(tab);
        if let Some(saved) = saved {
            config.initialize_from_save_data(saved);
        }
        config
    }

    /// Overwrite states present in `saved`; others keep their current value.
    /// Unknown ids are ignored.
    pub fn initialize_from_save_data(&mut self, saved: &[UnlockStateSnapshot]) {
        for snapshot in saved {
            if let Some(entry) = self.states.iter_mut().find(|(s, _)| s.id == snapshot.state_id) {
                entry.1 = snapshot.unlocked;
            }
        }
    }

    /// Tab name
    pub fn tab_name(&self) -> &str {
        &self.tab_name
    }

    /// Mark a state unlocked. Returns false if the tab has no such state.
    pub fn unlock_slot_state(&mut self, state_id: &str) -> bool {
        self.set_state(state_id, true)
    }

    /// Mark a state locked. Returns false if the tab has no such state.
    pub fn lock_slot_state(&mut self, state_id: &str) -> bool {
        self.set_state(state_id, false)
    }

    fn set_state(&mut self, state_id: &str, unlocked: bool) -> bool {
        match self.states.iter_mut().find(|(s, _)| s.id == state_id) {
            Some(entry) => {
                entry.1 = unlocked;
                true
            }
            None => false,
        }
    }

    /// Check a state
    pub fn is_slot_state_unlocked(&self, state_id: &str) -> bool {
        self.states
            .iter()
            .any(|(s, unlocked)| *unlocked && s.id == state_id)
    }

    /// Current capacity: slots contributed by unlocked states
    pub fn max_slots(&self) -> usize {
        self.states
            .iter()
            .filter(|(_, unlocked)| *unlocked)
            .map(|(s, _)| s.additional_slots as usize)
            .sum()
    }

    /// Capacity with every state unlocked
    pub fn total_slots(&self) -> usize {
        self.states
            .iter()
            .map(|(s, _)| s.additional_slots as usize)
            .sum()
    }

    /// Unlocked indices form a prefix: unlocked tiers are laid out in
    /// declaration order starting at index 0.
    pub fn is_inventory_slot_unlocked(&self, index: usize) -> bool {
        let mut unlocked_slots = 0;
        for (state, unlocked) in &self.states {
            if *unlocked {
                unlocked_slots += state.additional_slots as usize;
                if index < unlocked_slots {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_inventory_slot_locked(&self, index: usize) -> bool {
        !self.is_inventory_slot_unlocked(index)
    }

    /// States with their flags, in declaration order
    pub fn states(&self) -> impl Iterator<Item = (&SlotUnlockState, bool)> {
        self.states.iter().map(|(s, unlocked)| (s, *unlocked))
    }

    /// Snapshot for persistence
    pub fn serialized_unlock_states(&self) -> Vec<UnlockStateSnapshot> {
        self.states
            .iter()
            .map(|(s, unlocked)| UnlockStateSnapshot {
                state_id: s.id.clone(),
                unlocked: *unlocked,
            })
            .collect()
    }
}
