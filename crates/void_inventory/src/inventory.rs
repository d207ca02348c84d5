//! Runtime inventory
//!
//! Owns every slot of every tab, places and removes items under stack,
//! size and weight limits, and converts its state to and from
//! [`InventorySnapshot`]s.

use crate::config::InventoryConfig;
use crate::item::{ItemCatalog, ItemDefinition};
use crate::save::{InventorySaveSystem, InventorySnapshot, SaveError, SlotSnapshot, TabUnlockSnapshot};
use crate::slot::{InventorySlot, SlotEventKind, SlotId};
use crate::tab::RuntimeTabConfig;
use crate::update::{InventoryUpdate, InventoryUpdateType};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use void_event::{Signal, SubscriberId};

/// Save/load failures
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("No save system set for inventory '{0}'")]
    NoSaveSystem(String),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Sent when an add is refused by the weight cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightLimitReached {
    pub current_weight: f32,
    pub max_weight: f32,
}

/// Sent when an add finds no room
#[derive(Debug, Clone)]
pub struct SizeLimitReached {
    pub item: Arc<ItemDefinition>,
    /// Weight the inventory would have had
    pub prospective_weight: f32,
}

#[derive(Debug)]
struct TabSlots {
    runtime: RuntimeTabConfig,
    slots: Vec<InventorySlot>,
}

/// Sort key used to compact a tab
fn arrangement_rank(slot: &InventorySlot) -> u8 {
    match (slot.is_locked(), slot.is_empty()) {
        (false, false) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (true, true) => 3,
    }
}

/// Inventory state and operations
pub struct RuntimeInventory {
    config: InventoryConfig,
    /// Parallel to `config.tabs`
    tabs: Vec<TabSlots>,
    current_weight: f32,
    current_weight_limit: f32,
    invalid_item_ids: Vec<String>,
    next_slot_id: u64,
    save_system: Option<Box<dyn InventorySaveSystem>>,
    /// Fired after every committed change
    pub on_inventory_changed: Signal<RuntimeInventory>,
    pub on_weight_limit_reached: Signal<WeightLimitReached>,
    pub on_size_limit_reached: Signal<SizeLimitReached>,
}

impl RuntimeInventory {
    /// Create an inventory with every tab at its default unlock state
    pub fn new(config: InventoryConfig) -> Self {
        let current_weight_limit = config.max_weight;
        let mut inventory = Self {
            config,
            tabs: Vec::new(),
            current_weight: 0.0,
            current_weight_limit,
            invalid_item_ids: Vec::new(),
            next_slot_id: 1,
            save_system: None,
            on_inventory_changed: Signal::new(),
            on_weight_limit_reached: Signal::new(),
            on_size_limit_reached: Signal::new(),
        };
        inventory.initialize_tabs(None);
        inventory
    }

    /// Builder form of [`set_save_system`](Self::set_save_system)
    pub fn with_save_system(mut self, save_system: impl InventorySaveSystem + 'static) -> Self {
        self.set_save_system(save_system);
        self
    }

    /// Rebuild every tab. All previous slots, and their subscriptions, are dropped.
    ///
    /// Each tab gets one slot per declared capacity; slots past the
    /// unlocked prefix start locked.
    fn initialize_tabs(&mut self, save_data: Option<&InventorySnapshot>) {
        let mut next_id = self.next_slot_id;
        let mut tabs = Vec::with_capacity(self.config.tabs.len());

        for tab in &self.config.tabs {
            let saved = save_data.and_then(|s| s.tab_states(&tab.name));
            let runtime = RuntimeTabConfig::from_save_data(tab, saved);

            let mut slots = Vec::with_capacity(runtime.total_slots());
            for index in 0..runtime.total_slots() {
                let mut slot = InventorySlot::new(SlotId(next_id));
                next_id += 1;
                if runtime.is_inventory_slot_locked(index) {
                    slot.lock_slot();
                }
                slots.push(slot);
            }

            log::debug!(
                "Inventory '{}': tab '{}' has {}/{} slots unlocked",
                self.config.name,
                tab.name,
                runtime.max_slots(),
                slots.len()
            );
            tabs.push(TabSlots { runtime, slots });
        }

        self.tabs = tabs;
        self.next_slot_id = next_id;
    }

    /// Release every subscription held by the inventory and its slots
    pub fn cleanup(&mut self) {
        for tab in &mut self.tabs {
            for slot in &mut tab.slots {
                slot.clear_listeners();
            }
        }
        self.on_inventory_changed.clear();
        self.on_weight_limit_reached.clear();
        self.on_size_limit_reached.clear();
    }

    // ---- Accessors ----

    /// Configuration the inventory was built from
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Inventory name, also the save key
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Tracked weight of the contents
    pub fn current_weight(&self) -> f32 {
        self.current_weight
    }

    /// Weight limit adjustable at runtime and persisted with the inventory
    pub fn current_weight_limit(&self) -> f32 {
        self.current_weight_limit
    }

    /// Ids seen by the last load that the catalog could not resolve
    pub fn invalid_item_ids(&self) -> &[String] {
        &self.invalid_item_ids
    }

    /// Tab names in configuration order
    pub fn tab_names(&self) -> impl Iterator<Item = &str> {
        self.config.tabs.iter().map(|t| t.name.as_str())
    }

    /// Slots of a tab in their current order
    pub fn slots_for_tab(&self, tab: &str) -> Option<&[InventorySlot]> {
        self.tab_index(tab).map(|t| self.tabs[t].slots.as_slice())
    }

    /// Unlock state of a tab
    pub fn tab_config(&self, tab: &str) -> Option<&RuntimeTabConfig> {
        self.tab_index(tab).map(|t| &self.tabs[t].runtime)
    }

    /// Find a slot by id within a tab
    pub fn slot(&self, tab: &str, slot_id: SlotId) -> Option<&InventorySlot> {
        let t = self.tab_index(tab)?;
        self.tabs[t].slots.iter().find(|s| s.id() == slot_id)
    }

    /// Total units of an item across all tabs
    pub fn count_item(&self, item: &ItemDefinition) -> u32 {
        self.tabs
            .iter()
            .flat_map(|t| t.slots.iter())
            .filter(|s| s.holds(item))
            .fold(0u32, |total, s| total.saturating_add(s.amount()))
    }

    /// Check if every slot is empty
    pub fn is_empty(&self) -> bool {
        self.tabs
            .iter()
            .all(|t| t.slots.iter().all(|s| s.is_empty()))
    }

    fn tab_index(&self, name: &str) -> Option<usize> {
        self.config.tabs.iter().position(|t| t.name == name)
    }

    /// First of the item's tabs managed by this inventory
    fn resolve_tab(&self, item: &ItemDefinition) -> Option<usize> {
        item.tabs.iter().find_map(|t| self.tab_index(t))
    }

    fn slot_position(&self, tab: usize, slot_id: SlotId) -> Option<usize> {
        self.tabs[tab].slots.iter().position(|s| s.id() == slot_id)
    }

    // ---- Slot search ----

    /// Stack limit that makes a partially filled slot worth searching for
    fn partial_stack_limit(&self, item: &ItemDefinition) -> Option<u32> {
        if self.config.use_same_item_in_multiple_slots && item.is_stackable() {
            item.stack_limit()
        } else {
            None
        }
    }

    fn find_slot_index_with_item(&self, tab: usize, item: &ItemDefinition) -> Option<usize> {
        let slots = &self.tabs[tab].slots;
        match self.partial_stack_limit(item) {
            // A full stack does not count as a match
            Some(limit) => slots
                .iter()
                .position(|s| s.holds(item) && s.amount() < limit),
            None => slots.iter().position(|s| s.holds(item)),
        }
    }

    fn find_first_available_slot_index(
        &self,
        tab: usize,
        item: &ItemDefinition,
        count: u32,
    ) -> Option<usize> {
        if let Some(limit) = self.partial_stack_limit(item) {
            let partial = self.tabs[tab].slots.iter().position(|s| {
                s.holds(item) && !s.is_locked() && s.amount().saturating_add(count) <= limit
            });
            if partial.is_some() {
                return partial;
            }
        }
        self.find_first_unlocked_empty_slot_index(tab)
    }

    /// Last match: removal drains the newest stack first
    fn find_slot_index_for_removal(&self, tab: usize, item: &ItemDefinition) -> Option<usize> {
        self.tabs[tab]
            .slots
            .iter()
            .rposition(|s| s.holds(item) && s.amount() > 0)
    }

    fn find_first_unlocked_empty_slot_index(&self, tab: usize) -> Option<usize> {
        self.tabs[tab]
            .slots
            .iter()
            .position(|s| s.is_empty() && !s.is_locked())
    }

    /// First slot holding the item, skipping full stacks when overflow is enabled
    pub fn find_slot_with_item(&self, tab: &str, item: &ItemDefinition) -> Option<&InventorySlot> {
        let t = self.tab_index(tab)?;
        self.find_slot_index_with_item(t, item)
            .map(|i| &self.tabs[t].slots[i])
    }

    /// Slot an add of `count` units would land in
    pub fn find_first_available_slot_for_item(
        &self,
        tab: &str,
        item: &ItemDefinition,
        count: u32,
    ) -> Option<&InventorySlot> {
        let t = self.tab_index(tab)?;
        self.find_first_available_slot_index(t, item, count)
            .map(|i| &self.tabs[t].slots[i])
    }

    /// Slot a removal would take from
    pub fn find_slot_for_removal(&self, tab: &str, item: &ItemDefinition) -> Option<&InventorySlot> {
        let t = self.tab_index(tab)?;
        self.find_slot_index_for_removal(t, item)
            .map(|i| &self.tabs[t].slots[i])
    }

    /// First empty slot that accepts items
    pub fn find_first_unlocked_empty_slot(&self, tab: &str) -> Option<&InventorySlot> {
        let t = self.tab_index(tab)?;
        self.find_first_unlocked_empty_slot_index(t)
            .map(|i| &self.tabs[t].slots[i])
    }

    // ---- Adding ----

    /// Add units to the item's tab, stacking onto an existing slot when allowed
    pub fn add_item(&mut self, item: &Arc<ItemDefinition>, count: u32) -> InventoryUpdate {
        let tab = match self.resolve_tab(item) {
            Some(tab) => tab,
            None => return InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::Added),
        };

        match self.find_slot_index_with_item(tab, item) {
            Some(index) => self.run_checks_and_add(tab, index, item, count),
            None => self.add_item_to_first_available_slot(tab, item, count),
        }
    }

    /// Add units to a slot already known to the caller
    pub fn add_item_to_slot(
        &mut self,
        item: &Arc<ItemDefinition>,
        slot_id: SlotId,
        count: u32,
    ) -> InventoryUpdate {
        let tab = match self.resolve_tab(item) {
            Some(tab) => tab,
            None => return InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::Added),
        };

        match self.slot_position(tab, slot_id) {
            Some(index) => self.run_checks_and_add(tab, index, item, count),
            None => InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::SlotNotFound),
        }
    }

    /// Place units at an exact index, bypassing stacking rules.
    ///
    /// The tab must be managed here and listed in the item's tabs.
    pub fn add_item_to_specific_slot(
        &mut self,
        tab: &str,
        index: usize,
        item: &Arc<ItemDefinition>,
        count: u32,
    ) -> InventoryUpdate {
        match self.tab_index(tab) {
            Some(t) if item.has_tab(tab) => self.add_item_at(t, index, item, count),
            _ => InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::TabNotFound),
        }
    }

    fn add_item_to_first_available_slot(
        &mut self,
        tab: usize,
        item: &Arc<ItemDefinition>,
        count: u32,
    ) -> InventoryUpdate {
        match self.find_first_available_slot_index(tab, item, count) {
            Some(index) => self.add_item_at(tab, index, item, count),
            None => {
                self.notify_size_limit(item, count);
                InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::SizeLimitReached)
            }
        }
    }

    /// Stacking policy for a slot that already holds the item
    fn run_checks_and_add(
        &mut self,
        tab: usize,
        index: usize,
        item: &Arc<ItemDefinition>,
        count: u32,
    ) -> InventoryUpdate {
        let multiple_slots = self.config.use_same_item_in_multiple_slots;

        if item.is_stackable() {
            let amount = self.tabs[tab].slots[index].amount();
            let fits = item
                .stack_limit()
                .map_or(true, |limit| amount.saturating_add(count) <= limit);

            if fits {
                return self.add_item_at(tab, index, item, count);
            }
            if multiple_slots {
                return self.add_item_to_first_available_slot(tab, item, count);
            }
            // No partial adds across the limit
            return self.stack_limit_reached(tab, index, item);
        }

        if multiple_slots && !item.unique {
            return self.add_item_to_first_available_slot(tab, item, count);
        }

        self.stack_limit_reached(tab, index, item)
    }

    fn stack_limit_reached(&self, tab: usize, index: usize, item: &Arc<ItemDefinition>) -> InventoryUpdate {
        let slot = &self.tabs[tab].slots[index];
        InventoryUpdate::new(
            Some(item.clone()),
            Some(slot.id()),
            Some(index),
            !slot.is_empty(),
            InventoryUpdateType::StackLimitReached,
        )
    }

    /// Every add ends here. All checks run before anything is mutated.
    fn add_item_at(
        &mut self,
        tab: usize,
        index: usize,
        item: &Arc<ItemDefinition>,
        count: u32,
    ) -> InventoryUpdate {
        // Capacity, not list length: guards against unlock changes
        if index >= self.tabs[tab].runtime.max_slots() {
            self.notify_size_limit(item, count);
            return InventoryUpdate::slotless(Some(item.clone()), Some(index), InventoryUpdateType::SizeLimitReached);
        }

        let slot = match self.tabs[tab].slots.get(index) {
            Some(slot) => slot,
            None => {
                return InventoryUpdate::slotless(Some(item.clone()), Some(index), InventoryUpdateType::SlotNotFound)
            }
        };

        if slot.is_locked() {
            log::warn!(
                "Inventory '{}': refused to add '{}' to locked slot {}",
                self.config.name,
                item.id,
                index
            );
            return InventoryUpdate::new(
                Some(item.clone()),
                Some(slot.id()),
                Some(index),
                !slot.is_empty(),
                InventoryUpdateType::SlotLocked,
            );
        }

        if !slot.is_empty() && !slot.holds(item) {
            log::warn!(
                "Inventory '{}': slot {} holds '{}', cannot add '{}'",
                self.config.name,
                index,
                slot.item_id().unwrap_or_default(),
                item.id
            );
            return InventoryUpdate::new(
                Some(item.clone()),
                Some(slot.id()),
                Some(index),
                true,
                InventoryUpdateType::ItemMismatch,
            );
        }

        // A unique item never holds more than one unit
        if item.unique && slot.amount().saturating_add(count) > 1 {
            return InventoryUpdate::new(
                Some(item.clone()),
                Some(slot.id()),
                Some(index),
                !slot.is_empty(),
                InventoryUpdateType::StackLimitReached,
            );
        }

        if self.config.use_weight {
            let item_weight = item.weight_of(count);
            if self.current_weight + item_weight > self.config.max_weight {
                self.on_weight_limit_reached.emit(&WeightLimitReached {
                    current_weight: self.current_weight,
                    max_weight: self.config.max_weight,
                });
                return InventoryUpdate::slotless(
                    Some(item.clone()),
                    Some(index),
                    InventoryUpdateType::WeightLimitReached,
                );
            }
            self.current_weight += item_weight;
        }

        let slot = &mut self.tabs[tab].slots[index];
        let changed = slot.add_item(item, count);
        let slot_id = slot.id();
        let remaining = !slot.is_empty();

        if changed {
            self.handle_slot_changed(!remaining);
        }

        InventoryUpdate::new(
            Some(item.clone()),
            Some(slot_id),
            Some(index),
            remaining,
            InventoryUpdateType::Added,
        )
    }

    // ---- Removing ----

    /// Remove units of an item from the last slot holding it
    pub fn remove_item(&mut self, item: &Arc<ItemDefinition>, count: u32) -> InventoryUpdate {
        let tab = match self.resolve_tab(item) {
            Some(tab) => tab,
            None => return InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::Removed),
        };

        match self.find_slot_index_for_removal(tab, item) {
            Some(index) => self.remove_item_at(tab, index, count),
            None => InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::SlotNotFound),
        }
    }

    /// Remove units from a slot already known to the caller
    pub fn remove_item_from_slot(
        &mut self,
        item: &Arc<ItemDefinition>,
        slot_id: SlotId,
        count: u32,
    ) -> InventoryUpdate {
        let tab = match self.resolve_tab(item) {
            Some(tab) => tab,
            None => return InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::TabNotFound),
        };

        match self.slot_position(tab, slot_id) {
            Some(index) => self.remove_item_at(tab, index, count),
            None => InventoryUpdate::slotless(Some(item.clone()), None, InventoryUpdateType::SlotNotFound),
        }
    }

    /// Remove units at an exact index
    pub fn remove_item_from_specific_slot(&mut self, tab: &str, index: usize, count: u32) -> InventoryUpdate {
        match self.tab_index(tab) {
            Some(t) => self.remove_item_at(t, index, count),
            None => InventoryUpdate::slotless(None, None, InventoryUpdateType::TabNotFound),
        }
    }

    fn remove_item_at(&mut self, tab: usize, index: usize, count: u32) -> InventoryUpdate {
        let slot = match self.tabs[tab].slots.get(index) {
            Some(slot) => slot,
            None => return InventoryUpdate::slotless(None, Some(index), InventoryUpdateType::SlotNotFound),
        };

        let item = match slot.item() {
            Some(item) if !slot.is_empty() => item.clone(),
            _ => {
                return InventoryUpdate::new(
                    None,
                    Some(slot.id()),
                    Some(index),
                    false,
                    InventoryUpdateType::EmptySlotRemoveAttempt,
                )
            }
        };

        if slot.is_locked() {
            return InventoryUpdate::new(
                Some(item),
                Some(slot.id()),
                Some(index),
                true,
                InventoryUpdateType::SlotLocked,
            );
        }

        // Debits the requested count even if the slot holds fewer units
        if self.config.use_weight {
            self.current_weight -= item.weight_of(count);
        }

        let slot = &mut self.tabs[tab].slots[index];
        slot.remove_item(count);
        let slot_id = slot.id();
        let remaining = !slot.is_empty();

        self.handle_slot_changed(!remaining);

        InventoryUpdate::new(
            Some(item),
            Some(slot_id),
            Some(index),
            remaining,
            InventoryUpdateType::Removed,
        )
    }

    // ---- Slot management ----

    /// Overwrite a slot's contents (debug tooling). `None` keeps the current amount.
    ///
    /// The slot must belong to the new item's tab. Returns false if nothing changed.
    pub fn change_item_from_slot(
        &mut self,
        slot_id: SlotId,
        item: &Arc<ItemDefinition>,
        amount: Option<u32>,
    ) -> bool {
        let tab = match self.resolve_tab(item) {
            Some(tab) => tab,
            None => return false,
        };
        let index = match self.slot_position(tab, slot_id) {
            Some(index) => index,
            None => return false,
        };

        let slot = &mut self.tabs[tab].slots[index];
        let old_weight = slot.weight();
        let amount = amount.unwrap_or_else(|| slot.amount());
        if !slot.change_item(item.clone(), amount) {
            return false;
        }
        let weight_delta = slot.weight() - old_weight;
        let emptied = slot.is_empty();

        if self.config.use_weight {
            self.current_weight += weight_delta;
        }
        self.handle_slot_changed(emptied);
        true
    }

    /// Swap two slots' positions in a tab
    pub fn switch_slots(&mut self, tab: &str, first: SlotId, second: SlotId) -> bool {
        let t = match self.tab_index(tab) {
            Some(t) => t,
            None => return false,
        };
        let (a, b) = match (self.slot_position(t, first), self.slot_position(t, second)) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };

        self.tabs[t].slots.swap(a, b);

        if self.config.use_fixed_slots {
            self.notify_changed();
        } else {
            self.rearrange_slots(true);
        }
        true
    }

    /// Unlock a capacity tier and the slots it adds
    pub fn unlock_slots_for_tab(&mut self, tab: &str, state_id: &str) -> bool {
        let unlocked = match self.tab_index(tab) {
            Some(t) => {
                let entry = &mut self.tabs[t];
                let before = entry.runtime.max_slots();
                let changed = entry.runtime.unlock_slot_state(state_id);
                let after = entry.runtime.max_slots().min(entry.slots.len());

                for slot in entry.slots.iter_mut().take(after).skip(before) {
                    if slot.is_locked() {
                        slot.unlock_slot();
                    }
                }
                changed
            }
            None => false,
        };

        self.notify_changed();
        unlocked
    }

    /// Lock a capacity tier and the slots it contributed
    pub fn lock_slots_for_tab(&mut self, tab: &str, state_id: &str) -> bool {
        let locked = match self.tab_index(tab) {
            Some(t) => {
                let entry = &mut self.tabs[t];
                let before = entry.runtime.max_slots().min(entry.slots.len());
                let changed = entry.runtime.lock_slot_state(state_id);
                let after = entry.runtime.max_slots();

                for slot in entry.slots.iter_mut().take(before).skip(after) {
                    if !slot.is_locked() {
                        slot.lock_slot();
                    }
                }
                changed
            }
            None => false,
        };

        self.notify_changed();
        locked
    }

    /// Lock the slot at an index. Returns false if it does not exist.
    pub fn lock_slot(&mut self, tab: &str, index: usize) -> bool {
        self.set_slot_locked(tab, index, true)
    }

    /// Unlock the slot at an index. Returns false if it does not exist.
    pub fn unlock_slot(&mut self, tab: &str, index: usize) -> bool {
        self.set_slot_locked(tab, index, false)
    }

    fn set_slot_locked(&mut self, tab: &str, index: usize, locked: bool) -> bool {
        let t = match self.tab_index(tab) {
            Some(t) => t,
            None => return false,
        };
        let slot = match self.tabs[t].slots.get_mut(index) {
            Some(slot) => slot,
            None => return false,
        };

        if locked {
            slot.lock_slot();
        } else {
            slot.unlock_slot();
        }
        self.notify_changed();
        true
    }

    /// Listen to one slot. Dropped when the slot is reallocated by a load.
    pub fn subscribe_slot<F>(
        &mut self,
        tab: &str,
        slot_id: SlotId,
        kind: SlotEventKind,
        handler: F,
    ) -> Option<SubscriberId>
    where
        F: Fn(&InventorySlot) + Send + Sync + 'static,
    {
        let t = self.tab_index(tab)?;
        let slot = self.tabs[t].slots.iter_mut().find(|s| s.id() == slot_id)?;
        Some(slot.signal_mut(kind).subscribe(handler))
    }

    /// Remove a handler added by [`subscribe_slot`](Self::subscribe_slot)
    pub fn unsubscribe_slot(&mut self, tab: &str, slot_id: SlotId, kind: SlotEventKind, id: SubscriberId) -> bool {
        let t = match self.tab_index(tab) {
            Some(t) => t,
            None => return false,
        };
        match self.tabs[t].slots.iter_mut().find(|s| s.id() == slot_id) {
            Some(slot) => slot.signal_mut(kind).unsubscribe(id),
            None => false,
        }
    }

    /// Change the runtime weight limit
    pub fn change_weight_limit(&mut self, limit: f32) {
        self.current_weight_limit = limit;
        self.notify_changed();
    }

    fn handle_slot_changed(&mut self, emptied: bool) {
        if emptied && !self.config.use_fixed_slots {
            self.rearrange_slots(false);
        }
        self.notify_changed();
    }

    /// Order every tab: filled unlocked, empty unlocked, filled locked, empty locked.
    /// Slots move, they are never recreated.
    fn rearrange_slots(&mut self, notify: bool) {
        for tab in &mut self.tabs {
            tab.slots.sort_by_key(arrangement_rank);
        }
        if notify {
            self.notify_changed();
        }
    }

    fn notify_changed(&self) {
        self.on_inventory_changed.emit(self);
    }

    fn notify_size_limit(&self, item: &Arc<ItemDefinition>, count: u32) {
        self.on_size_limit_reached.emit(&SizeLimitReached {
            item: item.clone(),
            prospective_weight: self.current_weight + item.weight_of(count),
        });
    }

    // ---- Save / load ----

    /// Replace the save backend
    pub fn set_save_system(&mut self, save_system: impl InventorySaveSystem + 'static) {
        self.save_system = Some(Box::new(save_system));
    }

    /// Save through the configured backend
    pub fn save_inventory(&self) -> Result<(), InventoryError> {
        let save_system = self
            .save_system
            .as_ref()
            .ok_or_else(|| InventoryError::NoSaveSystem(self.config.name.clone()))?;

        let snapshot = self.get_save_data();
        save_system.save(&snapshot, &self.config.name)?;

        log::debug!(
            "Saved inventory '{}' ({} occupied slots)",
            self.config.name,
            snapshot.slots.len()
        );
        Ok(())
    }

    /// Load through the configured backend. Returns false if nothing was saved.
    pub fn load_inventory<C: ItemCatalog + ?Sized>(&mut self, catalog: &C) -> Result<bool, InventoryError> {
        let save_system = self
            .save_system
            .as_ref()
            .ok_or_else(|| InventoryError::NoSaveSystem(self.config.name.clone()))?;

        match save_system.load(&self.config.name)? {
            Some(snapshot) => {
                self.load_save_data(&snapshot, catalog);
                Ok(true)
            }
            None => {
                log::debug!("No saved data for inventory '{}'", self.config.name);
                self.notify_changed();
                Ok(false)
            }
        }
    }

    /// Snapshot of occupied slots, unlock states and the weight limit
    pub fn get_save_data(&self) -> InventorySnapshot {
        let mut snapshot = InventorySnapshot::new(self.config.name.clone());

        for tab in &self.tabs {
            for (slot_index, slot) in tab.slots.iter().enumerate() {
                if let Some(item) = slot.item() {
                    snapshot.slots.push(SlotSnapshot {
                        item_id: item.id.clone(),
                        amount: slot.amount(),
                        is_locked: slot.is_locked(),
                        slot_index,
                        tab_name: Some(tab.runtime.tab_name().to_string()),
                    });
                }
            }

            snapshot.unlocked_states_by_tab.push(TabUnlockSnapshot {
                tab_name: tab.runtime.tab_name().to_string(),
                unlocked_states: tab.runtime.serialized_unlock_states(),
            });
        }

        snapshot.current_weight_limit = self.current_weight_limit;
        snapshot
    }

    /// Replace the whole state with a snapshot.
    ///
    /// Entries whose id the catalog cannot resolve are dropped and listed in
    /// [`invalid_item_ids`](Self::invalid_item_ids). Each entry returns to its
    /// saved tab, or the item's first tab when none was saved. With fixed slots
    /// it also returns to its saved index; otherwise entries are packed from
    /// index 0 in save order.
    pub fn load_save_data<C: ItemCatalog + ?Sized>(&mut self, snapshot: &InventorySnapshot, catalog: &C) {
        self.invalid_item_ids.clear();
        self.initialize_tabs(Some(snapshot));
        self.current_weight = 0.0;

        let fixed_slots = self.config.use_fixed_slots;
        let mut next_index = vec![0usize; self.tabs.len()];

        for entry in &snapshot.slots {
            let item = match catalog.find_item(&entry.item_id) {
                Some(item) => item,
                None => {
                    if !self.invalid_item_ids.contains(&entry.item_id) {
                        self.invalid_item_ids.push(entry.item_id.clone());
                    }
                    continue;
                }
            };

            // Saved tab first; older saves carry none
            let saved_tab = entry
                .tab_name
                .as_deref()
                .filter(|name| item.has_tab(name))
                .and_then(|name| self.tab_index(name));

            let tab = match saved_tab.or_else(|| self.resolve_tab(&item)) {
                Some(tab) => tab,
                None => {
                    log::warn!(
                        "Inventory '{}': item '{}' has no tab here, skipped",
                        self.config.name,
                        item.id
                    );
                    continue;
                }
            };

            let index = if fixed_slots {
                entry.slot_index
            } else {
                next_index[tab]
            };

            let slot = match self.tabs[tab].slots.get_mut(index) {
                Some(slot) if slot.is_empty() => slot,
                _ => {
                    log::debug!(
                        "Inventory '{}': no room for '{}' at slot {}, dropped",
                        self.config.name,
                        item.id,
                        index
                    );
                    continue;
                }
            };

            slot.restore(item.clone(), entry.amount, entry.is_locked);
            if !fixed_slots {
                next_index[tab] += 1;
            }
            self.current_weight += item.weight_of(entry.amount);
        }

        // Slots outside the unlocked capacity stay locked whatever was saved
        for tab in &mut self.tabs {
            for (index, slot) in tab.slots.iter_mut().enumerate() {
                if tab.runtime.is_inventory_slot_locked(index) && !slot.is_locked() {
                    slot.lock_slot();
                }
            }
        }

        // Save data cannot raise the limit past the configured cap
        self.current_weight_limit = snapshot.current_weight_limit.min(self.config.max_weight);

        if !self.invalid_item_ids.is_empty() {
            log::warn!(
                "The following items were not found in the item database and were not loaded: {}",
                self.invalid_item_ids.join(", ")
            );
        }

        self.notify_changed();
    }
}

impl fmt::Debug for RuntimeInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeInventory")
            .field("name", &self.config.name)
            .field("tabs", &self.tabs)
            .field("current_weight", &self.current_weight)
            .field("current_weight_limit", &self.current_weight_limit)
            .field("invalid_item_ids", &self.invalid_item_ids)
            .field("has_save_system", &self.save_system.is_some())
            .finish()
    }
}
