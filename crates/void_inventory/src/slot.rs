//! Inventory slots

use crate::item::ItemDefinition;
use std::sync::Arc;
use void_event::Signal;

/// Stable slot identity. Survives rearrangement, never reused by an inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

/// Which slot notification to listen to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotEventKind {
    /// Contents changed
    Changed,
    /// Slot was locked
    Locked,
    /// Slot was unlocked
    Unlocked,
}

/// One storage unit of a tab
///
/// Empty means no item and a zero amount; the two are always cleared
/// together. A locked slot refuses every content mutation.
#[derive(Debug)]
pub struct InventorySlot {
    id: SlotId,
    item: Option<Arc<ItemDefinition>>,
    amount: u32,
    locked: bool,
    on_changed: Signal<InventorySlot>,
    on_locked: Signal<InventorySlot>,
    on_unlocked: Signal<InventorySlot>,
}

impl InventorySlot {
    /// Create an empty, unlocked slot
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            item: None,
            amount: 0,
            locked: false,
            on_changed: Signal::new(),
            on_locked: Signal::new(),
            on_unlocked: Signal::new(),
        }
    }

    /// Stable identity
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Stored item, if any
    pub fn item(&self) -> Option<&Arc<ItemDefinition>> {
        self.item.as_ref()
    }

    /// Id of the stored item
    pub fn item_id(&self) -> Option<&str> {
        self.item.as_deref().map(|item| item.id.as_str())
    }

    /// Units stored
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Check if the slot refuses content changes
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Check if the slot holds nothing
    pub fn is_empty(&self) -> bool {
        self.item.is_none() || self.amount == 0
    }

    /// Check if this slot holds `item`
    pub fn holds(&self, item: &ItemDefinition) -> bool {
        self.item_id() == Some(item.id.as_str())
    }

    /// Weight of the stored units
    pub fn weight(&self) -> f32 {
        self.item
            .as_deref()
            .map_or(0.0, |item| item.weight_of(self.amount))
    }

    /// Add units. Fills an empty slot or grows a stack of the same item.
    /// A different item is ignored. Returns true if the slot changed.
    pub fn add_item(&mut self, item: &Arc<ItemDefinition>, amount: u32) -> bool {
        if self.locked || amount == 0 {
            return false;
        }

        if self.is_empty() {
            self.item = Some(Arc::clone(item));
            self.amount = amount;
        } else if self.holds(item) {
            self.amount = self.amount.saturating_add(amount);
        } else {
            return false;
        }

        self.on_changed.emit(self);
        true
    }

    /// Remove units; reaching zero clears the slot.
    ///
    /// Notifies even when the slot was already empty. Returns false only
    /// for a locked slot.
    pub fn remove_item(&mut self, amount: u32) -> bool {
        if self.locked {
            return false;
        }

        self.amount = self.amount.saturating_sub(amount);
        if self.amount == 0 {
            self.clear_slot();
        }

        self.on_changed.emit(self);
        true
    }

    /// Overwrite contents without stack validation. Zero clears the slot.
    pub fn change_item(&mut self, item: Arc<ItemDefinition>, amount: u32) -> bool {
        if self.locked {
            return false;
        }

        if amount == 0 {
            self.clear_slot();
        } else {
            self.item = Some(item);
            self.amount = amount;
        }

        self.on_changed.emit(self);
        true
    }

    /// Lock and notify
    pub fn lock_slot(&mut self) {
        self.locked = true;
        self.on_locked.emit(self);
    }

    /// Unlock and notify
    pub fn unlock_slot(&mut self) {
        self.locked = false;
        self.on_unlocked.emit(self);
    }

    /// Empty the slot without notifying
    pub fn clear_slot(&mut self) {
        self.item = None;
        self.amount = 0;
    }

    /// Place saved contents regardless of the current lock state
    pub(crate) fn restore(&mut self, item: Arc<ItemDefinition>, amount: u32, locked: bool) {
        if amount == 0 {
            self.clear_slot();
        } else {
            self.item = Some(item);
            self.amount = amount;
        }
        self.locked = locked;
    }

    pub(crate) fn signal_mut(&mut self, kind: SlotEventKind) -> &mut Signal<InventorySlot> {
        match kind {
            SlotEventKind::Changed => &mut self.on_changed,
            SlotEventKind::Locked => &mut self.on_locked,
            SlotEventKind::Unlocked => &mut self.on_unlocked,
        }
    }

    pub(crate) fn clear_listeners(&mut self) {
        self.on_changed.clear();
        self.on_locked.clear();
        self.on_unlocked.clear();
    }
}
