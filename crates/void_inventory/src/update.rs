//! Results of inventory operations

use crate::item::ItemDefinition;
use crate::slot::SlotId;
use std::fmt;
use std::sync::Arc;

/// What an operation did, or why it did nothing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InventoryUpdateType {
    Added,
    Removed,
    TabNotFound,
    SlotNotFound,
    EmptySlotRemoveAttempt,
    SizeLimitReached,
    StackLimitReached,
    WeightLimitReached,
    /// Target slot is locked
    SlotLocked,
    /// Target slot holds a different item
    ItemMismatch,
    /// Host-defined tag (e.g. "Sold", "Bought")
    Custom(String),
}

impl InventoryUpdateType {
    pub fn custom(tag: impl Into<String>) -> Self {
        Self::Custom(tag.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::TabNotFound => "TabNotFound",
            Self::SlotNotFound => "SlotNotFound",
            Self::EmptySlotRemoveAttempt => "EmptySlotRemoveAttempt",
            Self::SizeLimitReached => "SizeLimitReached",
            Self::StackLimitReached => "StackLimitReached",
            Self::WeightLimitReached => "WeightLimitReached",
            Self::SlotLocked => "SlotLocked",
            Self::ItemMismatch => "ItemMismatch",
            Self::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for InventoryUpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an add/remove call
#[derive(Debug, Clone)]
pub struct InventoryUpdate {
    /// Item concerned, if any
    pub item: Option<Arc<ItemDefinition>>,
    /// Slot concerned, if any
    pub slot: Option<SlotId>,
    /// Index of that slot within its tab at the time of the operation
    pub slot_index: Option<usize>,
    /// Whether the slot is still occupied afterwards
    pub remaining: bool,
    pub update_type: InventoryUpdateType,
}

impl InventoryUpdate {
    pub fn new(
        item: Option<Arc<ItemDefinition>>,
        slot: Option<SlotId>,
        slot_index: Option<usize>,
        remaining: bool,
        update_type: InventoryUpdateType,
    ) -> Self {
        Self {
            item,
            slot,
            slot_index,
            remaining,
            update_type,
        }
    }

    /// Update without a slot
    pub(crate) fn slotless(
        item: Option<Arc<ItemDefinition>>,
        slot_index: Option<usize>,
        update_type: InventoryUpdateType,
    ) -> Self {
        Self::new(item, None, slot_index, false, update_type)
    }

    /// True when a slot was actually mutated.
    ///
    /// An `Added` update without a slot means the item has no tab in this
    /// inventory.
    pub fn succeeded(&self) -> bool {
        self.slot.is_some()
            && matches!(
                self.update_type,
                InventoryUpdateType::Added | InventoryUpdateType::Removed
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(InventoryUpdateType::StackLimitReached.to_string(), "StackLimitReached");
        assert_eq!(InventoryUpdateType::custom("Sold").to_string(), "Sold");
    }

    #[test]
    fn test_succeeded() {
        let no_tab = InventoryUpdate::slotless(None, None, InventoryUpdateType::Added);
        assert!(!no_tab.succeeded());

        let added = InventoryUpdate::new(None, Some(SlotId(3)), Some(0), true, InventoryUpdateType::Added);
        assert!(added.succeeded());

        let full = InventoryUpdate::new(
            None,
            Some(SlotId(3)),
            Some(0),
            true,
            InventoryUpdateType::StackLimitReached,
        );
        assert!(!full.succeeded());
    }
}
