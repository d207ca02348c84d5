//! Void Inventory - Slot Allocation and Persistence
//!
//! Tabbed, slot-based inventory engine with stack, size and weight limits.
//!
//! # Features
//!
//! - Item definitions with stacking rules, weight and tab membership
//! - Tabs whose capacity grows by unlocking named slot tiers
//! - Optional overflow of a full stack into further slots
//! - Compaction of empty slots, or fixed slot positions
//! - Weight cap with a runtime-adjustable limit
//! - Snapshots for save/load, with JSON file and in-memory backends
//! - Change notifications through `void_event` signals
//!
//! # Example
//!
//! ```ignore
//! use void_inventory::prelude::*;
//!
//! let config = InventoryConfig::new("Player")
//!     .with_tab(TabConfig::new("Items").with_unlock_state("base", 10))
//!     .with_weight(50.0);
//!
//! let potion = ItemDefinition::new("potion", "Potion")
//!     .with_stack_limit(5)
//!     .with_weight(0.5)
//!     .with_tab("Items")
//!     .into_shared();
//!
//! let mut inventory = RuntimeInventory::new(config);
//! let update = inventory.add_item(&potion, 3);
//! assert_eq!(update.update_type, InventoryUpdateType::Added);
//! ```

pub mod config;
pub mod inventory;
pub mod item;
pub mod save;
pub mod slot;
pub mod tab;
pub mod update;

pub mod prelude {
    pub use crate::config::{ConfigError, InventoryConfig};
    pub use crate::inventory::{InventoryError, RuntimeInventory, SizeLimitReached, WeightLimitReached};
    pub use crate::item::{ItemCatalog, ItemDatabase, ItemDefinition};
    pub use crate::save::{
        InventorySaveSystem, InventorySnapshot, JsonFileSaveSystem, MemorySaveSystem, SaveError,
        SlotSnapshot, TabUnlockSnapshot, UnlockStateSnapshot,
    };
    pub use crate::slot::{InventorySlot, SlotEventKind, SlotId};
    pub use crate::tab::{RuntimeTabConfig, SlotUnlockState, TabConfig};
    pub use crate::update::{InventoryUpdate, InventoryUpdateType};
}

pub use prelude::*;
