//! Integration tests for void_inventory

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use void_inventory::*;

fn backpack() -> InventoryConfig {
    InventoryConfig::new("Backpack")
        .with_tab(
            TabConfig::new("Items")
                .with_unlock_state("base", 3)
                .with_unlock_state("upgrade", 2),
        )
        .with_tab(TabConfig::new("Keys").with_unlock_state("base", 2))
        .with_weight(50.0)
}

fn database() -> ItemDatabase {
    ItemDatabase::from_items([
        ItemDefinition::new("potion", "Potion")
            .with_stack_limit(10)
            .with_weight(0.5)
            .with_tab("Items"),
        ItemDefinition::new("sword", "Sword")
            .with_stackable(false)
            .with_weight(4.0)
            .with_tab("Items"),
        ItemDefinition::new("gate_key", "Gate Key")
            .unique()
            .with_tab("Keys"),
    ])
}

fn item(db: &ItemDatabase, id: &str) -> Arc<ItemDefinition> {
    db.find_item(id).unwrap()
}

fn contents(inv: &RuntimeInventory, tab: &str) -> Vec<(Option<String>, u32, bool)> {
    inv.slots_for_tab(tab)
        .unwrap()
        .iter()
        .map(|s| (s.item_id().map(String::from), s.amount(), s.is_locked()))
        .collect()
}

#[test]
fn test_round_trip_through_memory() {
    let db = database();
    let store = Arc::new(MemorySaveSystem::new());

    let mut inv = RuntimeInventory::new(backpack()).with_save_system(store.clone());
    inv.add_item(&item(&db, "potion"), 4);
    inv.add_item(&item(&db, "sword"), 1);
    inv.add_item(&item(&db, "gate_key"), 1);
    inv.unlock_slots_for_tab("Items", "upgrade");
    inv.change_weight_limit(30.0);
    inv.save_inventory().unwrap();

    assert!(store.contains("Backpack"));

    let mut restored = RuntimeInventory::new(backpack()).with_save_system(store.clone());
    assert!(restored.load_inventory(&db).unwrap());

    assert_eq!(contents(&restored, "Items"), contents(&inv, "Items"));
    assert_eq!(contents(&restored, "Keys"), contents(&inv, "Keys"));
    assert_eq!(restored.tab_config("Items").unwrap().max_slots(), 5);
    assert_eq!(restored.current_weight(), inv.current_weight());
    assert_eq!(restored.current_weight_limit(), 30.0);
    assert!(restored.invalid_item_ids().is_empty());
}

#[test]
fn test_round_trip_fixed_slots_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = database();
    let config = backpack().with_fixed_slots(true);

    let mut inv = RuntimeInventory::new(config.clone())
        .with_save_system(JsonFileSaveSystem::new(dir.path()));
    inv.add_item_to_specific_slot("Items", 2, &item(&db, "potion"), 6);
    inv.add_item_to_specific_slot("Keys", 1, &item(&db, "gate_key"), 1);
    inv.save_inventory().unwrap();

    assert!(dir.path().join("Backpack.json").exists());

    let mut restored = RuntimeInventory::new(config)
        .with_save_system(JsonFileSaveSystem::new(dir.path()));
    assert!(restored.load_inventory(&db).unwrap());

    let items = restored.slots_for_tab("Items").unwrap();
    assert!(items[0].is_empty());
    assert_eq!(items[2].item_id(), Some("potion"));
    assert_eq!(items[2].amount(), 6);
    assert_eq!(restored.slots_for_tab("Keys").unwrap()[1].item_id(), Some("gate_key"));
}

#[test]
fn test_non_fixed_load_packs_slots() {
    let db = database();
    let mut snapshot = InventorySnapshot::new("Backpack");
    snapshot.slots.push(SlotSnapshot {
        item_id: "potion".into(),
        amount: 2,
        is_locked: false,
        slot_index: 2,
        tab_name: None,
    });

    let mut inv = RuntimeInventory::new(backpack());
    inv.load_save_data(&snapshot, &db);

    let items = inv.slots_for_tab("Items").unwrap();
    assert_eq!(items[0].item_id(), Some("potion"));
    assert_eq!(items[0].amount(), 2);
    assert!(items[2].is_empty());
}

#[test]
fn test_unknown_ids_are_reported() {
    let db = database();
    let mut snapshot = InventorySnapshot::new("Backpack");
    for (id, index) in [("potion", 0), ("dragon_egg", 1), ("dragon_egg", 2), ("old_map", 3)] {
        snapshot.slots.push(SlotSnapshot {
            item_id: id.into(),
            amount: 1,
            is_locked: false,
            slot_index: index,
            tab_name: Some("Items".into()),
        });
    }

    let mut inv = RuntimeInventory::new(backpack());
    inv.load_save_data(&snapshot, &db);

    assert_eq!(inv.invalid_item_ids(), ["dragon_egg", "old_map"]);
    assert_eq!(inv.count_item(&item(&db, "potion")), 1);

    let resaved = inv.get_save_data();
    let resaved: Vec<&str> = resaved.slots.iter().map(|s| s.item_id.as_str()).collect();
    assert_eq!(resaved, ["potion"]);
}

#[test]
fn test_fixed_round_trip_keeps_second_tab() {
    let lantern = ItemDefinition::new("lantern", "Lantern")
        .with_tab("Items")
        .with_tab("Keys");
    let mut db = database();
    db.add_item(lantern);
    let lantern = item(&db, "lantern");
    let potion = item(&db, "potion");

    let mut inv = RuntimeInventory::new(backpack().with_fixed_slots(true));
    assert_eq!(
        inv.add_item_to_specific_slot("Keys", 0, &potion, 3).update_type,
        InventoryUpdateType::TabNotFound
    );
    assert!(inv.add_item_to_specific_slot("Keys", 1, &lantern, 2).succeeded());
    assert!(inv.add_item_to_specific_slot("Items", 1, &lantern, 1).succeeded());

    let snapshot = inv.get_save_data();
    let mut restored = RuntimeInventory::new(backpack().with_fixed_slots(true));
    restored.load_save_data(&snapshot, &db);

    assert_eq!(contents(&restored, "Keys"), contents(&inv, "Keys"));
    assert_eq!(contents(&restored, "Items"), contents(&inv, "Items"));
    assert_eq!(restored.count_item(&lantern), 3);
    assert_eq!(restored.count_item(&potion), 0);
}

#[test]
fn test_saved_limit_is_clamped() {
    let db = database();
    let mut snapshot = InventorySnapshot::new("Backpack");
    snapshot.current_weight_limit = 500.0;

    let mut inv = RuntimeInventory::new(backpack());
    inv.load_save_data(&snapshot, &db);

    assert_eq!(inv.current_weight_limit(), 50.0);
}

#[test]
fn test_tier_locked_slots_stay_locked_after_load() {
    let db = database();
    let mut snapshot = InventorySnapshot::new("Backpack");
    snapshot.unlocked_states_by_tab.push(TabUnlockSnapshot {
        tab_name: "Items".into(),
        unlocked_states: vec![
            UnlockStateSnapshot {
                state_id: "base".into(),
                unlocked: true,
            },
            UnlockStateSnapshot {
                state_id: "upgrade".into(),
                unlocked: false,
            },
        ],
    });

    let mut inv = RuntimeInventory::new(backpack().with_fixed_slots(true));
    inv.load_save_data(&snapshot, &db);

    let items = inv.slots_for_tab("Items").unwrap();
    assert!(!items[2].is_locked());
    assert!(items[3].is_locked());
    assert!(items[4].is_locked());
}

#[test]
fn test_load_without_save() {
    let db = database();
    let mut inv = RuntimeInventory::new(backpack()).with_save_system(MemorySaveSystem::new());

    let changed = Arc::new(AtomicU32::new(0));
    let changed_clone = changed.clone();
    inv.on_inventory_changed.subscribe(move |_| {
        changed_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!inv.load_inventory(&db).unwrap());
    assert_eq!(changed.load(Ordering::SeqCst), 1);
    assert!(inv.is_empty());
}

#[test]
fn test_load_notifies_once() {
    let db = database();
    let store = Arc::new(MemorySaveSystem::new());

    let mut inv = RuntimeInventory::new(backpack()).with_save_system(store.clone());
    inv.add_item(&item(&db, "potion"), 3);
    inv.add_item(&item(&db, "sword"), 1);
    inv.save_inventory().unwrap();

    let mut restored = RuntimeInventory::new(backpack()).with_save_system(store);
    let changed = Arc::new(AtomicU32::new(0));
    let changed_clone = changed.clone();
    restored.on_inventory_changed.subscribe(move |inventory| {
        assert_eq!(inventory.count_item(&ItemDefinition::new("potion", "Potion")), 3);
        changed_clone.fetch_add(1, Ordering::SeqCst);
    });

    restored.load_inventory(&db).unwrap();
    assert_eq!(changed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_corrupted_save_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Backpack.json"), "{ not json").unwrap();

    let mut inv = RuntimeInventory::new(backpack())
        .with_save_system(JsonFileSaveSystem::new(dir.path()));

    let result = inv.load_inventory(&database());
    assert!(matches!(
        result,
        Err(InventoryError::Save(SaveError::Deserialization(_)))
    ));
}

#[test]
fn test_unlock_makes_slot_addressable() {
    let db = database();
    let potion = item(&db, "potion");
    let mut inv = RuntimeInventory::new(backpack());

    let before = inv.add_item_to_specific_slot("Items", 3, &potion, 1);
    assert_eq!(before.update_type, InventoryUpdateType::SizeLimitReached);

    assert!(inv.unlock_slots_for_tab("Items", "upgrade"));
    let after = inv.add_item_to_specific_slot("Items", 3, &potion, 1);
    assert_eq!(after.update_type, InventoryUpdateType::Added);
}

#[test]
fn test_items_go_to_their_tab() {
    let db = database();
    let mut inv = RuntimeInventory::new(backpack());

    let key = inv.add_item(&item(&db, "gate_key"), 1);
    assert!(key.succeeded());
    assert_eq!(inv.slots_for_tab("Keys").unwrap()[0].item_id(), Some("gate_key"));
    assert!(inv.slots_for_tab("Items").unwrap().iter().all(|s| s.is_empty()));
}

#[test]
fn test_weight_tracks_contents() {
    let db = database();
    let sword = item(&db, "sword");
    let potion = item(&db, "potion");
    let mut inv = RuntimeInventory::new(backpack());

    inv.add_item(&sword, 1);
    inv.add_item(&potion, 4);
    assert_eq!(inv.current_weight(), 6.0);

    inv.remove_item(&potion, 2);
    assert_eq!(inv.current_weight(), 5.0);
    assert_eq!(inv.find_slot_with_item("Items", &potion).unwrap().amount(), 2);
}

#[test]
fn test_config_from_json() {
    let config = InventoryConfig::from_json_str(
        r#"{
            "name": "Chest",
            "use_fixed_slots": true,
            "tabs": [
                { "name": "Items", "unlock_states": [
                    { "id": "base", "additional_slots": 4 },
                    { "id": "gold", "additional_slots": 4 }
                ] }
            ]
        }"#,
    )
    .unwrap();

    let inv = RuntimeInventory::new(config);
    assert_eq!(inv.slots_for_tab("Items").unwrap().len(), 8);
    assert_eq!(inv.tab_config("Items").unwrap().max_slots(), 4);
    assert_eq!(inv.current_weight_limit(), 100.0);
}
