//! Loading configuration and catalog tables from disk

use stashkit::{
    BitRecord, Collection, FormatVersion, Item, ItemCatalog, ItemCode, ItemId, ItemKind,
    RecordBuilder, StashError, StaticCatalog, TransferConfig,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_overflow_page_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("transfer.toml");
    fs::write(
        &path,
        "overflow_page_name = \"Mule\"\nlegacy_item_version = 100\ncreate_lead_page = true\n",
    )
    .unwrap();

    let config = TransferConfig::from_file(&path).unwrap();
    assert_eq!(config.overflow_page_name, "Mule");
    assert_eq!(config.legacy_item_version, 100);
    assert_eq!(config.native_item_version, 5);

    let collection = Collection::new(config).unwrap();
    assert_eq!(collection.config().overflow_page_name, "Mule");
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("transfer.toml");
    fs::write(&path, "overflow_page_name = \"this page name is far too long to be accepted\"\n").unwrap();

    assert!(matches!(
        TransferConfig::from_file(&path),
        Err(StashError::Config(_))
    ));
}

#[test]
fn test_catalog_supplies_footprints() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("items.json");
    fs::write(
        &path,
        r#"{
            "7cr": { "width": 2, "height": 4 },
            "r01": { "width": 1, "height": 1 }
        }"#,
    )
    .unwrap();
    let catalog = StaticCatalog::from_file(&path).unwrap();
    assert_eq!(catalog.len(), 2);

    let record = RecordBuilder::new(FormatVersion::LEGACY.variant())
        .code("7cr")
        .build()
        .unwrap();
    let item = Item::from_catalog(
        ItemId(1),
        record,
        FormatVersion::LEGACY,
        ItemCode::new("7cr").unwrap(),
        &catalog,
        ItemKind::Equipment {
            durability: None,
            sockets: None,
        },
    )
    .unwrap();
    assert_eq!(item.footprint(), catalog.footprint(item.code()).unwrap());
    assert_eq!(item.footprint().height, 4);
}

#[test]
fn test_unknown_code_rejected() {
    let catalog = StaticCatalog::new();
    let record: BitRecord = RecordBuilder::new(FormatVersion::LEGACY.variant())
        .code("xyz")
        .build()
        .unwrap();

    let result = Item::from_catalog(
        ItemId(1),
        record,
        FormatVersion::LEGACY,
        ItemCode::new("xyz").unwrap(),
        &catalog,
        ItemKind::Simple { quantity: None },
    );
    assert!(matches!(result, Err(StashError::UnknownItemCode(code)) if code == "xyz"));
}
