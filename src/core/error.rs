//! Error types for the storage and transfer engine

use crate::item::ItemId;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum StashError {
    /// Value needs more bits than the field declares
    #[error("Value {value} does not fit in {width} bits (field '{field}')")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: u32,
    },

    /// Bit range runs past the end of the record
    #[error("Bit range {offset}+{width} exceeds record length {len}")]
    FieldOutOfRange { offset: u32, width: u32, len: u32 },

    /// Field is not part of this record layout
    #[error("Field '{field}' does not exist in the {variant} format")]
    FieldAbsent {
        field: &'static str,
        variant: &'static str,
    },

    /// Field holds a value with no meaning (unknown location, storage or slot)
    #[error("Invalid value {value} for field '{field}'")]
    InvalidField { field: &'static str, value: u64 },

    /// Batch aborted because an item found no room
    #[error("Not enough space to transfer all the selected items. (stopped at item {item}, {transferred} transferred)")]
    InsufficientSpace { item: ItemId, transferred: usize },

    /// Page operation on a character
    #[error("Not a stash: {0} (page operations require a stash owner)")]
    NotAStash(String),

    /// Item is larger than an empty destination page
    #[error("Item {item} ({width}x{height}) cannot fit on an empty {rows}x{cols} page")]
    ItemTooLarge {
        item: ItemId,
        width: u8,
        height: u8,
        rows: u8,
        cols: u8,
    },

    /// Page index or range outside the stash
    #[error("Page index {page} out of range ({pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },

    /// No owner at this index
    #[error("Owner not found: {0}")]
    OwnerNotFound(usize),

    /// No item with this id anywhere in the collection
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Same id held by more than one slot
    #[error("Item {item} is referenced {count} times in the collection")]
    AliasedItem { item: ItemId, count: usize },

    /// Owner brings an id the collection already holds
    #[error("Duplicate item id: {0}")]
    DuplicateItemId(ItemId),

    /// Item code fails validation
    #[error("Invalid item code: {0}")]
    InvalidItemCode(String),

    /// Catalog has no footprint for this code
    #[error("Unknown item code: {0} (no catalog entry)")]
    UnknownItemCode(String),

    /// Item attributes disagree with its record
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Page kind belongs to the other stash format
    #[error("Page {page} is not a {expected} page")]
    PageKindMismatch { page: usize, expected: &'static str },

    /// Gold sum does not fit in a page
    #[error("Gold overflow: {0} exceeds page capacity")]
    GoldOverflow(u64),

    /// Snapshot data does not match its checksum
    #[error("Snapshot checksum verification failed")]
    ChecksumMismatch,

    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while loading configuration or catalogs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// bincode encoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// TOML decoding error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Engine result type
pub type Result<T> = std::result::Result<T, StashError>;
