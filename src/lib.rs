//! # stashkit - Item Storage & Transfer Engine
//!
//! `stashkit` moves items between parsed action-RPG save files: characters,
//! legacy shared stashes and native shared stashes. It works on the raw
//! bit-packed item records and keeps them consistent while items move:
//!
//! - **Bit record codec** with a static field schema for both save layouts
//! - **First-fit placement** in fixed-size item grids
//! - **Version conversion** between the legacy and native record layouts
//! - **Bulk transfer** with per-code quantities and overflow pages
//! - **Page lifecycle** that never loses stash gold
//! - **Snapshots** with SHA-256 checksums for caller-driven rollback
//!
//! ## Quick Start
//!
//! ```rust
//! use stashkit::{
//!     Character, Collection, FormatVersion, Item, ItemCode, ItemId, NativeStash, Owner, Page,
//!     Position, StorageType, TransferQuantities,
//! };
//!
//! # fn main() -> stashkit::Result<()> {
//! // Five runes in a legacy character's inventory
//! let runes = (0..5)
//!     .map(|i| {
//!         Item::builder(ItemId(i + 1), "r01")
//!             .simple()
//!             .stored(StorageType::Inventory, Position::new(0, i as u8))
//!             .build()
//!     })
//!     .collect::<stashkit::Result<Vec<_>>>()?;
//!
//! let mut collection = Collection::builder()
//!     .owner(Owner::Character(
//!         Character::new("Sorc", FormatVersion::LEGACY).with_items(runes),
//!     ))
//!     .owner(Owner::NativeStash(
//!         NativeStash::new("shared", FormatVersion::NATIVE).with_pages(vec![Page::native(0)])?,
//!     ))
//!     .build()?;
//!
//! let sorc = collection.find_owner("character/Sorc").unwrap();
//! let stash = collection.find_owner("native-stash/shared").unwrap();
//! let selected = collection.owner(sorc)?.item_ids();
//!
//! // Move three of the five runes, converting them to the native layout
//! let mut quantities = TransferQuantities::new();
//! quantities.set(ItemCode::new("r01")?, 3);
//! let report =
//!     collection.bulk_transfer_with_quantities(stash, &selected, &quantities, StorageType::Stash)?;
//!
//! assert_eq!(report.transferred.len(), 3);
//! assert_eq!(collection.owner(stash)?.item_count(), 3);
//! assert_eq!(collection.owner(sorc)?.item_count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The engine reports through `tracing`; install a subscriber to see it.

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use self::core::{
    allocator, bits, catalog, collection, config, conversion, error, grid, item, layout, owner,
    page, snapshot, transfer, validation,
};

// Re-export core types that users need
pub use crate::core::{
    allocator::{
        bitmap::OccupancyBitmap, first_fit::FirstFitAllocator, Footprint, GridAllocator,
        GridDimensions, Position, Rect,
    },
    bits::BitRecord,
    catalog::{ItemCatalog, StaticCatalog},
    collection::{Collection, CollectionBuilder, ItemLocator, OwnerId},
    config::TransferConfig,
    conversion::{convert_for, to_legacy_format, to_native_format},
    error::{Result, StashError},
    grid::grid_dimensions,
    item::{
        Durability, EquipSlot, Item, ItemBuilder, ItemHeader, ItemId, ItemKind, ItemLocation,
        Sockets, StorageType,
    },
    layout::{FieldSpec, FormatVariant, FormatVersion, RecordBuilder},
    owner::{owner_name, Character, LegacyStash, NativeStash, Owner},
    page::{add_page, delete_pages, Page, PageKind},
    snapshot::Snapshot,
    transfer::{
        group_items, occupied_rects, place_item, select_items, Placement, Rejected,
        TransferQuantities, TransferReport,
    },
    validation::ItemCode,
};
