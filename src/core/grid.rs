//! Grid size presets

use crate::allocator::GridDimensions;
use crate::item::StorageType;
use crate::layout::FormatVariant;
use crate::owner::Owner;

pub const INVENTORY: GridDimensions = GridDimensions::new(4, 10);
pub const CUBE: GridDimensions = GridDimensions::new(4, 3);
pub const LEGACY_CHARACTER_STASH: GridDimensions = GridDimensions::new(8, 6);
pub const NATIVE_CHARACTER_STASH: GridDimensions = GridDimensions::new(10, 10);
pub const LEGACY_STASH_PAGE: GridDimensions = GridDimensions::new(10, 10);
pub const NATIVE_STASH_PAGE: GridDimensions = GridDimensions::new(10, 10);

/// Belt slots; exposed for callers, never grid-packed
pub const BELT: GridDimensions = GridDimensions::new(1, 16);

/// Grid size for `storage` in `owner`
///
/// Stash owners only have pages, so `storage` is ignored for them.
pub fn grid_dimensions(storage: StorageType, owner: &Owner) -> GridDimensions {
    match owner {
        Owner::LegacyStash(_) => LEGACY_STASH_PAGE,
        Owner::NativeStash(_) => NATIVE_STASH_PAGE,
        Owner::Character(c) => match storage {
            StorageType::Inventory => INVENTORY,
            StorageType::Cube => CUBE,
            StorageType::Stash => match c.version.variant() {
                FormatVariant::Legacy => LEGACY_CHARACTER_STASH,
                FormatVariant::Native => NATIVE_CHARACTER_STASH,
            },
        },
    }
}
