//! Item transfer between owners
//!
//! A transfer detaches an item from wherever it is, asks the first-fit
//! allocator for a spot in the destination grid, converts the record to the
//! destination layout, then writes the location fields and attaches it.
//! Placement failure is a normal outcome ([`Placement::NoFit`]); errors hand the
//! item back through [`Rejected`] so the caller always ends up holding it.

use crate::allocator::first_fit::FirstFitAllocator;
use crate::allocator::{GridAllocator, Position, Rect};
use crate::collection::{Collection, OwnerId};
use crate::config::TransferConfig;
use crate::conversion::convert_for;
use crate::error::{Result, StashError};
use crate::grid::{grid_dimensions, LEGACY_STASH_PAGE};
use crate::item::{EquipSlot, Item, ItemId, ItemLocation, StorageType};
use crate::layout::{COLUMN, EQUIP_SLOT, LOCATION, ROW, STORAGE};
use crate::owner::Owner;
use crate::page::add_page;
use crate::validation::ItemCode;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of a placement attempt
#[derive(Debug)]
pub enum Placement {
    Placed(Position),
    /// No free spot; the item is handed back unchanged
    NoFit(Item),
}

/// A placement that failed with an error, returning the item
#[derive(Debug)]
pub struct Rejected {
    pub item: Item,
    pub error: StashError,
}

impl From<Rejected> for StashError {
    fn from(rejected: Rejected) -> Self {
        rejected.error
    }
}

/// Rectangles already occupied where an item would go
///
/// On a character this is every stored item of the same storage, except items
/// belonging to a corpse or the mercenary. On a stash it is the page's items.
pub fn occupied_rects(owner: &Owner, storage: StorageType, page: usize) -> Vec<Rect> {
    match owner {
        Owner::Character(c) => c
            .items
            .iter()
            .filter(|item| {
                item.location() == ItemLocation::Stored
                    && item.storage() == Some(storage)
                    && !item.is_corpse()
                    && !item.is_mercenary()
            })
            .map(Item::rect)
            .collect(),
        _ => owner
            .pages()
            .get(page)
            .map(|p| p.items.iter().map(Item::rect).collect())
            .unwrap_or_default(),
    }
}

/// Place a detached item into `owner`
///
/// `page` is ignored for characters. Stash destinations always use
/// [`StorageType::Stash`].
pub fn place_item(
    mut item: Item,
    owner: &mut Owner,
    storage: StorageType,
    page: usize,
    config: &TransferConfig,
) -> std::result::Result<Placement, Rejected> {
    let storage = if owner.is_stash() {
        StorageType::Stash
    } else {
        storage
    };

    if owner.is_stash() && page >= owner.page_count() {
        return Err(Rejected {
            item,
            error: StashError::PageOutOfRange {
                page,
                pages: owner.page_count(),
            },
        });
    }

    let allocator = FirstFitAllocator::new(grid_dimensions(storage, owner));
    let occupied = occupied_rects(owner, storage, page);
    let Some(position) = allocator.find_spot(item.footprint(), &occupied) else {
        debug!(
            "No spot for item {} ({}x{}) in {}",
            item.id(),
            item.footprint().width,
            item.footprint().height,
            owner.owner_name()
        );
        return Ok(Placement::NoFit(item));
    };

    if let Err(error) = convert_for(&mut item, owner.version(), config) {
        return Err(Rejected { item, error });
    }

    let writes = [
        (LOCATION, ItemLocation::Stored as u64),
        (EQUIP_SLOT, EquipSlot::None as u64),
        (COLUMN, u64::from(position.column)),
        (ROW, u64::from(position.row)),
        (STORAGE, storage as u64),
    ];
    if let Err(error) = item.rewrite(&writes) {
        return Err(Rejected { item, error });
    }
    item.clear_transient_flags();

    debug!(
        "Placed item {} at ({}, {}) in {}",
        item.id(),
        position.row,
        position.column,
        owner.owner_name()
    );

    match owner {
        Owner::Character(c) => {
            item.set_page(None);
            c.items.push(item);
        }
        Owner::LegacyStash(s) => {
            item.set_page(Some(page));
            s.pages[page].items.push(item);
        }
        Owner::NativeStash(s) => {
            item.set_page(Some(page));
            s.pages[page].items.push(item);
        }
    }

    Ok(Placement::Placed(position))
}

/// Requested transfer count per item code
///
/// Only consulted for groups of more than one stackable item.
#[derive(Debug, Clone, Default)]
pub struct TransferQuantities {
    quantities: AHashMap<ItemCode, u32>,
}

impl TransferQuantities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for `code`; zero or negative removes the entry
    pub fn set(&mut self, code: ItemCode, quantity: i64) {
        if quantity <= 0 {
            self.quantities.remove(&code);
        } else {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            self.quantities.insert(code, quantity);
        }
    }

    pub fn get(&self, code: &ItemCode) -> Option<u32> {
        self.quantities.get(code).copied()
    }

    pub fn reset(&mut self) {
        self.quantities.clear();
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

/// Result of a bulk transfer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReport {
    /// Items placed, in placement order
    pub transferred: Vec<ItemId>,
    /// Pages added to the destination
    pub pages_created: usize,
}

/// Group stackable items by code, in first-appearance order
///
/// Every other item forms a group of its own at its input position, so
/// equipment keeps the caller's order.
pub fn group_items<'a>(items: &[&'a Item]) -> Vec<Vec<&'a Item>> {
    let mut index: AHashMap<&ItemCode, usize> = AHashMap::new();
    let mut groups: Vec<Vec<&Item>> = Vec::new();
    for &item in items {
        if !item.is_stackable() {
            groups.push(vec![item]);
            continue;
        }
        match index.get(item.code()) {
            Some(&group) => groups[group].push(item),
            None => {
                index.insert(item.code(), groups.len());
                groups.push(vec![item]);
            }
        }
    }
    groups
}

/// Pick the items a bulk transfer will move
///
/// A group of more than one stackable item with a requested quantity `q`,
/// `0 < q < group size`, contributes its first `q` items. Every other group
/// contributes all of its items.
pub fn select_items(items: &[&Item], quantities: &TransferQuantities) -> Vec<ItemId> {
    let mut selected = Vec::new();
    for group in group_items(items) {
        let take = match (group.first(), group.len()) {
            (Some(first), len) if first.is_stackable() && len > 1 => {
                match quantities.get(first.code()) {
                    Some(q) if (q as usize) < len => q as usize,
                    _ => len,
                }
            }
            (_, len) => len,
        };
        selected.extend(group.iter().take(take).map(|item| item.id()));
    }
    selected
}

impl Collection {
    /// Move one item into `to`
    ///
    /// Returns `Ok(false)` when the destination has no room; the item then
    /// sits in the detached list until it is transferred again. Unknown owners,
    /// out-of-range pages and aliased ids are reported before anything moves.
    pub fn transfer_item(
        &mut self,
        id: ItemId,
        to: OwnerId,
        storage: StorageType,
        page: Option<usize>,
    ) -> Result<bool> {
        let page = page.unwrap_or(0);
        let owner = self.owner(to)?;
        if owner.is_stash() && page >= owner.page_count() {
            return Err(StashError::PageOutOfRange {
                page,
                pages: owner.page_count(),
            });
        }

        let item = self.detach(id)?;
        self.place_detached(item, to, storage, page)
    }

    /// Place an item that is already out of every owner
    ///
    /// Items that do not fit, or that fail with an error, are parked in the
    /// detached list.
    fn place_detached(
        &mut self,
        item: Item,
        to: OwnerId,
        storage: StorageType,
        page: usize,
    ) -> Result<bool> {
        let config = self.config().clone();
        let owner = self.owner_mut(to)?;
        match place_item(item, owner, storage, page, &config) {
            Ok(Placement::Placed(_)) => Ok(true),
            Ok(Placement::NoFit(item)) => {
                self.park(item);
                Ok(false)
            }
            Err(Rejected { item, error }) => {
                self.park(item);
                Err(error)
            }
        }
    }

    /// Items a bulk transfer of `items` would move, in transfer order
    pub fn plan_transfer(
        &self,
        items: &[ItemId],
        quantities: &TransferQuantities,
    ) -> Result<Vec<ItemId>> {
        let mut seen = AHashSet::new();
        let mut resolved = Vec::new();
        for &id in items {
            if seen.insert(id) {
                resolved.push(self.item(id)?);
            }
        }
        Ok(select_items(&resolved, quantities))
    }

    /// Move a selection of items into `to`, honouring per-code quantities
    ///
    /// - Legacy stash: items go onto a fresh overflow page; when a page fills
    ///   up another one is added and the item retried once.
    /// - Character: the first item that does not fit aborts the batch.
    /// - Native stash: every item scans the pages from the first one; an item
    ///   that fits nowhere aborts the batch.
    ///
    /// An abort returns [`StashError::InsufficientSpace`]. Items moved before it
    /// stay where they were placed; the failing item is left detached.
    pub fn bulk_transfer_with_quantities(
        &mut self,
        to: OwnerId,
        items: &[ItemId],
        quantities: &TransferQuantities,
        storage: StorageType,
    ) -> Result<TransferReport> {
        let plan = self.plan_transfer(items, quantities)?;
        let target = self.owner(to)?;
        let target_name = target.owner_name();
        let (legacy, character) = (target.is_legacy_stash(), target.is_character());

        let report = if legacy {
            self.fill_legacy_stash(to, &plan)?
        } else if character {
            self.fill_character(to, &plan, storage)?
        } else {
            self.fill_native_stash(to, &plan)?
        };

        info!(
            "Transferred {} of {} selected items to {} ({} pages created)",
            report.transferred.len(),
            plan.len(),
            target_name,
            report.pages_created
        );
        Ok(report)
    }

    fn fill_legacy_stash(&mut self, to: OwnerId, plan: &[ItemId]) -> Result<TransferReport> {
        for &id in plan {
            let footprint = self.item(id)?.footprint();
            if !LEGACY_STASH_PAGE.can_hold(footprint) {
                return Err(StashError::ItemTooLarge {
                    item: id,
                    width: footprint.width,
                    height: footprint.height,
                    rows: LEGACY_STASH_PAGE.rows,
                    cols: LEGACY_STASH_PAGE.cols,
                });
            }
        }

        let mut report = TransferReport::default();
        let overflow_name = self.config().overflow_page_name.clone();

        let mut page = match self.owner(to)?.page_count() {
            count if self.config().create_lead_page || count == 0 => {
                report.pages_created += 1;
                add_page(self.owner_mut(to)?, &overflow_name)?
            }
            count => count - 1,
        };

        for &id in plan {
            let item = self.detach(id)?;
            if !self.place_detached(item, to, StorageType::Stash, page)? {
                warn!("Page {} is full, adding overflow page '{}'", page, overflow_name);
                page = add_page(self.owner_mut(to)?, &overflow_name)?;
                report.pages_created += 1;

                let item = self.detach(id)?;
                if !self.place_detached(item, to, StorageType::Stash, page)? {
                    warn!("Item {} does not fit on an empty page, aborting", id);
                    return Err(StashError::InsufficientSpace {
                        item: id,
                        transferred: report.transferred.len(),
                    });
                }
            }
            report.transferred.push(id);
        }

        Ok(report)
    }

    fn fill_character(
        &mut self,
        to: OwnerId,
        plan: &[ItemId],
        storage: StorageType,
    ) -> Result<TransferReport> {
        let mut report = TransferReport::default();
        for &id in plan {
            if !self.transfer_item(id, to, storage, None)? {
                warn!("Character is full, aborting at item {}", id);
                return Err(StashError::InsufficientSpace {
                    item: id,
                    transferred: report.transferred.len(),
                });
            }
            report.transferred.push(id);
        }
        Ok(report)
    }

    fn fill_native_stash(&mut self, to: OwnerId, plan: &[ItemId]) -> Result<TransferReport> {
        let mut report = TransferReport::default();
        'items: for &id in plan {
            let mut item = self.detach(id)?;
            // Restart from the first page every time; a smaller item may fit
            // where the previous one did not
            for page in 0..self.owner(to)?.page_count() {
                if self.place_detached(item, to, StorageType::Stash, page)? {
                    report.transferred.push(id);
                    continue 'items;
                }
                item = self.detach(id)?;
            }
            self.park(item);
            warn!("Stash is full, aborting at item {}", id);
            return Err(StashError::InsufficientSpace {
                item: id,
                transferred: report.transferred.len(),
            });
        }
        Ok(report)
    }

    /// Place a copy of an item, with fresh ids for it and its socket fillers
    ///
    /// Returns the id of the copy, or `None` if the destination has no room
    /// (the copy is then discarded).
    pub fn duplicate_item(
        &mut self,
        id: ItemId,
        to: OwnerId,
        storage: StorageType,
        page: Option<usize>,
    ) -> Result<Option<ItemId>> {
        let page = page.unwrap_or(0);
        self.owner(to)?;
        let original = self.item(id)?.clone();
        let copy = original.duplicate(&mut || self.next_item_id());
        let copy_id = copy.id();

        let config = self.config().clone();
        match place_item(copy, self.owner_mut(to)?, storage, page, &config) {
            Ok(Placement::Placed(_)) => {
                info!("Duplicated item {} as {}", id, copy_id);
                Ok(Some(copy_id))
            }
            Ok(Placement::NoFit(_)) => Ok(None),
            Err(rejected) => Err(rejected.into()),
        }
    }
}
