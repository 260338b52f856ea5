//! The owner graph
//!
//! A [`Collection`] holds every loaded owner and a detached list for items that
//! left an owner without finding a new slot. Items are addressed by
//! [`ItemId`] and owners by [`OwnerId`], so a transfer between two slots of the
//! same owner needs no aliasing borrows.

use crate::config::TransferConfig;
use crate::error::{Result, StashError};
use crate::item::{Item, ItemId};
use crate::owner::Owner;
use crate::page;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Index of an owner within its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub usize);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner {}", self.0)
    }
}

/// Where an item currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLocator {
    Owner {
        owner: OwnerId,
        page: Option<usize>,
    },
    Detached,
}

/// Loaded owners and the items between them
#[derive(Debug, Clone)]
pub struct Collection {
    owners: Vec<Owner>,
    detached: Vec<Item>,
    config: TransferConfig,
    next_item_id: u64,
}

impl Default for Collection {
    fn default() -> Self {
        Collection {
            owners: Vec::new(),
            detached: Vec::new(),
            config: TransferConfig::default(),
            next_item_id: 1,
        }
    }
}

impl Collection {
    /// Create an empty collection with a validated configuration
    pub fn new(config: TransferConfig) -> Result<Self> {
        Ok(Collection {
            config: config.validated()?,
            ..Collection::default()
        })
    }

    pub fn builder() -> CollectionBuilder {
        CollectionBuilder::new()
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Register an owner
    ///
    /// Every item id in the owner, socket fillers included, must be new to the
    /// collection.
    pub fn add_owner(&mut self, owner: Owner) -> Result<OwnerId> {
        let mut known: AHashSet<ItemId> = self.all_item_ids().into_iter().collect();
        for id in owner.item_ids() {
            if !known.insert(id) {
                return Err(StashError::DuplicateItemId(id));
            }
        }

        if let Some(max) = known.iter().map(|id| id.0).max() {
            self.next_item_id = self.next_item_id.max(max + 1);
        }

        let id = OwnerId(self.owners.len());
        info!(
            "Loaded {} with {} items as {}",
            owner.owner_name(),
            owner.item_count(),
            id
        );
        self.owners.push(owner);
        Ok(id)
    }

    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    pub fn owner(&self, id: OwnerId) -> Result<&Owner> {
        self.owners.get(id.0).ok_or(StashError::OwnerNotFound(id.0))
    }

    pub(crate) fn owner_mut(&mut self, id: OwnerId) -> Result<&mut Owner> {
        self.owners.get_mut(id.0).ok_or(StashError::OwnerNotFound(id.0))
    }

    /// Look an owner up by its [`owner_name`](crate::owner::owner_name) key
    pub fn find_owner(&self, name: &str) -> Option<OwnerId> {
        self.owners
            .iter()
            .position(|owner| owner.owner_name() == name)
            .map(OwnerId)
    }

    /// Items that left an owner without being placed
    pub fn detached(&self) -> &[Item] {
        &self.detached
    }

    pub(crate) fn park(&mut self, item: Item) {
        self.detached.push(item);
    }

    /// Every item id held, socket fillers included
    pub fn all_item_ids(&self) -> Vec<ItemId> {
        self.owners
            .iter()
            .flat_map(Owner::item_ids)
            .chain(self.detached.iter().flat_map(Item::ids))
            .collect()
    }

    /// Number of top-level slots holding `id`
    pub fn occurrences(&self, id: ItemId) -> usize {
        let held: usize = self.owners.iter().map(|o| o.slots_of(id).len()).sum();
        held + self.detached.iter().filter(|item| item.id() == id).count()
    }

    fn check_unique(&self, id: ItemId) -> Result<()> {
        match self.occurrences(id) {
            0 => Err(StashError::ItemNotFound(id)),
            1 => Ok(()),
            count => {
                warn!("Item {} is held in {} places", id, count);
                Err(StashError::AliasedItem { item: id, count })
            }
        }
    }

    /// Find where a top-level item is
    pub fn locate(&self, id: ItemId) -> Result<ItemLocator> {
        self.check_unique(id)?;
        for (index, owner) in self.owners.iter().enumerate() {
            if let Some(item) = owner.get(id) {
                return Ok(ItemLocator::Owner {
                    owner: OwnerId(index),
                    page: item.page(),
                });
            }
        }
        Ok(ItemLocator::Detached)
    }

    /// Borrow a top-level item
    pub fn item(&self, id: ItemId) -> Result<&Item> {
        self.check_unique(id)?;
        self.owners
            .iter()
            .find_map(|owner| owner.get(id))
            .or_else(|| self.detached.iter().find(|item| item.id() == id))
            .ok_or(StashError::ItemNotFound(id))
    }

    /// Remove a top-level item from wherever it is and hand it to the caller
    pub fn detach(&mut self, id: ItemId) -> Result<Item> {
        self.check_unique(id)?;

        for owner in &mut self.owners {
            if let Some(slot) = owner.slots_of(id).into_iter().next() {
                return owner.take(slot).ok_or(StashError::ItemNotFound(id));
            }
        }

        let index = self
            .detached
            .iter()
            .position(|item| item.id() == id)
            .ok_or(StashError::ItemNotFound(id))?;
        Ok(self.detached.remove(index))
    }

    /// Fresh id, never used by this collection
    pub fn next_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Append an empty page to a stash
    pub fn add_page(&mut self, owner: OwnerId, name: &str) -> Result<usize> {
        page::add_page(self.owner_mut(owner)?, name)
    }

    /// Delete pages `[from, to)` of a stash
    ///
    /// The released items move to the detached list; their ids are returned.
    pub fn delete_pages(
        &mut self,
        owner: OwnerId,
        from: usize,
        to: Option<usize>,
    ) -> Result<Vec<ItemId>> {
        let items = page::delete_pages(self.owner_mut(owner)?, from, to)?;
        let ids = items.iter().map(Item::id).collect();
        self.detached.extend(items);
        Ok(ids)
    }

    pub(crate) fn replace_graph(&mut self, owners: Vec<Owner>, detached: Vec<Item>) {
        self.owners = owners;
        self.detached = detached;
        let max = self.all_item_ids().into_iter().map(|id| id.0).max();
        if let Some(max) = max {
            self.next_item_id = self.next_item_id.max(max + 1);
        }
    }

    pub(crate) fn graph(&self) -> (&[Owner], &[Item]) {
        (&self.owners, &self.detached)
    }
}

/// Builder for a [`Collection`]
///
/// # Examples
///
/// ```
/// use stashkit::{Character, Collection, FormatVersion, Owner, TransferConfig};
///
/// # fn main() -> stashkit::Result<()> {
/// let collection = Collection::builder()
///     .config(TransferConfig::default())
///     .owner(Owner::Character(Character::new("Sorc", FormatVersion::LEGACY)))
///     .build()?;
///
/// assert_eq!(collection.owners().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CollectionBuilder {
    config: TransferConfig,
    owners: Vec<Owner>,
}

impl CollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: TransferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn owner(mut self, owner: Owner) -> Self {
        self.owners.push(owner);
        self
    }

    /// Validate the configuration and register every owner in order
    pub fn build(self) -> Result<Collection> {
        let mut collection = Collection::new(self.config)?;
        for owner in self.owners {
            collection.add_owner(owner)?;
        }
        Ok(collection)
    }
}
