//! Item owners
//!
//! An owner is one parsed save file: a character, a legacy shared stash made of
//! named pages, or a native shared stash whose pages each carry their own gold.

use crate::error::{Result, StashError};
use crate::item::{Item, ItemId};
use crate::layout::{FormatVariant, FormatVersion};
use crate::page::{Page, PageKind};
use serde::{Deserialize, Serialize};

/// Character save: a flat list of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub version: FormatVersion,
    pub items: Vec<Item>,
}

impl Character {
    pub fn new(name: impl Into<String>, version: FormatVersion) -> Self {
        Character {
            name: name.into(),
            version,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, mut items: Vec<Item>) -> Self {
        for item in &mut items {
            item.set_page(None);
        }
        self.items = items;
        self
    }
}

/// Legacy shared stash; gold is held once for the whole stash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStash {
    pub name: String,
    pub version: FormatVersion,
    pub gold: u64,
    /// Personal stash of one character rather than the shared one
    pub personal: bool,
    pub(crate) pages: Vec<Page>,
}

impl LegacyStash {
    pub fn new(name: impl Into<String>, version: FormatVersion) -> Self {
        LegacyStash {
            name: name.into(),
            version,
            gold: 0,
            personal: false,
            pages: Vec::new(),
        }
    }

    /// Attach pages; every page must be a legacy page
    pub fn with_pages(mut self, pages: Vec<Page>) -> Result<Self> {
        check_page_kinds(&pages, false)?;
        self.pages = number_pages(pages);
        Ok(self)
    }
}

/// Native shared stash; each page holds its own gold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeStash {
    pub name: String,
    pub version: FormatVersion,
    pub(crate) pages: Vec<Page>,
}

impl NativeStash {
    pub fn new(name: impl Into<String>, version: FormatVersion) -> Self {
        NativeStash {
            name: name.into(),
            version,
            pages: Vec::new(),
        }
    }

    /// Attach pages; every page must be a native page
    pub fn with_pages(mut self, pages: Vec<Page>) -> Result<Self> {
        check_page_kinds(&pages, true)?;
        self.pages = number_pages(pages);
        Ok(self)
    }
}

/// Anything that holds items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Owner {
    Character(Character),
    LegacyStash(LegacyStash),
    NativeStash(NativeStash),
}

/// Where a top-level item sits inside its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemSlot {
    Character(usize),
    Page { page: usize, index: usize },
}

impl Owner {
    pub fn name(&self) -> &str {
        match self {
            Owner::Character(c) => &c.name,
            Owner::LegacyStash(s) => &s.name,
            Owner::NativeStash(s) => &s.name,
        }
    }

    pub fn version(&self) -> FormatVersion {
        match self {
            Owner::Character(c) => c.version,
            Owner::LegacyStash(s) => s.version,
            Owner::NativeStash(s) => s.version,
        }
    }

    pub fn variant(&self) -> FormatVariant {
        self.version().variant()
    }

    pub fn is_character(&self) -> bool {
        matches!(self, Owner::Character(_))
    }

    pub fn is_stash(&self) -> bool {
        !self.is_character()
    }

    pub fn is_legacy_stash(&self) -> bool {
        matches!(self, Owner::LegacyStash(_))
    }

    pub fn is_native_stash(&self) -> bool {
        matches!(self, Owner::NativeStash(_))
    }

    /// Stable identity key, unique per owner and kind
    pub fn owner_name(&self) -> String {
        owner_name(self)
    }

    pub fn pages(&self) -> &[Page] {
        match self {
            Owner::Character(_) => &[],
            Owner::LegacyStash(s) => &s.pages,
            Owner::NativeStash(s) => &s.pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    pub(crate) fn pages_mut(&mut self) -> Option<&mut Vec<Page>> {
        match self {
            Owner::Character(_) => None,
            Owner::LegacyStash(s) => Some(&mut s.pages),
            Owner::NativeStash(s) => Some(&mut s.pages),
        }
    }

    /// Every top-level item, characters first then page by page
    pub fn items(&self) -> Box<dyn Iterator<Item = &Item> + '_> {
        match self {
            Owner::Character(c) => Box::new(c.items.iter()),
            _ => Box::new(self.pages().iter().flat_map(|p| p.items.iter())),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// Every item id held, socket fillers included
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items().flat_map(Item::ids).collect()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id() == id)
    }

    /// Every top-level slot holding `id`
    pub(crate) fn slots_of(&self, id: ItemId) -> Vec<ItemSlot> {
        match self {
            Owner::Character(c) => c
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.id() == id)
                .map(|(index, _)| ItemSlot::Character(index))
                .collect(),
            _ => self
                .pages()
                .iter()
                .enumerate()
                .flat_map(|(page, p)| {
                    p.items
                        .iter()
                        .enumerate()
                        .filter(move |(_, item)| item.id() == id)
                        .map(move |(index, _)| ItemSlot::Page { page, index })
                })
                .collect(),
        }
    }

    /// Remove the item at `slot`
    pub(crate) fn take(&mut self, slot: ItemSlot) -> Option<Item> {
        match (self, slot) {
            (Owner::Character(c), ItemSlot::Character(index)) if index < c.items.len() => {
                Some(c.items.remove(index))
            }
            (owner, ItemSlot::Page { page, index }) => {
                let items = &mut owner.pages_mut()?.get_mut(page)?.items;
                (index < items.len()).then(|| items.remove(index))
            }
            _ => None,
        }
    }
}

/// Reject pages whose kind belongs to the other stash format
pub(crate) fn check_page_kinds(pages: &[Page], native: bool) -> Result<()> {
    for (index, page) in pages.iter().enumerate() {
        if matches!(page.kind, PageKind::Native { .. }) != native {
            return Err(StashError::PageKindMismatch {
                page: index,
                expected: if native { "native" } else { "legacy" },
            });
        }
    }
    Ok(())
}

fn number_pages(mut pages: Vec<Page>) -> Vec<Page> {
    for (index, page) in pages.iter_mut().enumerate() {
        for item in &mut page.items {
            item.set_page(Some(index));
        }
    }
    pages
}

/// Stable identity key of an owner
///
/// Names are only unique within one kind, so the key carries the kind.
pub fn owner_name(owner: &Owner) -> String {
    let kind = match owner {
        Owner::Character(_) => "character",
        Owner::LegacyStash(_) => "legacy-stash",
        Owner::NativeStash(_) => "native-stash",
    };
    format!("{}/{}", kind, owner.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Position;
    use crate::item::StorageType;

    fn item(id: u64) -> Item {
        Item::builder(ItemId(id), "hp1")
            .simple()
            .stored(StorageType::Stash, Position::new(0, id as u8))
            .build()
            .unwrap()
    }

    #[test]
    fn test_predicates() {
        let character = Owner::Character(Character::new("Sorc", FormatVersion::LEGACY));
        let legacy = Owner::LegacyStash(LegacyStash::new("shared", FormatVersion::LEGACY));
        let native = Owner::NativeStash(NativeStash::new("shared", FormatVersion::NATIVE));

        assert!(character.is_character() && !character.is_stash());
        assert!(legacy.is_stash() && legacy.is_legacy_stash() && !legacy.is_native_stash());
        assert!(native.is_stash() && native.is_native_stash() && !native.is_legacy_stash());
    }

    #[test]
    fn test_owner_name_distinguishes_kinds() {
        let legacy = Owner::LegacyStash(LegacyStash::new("shared", FormatVersion::LEGACY));
        let native = Owner::NativeStash(NativeStash::new("shared", FormatVersion::NATIVE));

        assert_eq!(owner_name(&legacy), "legacy-stash/shared");
        assert_eq!(native.owner_name(), "native-stash/shared");
        assert_ne!(owner_name(&legacy), owner_name(&native));
    }

    #[test]
    fn test_items_across_pages() {
        let stash = Owner::LegacyStash(
            LegacyStash::new("shared", FormatVersion::LEGACY)
                .with_pages(vec![
                    Page::legacy("one").with_items(vec![item(1), item(2)]),
                    Page::legacy("two").with_items(vec![item(3)]),
                ])
                .unwrap(),
        );

        assert_eq!(stash.page_count(), 2);
        assert_eq!(stash.item_count(), 3);
        assert_eq!(stash.item_ids(), vec![ItemId(1), ItemId(2), ItemId(3)]);
        assert_eq!(stash.slots_of(ItemId(3)), vec![ItemSlot::Page { page: 1, index: 0 }]);
        assert!(stash.get(ItemId(4)).is_none());
    }

    #[test]
    fn test_mismatched_page_kinds_rejected() {
        let legacy = LegacyStash::new("shared", FormatVersion::LEGACY)
            .with_pages(vec![Page::native(7), Page::legacy("b")]);
        assert!(matches!(
            legacy,
            Err(StashError::PageKindMismatch { page: 0, expected: "legacy" })
        ));

        let native = NativeStash::new("shared", FormatVersion::NATIVE)
            .with_pages(vec![Page::native(5), Page::legacy("x")]);
        assert!(matches!(
            native,
            Err(StashError::PageKindMismatch { page: 1, expected: "native" })
        ));
    }

    #[test]
    fn test_take() {
        let mut character = Owner::Character(
            Character::new("Sorc", FormatVersion::LEGACY).with_items(vec![item(1), item(2)]),
        );
        let taken = character.take(ItemSlot::Character(0)).unwrap();
        assert_eq!(taken.id(), ItemId(1));
        assert_eq!(character.item_count(), 1);
        assert!(character.take(ItemSlot::Character(5)).is_none());
        assert!(character.take(ItemSlot::Page { page: 0, index: 0 }).is_none());
    }
}
