//! Items and their persisted record
//!
//! An [`Item`] owns its raw [`BitRecord`], which is the single source of truth
//! for every persisted field. The decoded [`ItemHeader`] is derived from the
//! record and is only ever replaced together with it: every write builds the new
//! record, decodes it, and swaps both in one step.

use crate::allocator::{Footprint, Position, Rect};
use crate::bits::BitRecord;
use crate::catalog::ItemCatalog;
use crate::error::{Result, StashError};
use crate::layout::{
    decode_code, FieldSpec, FormatVariant, FormatVersion, RecordBuilder, CODE, COLUMN,
    EQUIP_SLOT, ETHEREAL, IDENTIFIED, LOCATION, PERSONALIZED, ROW, RUNEWORD, SIMPLE, SOCKETED,
    STORAGE,
};
use crate::validation::ItemCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest footprint side of any base item type
pub const MAX_FOOTPRINT_SIDE: u8 = 4;

/// Identity of an item within a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an item is, as persisted in its location field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ItemLocation {
    Stored = 0,
    Equipped = 1,
    Belt = 2,
    Socketed = 6,
}

impl ItemLocation {
    pub fn from_raw(value: u64) -> Result<Self> {
        match value {
            0 => Ok(ItemLocation::Stored),
            1 => Ok(ItemLocation::Equipped),
            2 => Ok(ItemLocation::Belt),
            6 => Ok(ItemLocation::Socketed),
            _ => Err(StashError::InvalidField {
                field: LOCATION.name,
                value,
            }),
        }
    }
}

/// Storage sub-type of a stored item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StorageType {
    Inventory = 1,
    Cube = 4,
    Stash = 5,
}

impl StorageType {
    /// Decode the storage field; 0 means "not stored"
    pub fn from_raw(value: u64) -> Result<Option<Self>> {
        match value {
            0 => Ok(None),
            1 => Ok(Some(StorageType::Inventory)),
            4 => Ok(Some(StorageType::Cube)),
            5 => Ok(Some(StorageType::Stash)),
            _ => Err(StashError::InvalidField {
                field: STORAGE.name,
                value,
            }),
        }
    }
}

/// Body slot of an equipped item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EquipSlot {
    None = 0,
    Head = 1,
    Neck = 2,
    Torso = 3,
    RightHand = 4,
    LeftHand = 5,
    RightFinger = 6,
    LeftFinger = 7,
    Waist = 8,
    Feet = 9,
    Hands = 10,
    AltRightHand = 11,
    AltLeftHand = 12,
}

impl EquipSlot {
    pub fn from_raw(value: u64) -> Result<Self> {
        const SLOTS: [EquipSlot; 13] = [
            EquipSlot::None,
            EquipSlot::Head,
            EquipSlot::Neck,
            EquipSlot::Torso,
            EquipSlot::RightHand,
            EquipSlot::LeftHand,
            EquipSlot::RightFinger,
            EquipSlot::LeftFinger,
            EquipSlot::Waist,
            EquipSlot::Feet,
            EquipSlot::Hands,
            EquipSlot::AltRightHand,
            EquipSlot::AltLeftHand,
        ];
        SLOTS
            .get(value as usize)
            .copied()
            .ok_or(StashError::InvalidField {
                field: EQUIP_SLOT.name,
                value,
            })
    }
}

/// Header fields decoded from an item record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHeader {
    pub location: ItemLocation,
    pub equip_slot: EquipSlot,
    pub storage: Option<StorageType>,
    pub column: u8,
    pub row: u8,
    pub identified: bool,
    pub socketed: bool,
    pub simple: bool,
    pub ethereal: bool,
    pub personalized: bool,
    pub runeword: bool,
}

impl ItemHeader {
    pub fn decode(record: &BitRecord, variant: FormatVariant) -> Result<Self> {
        let flag = |field: FieldSpec| -> Result<bool> { Ok(field.read(record, variant)? == 1) };
        Ok(ItemHeader {
            location: ItemLocation::from_raw(LOCATION.read(record, variant)?)?,
            equip_slot: EquipSlot::from_raw(EQUIP_SLOT.read(record, variant)?)?,
            storage: StorageType::from_raw(STORAGE.read(record, variant)?)?,
            column: COLUMN.read(record, variant)? as u8,
            row: ROW.read(record, variant)? as u8,
            identified: flag(IDENTIFIED)?,
            socketed: flag(SOCKETED)?,
            simple: flag(SIMPLE)?,
            ethereal: flag(ETHEREAL)?,
            personalized: flag(PERSONALIZED)?,
            runeword: flag(RUNEWORD)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    pub current: u16,
    pub max: u16,
}

/// Socket capacity and the items filling it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sockets {
    pub count: u8,
    pub filled: Vec<Item>,
}

/// Kind-dependent attributes, supplied by the save-file parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Fungible item (gems, runes, potions); grouped for quantity transfer
    Simple { quantity: Option<u16> },
    /// Anything with its own stats
    Equipment {
        durability: Option<Durability>,
        sockets: Option<Sockets>,
    },
}

/// An item and its persisted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    record: BitRecord,
    header: ItemHeader,
    version: FormatVersion,
    code: ItemCode,
    footprint: Footprint,
    kind: ItemKind,
    /// Page index when held by a stash
    page: Option<usize>,
    /// Parsed from a corpse section
    corpse: bool,
    /// Parsed from the mercenary section
    mercenary: bool,
}

impl Item {
    /// Wrap a parsed record
    ///
    /// Validates that the record decodes in the variant implied by `version`,
    /// that the kind agrees with the record's flags, and that socket fillers are
    /// socketed items of the same variant.
    pub fn from_record(
        id: ItemId,
        record: BitRecord,
        version: FormatVersion,
        code: ItemCode,
        footprint: Footprint,
        kind: ItemKind,
    ) -> Result<Self> {
        let variant = version.variant();
        let header = ItemHeader::decode(&record, variant)?;

        if !(1..=MAX_FOOTPRINT_SIDE).contains(&footprint.width)
            || !(1..=MAX_FOOTPRINT_SIDE).contains(&footprint.height)
        {
            return Err(StashError::InvalidItem(format!(
                "{} footprint {}x{} outside 1..={}",
                code, footprint.width, footprint.height, MAX_FOOTPRINT_SIDE
            )));
        }

        if variant == FormatVariant::Legacy {
            let persisted = decode_code(CODE.read(&record, variant)?);
            if persisted != code.as_str() {
                return Err(StashError::InvalidItem(format!(
                    "record code '{}' does not match '{}'",
                    persisted, code
                )));
            }
        }

        match &kind {
            ItemKind::Simple { .. } if !header.simple => {
                return Err(StashError::InvalidItem(format!(
                    "{} is simple but the record's simple flag is clear",
                    id
                )));
            }
            ItemKind::Equipment { .. } if header.simple => {
                return Err(StashError::InvalidItem(format!(
                    "{} is equipment but the record's simple flag is set",
                    id
                )));
            }
            ItemKind::Equipment { sockets, .. } => {
                if header.socketed != sockets.is_some() {
                    return Err(StashError::InvalidItem(format!(
                        "{} socketed flag disagrees with its sockets",
                        id
                    )));
                }
                if let Some(sockets) = sockets {
                    if sockets.filled.len() > sockets.count as usize {
                        return Err(StashError::InvalidItem(format!(
                            "{} has {} fillers for {} sockets",
                            id,
                            sockets.filled.len(),
                            sockets.count
                        )));
                    }
                    for filler in &sockets.filled {
                        if filler.location() != ItemLocation::Socketed
                            || filler.variant() != variant
                        {
                            return Err(StashError::InvalidItem(format!(
                                "{} socket filler {} is not a socketed {} item",
                                id,
                                filler.id(),
                                variant
                            )));
                        }
                    }
                }
            }
            ItemKind::Simple { .. } => {}
        }

        Ok(Item {
            id,
            record,
            header,
            version,
            code,
            footprint,
            kind,
            page: None,
            corpse: false,
            mercenary: false,
        })
    }

    /// Wrap a parsed record, taking the footprint from the game data catalog
    pub fn from_catalog(
        id: ItemId,
        record: BitRecord,
        version: FormatVersion,
        code: ItemCode,
        catalog: &dyn ItemCatalog,
        kind: ItemKind,
    ) -> Result<Self> {
        let footprint = catalog
            .footprint(&code)
            .ok_or_else(|| StashError::UnknownItemCode(code.to_string()))?;
        Self::from_record(id, record, version, code, footprint, kind)
    }

    /// Start building a synthetic item
    pub fn builder(id: ItemId, code: &str) -> ItemBuilder {
        ItemBuilder::new(id, code)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn record(&self) -> &BitRecord {
        &self.record
    }

    pub fn header(&self) -> &ItemHeader {
        &self.header
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn variant(&self) -> FormatVariant {
        self.version.variant()
    }

    pub fn code(&self) -> &ItemCode {
        &self.code
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn location(&self) -> ItemLocation {
        self.header.location
    }

    pub fn storage(&self) -> Option<StorageType> {
        self.header.storage
    }

    pub fn equip_slot(&self) -> EquipSlot {
        self.header.equip_slot
    }

    pub fn position(&self) -> Position {
        Position::new(self.header.row, self.header.column)
    }

    /// Cells covered by the item in its grid
    pub fn rect(&self) -> Rect {
        Rect::new(self.position(), self.footprint)
    }

    pub fn page(&self) -> Option<usize> {
        self.page
    }

    /// Stackable items group by code and support partial-quantity transfer
    pub fn is_stackable(&self) -> bool {
        matches!(self.kind, ItemKind::Simple { .. })
    }

    pub fn quantity(&self) -> Option<u16> {
        match self.kind {
            ItemKind::Simple { quantity } => quantity,
            ItemKind::Equipment { .. } => None,
        }
    }

    pub fn durability(&self) -> Option<Durability> {
        match self.kind {
            ItemKind::Equipment { durability, .. } => durability,
            ItemKind::Simple { .. } => None,
        }
    }

    pub fn sockets(&self) -> Option<&Sockets> {
        match &self.kind {
            ItemKind::Equipment { sockets, .. } => sockets.as_ref(),
            ItemKind::Simple { .. } => None,
        }
    }

    /// Items embedded in this item's sockets
    pub fn socketed_items(&self) -> &[Item] {
        self.sockets().map(|s| s.filled.as_slice()).unwrap_or(&[])
    }

    pub fn is_corpse(&self) -> bool {
        self.corpse
    }

    pub fn is_mercenary(&self) -> bool {
        self.mercenary
    }

    /// Mark the item as parsed from a corpse or mercenary section
    pub fn with_context(mut self, corpse: bool, mercenary: bool) -> Self {
        self.corpse = corpse;
        self.mercenary = mercenary;
        self
    }

    /// Write header fields through the codec
    ///
    /// The new record is built and decoded before anything is replaced, so a
    /// failed write leaves the item untouched.
    pub(crate) fn rewrite(&mut self, writes: &[(FieldSpec, u64)]) -> Result<()> {
        let variant = self.variant();
        let mut record = self.record.clone();
        for (field, value) in writes {
            record = field.write(&record, variant, *value)?;
        }
        let header = ItemHeader::decode(&record, variant)?;
        self.record = record;
        self.header = header;
        Ok(())
    }

    /// Replace the record with one laid out for `version`
    pub(crate) fn replace_record(&mut self, record: BitRecord, version: FormatVersion) -> Result<()> {
        let header = ItemHeader::decode(&record, version.variant())?;
        self.record = record;
        self.header = header;
        self.version = version;
        Ok(())
    }

    pub(crate) fn retag(&mut self, version: FormatVersion) {
        self.version = version;
    }

    pub(crate) fn set_page(&mut self, page: Option<usize>) {
        self.page = page;
    }

    pub(crate) fn clear_transient_flags(&mut self) {
        self.corpse = false;
        self.mercenary = false;
    }

    pub(crate) fn socketed_items_mut(&mut self) -> &mut [Item] {
        match &mut self.kind {
            ItemKind::Equipment {
                sockets: Some(sockets),
                ..
            } => sockets.filled.as_mut_slice(),
            _ => &mut [],
        }
    }

    /// Deep copy with fresh identities for the item and its socket fillers
    pub fn duplicate(&self, next_id: &mut impl FnMut() -> ItemId) -> Item {
        let mut copy = self.clone();
        copy.id = next_id();
        for filler in copy.socketed_items_mut() {
            *filler = filler.duplicate(next_id);
        }
        copy
    }

    /// Ids of this item and every item in its sockets
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids = vec![self.id];
        for filler in self.socketed_items() {
            ids.extend(filler.ids());
        }
        ids
    }
}

/// Builder for synthetic items
///
/// # Examples
///
/// ```
/// use stashkit::{FormatVersion, Item, ItemId, Position, StorageType};
///
/// let rune = Item::builder(ItemId(1), "r01")
///     .version(FormatVersion::LEGACY)
///     .simple()
///     .stored(StorageType::Stash, Position::new(0, 0))
///     .build()
///     .unwrap();
///
/// assert!(rune.is_stackable());
/// assert_eq!(rune.storage(), Some(StorageType::Stash));
/// ```
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    id: ItemId,
    code: String,
    version: FormatVersion,
    footprint: Footprint,
    kind: ItemKind,
    location: ItemLocation,
    equip_slot: EquipSlot,
    storage: Option<StorageType>,
    position: Position,
    ethereal: bool,
}

impl ItemBuilder {
    pub fn new(id: ItemId, code: &str) -> Self {
        ItemBuilder {
            id,
            code: code.to_string(),
            version: FormatVersion::LEGACY,
            footprint: Footprint::new(1, 1),
            kind: ItemKind::Equipment {
                durability: None,
                sockets: None,
            },
            location: ItemLocation::Stored,
            equip_slot: EquipSlot::None,
            storage: Some(StorageType::Inventory),
            position: Position::new(0, 0),
            ethereal: false,
        }
    }

    pub fn version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    pub fn footprint(mut self, width: u8, height: u8) -> Self {
        self.footprint = Footprint::new(width, height);
        self
    }

    pub fn simple(mut self) -> Self {
        self.kind = ItemKind::Simple { quantity: None };
        self
    }

    pub fn quantity(mut self, quantity: u16) -> Self {
        self.kind = ItemKind::Simple {
            quantity: Some(quantity),
        };
        self
    }

    pub fn durability(mut self, current: u16, max: u16) -> Self {
        if let ItemKind::Equipment { durability, .. } = &mut self.kind {
            *durability = Some(Durability { current, max });
        }
        self
    }

    /// Give the item `count` sockets holding `filled`
    pub fn sockets(mut self, count: u8, filled: Vec<Item>) -> Self {
        let durability = match self.kind {
            ItemKind::Equipment { durability, .. } => durability,
            ItemKind::Simple { .. } => None,
        };
        self.kind = ItemKind::Equipment {
            durability,
            sockets: Some(Sockets { count, filled }),
        };
        self
    }

    pub fn ethereal(mut self) -> Self {
        self.ethereal = true;
        self
    }

    pub fn stored(mut self, storage: StorageType, position: Position) -> Self {
        self.location = ItemLocation::Stored;
        self.equip_slot = EquipSlot::None;
        self.storage = Some(storage);
        self.position = position;
        self
    }

    pub fn equipped(mut self, slot: EquipSlot) -> Self {
        self.location = ItemLocation::Equipped;
        self.equip_slot = slot;
        self.storage = None;
        self.position = Position::new(0, 0);
        self
    }

    pub fn belt(mut self, slot: u8) -> Self {
        self.location = ItemLocation::Belt;
        self.equip_slot = EquipSlot::None;
        self.storage = None;
        self.position = Position::new(0, slot);
        self
    }

    pub fn socketed(mut self) -> Self {
        self.location = ItemLocation::Socketed;
        self.equip_slot = EquipSlot::None;
        self.storage = None;
        self.position = Position::new(0, 0);
        self
    }

    pub fn build(self) -> Result<Item> {
        let code = ItemCode::new(self.code)?;
        let mut record = RecordBuilder::new(self.version.variant())
            .code(code.as_str())
            .flag(IDENTIFIED)
            .field(LOCATION, self.location as u64)
            .field(EQUIP_SLOT, self.equip_slot as u64)
            .field(COLUMN, self.position.column as u64)
            .field(ROW, self.position.row as u64)
            .field(STORAGE, self.storage.map_or(0, |s| s as u64));

        match &self.kind {
            ItemKind::Simple { .. } => record = record.flag(SIMPLE),
            ItemKind::Equipment {
                sockets: Some(_), ..
            } => record = record.flag(SOCKETED),
            ItemKind::Equipment { .. } => {}
        }
        if self.ethereal {
            record = record.flag(ETHEREAL);
        }

        Item::from_record(
            self.id,
            record.build()?,
            self.version,
            code,
            self.footprint,
            self.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FIRST_NATIVE_VERSION;

    fn rune(id: u64) -> Item {
        Item::builder(ItemId(id), "r01")
            .simple()
            .stored(StorageType::Stash, Position::new(2, 3))
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_decoded_from_record() {
        let item = rune(1);
        assert_eq!(item.location(), ItemLocation::Stored);
        assert_eq!(item.storage(), Some(StorageType::Stash));
        assert_eq!(item.position(), Position::new(2, 3));
        assert!(item.header().identified);
        assert!(item.is_stackable());
        assert_eq!(item.variant(), FormatVariant::Legacy);
    }

    #[test]
    fn test_rewrite_keeps_record_and_header_in_sync() {
        let mut item = rune(1);
        item.rewrite(&[(COLUMN, 7), (ROW, 1)]).unwrap();

        assert_eq!(item.position(), Position::new(1, 7));
        assert_eq!(COLUMN.read(item.record(), FormatVariant::Legacy).unwrap(), 7);
        assert_eq!(ROW.read(item.record(), FormatVariant::Legacy).unwrap(), 1);
    }

    #[test]
    fn test_failed_rewrite_leaves_item_untouched() {
        let mut item = rune(1);
        let before = item.clone();

        let result = item.rewrite(&[(COLUMN, 5), (ROW, 99)]);
        assert!(matches!(result, Err(StashError::FieldOverflow { field: "row", .. })));
        assert_eq!(item, before);
    }

    #[test]
    fn test_kind_must_match_simple_flag() {
        let simple = rune(1);
        let result = Item::from_record(
            ItemId(2),
            simple.record().clone(),
            simple.version(),
            simple.code().clone(),
            simple.footprint(),
            ItemKind::Equipment {
                durability: None,
                sockets: None,
            },
        );
        assert!(matches!(result, Err(StashError::InvalidItem(_))));
    }

    #[test]
    fn test_code_must_match_legacy_record() {
        let item = rune(1);
        let result = Item::from_record(
            ItemId(2),
            item.record().clone(),
            item.version(),
            ItemCode::new("r02").unwrap(),
            item.footprint(),
            item.kind().clone(),
        );
        assert!(matches!(result, Err(StashError::InvalidItem(_))));
    }

    #[test]
    fn test_footprint_validated() {
        let result = Item::builder(ItemId(1), "box").footprint(5, 1).build();
        assert!(matches!(result, Err(StashError::InvalidItem(_))));
    }

    #[test]
    fn test_socket_fillers_validated() {
        let jewel = Item::builder(ItemId(2), "jew").socketed().build().unwrap();
        let host = Item::builder(ItemId(1), "7cr")
            .footprint(2, 4)
            .sockets(2, vec![jewel])
            .build()
            .unwrap();
        assert_eq!(host.socketed_items().len(), 1);
        assert!(host.header().socketed);
        assert_eq!(host.ids(), vec![ItemId(1), ItemId(2)]);

        // A filler that is not socketed is rejected
        let loose = Item::builder(ItemId(3), "jew").build().unwrap();
        let result = Item::builder(ItemId(4), "7cr").sockets(2, vec![loose]).build();
        assert!(matches!(result, Err(StashError::InvalidItem(_))));

        // More fillers than sockets
        let a = Item::builder(ItemId(5), "r01").simple().socketed().build().unwrap();
        let b = Item::builder(ItemId(6), "r02").simple().socketed().build().unwrap();
        let result = Item::builder(ItemId(7), "7cr").sockets(1, vec![a, b]).build();
        assert!(matches!(result, Err(StashError::InvalidItem(_))));
    }

    #[test]
    fn test_native_item() {
        let item = Item::builder(ItemId(1), "hp1")
            .version(FormatVersion(FIRST_NATIVE_VERSION))
            .simple()
            .stored(StorageType::Cube, Position::new(3, 2))
            .build()
            .unwrap();
        assert_eq!(item.variant(), FormatVariant::Native);
        assert_eq!(item.storage(), Some(StorageType::Cube));
        assert_eq!(item.position(), Position::new(3, 2));
        assert_eq!(item.record().bit_len(), 56);
    }

    #[test]
    fn test_invalid_location_rejected() {
        let record = RecordBuilder::new(FormatVariant::Legacy)
            .code("hp1")
            .field(LOCATION, 3)
            .build()
            .unwrap();
        let result = Item::from_record(
            ItemId(1),
            record,
            FormatVersion::LEGACY,
            ItemCode::new("hp1").unwrap(),
            Footprint::new(1, 1),
            ItemKind::Equipment {
                durability: None,
                sockets: None,
            },
        );
        assert!(matches!(
            result,
            Err(StashError::InvalidField { field: "location", value: 3 })
        ));
    }

    #[test]
    fn test_duplicate_assigns_fresh_ids() {
        let jewel = Item::builder(ItemId(2), "jew").socketed().build().unwrap();
        let host = Item::builder(ItemId(1), "7cr")
            .sockets(3, vec![jewel])
            .build()
            .unwrap();

        let mut next = 100;
        let copy = host.duplicate(&mut || {
            next += 1;
            ItemId(next)
        });

        assert_eq!(copy.ids(), vec![ItemId(101), ItemId(102)]);
        assert_eq!(copy.record(), host.record());
    }

    #[test]
    fn test_equipped_and_belt() {
        let helm = Item::builder(ItemId(1), "cap")
            .equipped(EquipSlot::Head)
            .build()
            .unwrap();
        assert_eq!(helm.location(), ItemLocation::Equipped);
        assert_eq!(helm.equip_slot(), EquipSlot::Head);
        assert_eq!(helm.storage(), None);

        let potion = Item::builder(ItemId(2), "hp1").simple().belt(5).build().unwrap();
        assert_eq!(potion.location(), ItemLocation::Belt);
        assert_eq!(potion.position().column, 5);
    }
}
