//! Static field schema for item records
//!
//! Both save format variants share the same fields, but the native variant drops
//! the 16-bit "JM" marker and packs the item version into 3 bits instead of 10.
//! Every field after the version therefore sits [`NATIVE_OFFSET`] bits earlier in
//! native records. Offsets are declared once here; callers resolve them through
//! [`FieldSpec::offset`] and never compute them by hand.
//!
//! # Layout (legacy offsets)
//!
//! ```text
//! bits  0..16   marker "JM"              (legacy only)
//! bits 16..48   flags                    (native: -16)
//! bits 48..58   item version (10 bits)   (native: 32..35, 3 bits)
//! bits 58..61   location                 (native: -23)
//! bits 61..65   equip slot
//! bits 65..69   column
//! bits 69..73   row
//! bits 73..76   storage
//! bits 76..108  code, 4 x 8-bit chars    (legacy only)
//! ```

use crate::bits::{check_fits, BitRecord};
use crate::error::{Result, StashError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the "JM" marker that only legacy records carry
pub const MARKER_BITS: u32 = 16;

/// "JM", least significant byte first
pub const MARKER: u64 = 0x4D4A;

/// Shift applied to every field after the item version in native records
pub const NATIVE_OFFSET: i32 = -23;

/// Save-format version from which files use the native layout
pub const FIRST_NATIVE_VERSION: u32 = 97;

/// Save-format version written by the legacy game (1.10 - 1.14d)
pub const LEGACY_FILE_VERSION: u32 = 96;

/// The two on-disk record layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatVariant {
    Legacy,
    Native,
}

impl FormatVariant {
    pub fn label(&self) -> &'static str {
        match self {
            FormatVariant::Legacy => "legacy",
            FormatVariant::Native => "native",
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Save-format version tag carried by owners and items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
    pub const LEGACY: FormatVersion = FormatVersion(LEGACY_FILE_VERSION);
    pub const NATIVE: FormatVersion = FormatVersion(FIRST_NATIVE_VERSION);

    /// Resolve the record layout, given the first native save version
    pub fn variant_from(&self, first_native: u32) -> FormatVariant {
        if self.0 >= first_native {
            FormatVariant::Native
        } else {
            FormatVariant::Legacy
        }
    }

    /// Resolve the record layout with the default threshold
    pub fn variant(&self) -> FormatVariant {
        self.variant_from(FIRST_NATIVE_VERSION)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// How a field's position changes between variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Flag bits, moved by the missing marker only
    Flags,
    /// Fields after the item version, moved by [`NATIVE_OFFSET`]
    Native,
    /// Present in legacy records only
    LegacyOnly,
    /// Present in native records only, offset is already native
    NativeOnly,
}

/// A named bit field of the item record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Offset in legacy records (native offset for `NativeOnly` fields)
    pub offset: u32,
    pub width: u32,
    pub shift: Shift,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: u32, width: u32, shift: Shift) -> Self {
        FieldSpec {
            name,
            offset,
            width,
            shift,
        }
    }

    /// Offset of this field in records of the given variant
    pub fn offset(&self, variant: FormatVariant) -> Result<u32> {
        let absent = || StashError::FieldAbsent {
            field: self.name,
            variant: variant.label(),
        };
        match (self.shift, variant) {
            (Shift::LegacyOnly, FormatVariant::Native) => Err(absent()),
            (Shift::NativeOnly, FormatVariant::Legacy) => Err(absent()),
            (_, FormatVariant::Legacy) | (Shift::NativeOnly, _) => Ok(self.offset),
            (Shift::Flags, FormatVariant::Native) => Ok(self.offset - MARKER_BITS),
            (Shift::Native, FormatVariant::Native) => {
                Ok(self.offset.saturating_add_signed(NATIVE_OFFSET))
            }
        }
    }

    /// Read this field from a record of the given variant
    pub fn read(&self, record: &BitRecord, variant: FormatVariant) -> Result<u64> {
        record.read_field(self.offset(variant)?, self.width)
    }

    /// Write this field, producing a new record
    pub fn write(&self, record: &BitRecord, variant: FormatVariant, value: u64) -> Result<BitRecord> {
        check_fits(self.name, self.width, value)?;
        record.write_field(self.offset(variant)?, self.width, value)
    }
}

pub const MARKER_FIELD: FieldSpec = FieldSpec::new("marker", 0, MARKER_BITS, Shift::LegacyOnly);

pub const IDENTIFIED: FieldSpec = FieldSpec::new("identified", 20, 1, Shift::Flags);
pub const SOCKETED: FieldSpec = FieldSpec::new("socketed", 27, 1, Shift::Flags);
pub const SIMPLE: FieldSpec = FieldSpec::new("simple", 37, 1, Shift::Flags);
pub const ETHEREAL: FieldSpec = FieldSpec::new("ethereal", 38, 1, Shift::Flags);
pub const PERSONALIZED: FieldSpec = FieldSpec::new("personalized", 40, 1, Shift::Flags);
pub const RUNEWORD: FieldSpec = FieldSpec::new("runeword", 42, 1, Shift::Flags);

pub const LEGACY_ITEM_VERSION: FieldSpec =
    FieldSpec::new("item_version", 48, 10, Shift::LegacyOnly);
pub const NATIVE_ITEM_VERSION: FieldSpec =
    FieldSpec::new("item_version", 32, 3, Shift::NativeOnly);

pub const LOCATION: FieldSpec = FieldSpec::new("location", 58, 3, Shift::Native);
pub const EQUIP_SLOT: FieldSpec = FieldSpec::new("equip_slot", 61, 4, Shift::Native);
pub const COLUMN: FieldSpec = FieldSpec::new("column", 65, 4, Shift::Native);
pub const ROW: FieldSpec = FieldSpec::new("row", 69, 4, Shift::Native);
pub const STORAGE: FieldSpec = FieldSpec::new("storage", 73, 3, Shift::Native);

pub const CODE: FieldSpec = FieldSpec::new("code", 76, 32, Shift::LegacyOnly);

/// Item version field of the given variant
pub fn item_version_field(variant: FormatVariant) -> FieldSpec {
    match variant {
        FormatVariant::Legacy => LEGACY_ITEM_VERSION,
        FormatVariant::Native => NATIVE_ITEM_VERSION,
    }
}

/// Smallest record that holds every header field of the variant
pub fn header_bits(variant: FormatVariant) -> u32 {
    match variant {
        FormatVariant::Legacy => CODE.offset + CODE.width,
        FormatVariant::Native => STORAGE.offset.saturating_add_signed(NATIVE_OFFSET) + STORAGE.width,
    }
}

/// Builds minimal well-formed records
///
/// The engine itself never parses save files; this exists for duplication
/// flows and for callers that synthesize items.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    variant: FormatVariant,
    item_version: u64,
    code: Option<String>,
    flags: Vec<FieldSpec>,
    fields: Vec<(FieldSpec, u64)>,
    extra_bits: u32,
}

impl RecordBuilder {
    pub fn new(variant: FormatVariant) -> Self {
        let item_version = match variant {
            FormatVariant::Legacy => 101,
            FormatVariant::Native => 5,
        };
        RecordBuilder {
            variant,
            item_version,
            code: None,
            flags: Vec::new(),
            fields: Vec::new(),
            extra_bits: 0,
        }
    }

    pub fn item_version(mut self, version: u64) -> Self {
        self.item_version = version;
        self
    }

    /// Item code, written as space padded ASCII in legacy records
    pub fn code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    /// Set a one-bit flag field
    pub fn flag(mut self, flag: FieldSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn field(mut self, field: FieldSpec, value: u64) -> Self {
        self.fields.push((field, value));
        self
    }

    /// Append opaque trailing bits (stats, affixes) after the header
    pub fn trailing_bits(mut self, bits: u32) -> Self {
        self.extra_bits = bits;
        self
    }

    pub fn build(self) -> Result<BitRecord> {
        let variant = self.variant;
        let total = header_bits(variant) + self.extra_bits;
        let mut record = BitRecord::zeroed(total.div_ceil(8) * 8);

        if variant == FormatVariant::Legacy {
            record = MARKER_FIELD.write(&record, variant, MARKER)?;
        }
        record = item_version_field(variant).write(&record, variant, self.item_version)?;

        for flag in &self.flags {
            record = flag.write(&record, variant, 1)?;
        }
        for (field, value) in &self.fields {
            record = field.write(&record, variant, *value)?;
        }

        if let (FormatVariant::Legacy, Some(code)) = (variant, &self.code) {
            record = CODE.write(&record, variant, encode_code(code)?)?;
        }

        Ok(record)
    }
}

/// Pack up to four ASCII characters, space padded, first character lowest
pub fn encode_code(code: &str) -> Result<u64> {
    if code.len() > 4 || !code.is_ascii() {
        return Err(StashError::InvalidItemCode(code.to_string()));
    }
    let mut padded = [b' '; 4];
    padded[..code.len()].copy_from_slice(code.as_bytes());
    Ok(padded
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | (u64::from(*b) << (8 * i))))
}

/// Inverse of [`encode_code`], trailing spaces trimmed
pub fn decode_code(raw: u64) -> String {
    (0..4)
        .map(|i| ((raw >> (8 * i)) & 0xFF) as u8 as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}
