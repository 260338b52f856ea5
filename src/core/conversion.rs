//! Record conversion between the legacy and native layouts
//!
//! Legacy records open with the "JM" marker, store the item version in 10 bits
//! and carry the item code as four ASCII characters after the header. Native
//! records have no marker, a 3-bit item version, and no inline ASCII code (the
//! save writer encodes it from [`Item::code`]). Conversion reshapes only those
//! three regions; every other bit moves with its neighbours.
//!
//! Socket fillers are converted together with their host. The new records are
//! built completely before the item is touched, so a failed conversion leaves
//! the item as it was.

use crate::bits::BitRecord;
use crate::config::TransferConfig;
use crate::error::Result;
use crate::item::Item;
use crate::layout::{
    encode_code, FormatVariant, FormatVersion, CODE, LEGACY_ITEM_VERSION, MARKER, MARKER_BITS,
    MARKER_FIELD, NATIVE_ITEM_VERSION,
};
use tracing::debug;

/// Rewrite a legacy item (and its socket fillers) into the native layout
///
/// Items already in the native layout are left as they are.
pub fn to_native_format(item: &mut Item, config: &TransferConfig) -> Result<()> {
    *item = converted(item, FormatVariant::Native, config)?;
    Ok(())
}

/// Rewrite a native item (and its socket fillers) into the legacy layout
///
/// Items already in the legacy layout are left as they are.
pub fn to_legacy_format(item: &mut Item, config: &TransferConfig) -> Result<()> {
    *item = converted(item, FormatVariant::Legacy, config)?;
    Ok(())
}

/// Bring an item to the layout of `target` and tag it with that version
///
/// Conversion only happens when the layouts differ; otherwise the version tag
/// is updated and the record left alone.
pub fn convert_for(item: &mut Item, target: FormatVersion, config: &TransferConfig) -> Result<()> {
    let mut next = converted(item, target.variant(), config)?;
    retag_all(&mut next, target);
    *item = next;
    Ok(())
}

fn converted(item: &Item, target: FormatVariant, config: &TransferConfig) -> Result<Item> {
    let mut next = item.clone();

    if item.variant() != target {
        let (record, version) = match target {
            FormatVariant::Native => (
                native_record(item.record(), config)?,
                FormatVersion::NATIVE,
            ),
            FormatVariant::Legacy => (
                legacy_record(item.record(), item.code().as_str(), config)?,
                FormatVersion::LEGACY,
            ),
        };
        debug!(
            "Converted item {} from {} to {} ({} -> {} bits)",
            item.id(),
            item.variant(),
            target,
            item.record().bit_len(),
            record.bit_len()
        );
        next.replace_record(record, version)?;
    }

    for filler in next.socketed_items_mut() {
        *filler = converted(filler, target, config)?;
    }

    Ok(next)
}

fn retag_all(item: &mut Item, version: FormatVersion) {
    item.retag(version);
    for filler in item.socketed_items_mut() {
        retag_all(filler, version);
    }
}

/// Legacy record to native: drop code and marker, narrow the version
fn native_record(record: &BitRecord, config: &TransferConfig) -> Result<BitRecord> {
    let legacy = FormatVariant::Legacy;
    let version_offset = LEGACY_ITEM_VERSION.offset(legacy)? - MARKER_BITS;

    record
        .remove_bits(CODE.offset(legacy)?, CODE.width)?
        .remove_bits(MARKER_FIELD.offset(legacy)?, MARKER_FIELD.width)?
        .resize_field(
            version_offset,
            LEGACY_ITEM_VERSION.width,
            NATIVE_ITEM_VERSION.width,
            u64::from(config.native_item_version),
        )
}

/// Native record to legacy: widen the version, restore marker and code
fn legacy_record(record: &BitRecord, code: &str, config: &TransferConfig) -> Result<BitRecord> {
    let legacy = FormatVariant::Legacy;
    let version_offset = NATIVE_ITEM_VERSION.offset(FormatVariant::Native)?;

    record
        .resize_field(
            version_offset,
            NATIVE_ITEM_VERSION.width,
            LEGACY_ITEM_VERSION.width,
            u64::from(config.legacy_item_version),
        )?
        .insert_field(MARKER_FIELD.offset(legacy)?, MARKER_FIELD.width, MARKER)?
        .insert_field(CODE.offset(legacy)?, CODE.width, encode_code(code)?)
}
