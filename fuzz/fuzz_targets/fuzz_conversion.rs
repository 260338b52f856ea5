#![no_main]
use libfuzzer_sys::fuzz_target;
use stashkit::{to_legacy_format, to_native_format, Item, ItemId, Position, StorageType, TransferConfig};

// Legacy -> native -> legacy must restore the record for any header position
fuzz_target!(|input: (u8, u8, bool)| {
    let (row, column, ethereal) = input;
    let mut builder = Item::builder(ItemId(1), "cap")
        .stored(StorageType::Stash, Position::new(row % 16, column % 16));
    if ethereal {
        builder = builder.ethereal();
    }
    let Ok(original) = builder.build() else {
        return;
    };

    let config = TransferConfig::default();
    let mut item = original.clone();
    if to_native_format(&mut item, &config).is_err() {
        return;
    }
    to_legacy_format(&mut item, &config).expect("native record converts back");
    assert_eq!(item.record(), original.record());
});
