#![no_main]
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};
use stashkit::BitRecord;

#[derive(Debug, Arbitrary)]
struct FieldOp {
    offset: u16,
    width: u8,
    value: u64,
}

// Writes then reads arbitrary fields; out-of-range calls must error, never panic
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let bytes: Vec<u8> = match u.arbitrary() {
        Ok(bytes) => bytes,
        Err(_) => return,
    };
    let ops: Vec<FieldOp> = match u.arbitrary() {
        Ok(ops) => ops,
        Err(_) => return,
    };

    let mut record = BitRecord::from_bytes(bytes);
    for op in ops.iter().take(32) {
        let (offset, width) = (u32::from(op.offset), u32::from(op.width));
        if let Ok(next) = record.write_field(offset, width, op.value) {
            assert_eq!(next.bit_len(), record.bit_len());
            assert_eq!(next.read_field(offset, width).ok(), Some(op.value));
            record = next;
        }
        let _ = record.remove_bits(offset, width);
        let _ = record.insert_field(offset, width.min(64), 0);
    }
});
