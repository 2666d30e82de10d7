#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn encode(value: &DataValue, tz: Option<u16>) -> Vec<u8> {
    let mut out = Vec::new();
    write_scalar(&mut out, value, tz);
    out
}

fn decode(bytes: &[u8], slot: DataSlot) -> SerialResult<(DataValue, Option<u32>)> {
    let mut cursor = Cursor::new(bytes);
    let result = read_scalar(&mut cursor, slot)?;
    assert!(cursor.is_at_end(), "payload not fully consumed");
    Ok(result)
}

#[test]
fn negative_int32_is_zigzagged() {
    assert_eq!(encode(&DataValue::I32(-5), None), vec![9]);
    assert_eq!(decode(&[9], DataSlot::Int32).unwrap(), (DataValue::I32(-5), None));
}

#[test]
fn raw_byte_layouts() {
    assert_eq!(encode(&DataValue::Bool(true), None), vec![1]);
    assert_eq!(encode(&DataValue::I8(-1), None), vec![0xff]);
    assert_eq!(decode(&[0xff], DataSlot::Int8).unwrap().0, DataValue::I8(-1));
    assert_eq!(decode(&[7], DataSlot::Bool).unwrap().0, DataValue::Bool(true));
}

#[test]
fn floats_are_little_endian() {
    assert_eq!(encode(&DataValue::F32(1.0), None), vec![0x00, 0x00, 0x80, 0x3f]);
    assert_eq!(encode(&DataValue::F64(1.0), None).len(), 8);
}

#[test]
fn timezone_follows_value() {
    let bytes = encode(&DataValue::U32(1000), Some(3));
    assert_eq!(bytes, vec![0xe8, 0x07, 0x03]);
    assert_eq!(
        decode(&bytes, DataSlot::TzDatetime).unwrap(),
        (DataValue::U32(1000), Some(3))
    );
}

#[test]
fn decimal_uses_fifteen_bytes() {
    assert_eq!(encode(&DataValue::Decimal(-1), None), vec![0xff; 15]);
    assert_eq!(decode(&[0xff; 15], DataSlot::Decimal).unwrap().0, DataValue::Decimal(-1));
    let max = (1_i128 << 119) - 1;
    let bytes = encode(&DataValue::Decimal(max), None);
    assert_eq!(bytes.len(), DECIMAL_WIRE_BYTES);
    assert_eq!(decode(&bytes, DataSlot::Decimal).unwrap().0, DataValue::Decimal(max));
}

#[test]
fn empty_bytes() {
    assert_eq!(encode(&DataValue::Bytes(vec![]), None), vec![0]);
    assert_eq!(decode(&[0], DataSlot::String).unwrap().0, DataValue::Bytes(vec![]));
}

#[test]
fn narrow_values_reject_wide_input() {
    // 70000 does not fit in u16.
    let mut bytes = Vec::new();
    write_var32(&mut bytes, 70_000);
    assert!(matches!(
        decode(&bytes, DataSlot::Uint16),
        Err(SerialError::Corrupted {
            kind: Corruption::ScalarOutOfRange,
            ..
        })
    ));
}

#[test]
fn truncated_payload() {
    let err = decode(&[0x00, 0x00], DataSlot::Double).unwrap_err();
    assert_eq!(err, SerialError::PrematureEnd { offset: 0, needed: 6 });
}

proptest! {
    #[test]
    fn int64_payload_decodes(value: i64) {
        let bytes = encode(&DataValue::I64(value), None);
        prop_assert_eq!(decode(&bytes, DataSlot::Int64).unwrap(), (DataValue::I64(value), None));
    }

    #[test]
    fn decimal_payload_decodes(value in -(1_i128 << 119)..(1_i128 << 119)) {
        let bytes = encode(&DataValue::Decimal(value), None);
        prop_assert_eq!(decode(&bytes, DataSlot::Decimal).unwrap().0, DataValue::Decimal(value));
    }
}
