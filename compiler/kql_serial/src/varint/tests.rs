#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn encode32(value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    write_var32(&mut out, value);
    out
}

fn encode64(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    write_var64(&mut out, value);
    out
}

#[test]
fn small_values_take_one_byte() {
    assert_eq!(encode32(0), vec![0x00]);
    assert_eq!(encode32(127), vec![0x7f]);
    assert_eq!(encode32(128), vec![0x80, 0x01]);
    assert_eq!(encode32(300), vec![0xac, 0x02]);
}

#[test]
fn width_limits() {
    assert_eq!(encode32(u32::MAX).len(), MAX_VAR32_BYTES);
    assert_eq!(encode64(u64::MAX).len(), MAX_VAR64_BYTES);
    assert_eq!(read_var32(&encode32(u32::MAX)).unwrap(), (u32::MAX, 5));
    assert_eq!(read_var64(&encode64(u64::MAX)).unwrap(), (u64::MAX, 10));
}

#[test]
fn decode_stops_at_last_group() {
    assert_eq!(read_var32(&[0xac, 0x02, 0xff]).unwrap(), (300, 2));
}

#[test]
fn truncated_input() {
    assert_eq!(read_var32(&[]), Err(VarintError::Truncated));
    assert_eq!(read_var32(&[0x80]), Err(VarintError::Truncated));
    assert_eq!(read_var64(&[0xff, 0xff, 0xff]), Err(VarintError::Truncated));
}

#[test]
fn overlong_input() {
    // Sixth group for a 32-bit value.
    assert_eq!(
        read_var32(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]),
        Err(VarintError::Overflow)
    );
    // Fifth group sets bits above 32.
    assert_eq!(
        read_var32(&[0xff, 0xff, 0xff, 0xff, 0x1f]),
        Err(VarintError::Overflow)
    );
    // Tenth group sets bits above 64.
    let mut bytes = vec![0xff; 9];
    bytes.push(0x02);
    assert_eq!(read_var64(&bytes), Err(VarintError::Overflow));
}

#[test]
fn zigzag_interleaves_signs() {
    assert_eq!(zigzag_encode32(0), 0);
    assert_eq!(zigzag_encode32(-1), 1);
    assert_eq!(zigzag_encode32(1), 2);
    assert_eq!(zigzag_encode32(-5), 9);
    assert_eq!(zigzag_encode32(i32::MIN), u32::MAX);
    assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);
    assert_eq!(zigzag_decode64(u64::MAX), i64::MIN);
}

proptest! {
    #[test]
    fn var64_decodes_what_it_encodes(value: u64) {
        let bytes = encode64(value);
        prop_assert_eq!(read_var64(&bytes), Ok((value, bytes.len())));
    }

    #[test]
    fn zigzag32_is_a_bijection(value: i32) {
        prop_assert_eq!(zigzag_decode32(zigzag_encode32(value)), value);
    }

    #[test]
    fn zigzag64_is_a_bijection(value: i64) {
        prop_assert_eq!(zigzag_decode64(zigzag_encode64(value)), value);
    }
}
