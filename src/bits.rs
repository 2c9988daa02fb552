//! Bit-field helpers shared by the encoder, the decoder and the CIM unit.
//!
//! Field bounds are inclusive and counted from bit 0 (LSB), matching the
//! `[hi:lo]` notation used for the instruction layouts.

use bitvec::prelude::*;

/// Extract `word[hi:lo]` as an unsigned value.
#[inline]
pub fn field(word: u16, hi: usize, lo: usize) -> u8 {
    word.view_bits::<Lsb0>()[lo..=hi].load_le::<u8>()
}

/// Store `value` into `word[hi:lo]`. Bits of `value` above the field width are dropped.
#[inline]
pub fn set_field(word: &mut u16, hi: usize, lo: usize, value: u8) {
    let width = hi - lo + 1;
    let mask = ((1u16 << width) - 1) as u8;
    word.view_bits_mut::<Lsb0>()[lo..=hi].store_le(value & mask);
}

/// Sign-extend the low `bits` bits of `v`.
#[inline]
pub fn sign_ext(v: u16, bits: u32) -> i16 {
    let s = 16 - bits;
    ((v << s) as i16) >> s
}

/// Narrow a full-precision result to a 16-bit two's-complement value.
#[inline]
pub fn narrow(v: i32) -> i16 {
    (v & 0xFFFF) as u16 as i16
}
