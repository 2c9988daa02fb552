//! Compute-in-memory unit: sixteen rows of packed 4-bit weights and the
//! quantized dot product behind CMPT.

use serde::{Deserialize, Serialize};

pub const CIM_ROWS: usize = 16;
pub const LANES: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimUnit {
    pub rows: [u16; CIM_ROWS],
    /// Right-shift applied to every lane accumulator, 0..=15.
    pub qshift: u8,
}

impl CimUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row addresses come straight from a register; only the low four bits select.
    #[inline]
    pub fn read(&self, idx: i16) -> u16 {
        self.rows[(idx & 0xF) as usize]
    }

    #[inline]
    pub fn write(&mut self, idx: i16, val: u16) {
        self.rows[(idx & 0xF) as usize] = val;
    }

    pub fn set_qshift(&mut self, q: u8) {
        self.qshift = q & 0xF;
    }

    /// The four weight rows feeding lanes 0..3 when the activation comes
    /// from register `src`: rows `base`, `base+4`, `base+8`, `base+12`
    /// with `base = src & 3`.
    pub fn rows_for(&self, src: u8) -> [u16; LANES] {
        let base = (src & 0x3) as usize;
        std::array::from_fn(|lane| self.rows[base + 4 * lane])
    }

    pub fn compute(&self, src: u8, activation: u16) -> u16 {
        cmpt(self.rows_for(src), activation, self.qshift)
    }
}

/// Nibble `i` of `word` (bits `4i+3..4i`) as a signed value in -8..=7.
pub fn unpack_nibbles(word: u16) -> [i8; LANES] {
    std::array::from_fn(|i| {
        let n = ((word >> (4 * i)) & 0xF) as i8;
        if n >= 8 {
            n - 16
        } else {
            n
        }
    })
}

/// Inverse of [`unpack_nibbles`]; each lane keeps only its low four bits.
pub fn pack_nibbles(lanes: [i32; LANES]) -> u16 {
    lanes
        .iter()
        .enumerate()
        .fold(0u16, |acc, (i, &v)| acc | (((v & 0xF) as u16) << (4 * i)))
}

/// Shift toward zero: negative accumulators are shifted by magnitude.
#[inline]
pub fn quantize(acc: i32, q: u8) -> i32 {
    if acc >= 0 {
        acc >> q
    } else {
        -((-acc) >> q)
    }
}

pub fn dot_lane(weights: u16, act: [i8; LANES]) -> i32 {
    unpack_nibbles(weights)
        .iter()
        .zip(act.iter())
        .map(|(&w, &a)| w as i32 * a as i32)
        .sum()
}

/// One CMPT: four quantized dot products of `activation` against `rows`,
/// packed lane 0 into bits 3..0.
pub fn cmpt(rows: [u16; LANES], activation: u16, qshift: u8) -> u16 {
    let act = unpack_nibbles(activation);
    let q = qshift & 0xF;
    pack_nibbles(rows.map(|w| quantize(dot_lane(w, act), q)))
}
