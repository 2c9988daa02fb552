use crate::decoder::{Decoded, Decoder};
use crate::instructions::Format;
use crate::isa::cond::Cond;

pub fn fmt_decoded(d: &Decoded) -> String {
    let mn = d.mnemonic;
    match d.format {
        Format::Rr | Format::Rs => format!("{} R{}, R{}", mn, d.rd, d.rs),
        // 8-bit fields print as the raw byte so the text reassembles to the same word
        Format::Ri => format!("{} R{}, {}", mn, d.rd, hex(d.raw & 0xFF)),
        Format::Ir => format!("{} R{}, {}", mn, d.rd, hex(d.imm as u16)),
        Format::Ri4 => format!("{} R{}, {}", mn, d.rd, d.imm),
        Format::I4 => format!("{} {}", mn, d.imm),
        Format::Bcond => format!("{} {}, {}", mn, cond(d), d.imm),
        Format::Jcond => format!("{} {}, R{}", mn, cond(d), d.rs),
        // the assembler only writes vector 0, so that form reads back as bare text
        Format::Fix => mn.to_string(),
        Format::Fixv if d.imm == 0 => mn.to_string(),
        Format::Fixv => format!("{} {}", mn, hex(d.imm as u16)),
    }
}

fn hex(v: u16) -> String {
    format!("0x{v:X}")
}

fn cond(d: &Decoded) -> &'static str {
    Cond::from_code(d.cond).mnemonic()
}

/// Text for one word. Unrecognised words render as `??? (0xWORD)`.
pub fn disassemble<D: Decoder>(dec: &D, raw: u16) -> String {
    match dec.decode(raw) {
        Some(d) => fmt_decoded(&d),
        None => format!("??? (0x{raw:04X})"),
    }
}

pub fn disassemble_all<D: Decoder>(dec: &D, words: &[u16]) -> Vec<String> {
    words.iter().map(|&w| disassemble(dec, w)).collect()
}
