//! Packs a descriptor and resolved operands into one machine word.

use crate::bits::set_field;
use crate::decoder::Decoded;
use crate::error::AsmError;
use crate::instructions::{Format, InstrDesc};

/// Resolved operands. Which fields are read depends on the format; the
/// assembler has already turned labels into displacements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    pub rd: u8,
    pub rs: u8,
    pub cond: u8,
    pub imm: i64,
}

impl From<&Decoded> for Operands {
    fn from(d: &Decoded) -> Self {
        Self {
            rd: d.rd,
            rs: d.rs,
            cond: d.cond,
            imm: d.imm as i64,
        }
    }
}

pub fn encode(desc: &InstrDesc, ops: &Operands) -> Result<u16, AsmError> {
    match desc.format {
        Format::Fix => return Ok(desc.fixed),
        // the vector field has no source operand; it is always written as zero
        Format::Fixv => return Ok(desc.fixed & 0xFFF0),
        _ => {}
    }
    let unsupported = || AsmError::UnsupportedFormat(desc.mnemonic.to_string());
    let out_of_range = || AsmError::ImmediateOutOfRange {
        mnemonic: desc.mnemonic.to_string(),
        value: ops.imm,
    };
    let opcode = desc.opcode.ok_or_else(unsupported)?;

    let mut w = 0u16;
    set_field(&mut w, 15, 12, opcode);
    match desc.format {
        Format::Rr | Format::Rs => {
            set_field(&mut w, 11, 8, ops.rd);
            set_field(&mut w, 7, 4, desc.ext.ok_or_else(unsupported)?);
            set_field(&mut w, 3, 0, ops.rs);
        }
        Format::Ri => {
            // signed or unsigned byte; the opcode decides how it is extended
            if !(-128..=255).contains(&ops.imm) {
                return Err(out_of_range());
            }
            set_field(&mut w, 11, 8, ops.rd);
            set_field(&mut w, 7, 0, (ops.imm & 0xFF) as u8);
        }
        Format::Ri4 => {
            let mag = ops.imm.unsigned_abs();
            if mag >= 16 {
                return Err(out_of_range());
            }
            set_field(&mut w, 11, 8, ops.rd);
            set_field(&mut w, 7, 5, desc.ext.unwrap_or(0));
            set_field(&mut w, 4, 4, (ops.imm < 0) as u8);
            set_field(&mut w, 3, 0, mag as u8);
        }
        Format::I4 => {
            set_field(&mut w, 7, 4, desc.ext.ok_or_else(unsupported)?);
            set_field(&mut w, 3, 0, (ops.imm & 0xF) as u8);
        }
        Format::Bcond => {
            set_field(&mut w, 11, 8, ops.cond);
            set_field(&mut w, 7, 0, (ops.imm & 0xFF) as u8);
        }
        Format::Jcond => {
            set_field(&mut w, 11, 8, ops.cond);
            set_field(&mut w, 7, 4, desc.ext.ok_or_else(unsupported)?);
            set_field(&mut w, 3, 0, ops.rs);
        }
        Format::Ir => {
            set_field(&mut w, 11, 8, ops.rd);
            match desc.ext {
                Some(ext) => {
                    if !(0..16).contains(&ops.imm) {
                        return Err(out_of_range());
                    }
                    set_field(&mut w, 7, 4, ext);
                    set_field(&mut w, 3, 0, ops.imm as u8);
                }
                None => set_field(&mut w, 7, 0, (ops.imm & 0xFF) as u8),
            }
        }
        Format::Fix | Format::Fixv => return Err(unsupported()),
    }
    Ok(w)
}
