//! Instruction registry: the catalog of mnemonics, formats and fixed fields
//! shared by the encoder, the decoder and the interpreter.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::bits::field;
use crate::decoder::Op;
use crate::error::{AsmError, RegistryError};

/// Bit layout of an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// opcode[15:12] Rdest[11:8] ext[7:4] Rsrc[3:0]
    Rr,
    /// opcode[15:12] Rdest[11:8] imm[7:0]
    Ri,
    /// opcode[15:12] Rdest[11:8] sub[7:5] s[4] imm[3:0]
    Ri4,
    /// opcode[15:12] 0[11:8] ext[7:4] imm[3:0]
    I4,
    /// opcode[15:12] cond[11:8] disp[7:0]
    Bcond,
    /// opcode[15:12] cond[11:8] ext[7:4] Rtarget[3:0]
    Jcond,
    /// opcode[15:12] Rsrc[11:8] ext[7:4] Raddr[3:0]
    Rs,
    /// opcode[15:12] Rsrc[11:8] imm[7:0], or ext[7:4] imm[3:0] when an ext is set
    Ir,
    /// Whole word is a literal.
    Fix,
    /// Top 12 bits literal, vector in [3:0].
    Fixv,
}

/// How an 8-bit RI immediate widens when decoded and executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImmSign {
    Signed,
    Unsigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub format: Format,
    pub opcode: Option<u8>,
    pub ext: Option<u8>,
    /// FIX: the full word. FIXV: the fixed top 12 bits (low nibble ignored).
    pub fixed: u16,
    pub imm_sign: ImmSign,
}

impl InstrDesc {
    const fn base(op: Op, mnemonic: &'static str, format: Format) -> Self {
        Self {
            op,
            mnemonic,
            format,
            opcode: None,
            ext: None,
            fixed: 0,
            imm_sign: ImmSign::Unsigned,
        }
    }

    pub const fn rr(op: Op, mnemonic: &'static str, opcode: u8, ext: u8) -> Self {
        Self { opcode: Some(opcode), ext: Some(ext), ..Self::base(op, mnemonic, Format::Rr) }
    }

    pub const fn ri(op: Op, mnemonic: &'static str, opcode: u8, imm_sign: ImmSign) -> Self {
        Self { opcode: Some(opcode), imm_sign, ..Self::base(op, mnemonic, Format::Ri) }
    }

    /// `sub` selects the value of bits [7:5]; `None` means zero.
    pub const fn ri4(op: Op, mnemonic: &'static str, opcode: u8, sub: Option<u8>) -> Self {
        Self {
            opcode: Some(opcode),
            ext: sub,
            imm_sign: ImmSign::Signed,
            ..Self::base(op, mnemonic, Format::Ri4)
        }
    }

    pub const fn i4(op: Op, mnemonic: &'static str, opcode: u8, ext: u8) -> Self {
        Self { opcode: Some(opcode), ext: Some(ext), ..Self::base(op, mnemonic, Format::I4) }
    }

    pub const fn bcond(op: Op, mnemonic: &'static str, opcode: u8) -> Self {
        Self {
            opcode: Some(opcode),
            imm_sign: ImmSign::Signed,
            ..Self::base(op, mnemonic, Format::Bcond)
        }
    }

    pub const fn jcond(op: Op, mnemonic: &'static str, opcode: u8, ext: u8) -> Self {
        Self { opcode: Some(opcode), ext: Some(ext), ..Self::base(op, mnemonic, Format::Jcond) }
    }

    pub const fn rs(op: Op, mnemonic: &'static str, opcode: u8, ext: u8) -> Self {
        Self { opcode: Some(opcode), ext: Some(ext), ..Self::base(op, mnemonic, Format::Rs) }
    }

    pub const fn ir(op: Op, mnemonic: &'static str, opcode: u8, ext: Option<u8>) -> Self {
        Self { opcode: Some(opcode), ext, ..Self::base(op, mnemonic, Format::Ir) }
    }

    pub const fn fix(op: Op, mnemonic: &'static str, value: u16) -> Self {
        Self { fixed: value, ..Self::base(op, mnemonic, Format::Fix) }
    }

    pub const fn fixv(op: Op, mnemonic: &'static str, fixed: u16) -> Self {
        Self { fixed: fixed & 0xFFF0, ..Self::base(op, mnemonic, Format::Fixv) }
    }

    /// Whether `raw` is an encoding of this instruction.
    pub fn matches(&self, raw: u16) -> bool {
        match self.format {
            Format::Fix => raw == self.fixed,
            Format::Fixv => raw & 0xFFF0 == self.fixed & 0xFFF0,
            _ => {
                let Some(opcode) = self.opcode else { return false };
                if field(raw, 15, 12) != opcode {
                    return false;
                }
                let ext = field(raw, 7, 4);
                match self.format {
                    Format::Rr | Format::Jcond | Format::Rs => Some(ext) == self.ext,
                    Format::Ri | Format::Bcond => true,
                    Format::Ri4 => field(raw, 7, 5) == self.ext.unwrap_or(0),
                    Format::I4 => field(raw, 11, 8) == 0 && Some(ext) == self.ext,
                    Format::Ir => self.ext.map_or(true, |e| e == ext),
                    Format::Fix | Format::Fixv => false,
                }
            }
        }
    }

    fn is_complete(&self) -> bool {
        match self.format {
            Format::Fix | Format::Fixv => true,
            Format::Rr | Format::Jcond | Format::Rs | Format::I4 => {
                self.opcode.is_some() && self.ext.is_some()
            }
            Format::Ri | Format::Ri4 | Format::Bcond | Format::Ir => self.opcode.is_some(),
        }
    }
}

use ImmSign::{Signed, Unsigned};

pub const TABLE: &[InstrDesc] = &[
    // register-register
    InstrDesc::rr(Op::Add, "ADD", 0b0000, 0b0101),
    InstrDesc::rr(Op::Addu, "ADDU", 0b0000, 0b0110),
    InstrDesc::rr(Op::Addc, "ADDC", 0b0000, 0b0111),
    InstrDesc::rr(Op::Mul, "MUL", 0b0000, 0b1110),
    InstrDesc::rr(Op::Sub, "SUB", 0b0000, 0b1001),
    InstrDesc::rr(Op::Subc, "SUBC", 0b0000, 0b1010),
    InstrDesc::rr(Op::Cmp, "CMP", 0b0000, 0b1011),
    InstrDesc::rr(Op::And, "AND", 0b0000, 0b0001),
    InstrDesc::rr(Op::Or, "OR", 0b0000, 0b0010),
    InstrDesc::rr(Op::Xor, "XOR", 0b0000, 0b0011),
    InstrDesc::rr(Op::Mov, "MOV", 0b0000, 0b1101),
    // register-immediate
    InstrDesc::ri(Op::Addi, "ADDI", 0b0101, Signed),
    InstrDesc::ri(Op::Addui, "ADDUI", 0b0110, Signed),
    InstrDesc::ri(Op::Addci, "ADDCI", 0b0111, Signed),
    InstrDesc::ri(Op::Muli, "MULI", 0b1110, Signed),
    InstrDesc::ri(Op::Subi, "SUBI", 0b1001, Signed),
    InstrDesc::ri(Op::Subci, "SUBCI", 0b1010, Signed),
    InstrDesc::ri(Op::Cmpi, "CMPI", 0b1011, Signed),
    InstrDesc::ri(Op::Andi, "ANDI", 0b0001, Unsigned),
    InstrDesc::ri(Op::Ori, "ORI", 0b0010, Unsigned),
    InstrDesc::ri(Op::Xori, "XORI", 0b0011, Unsigned),
    InstrDesc::ri(Op::Movi, "MOVI", 0b1101, Unsigned),
    // shifts
    InstrDesc::rr(Op::Lsh, "LSH", 0b1000, 0b0100),
    InstrDesc::ri4(Op::Lshi, "LSHI", 0b1000, None),
    InstrDesc::rr(Op::Ashu, "ASHU", 0b1000, 0b0110),
    InstrDesc::ri4(Op::Ashui, "ASHUI", 0b1000, Some(0b001)),
    InstrDesc::ri(Op::Lui, "LUI", 0b1111, Unsigned),
    // memory
    InstrDesc::rr(Op::Load, "LOAD", 0b0100, 0b0000),
    InstrDesc::rs(Op::Stor, "STOR", 0b0100, 0b0100),
    // byte extension
    InstrDesc::rr(Op::Snxb, "SNXB", 0b0100, 0b0010),
    InstrDesc::rr(Op::Zrxb, "ZRXB", 0b0100, 0b0110),
    // control flow
    InstrDesc::rr(Op::Scond, "SCOND", 0b0100, 0b1101),
    InstrDesc::bcond(Op::Bcond, "BCOND", 0b1100),
    InstrDesc::jcond(Op::Jcond, "JCOND", 0b0100, 0b1100),
    InstrDesc::rr(Op::Jal, "JAL", 0b0100, 0b1000),
    // bit test
    InstrDesc::rr(Op::Tbit, "TBIT", 0b0100, 0b1010),
    InstrDesc::ir(Op::Tbiti, "TBITI", 0b0100, Some(0b1110)),
    // processor status
    InstrDesc::rr(Op::Lpr, "LPR", 0b0100, 0b0001),
    InstrDesc::rr(Op::Spr, "SPR", 0b0100, 0b0101),
    // fixed words
    InstrDesc::fix(Op::Di, "DI", 0x4030),
    InstrDesc::fix(Op::Ei, "EI", 0x4070),
    InstrDesc::fix(Op::Retx, "RETX", 0x4090),
    InstrDesc::fix(Op::Wait, "WAIT", 0x0000),
    InstrDesc::fixv(Op::Excp, "EXCP", 0x40B0),
    // compute-in-memory
    InstrDesc::rr(Op::Stcr, "STCR", 0b0000, 0b0100),
    InstrDesc::rr(Op::Stcm, "STCM", 0b0000, 0b1000),
    InstrDesc::rr(Op::Ldcr, "LDCR", 0b0000, 0b1100),
    InstrDesc::rr(Op::Cmpt, "CMPT", 0b0000, 0b1111),
    InstrDesc::i4(Op::Setq, "SETQ", 0b0100, 0b1111),
];

/// Immutable instruction catalog with a case-insensitive mnemonic index.
///
/// Built explicitly and passed by reference; independent fixtures may hold
/// distinct registries side by side.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<InstrDesc>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// The full CIM16 catalog.
    pub fn standard() -> Self {
        Self::index_unchecked(TABLE.to_vec())
    }

    /// Build a registry from a custom table, rejecting tables that would make
    /// decoding ambiguous.
    pub fn from_table(entries: Vec<InstrDesc>) -> Result<Self, RegistryError> {
        let reg = Self::index_unchecked(entries);
        reg.validate()?;
        Ok(reg)
    }

    fn index_unchecked(entries: Vec<InstrDesc>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, d)| (d.mnemonic.to_ascii_uppercase(), i))
            .collect();
        Self { entries, index }
    }

    /// Check mnemonic uniqueness, per-format completeness, and that no word
    /// matches two entries.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for d in &self.entries {
            let key = d.mnemonic.to_ascii_uppercase();
            if !seen.insert(key.clone()) {
                return Err(RegistryError::DuplicateMnemonic(key));
            }
        }
        if let Some(d) = self.entries.iter().find(|d| !d.is_complete()) {
            return Err(RegistryError::Incomplete(d.mnemonic.to_string()));
        }
        for raw in 0..=u16::MAX {
            let mut hits = self.entries.iter().filter(|d| d.matches(raw));
            if let (Some(a), Some(b)) = (hits.next(), hits.next()) {
                return Err(RegistryError::Overlap {
                    a: a.mnemonic.to_string(),
                    b: b.mnemonic.to_string(),
                    word: raw,
                });
            }
        }
        Ok(())
    }

    pub fn lookup(&self, mnemonic: &str) -> Result<&InstrDesc, AsmError> {
        self.index
            .get(&mnemonic.to_ascii_uppercase())
            .map(|&i| &self.entries[i])
            .ok_or_else(|| AsmError::UnknownMnemonic(mnemonic.to_string()))
    }

    pub fn entries(&self) -> &[InstrDesc] {
        &self.entries
    }

    /// Descriptor for a machine word: exact FIX patterns first, then FIXV
    /// prefixes, then opcode/format/extension matches.
    pub fn find_word(&self, raw: u16) -> Option<&InstrDesc> {
        let by_format = |pred: fn(Format) -> bool| {
            self.entries
                .iter()
                .filter(move |d| pred(d.format))
                .find(|d| d.matches(raw))
        };
        by_format(|f| f == Format::Fix)
            .or_else(|| by_format(|f| f == Format::Fixv))
            .or_else(|| by_format(|f| !matches!(f, Format::Fix | Format::Fixv)))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
