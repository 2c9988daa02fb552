use crate::bits::{field, sign_ext};
use crate::decoder::{Decoded, Decoder};
use crate::instructions::{Format, ImmSign, InstrDesc, Registry};

/// Table-driven decoder over a [`Registry`].
pub struct Cim16Decoder<'r> {
    reg: &'r Registry,
}

impl<'r> Cim16Decoder<'r> {
    pub fn new(reg: &'r Registry) -> Self {
        Self { reg }
    }
}

impl Decoder for Cim16Decoder<'_> {
    fn decode(&self, raw: u16) -> Option<Decoded> {
        let desc = self.reg.find_word(raw)?;
        Some(extract(desc, raw))
    }
}

fn extract(desc: &InstrDesc, raw: u16) -> Decoded {
    let mut d = Decoded {
        op: desc.op,
        mnemonic: desc.mnemonic,
        format: desc.format,
        raw,
        rd: 0,
        rs: 0,
        cond: 0,
        imm: 0,
    };
    let hi = field(raw, 11, 8);
    let lo = field(raw, 3, 0);
    match desc.format {
        Format::Rr | Format::Rs => {
            d.rd = hi;
            d.rs = lo;
        }
        Format::Ri => {
            d.rd = hi;
            d.imm = match desc.imm_sign {
                ImmSign::Signed => sign_ext(raw & 0xFF, 8) as i32,
                ImmSign::Unsigned => (raw & 0xFF) as i32,
            };
        }
        Format::Ri4 => {
            d.rd = hi;
            let mag = lo as i32;
            d.imm = if field(raw, 4, 4) == 1 { -mag } else { mag };
        }
        Format::I4 | Format::Fixv => d.imm = lo as i32,
        Format::Bcond => {
            d.cond = hi;
            d.imm = sign_ext(raw & 0xFF, 8) as i32;
        }
        Format::Jcond => {
            d.cond = hi;
            d.rs = lo;
        }
        Format::Ir => {
            d.rd = hi;
            d.imm = match desc.ext {
                Some(_) => lo as i32,
                None => (raw & 0xFF) as i32,
            };
        }
        Format::Fix => {}
    }
    d
}
