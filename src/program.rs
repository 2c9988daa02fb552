use crate::asm::{Assembler, Assembly};
use crate::decoder::{Decoded, Decoder};
use crate::instructions::Registry;
use crate::isa::cim16::Cim16Decoder;

/// One instruction address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Insn(Decoded),
    /// A line that did not assemble, or a word no descriptor matches.
    /// Executing it is a logged fault.
    Invalid { raw: Option<u16>, reason: String },
}

/// Executable image, indexed by the program counter.
#[derive(Debug, Clone, Default)]
pub struct Program {
    slots: Vec<Slot>,
}

impl Program {
    pub fn from_words(reg: &Registry, words: &[u16]) -> Self {
        let dec = Cim16Decoder::new(reg);
        let slots = words
            .iter()
            .map(|&raw| match dec.decode(raw) {
                Some(d) => Slot::Insn(d),
                None => Slot::Invalid {
                    raw: Some(raw),
                    reason: format!("unrecognised word {raw:04X}"),
                },
            })
            .collect();
        Self { slots }
    }

    /// Assemble `src` and decode the result. Lines that failed to assemble
    /// keep their address as [`Slot::Invalid`], so later addresses and
    /// label displacements stay where the assembler put them.
    pub fn from_source(reg: &Registry, src: &str) -> (Self, Assembly) {
        let asm = Assembler::new(reg).assemble(src);
        let dec = Cim16Decoder::new(reg);
        let mut slots: Vec<Slot> = asm
            .source
            .iter()
            .map(|_| Slot::Invalid { raw: None, reason: String::new() })
            .collect();
        for e in &asm.words {
            slots[e.addr as usize] = match dec.decode(e.word) {
                Some(d) => Slot::Insn(d),
                None => Slot::Invalid {
                    raw: Some(e.word),
                    reason: format!("unrecognised word {:04X}", e.word),
                },
            };
        }
        for diag in &asm.diagnostics {
            slots[diag.addr as usize] = Slot::Invalid {
                raw: None,
                reason: diag.to_string(),
            };
        }
        (Self { slots }, asm)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `None` once `pc` leaves the program, negative values included.
    pub fn get(&self, pc: i32) -> Option<&Slot> {
        usize::try_from(pc).ok().and_then(|i| self.slots.get(i))
    }
}
