use serde::{Deserialize, Serialize};

use crate::instructions::Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Add,
    Addu,
    Addc,
    Mul,
    Sub,
    Subc,
    Cmp,
    And,
    Or,
    Xor,
    Mov,
    Addi,
    Addui,
    Addci,
    Muli,
    Subi,
    Subci,
    Cmpi,
    Andi,
    Ori,
    Xori,
    Movi,
    Lsh,
    Lshi,
    Ashu,
    Ashui,
    Lui,
    Load,
    Stor,
    Snxb,
    Zrxb,
    Scond,
    Bcond,
    Jcond,
    Jal,
    Tbit,
    Tbiti,
    Lpr,
    Spr,
    Di,
    Ei,
    Retx,
    Wait,
    Excp,
    // compute-in-memory
    Stcr,
    Stcm,
    Ldcr,
    Cmpt,
    Setq,
}

/// A machine word broken into its operand fields.
///
/// Register fields are named by position rather than role, since the role
/// depends on the instruction (STOR's `rd` is the value being stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub op: Op,
    pub mnemonic: &'static str,
    pub format: Format,
    pub raw: u16,
    /// Register field at [11:8].
    pub rd: u8,
    /// Register field at [3:0].
    pub rs: u8,
    pub cond: u8,
    /// Immediate, displacement or vector, already widened per the format's sign rule.
    pub imm: i32,
}

pub trait Decoder {
    fn decode(&self, raw: u16) -> Option<Decoded>;
}
