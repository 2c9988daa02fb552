use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::cim::CimUnit;
use crate::exec::{Executor, Flow};
use crate::memory::Bus;
use crate::program::{Program, Slot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuConfig {
    /// Stop after this many executed steps. `None` runs until WAIT or the
    /// program counter leaves the program.
    pub max_steps: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// Index into the program, one unit per instruction word.
    pub pc: i32,
    pub psw: Psw,
    pub gpr: [i16; 16],
    pub cfg: CpuConfig,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psw: u8 {
const Z = 1 << 0; // Zero
const N = 1 << 1; // Negative
const F = 1 << 2; // Overflow
const C = 1 << 3; // Carry, never written
const L = 1 << 4; // Lower-than, never written
}
}

/// Runtime fault. The interpreter logs it and moves on to the next instruction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    #[error("invalid instruction at pc {pc}: {reason}")]
    InvalidInstruction { pc: i32, reason: String },
    #[error("{mnemonic} at pc {pc} is not implemented by the interpreter")]
    Unsupported { pc: i32, mnemonic: &'static str },
    #[error("negative shift amount {amount} at pc {pc}")]
    NegativeShift { pc: i32, amount: i32 },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    Wait { pc: i32 },
    ProgramEnd { pc: i32 },
    StepLimit { steps: u64 },
}

impl std::fmt::Display for Halt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Halt::Wait { pc } => write!(f, "WAIT at pc {pc}"),
            Halt::ProgramEnd { pc } => write!(f, "program end (pc {pc})"),
            Halt::StepLimit { steps } => write!(f, "step limit reached after {steps} steps"),
        }
    }
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: 0,
            psw: Psw::empty(),
            gpr: [0; 16],
            cfg,
        }
    }

    #[inline]
    pub fn reg(&self, idx: u8) -> i16 {
        self.gpr[(idx & 0xF) as usize]
    }

    #[inline]
    pub fn set_reg(&mut self, idx: u8, val: i16) {
        self.gpr[(idx & 0xF) as usize] = val;
    }

    /// Zero and Negative from a narrowed result.
    #[inline]
    pub fn set_zn(&mut self, val: i16) {
        self.psw.set(Psw::Z, val == 0);
        self.psw.set(Psw::N, val < 0);
    }

    /// Execute the instruction at `pc`.
    ///
    /// Returns `Ok(Some(_))` when the run is over. On `Err` the faulting
    /// instruction has had no effect and `pc` already points past it.
    pub fn step<B: Bus, X: Executor>(
        &mut self,
        prog: &Program,
        bus: &mut B,
        cim: &mut CimUnit,
        exec: &X,
    ) -> Result<Option<Halt>, Trap> {
        let pc = self.pc;
        let Some(slot) = prog.get(pc) else {
            return Ok(Some(Halt::ProgramEnd { pc }));
        };
        let d = match slot {
            Slot::Insn(d) => d,
            Slot::Invalid { reason, .. } => {
                self.pc = pc + 1;
                return Err(Trap::InvalidInstruction { pc, reason: reason.clone() });
            }
        };
        tracing::debug!(pc, word = format_args!("{:04X}", d.raw), op = d.mnemonic, "step");
        match exec.exec(self, bus, cim, d) {
            Ok(Flow::Next) => self.pc = pc + 1,
            Ok(Flow::Jump(target)) => self.pc = target,
            Ok(Flow::Halt) => return Ok(Some(Halt::Wait { pc })),
            Err(trap) => {
                self.pc = pc + 1;
                return Err(trap);
            }
        }
        Ok(None)
    }
}
