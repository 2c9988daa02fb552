pub mod asm;
pub mod bits;
pub mod cim;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod exec;
pub mod hex;
pub mod instructions;
pub mod memory;
pub mod program;
pub mod sim;

pub mod isa {
    pub mod cim16;
    pub mod cond;
}

pub use asm::{Assembler, Assembly};
pub use cpu::{Cpu, CpuConfig, Halt, Psw, Trap};
pub use error::{AsmError, HexError, RegistryError};
pub use instructions::Registry;
pub use isa::cim16::Cim16Decoder;
pub use memory::{Bus, DataMemory};
pub use program::Program;
pub use sim::{Simulator, StateDump, TraceEntry};
