use crate::bits::narrow;
use crate::cim::CimUnit;
use crate::cpu::{Cpu, Psw, Trap};
use crate::decoder::{Decoded, Op};
use crate::isa::cond::Cond;
use crate::memory::Bus;

/// What the program counter does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Jump(i32),
    Halt,
}

pub trait Executor {
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        cim: &mut CimUnit,
        d: &Decoded,
    ) -> Result<Flow, Trap>;
}

#[inline]
fn add_overflows(a: i16, b: i16, r: i16) -> bool {
    (a < 0) == (b < 0) && (r < 0) != (a < 0)
}

#[inline]
fn sub_overflows(a: i16, b: i16, r: i16) -> bool {
    (a < 0) != (b < 0) && (r < 0) != (a < 0)
}

/// Left shift at full precision; anything at or beyond the register width clears it.
#[inline]
fn shl16(v: i16, amount: u32) -> i16 {
    if amount >= 16 {
        0
    } else {
        narrow((v as i32) << amount)
    }
}

/// Integer core plus the CIM extension.
pub struct IntExecutor;

impl IntExecutor {
    fn add(cpu: &mut Cpu, rd: u8, b: i16) {
        let a = cpu.reg(rd);
        let r = narrow(a as i32 + b as i32);
        cpu.set_reg(rd, r);
        cpu.set_zn(r);
        cpu.psw.set(Psw::F, add_overflows(a, b, r));
    }

    /// SUB/CMP family; `write` is false for the compare forms.
    fn sub(cpu: &mut Cpu, rd: u8, b: i16, write: bool) {
        let a = cpu.reg(rd);
        let r = narrow(a as i32 - b as i32);
        if write {
            cpu.set_reg(rd, r);
        }
        cpu.set_zn(r);
        cpu.psw.set(Psw::F, sub_overflows(a, b, r));
    }

    fn logic(cpu: &mut Cpu, rd: u8, b: i16, f: fn(i16, i16) -> i16) {
        let r = f(cpu.reg(rd), b);
        cpu.set_reg(rd, r);
        cpu.set_zn(r);
    }

    fn load(cpu: &mut Cpu, rd: u8, v: i16) {
        cpu.set_reg(rd, v);
        cpu.set_zn(v);
    }
}

impl Executor for IntExecutor {
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        cim: &mut CimUnit,
        d: &Decoded,
    ) -> Result<Flow, Trap> {
        let pc = cpu.pc;
        // RI immediates are already widened per the instruction's sign rule;
        // narrowing keeps zero-extended bytes as-is.
        let imm = narrow(d.imm);
        let src = cpu.reg(d.rs);
        match d.op {
            Op::Add => Self::add(cpu, d.rd, src),
            Op::Addi => Self::add(cpu, d.rd, imm),
            Op::Sub => Self::sub(cpu, d.rd, src, true),
            Op::Subi => Self::sub(cpu, d.rd, imm, true),
            Op::Cmp => Self::sub(cpu, d.rd, src, false),
            Op::Cmpi => Self::sub(cpu, d.rd, imm, false),
            Op::And => Self::logic(cpu, d.rd, src, |a, b| a & b),
            Op::Andi => Self::logic(cpu, d.rd, imm, |a, b| a & b),
            Op::Or => Self::logic(cpu, d.rd, src, |a, b| a | b),
            Op::Ori => Self::logic(cpu, d.rd, imm, |a, b| a | b),
            Op::Xor => Self::logic(cpu, d.rd, src, |a, b| a ^ b),
            Op::Xori => Self::logic(cpu, d.rd, imm, |a, b| a ^ b),
            Op::Mov => Self::load(cpu, d.rd, src),
            Op::Movi => Self::load(cpu, d.rd, imm),
            Op::Lui => Self::load(cpu, d.rd, shl16(imm & 0xFF, 8)),
            Op::Lsh => {
                let amount = if src < 0 { (src & 0xF) as u32 } else { src as u32 };
                let r = shl16(cpu.reg(d.rd), amount);
                Self::load(cpu, d.rd, r);
            }
            Op::Lshi => {
                if d.imm < 0 {
                    return Err(Trap::NegativeShift { pc, amount: d.imm });
                }
                let r = shl16(cpu.reg(d.rd), d.imm as u32);
                Self::load(cpu, d.rd, r);
            }
            Op::Load => {
                let v = bus.read(src);
                Self::load(cpu, d.rd, v);
            }
            Op::Stor => bus.write(src, cpu.reg(d.rd)),
            Op::Bcond => {
                let taken = Cond::from_code(d.cond).holds(cpu.psw);
                tracing::debug!(pc, cond = d.cond, disp = d.imm, taken, "bcond");
                if taken {
                    return Ok(Flow::Jump(pc + 1 + d.imm));
                }
            }
            Op::Jcond => {
                let taken = Cond::from_code(d.cond).holds(cpu.psw);
                tracing::debug!(pc, cond = d.cond, target = src, taken, "jcond");
                if taken {
                    return Ok(Flow::Jump(src as i32));
                }
            }
            Op::Jal => {
                // target is read before the link is written, so JAL R1, R1 jumps to the old R1
                cpu.set_reg(d.rd, narrow(pc + 1));
                return Ok(Flow::Jump(src as i32));
            }
            Op::Wait => return Ok(Flow::Halt),
            Op::Di | Op::Ei => {}
            Op::Stcr => cim.write(src, cpu.reg(d.rd) as u16),
            Op::Stcm => {
                let v = bus.read(src);
                cim.write(cpu.reg(d.rd), v as u16);
            }
            Op::Ldcr => {
                let v = cim.read(cpu.reg(d.rd)) as i16;
                Self::load(cpu, d.rs, v);
            }
            Op::Setq => cim.set_qshift(d.imm as u8),
            Op::Cmpt => {
                let act = cpu.reg(d.rd) as u16;
                let packed = cim.compute(d.rd, act);
                tracing::debug!(pc, act = format_args!("{act:04X}"), packed = format_args!("{packed:04X}"), "cmpt");
                bus.write(src, packed as i16);
            }
            Op::Addu
            | Op::Addc
            | Op::Mul
            | Op::Subc
            | Op::Addui
            | Op::Addci
            | Op::Muli
            | Op::Subci
            | Op::Ashu
            | Op::Ashui
            | Op::Snxb
            | Op::Zrxb
            | Op::Scond
            | Op::Tbit
            | Op::Tbiti
            | Op::Lpr
            | Op::Spr
            | Op::Retx
            | Op::Excp => {
                return Err(Trap::Unsupported { pc, mnemonic: d.mnemonic });
            }
        }
        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_rules() {
        assert!(add_overflows(i16::MAX, 1, i16::MIN));
        assert!(add_overflows(i16::MIN, -1, i16::MAX));
        assert!(!add_overflows(-1, 1, 0));
        assert!(sub_overflows(i16::MIN, 1, i16::MAX));
        assert!(sub_overflows(i16::MAX, -1, i16::MIN));
        assert!(!sub_overflows(0, 1, -1));
    }

    #[test]
    fn shifts_past_width_clear() {
        assert_eq!(shl16(1, 15), i16::MIN);
        assert_eq!(shl16(1, 16), 0);
        assert_eq!(shl16(0x00FF, 8), -256);
    }
}
