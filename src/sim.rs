//! Run loop and final-state dump.

use std::fmt;

use serde::Serialize;

use crate::cim::CimUnit;
use crate::cpu::{Cpu, CpuConfig, Halt, Psw, Trap};
use crate::disasm::fmt_decoded;
use crate::exec::IntExecutor;
use crate::memory::DataMemory;
use crate::program::{Program, Slot};

/// Entries kept in each of the fault and trace logs; later ones are only counted.
pub const LOG_LIMIT: usize = 65_536;

/// One executed step: where, what, and what it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub pc: i32,
    pub text: String,
    pub effects: Vec<String>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SIM] PC={}, executing: {}", self.pc, self.text)?;
        if !self.effects.is_empty() {
            write!(f, "\n  {}", self.effects.join(", "))?;
        }
        Ok(())
    }
}

/// Machine state captured before a traced step.
struct Snapshot {
    gpr: [i16; 16],
    psw: Psw,
    mem: Vec<i16>,
    cim: CimUnit,
}

/// All state of one run. Nothing is shared between simulators.
pub struct Simulator {
    pub prog: Program,
    pub cpu: Cpu,
    pub mem: DataMemory,
    pub cim: CimUnit,
    /// The first [`LOG_LIMIT`] faults, in execution order.
    pub faults: Vec<Trap>,
    /// Per-step trace, empty unless enabled with [`Simulator::set_trace`].
    pub trace: Vec<TraceEntry>,
    faults_dropped: u64,
    trace_dropped: u64,
    tracing_steps: bool,
    steps: u64,
    exec: IntExecutor,
}

impl Simulator {
    pub fn new(prog: Program, cfg: CpuConfig) -> Self {
        Self {
            prog,
            cpu: Cpu::new(cfg),
            mem: DataMemory::new(),
            cim: CimUnit::new(),
            faults: Vec::new(),
            trace: Vec::new(),
            faults_dropped: 0,
            trace_dropped: 0,
            tracing_steps: false,
            steps: 0,
            exec: IntExecutor,
        }
    }

    pub fn set_trace(&mut self, on: bool) {
        self.tracing_steps = on;
    }

    /// Executed instructions, the halting WAIT and skipped faults included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Faults raised beyond [`LOG_LIMIT`].
    pub fn faults_dropped(&self) -> u64 {
        self.faults_dropped
    }

    /// Execute one instruction. A fault is recorded and skipped.
    pub fn step(&mut self) -> Option<Halt> {
        let pc = self.cpu.pc;
        let Some(text) = self.prog.get(pc).map(slot_text) else {
            return Some(Halt::ProgramEnd { pc });
        };
        let before = self.tracing_steps.then(|| self.snapshot());

        let (halt, fault) = match self.cpu.step(&self.prog, &mut self.mem, &mut self.cim, &self.exec) {
            Ok(halt) => (halt, None),
            Err(trap) => {
                tracing::warn!(%trap, "skipping instruction");
                (None, Some(trap))
            }
        };
        self.steps += 1;

        if let Some(before) = before {
            let mut effects = self.effects(&before, pc);
            if let Some(trap) = &fault {
                effects.push(format!("fault: {trap}"));
            }
            if let Some(halt) = &halt {
                effects.push(format!("halt: {halt}"));
            }
            let entry = TraceEntry { pc, text, effects };
            if self.trace.len() < LOG_LIMIT {
                self.trace.push(entry);
            } else {
                self.trace_dropped += 1;
            }
        }
        if let Some(trap) = fault {
            if self.faults.len() < LOG_LIMIT {
                self.faults.push(trap);
            } else {
                self.faults_dropped += 1;
            }
        }
        halt
    }

    pub fn run(&mut self) -> Halt {
        loop {
            if let Some(limit) = self.cpu.cfg.max_steps {
                if self.steps >= limit {
                    let halt = Halt::StepLimit { steps: self.steps };
                    tracing::info!(%halt, "halted");
                    return halt;
                }
            }
            if let Some(halt) = self.step() {
                tracing::info!(%halt, steps = self.steps, "halted");
                return halt;
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            gpr: self.cpu.gpr,
            psw: self.cpu.psw,
            mem: self.mem.mem.clone(),
            cim: self.cim.clone(),
        }
    }

    fn effects(&self, before: &Snapshot, pc: i32) -> Vec<String> {
        let mut out = Vec::new();
        for (i, (old, new)) in before.gpr.iter().zip(self.cpu.gpr.iter()).enumerate() {
            if old != new {
                out.push(format!("R{i} = {new}"));
            }
        }
        if before.psw != self.cpu.psw {
            let p = self.cpu.psw;
            out.push(format!(
                "F={}, N={}, Z={}, C={}, L={}",
                p.contains(Psw::F),
                p.contains(Psw::N),
                p.contains(Psw::Z),
                p.contains(Psw::C),
                p.contains(Psw::L)
            ));
        }
        for (addr, (old, new)) in before.mem.iter().zip(self.mem.mem.iter()).enumerate() {
            if old != new {
                out.push(format!("DMEM[{addr}] = {new}"));
            }
        }
        for (row, (old, new)) in before.cim.rows.iter().zip(self.cim.rows.iter()).enumerate() {
            if old != new {
                out.push(format!("CIM[{row}] = 0x{new:04X}"));
            }
        }
        if before.cim.qshift != self.cim.qshift {
            out.push(format!("QSHIFT = {}", self.cim.qshift));
        }
        if self.cpu.pc != pc + 1 && self.cpu.pc != pc {
            out.push(format!("jump to {}", self.cpu.pc));
        }
        out
    }

    pub fn dump(&self, halt: Option<Halt>) -> StateDump {
        let psw = self.cpu.psw;
        StateDump {
            halt,
            pc: self.cpu.pc,
            steps: self.steps,
            regs: self.cpu.gpr,
            flags: Flags {
                z: psw.contains(Psw::Z),
                n: psw.contains(Psw::N),
                f: psw.contains(Psw::F),
                c: psw.contains(Psw::C),
                l: psw.contains(Psw::L),
            },
            qshift: self.cim.qshift,
            dmem: self.mem.nonzero().collect(),
            cim: self
                .cim
                .rows
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, r)| r != 0)
                .collect(),
            faults: self.faults.iter().map(|t| t.to_string()).collect(),
            faults_dropped: self.faults_dropped,
        }
    }

    /// The trace as log text, one entry per step.
    pub fn trace_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.trace {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        if self.trace_dropped > 0 {
            out.push_str(&format!("[SIM] {} further steps not traced\n", self.trace_dropped));
        }
        out
    }
}

fn slot_text(slot: &Slot) -> String {
    match slot {
        Slot::Insn(d) => fmt_decoded(d),
        Slot::Invalid { reason, .. } => format!("<invalid: {reason}>"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub z: bool,
    pub n: bool,
    pub f: bool,
    pub c: bool,
    pub l: bool,
}

/// Final machine state. `dmem` and `cim` list non-zero entries only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateDump {
    pub halt: Option<Halt>,
    pub pc: i32,
    pub steps: u64,
    pub regs: [i16; 16],
    pub flags: Flags,
    pub qshift: u8,
    pub dmem: Vec<(usize, i16)>,
    pub cim: Vec<(usize, u16)>,
    pub faults: Vec<String>,
    /// Faults past the logged ones.
    pub faults_dropped: u64,
}

impl fmt::Display for StateDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----- Simulation Finished -----")?;
        if let Some(halt) = &self.halt {
            writeln!(f, "Halt: {halt}")?;
        }
        writeln!(f, "PC = {}, steps = {}", self.pc, self.steps)?;
        writeln!(f, "Registers:")?;
        for (i, r) in self.regs.iter().enumerate() {
            writeln!(f, "  R{i} = {r}")?;
        }
        let fl = &self.flags;
        writeln!(
            f,
            "Flags: F={}, N={}, Z={}, C={}, L={}",
            fl.f, fl.n, fl.z, fl.c, fl.l
        )?;
        writeln!(f, "QSHIFT = {}", self.qshift)?;
        if !self.dmem.is_empty() {
            writeln!(f, "DMEM:")?;
            for (addr, v) in &self.dmem {
                writeln!(f, "  [{addr:03}] = {v}")?;
            }
        }
        if !self.cim.is_empty() {
            writeln!(f, "CIM:")?;
            for (row, v) in &self.cim {
                writeln!(f, "  row {row:2} = 0x{v:04X}")?;
            }
        }
        if !self.faults.is_empty() {
            writeln!(f, "Faults:")?;
            for t in &self.faults {
                writeln!(f, "  {t}")?;
            }
            if self.faults_dropped > 0 {
                writeln!(f, "  ... and {} more", self.faults_dropped)?;
            }
        }
        Ok(())
    }
}
