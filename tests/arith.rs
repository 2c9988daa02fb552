use pretty_assertions::assert_eq;

use cim16_rs::{CpuConfig, Halt, Program, Psw, Registry, Simulator};

fn run(src: &str) -> Simulator {
    let reg = Registry::standard();
    let (prog, asm) = Program::from_source(&reg, src);
    assert!(asm.is_ok(), "{:?}", asm.diagnostics);
    let mut sim = Simulator::new(prog, CpuConfig { max_steps: Some(10_000) });
    let halt = sim.run();
    assert!(matches!(halt, Halt::Wait { .. } | Halt::ProgramEnd { .. }), "{halt:?}");
    sim
}

/// Runs `op R1, R2` with the given register values and returns (R1, psw).
fn binop(op: &str, a: i16, b: i16) -> (i16, Psw) {
    let reg = Registry::standard();
    let (prog, _) = Program::from_source(&reg, &format!("{op} R1, R2"));
    let mut sim = Simulator::new(prog, CpuConfig::default());
    sim.cpu.gpr[1] = a;
    sim.cpu.gpr[2] = b;
    sim.run();
    (sim.cpu.gpr[1], sim.cpu.psw)
}

#[test]
fn add_overflow_boundaries() {
    let cases: [(i16, i16, i16, bool); 6] = [
        (0x7FFF, 1, i16::MIN, true),
        (i16::MIN, -1, 0x7FFF, true),
        (i16::MIN, i16::MIN, 0, true),
        (-1, 1, 0, false),
        (0x7FFF, -1, 0x7FFE, false),
        (0, 0, 0, false),
    ];
    for (a, b, r, f) in cases {
        let (got, psw) = binop("ADD", a, b);
        assert_eq!(got, r, "{a} + {b}");
        assert_eq!(psw.contains(Psw::F), f, "{a} + {b}");
        assert_eq!(psw.contains(Psw::Z), r == 0);
        assert_eq!(psw.contains(Psw::N), r < 0);
    }
}

#[test]
fn sub_overflow_boundaries() {
    let cases: [(i16, i16, i16, bool); 5] = [
        (i16::MIN, 1, 0x7FFF, true),
        (0x7FFF, -1, i16::MIN, true),
        (0, i16::MIN, i16::MIN, true),
        (-1, -1, 0, false),
        (1, 0x7FFF, -0x7FFE, false),
    ];
    for (a, b, r, f) in cases {
        let (got, psw) = binop("SUB", a, b);
        assert_eq!(got, r, "{a} - {b}");
        assert_eq!(psw.contains(Psw::F), f, "{a} - {b}");
    }
}

#[test]
fn cmp_sets_flags_without_writing() {
    let (r1, psw) = binop("CMP", 5, 5);
    assert_eq!(r1, 5);
    assert!(psw.contains(Psw::Z));
    let (r1, psw) = binop("CMP", 3, 5);
    assert_eq!(r1, 3);
    assert!(psw.contains(Psw::N) && !psw.contains(Psw::Z));
}

#[test]
fn logic_ops_keep_overflow() {
    let sim = run("MOVI R1, 0xFF\nLUI R2, 0x7F\nOR R1, R2\nADDI R1, 1\nAND R1, R1\nXORI R1, 0xFF\n");
    // 0x7FFF + 1 overflows; the AND and XORI afterwards leave F alone
    assert!(sim.cpu.psw.contains(Psw::F));
    assert_eq!(sim.cpu.gpr[1] as u16, 0x80FF);
    assert!(sim.cpu.psw.contains(Psw::N));
}

#[test]
fn immediate_sign_rules() {
    let sim = run("MOVI R1, 0xFF\nMOVI R2, 0\nADDI R2, -1\nMOVI R3, 1\nANDI R3, 0xFF\nSUBI R4, -2\nCMPI R4, 2\n");
    assert_eq!(sim.cpu.gpr[1], 255);
    assert_eq!(sim.cpu.gpr[2], -1);
    assert_eq!(sim.cpu.gpr[3], 1);
    assert_eq!(sim.cpu.gpr[4], 2);
    assert!(sim.cpu.psw.contains(Psw::Z));
}

#[test]
fn shifts() {
    let sim = run("\
MOVI R1, 1
LSHI R1, 15
MOVI R2, 3
MOVI R3, 2
LSH R2, R3
MOVI R4, 1
MOVI R5, 0
SUBI R5, 13      ; -13 & 0xF = 3
LSH R4, R5
MOVI R6, 1
MOVI R7, 16
LSH R6, R7
LUI R8, 0x12
");
    assert_eq!(sim.cpu.gpr[1], i16::MIN);
    assert_eq!(sim.cpu.gpr[2], 12);
    assert_eq!(sim.cpu.gpr[4], 8);
    assert_eq!(sim.cpu.gpr[6], 0);
    assert_eq!(sim.cpu.gpr[8], 0x1200);
}

#[test]
fn negative_lshi_is_a_skipped_fault() {
    let sim = run("MOVI R1, 3\nLSHI R1, -2\nADDI R1, 1\n");
    assert_eq!(sim.cpu.gpr[1], 4);
    assert_eq!(sim.faults.len(), 1);
}

#[test]
fn memory_wraps_to_nine_bits() {
    let sim = run("\
MOVI R1, 42
LUI R2, 0x02     ; 0x0200 -> address 0
ORI R2, 5
STOR R1, R2
MOVI R3, 5
LOAD R4, R3
");
    assert_eq!(sim.mem.mem[5], 42);
    assert_eq!(sim.cpu.gpr[4], 42);
}

#[test]
fn load_updates_zero_and_negative() {
    let sim = run("MOVI R1, 1\nMOVI R2, 7\nLOAD R3, R2\n");
    assert!(sim.cpu.psw.contains(Psw::Z));
    assert_eq!(sim.cpu.gpr[3], 0);
}

#[test]
fn unsupported_instructions_are_skipped() {
    let sim = run("MOVI R1, 2\nMUL R1, R1\nADDU R1, R1\nRETX\nDI\nEI\nADDI R1, 1\n");
    assert_eq!(sim.cpu.gpr[1], 3);
    assert_eq!(sim.faults.len(), 3);
}
