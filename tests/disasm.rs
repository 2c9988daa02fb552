use pretty_assertions::assert_eq;

use cim16_rs::disasm::{disassemble, disassemble_all};
use cim16_rs::{Cim16Decoder, Registry};

#[test]
fn sample_words() {
    let reg = Registry::standard();
    let dec = Cim16Decoder::new(&reg);
    let lines = disassemble_all(&dec, &[0x0152, 0x530A, 0x8415, 0xC2F8, 0x43C5, 0x4647]);
    assert_eq!(
        lines,
        vec![
            "ADD R1, R2",
            "ADDI R3, 0xA",
            "LSHI R4, -5",
            "BCOND CS, -8",
            "JCOND CC, R5",
            "STOR R6, R7",
        ]
    );
}

#[test]
fn unrecognised_words_degrade_to_sentinel() {
    let reg = Registry::standard();
    let dec = Cim16Decoder::new(&reg);
    // opcode 0 with an unused extension, and SETQ with a non-zero [11:8]
    assert_eq!(disassemble(&dec, 0x0100), "??? (0x0100)");
    assert_eq!(disassemble(&dec, 0x41F3), "??? (0x41F3)");
    // LSHI/ASHUI reserve sub-ops 010..111
    assert_eq!(disassemble(&dec, 0x8445), "LSH R4, R5");
    assert_eq!(disassemble(&dec, 0x8465), "ASHU R4, R5");
    assert_eq!(disassemble(&dec, 0x84A5), "??? (0x84A5)");
}

#[test]
fn immediates_by_format() {
    let reg = Registry::standard();
    let dec = Cim16Decoder::new(&reg);
    assert_eq!(disassemble(&dec, 0xD1FF), "MOVI R1, 0xFF");
    assert_eq!(disassemble(&dec, 0x51FF), "ADDI R1, 0xFF");
    assert_eq!(disassemble(&dec, 0xF280), "LUI R2, 0x80");
    assert_eq!(disassemble(&dec, 0x840F), "LSHI R4, 15");
    assert_eq!(disassemble(&dec, 0x8435), "ASHUI R4, -5");
    assert_eq!(disassemble(&dec, 0xCE7F), "BCOND UC, 127");
    assert_eq!(disassemble(&dec, 0xCF80), "BCOND NV, -128");
    assert_eq!(disassemble(&dec, 0x40F9), "SETQ 9");
    assert_eq!(disassemble(&dec, 0x40BA), "EXCP 0xA");
    assert_eq!(disassemble(&dec, 0x01F2), "CMPT R1, R2");
}
