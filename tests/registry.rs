use cim16_rs::decoder::Op;
use cim16_rs::instructions::{ImmSign, InstrDesc, TABLE};
use cim16_rs::{Registry, RegistryError};

#[test]
fn standard_catalog_is_unambiguous() {
    Registry::standard().validate().unwrap();
}

#[test]
fn every_mnemonic_is_unique_and_resolvable() {
    let reg = Registry::standard();
    assert_eq!(reg.entries().len(), TABLE.len());
    for d in TABLE {
        assert_eq!(reg.lookup(&d.mnemonic.to_ascii_lowercase()).unwrap().op, d.op);
    }
}

#[test]
fn duplicate_mnemonics_rejected() {
    let table = vec![
        InstrDesc::rr(Op::Add, "ADD", 0, 5),
        InstrDesc::rr(Op::Addu, "add", 0, 6),
    ];
    assert_eq!(
        Registry::from_table(table).unwrap_err(),
        RegistryError::DuplicateMnemonic("ADD".into())
    );
}

#[test]
fn ri_shadowing_rr_is_an_overlap() {
    // an RI entry on opcode 0 claims every word an RR entry on opcode 0 does
    let table = vec![
        InstrDesc::rr(Op::Add, "ADD", 0, 5),
        InstrDesc::ri(Op::Addi, "ADDI", 0, ImmSign::Signed),
    ];
    match Registry::from_table(table) {
        Err(RegistryError::Overlap { a, b, word }) => {
            assert_eq!((a.as_str(), b.as_str()), ("ADD", "ADDI"));
            assert_eq!(word & 0xF0, 0x50);
        }
        other => panic!("expected overlap, got {other:?}"),
    }
}

#[test]
fn fixed_word_may_sit_inside_an_opcode_space() {
    // WAIT is 0x0000; the RR entries on opcode 0 never use extension 0
    let reg = Registry::standard();
    assert_eq!(reg.find_word(0x0000).unwrap().mnemonic, "WAIT");
    assert_eq!(reg.find_word(0x0050).unwrap().mnemonic, "ADD");
}
