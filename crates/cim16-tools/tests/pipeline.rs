use pretty_assertions::assert_eq;
use std::path::PathBuf;

use cim16_rs::{CpuConfig, Halt, Registry};
use cim16_tools::{load_hex, run_pipeline, PipelinePaths};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cim16-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn paths_follow_source_stem() {
    let p = PipelinePaths::new(&PathBuf::from("progs/demo.asm"), &PathBuf::from("out"));
    assert_eq!(p.hex, PathBuf::from("out/demo.hex"));
    assert_eq!(p.listing, PathBuf::from("out/demo_no_label.asm"));
    assert_eq!(p.sim_out, PathBuf::from("out/simulation.out"));
}

#[test]
fn pipeline_writes_every_stage() {
    let dir = scratch("pipeline");
    let src = dir.join("count.asm");
    std::fs::write(
        &src,
        "        MOVI R1, 3\n\
         loop:   SUBI R1, 1\n\
                 BCOND NE, loop\n\
                 MOVI R2, 0x10\n\
                 STOR R1, R2\n\
                 WAIT\n",
    )
    .unwrap();

    let reg = Registry::standard();
    let (paths, dump) = run_pipeline(&reg, &src, &dir.join("output"), CpuConfig::default()).unwrap();

    assert_eq!(load_hex(&paths.hex).unwrap(), vec![0xD103, 0x9101, 0xC1FE, 0xD210, 0x4142, 0x0000]);
    let listing = std::fs::read_to_string(&paths.listing).unwrap();
    assert_eq!(
        listing.lines().collect::<Vec<_>>(),
        vec!["MOVI R1, 0x3", "SUBI R1, 0x1", "BCOND NE, -2", "MOVI R2, 0x10", "STOR R1, R2", "WAIT"]
    );
    assert_eq!(dump.halt, Some(Halt::Wait { pc: 5 }));
    assert_eq!(dump.regs[1], 0);
    assert_eq!(dump.regs[2], 0x10);
    let out = std::fs::read_to_string(&paths.sim_out).unwrap();
    assert!(out.contains("R2 = 16"), "{out}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn simulation_output_starts_with_step_trace() {
    let dir = scratch("pipeline-trace");
    let src = dir.join("trace.asm");
    std::fs::write(&src, "MOVI R1, 3\nMOVI R2, 0x10\nSTOR R1, R2\nWAIT\n").unwrap();
    let reg = Registry::standard();
    let (paths, _) = run_pipeline(&reg, &src, &dir.join("output"), CpuConfig::default()).unwrap();

    let out = std::fs::read_to_string(&paths.sim_out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        &lines[..8],
        &[
            "[SIM] PC=0, executing: MOVI R1, 0x3",
            "  R1 = 3",
            "[SIM] PC=1, executing: MOVI R2, 0x10",
            "  R2 = 16",
            "[SIM] PC=2, executing: STOR R1, R2",
            "  DMEM[16] = 3",
            "[SIM] PC=3, executing: WAIT",
            "  halt: WAIT at pc 3",
        ]
    );
    assert_eq!(lines[8], "----- Simulation Finished -----");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exception_survives_every_stage() {
    let dir = scratch("pipeline-excp");
    let src = dir.join("excp.asm");
    std::fs::write(&src, "MOVI R1, 1\nEXCP\nADDI R1, 100\nWAIT\n").unwrap();
    let reg = Registry::standard();
    let (paths, dump) = run_pipeline(&reg, &src, &dir.join("output"), CpuConfig::default()).unwrap();

    assert_eq!(load_hex(&paths.hex).unwrap()[1], 0x40B0);
    let listing = std::fs::read_to_string(&paths.listing).unwrap();
    assert_eq!(listing.lines().nth(1), Some("EXCP"));
    assert_eq!(dump.halt, Some(Halt::Wait { pc: 3 }));
    assert_eq!(dump.regs[1], 101);
    assert_eq!(dump.faults.len(), 1);
    assert!(dump.faults[0].contains("EXCP at pc 1"), "{:?}", dump.faults);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn assembly_errors_stop_the_pipeline() {
    let dir = scratch("pipeline-err");
    let src = dir.join("bad.asm");
    std::fs::write(&src, "ADD R1, R99\n").unwrap();
    let reg = Registry::standard();
    let err = run_pipeline(&reg, &src, &dir.join("output"), CpuConfig::default()).unwrap_err();
    assert!(err.to_string().contains("line 1"), "{err}");
    assert!(!dir.join("output/bad.hex").exists());
    let _ = std::fs::remove_dir_all(&dir);
}
