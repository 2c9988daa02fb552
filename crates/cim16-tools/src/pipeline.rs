//! assemble → disassemble → simulate, each stage reading the previous
//! stage's file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use cim16_rs::disasm::disassemble_all;
use cim16_rs::{Assembler, Assembly, Cim16Decoder, CpuConfig, Program, Registry, Simulator, StateDump};

use crate::model::{load_hex, write_hex, write_listing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub hex: PathBuf,
    pub listing: PathBuf,
    pub sim_out: PathBuf,
}

impl PipelinePaths {
    /// `<stem>.hex`, `<stem>_no_label.asm` and `simulation.out` under `out_dir`.
    pub fn new(src: &Path, out_dir: &Path) -> Self {
        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        Self {
            hex: out_dir.join(format!("{stem}.hex")),
            listing: out_dir.join(format!("{stem}_no_label.asm")),
            sim_out: out_dir.join("simulation.out"),
        }
    }
}

fn ensure_assembled(asm: &Assembly, path: &Path) -> Result<()> {
    if !asm.is_ok() {
        let msgs: Vec<String> = asm.diagnostics.iter().map(|d| d.to_string()).collect();
        anyhow::bail!("assembly of {} failed:\n{}", path.display(), msgs.join("\n"));
    }
    Ok(())
}

pub fn run_pipeline(
    reg: &Registry,
    src: &Path,
    out_dir: &Path,
    cfg: CpuConfig,
) -> Result<(PipelinePaths, StateDump)> {
    let paths = PipelinePaths::new(src, out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    tracing::info!(src = %src.display(), "assembling");
    let text = std::fs::read_to_string(src)
        .with_context(|| format!("reading {}", src.display()))?;
    let asm = Assembler::new(reg).assemble(&text);
    ensure_assembled(&asm, src)?;
    write_hex(&paths.hex, &asm.machine_code())?;

    tracing::info!(hex = %paths.hex.display(), "disassembling");
    let words = load_hex(&paths.hex)?;
    let lines = disassemble_all(&Cim16Decoder::new(reg), &words);
    write_listing(&paths.listing, &lines)?;

    tracing::info!(listing = %paths.listing.display(), "simulating");
    let listing = std::fs::read_to_string(&paths.listing)
        .with_context(|| format!("reading {}", paths.listing.display()))?;
    let (prog, relisted) = Program::from_source(reg, &listing);
    ensure_assembled(&relisted, &paths.listing)?;
    let mut sim = Simulator::new(prog, cfg);
    sim.set_trace(true);
    let halt = sim.run();
    let dump = sim.dump(Some(halt));
    let report = format!("{}{}", sim.trace_text(), dump);
    std::fs::write(&paths.sim_out, report)
        .with_context(|| format!("writing {}", paths.sim_out.display()))?;

    Ok((paths, dump))
}
