use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cim16_rs::disasm::disassemble_all;
use cim16_rs::{Assembler, Cim16Decoder, CpuConfig, Program, Registry, Simulator};
use cim16_tools::{load_hex, parse_hex, run_pipeline, write_hex, write_listing};

#[derive(Parser, Debug)]
#[command(author, version, about = "CIM16 toolchain CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble source into a hex machine-code file
    Asm {
        #[arg(value_name = "SRC")]
        input: PathBuf,
        #[arg(value_name = "HEX")]
        output: PathBuf,
    },
    /// Disassemble a hex file into label-free source
    Disasm {
        #[arg(value_name = "HEX")]
        input: PathBuf,
        #[arg(value_name = "ASM")]
        output: PathBuf,
    },
    /// Simulate a program and print its final state
    Run {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        /// Input is a hex machine-code file
        #[arg(long)]
        hex: bool,
        #[arg(long)]
        max_steps: Option<u64>,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
        /// Print a line per executed instruction first
        #[arg(long)]
        trace: bool,
    },
    /// Assemble, disassemble and simulate, writing every stage's output
    Pipeline {
        #[arg(value_name = "SRC")]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
        #[arg(long)]
        max_steps: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let reg = Registry::standard();

    match cli.cmd {
        Command::Asm { input, output } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let asm = Assembler::new(&reg).assemble(&text);
            for w in &asm.warnings {
                eprintln!("warning: {w}");
            }
            for d in &asm.diagnostics {
                eprintln!("error: {d}");
            }
            anyhow::ensure!(
                asm.is_ok(),
                "{} line(s) failed to assemble; nothing written",
                asm.diagnostics.len()
            );
            write_hex(&output, &asm.machine_code())?;
            println!("{} words -> {}", asm.words.len(), output.display());
        }
        Command::Disasm { input, output } => {
            let words = load_hex(&input)?;
            let lines = disassemble_all(&Cim16Decoder::new(&reg), &words);
            write_listing(&output, &lines)?;
            println!("{} lines -> {}", lines.len(), output.display());
        }
        Command::Run { input, hex, max_steps, json, trace } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let prog = if hex {
                Program::from_words(&reg, &parse_hex(&text)?)
            } else {
                let (prog, asm) = Program::from_source(&reg, &text);
                for d in &asm.diagnostics {
                    eprintln!("error: {d}");
                }
                prog
            };
            let mut sim = Simulator::new(prog, CpuConfig { max_steps });
            sim.set_trace(trace);
            let halt = sim.run();
            let dump = sim.dump(Some(halt));
            // the trace goes to stderr so stdout stays valid JSON
            if json {
                eprint!("{}", sim.trace_text());
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                print!("{}{dump}", sim.trace_text());
            }
        }
        Command::Pipeline { input, out_dir, max_steps } => {
            let (paths, dump) = run_pipeline(&reg, &input, &out_dir, CpuConfig { max_steps })?;
            println!("hex:        {}", paths.hex.display());
            println!("listing:    {}", paths.listing.display());
            println!("simulation: {}", paths.sim_out.display());
            if let Some(halt) = dump.halt {
                println!("halted: {halt}");
            }
        }
    }
    Ok(())
}
