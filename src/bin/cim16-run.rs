use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cim16_rs::hex::parse_hex;
use cim16_rs::{CpuConfig, Program, Registry, Simulator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a CIM16 program on the cim16-rs interpreter")]
struct Opts {
    /// Treat the input as machine code, one hex word per line.
    #[arg(long)]
    hex: bool,
    #[arg(long)]
    max_steps: Option<u64>,
    /// Print the final state as JSON.
    #[arg(long)]
    json: bool,
    /// Print a line per executed instruction before the final state.
    #[arg(long)]
    trace: bool,
    #[arg(value_name = "FILE")]
    input: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input))?;

    let reg = Registry::standard();
    let prog = if opts.hex {
        let words = parse_hex(&text).with_context(|| format!("parsing {}", opts.input))?;
        Program::from_words(&reg, &words)
    } else {
        let (prog, asm) = Program::from_source(&reg, &text);
        for d in &asm.diagnostics {
            eprintln!("{d}");
        }
        prog
    };

    let mut sim = Simulator::new(prog, CpuConfig { max_steps: opts.max_steps });
    sim.set_trace(opts.trace);
    let halt = sim.run();
    let dump = sim.dump(Some(halt));
    // the trace goes to stderr so stdout stays valid JSON
    if opts.json {
        eprint!("{}", sim.trace_text());
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        print!("{}{dump}", sim.trace_text());
    }
    Ok(())
}
