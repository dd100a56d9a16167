//! Quad-core simulator CLI.
//!
//! This binary wires the file-backed world to the simulation engine. It
//! performs:
//! 1. **Argument handling:** Zero positional paths (default file names in the
//!    working directory) or exactly 27 in the fixed reference order.
//! 2. **Setup:** Optional JSON config override, instruction and memory image
//!    loading, trace file creation.
//! 3. **Run:** Clock the machine until every core halts or the safety bound
//!    fires, then write every final dump.
//!
//! Exit code 0 on success (including a safety-bound stop, which is
//! informational); non-zero on argument or file errors, before any cycle runs.

use std::fs;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quadsim_core::Config;
use quadsim_core::common::SimError;
use quadsim_core::sim::{FileSet, FileSink, RunOutcome, Simulator, loader, output};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    version,
    about = "Cycle-accurate quad-core MESI cache-coherence simulator",
    long_about = "Runs four cores with private L1 caches over a snooped bus and a \
latency-modelled main memory, producing byte-comparable traces and dumps.\n\n\
Pass no file arguments to use the default names (imem0..3.txt, memin.txt, ...) \
in the working directory, or all 27 paths in the fixed order:\n\
  imem0..3 memin memout regout0..3 coretrace0..3 bustrace dsram0..3 tsram0..3 stats0..3"
)]
struct Cli {
    /// JSON file overriding run parameters (memory latency, cycle bound).
    #[arg(short, long)]
    config: Option<String>,

    /// 0 or 27 positional file paths.
    #[arg(trailing_var_arg = true)]
    files: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("sim: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let files = FileSet::from_args(&cli.files)?;

    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| SimError::file(path, e))?;
            Config::from_json(&text)?
        }
        None => Config::default(),
    };

    let imems = loader::load_imems(&files)?;
    let mut sim = Simulator::new(imems, &config);
    loader::load_memin(&mut sim.memory, &files)?;

    let mut sink = FileSink::create(&files)?;
    let outcome = sim.run(&mut sink)?;
    sink.finish()?;

    output::write_outputs(&sim, &files)?;

    match outcome {
        RunOutcome::Completed => {
            println!("Simulation completed in {} cycles.", sim.cycle);
        }
        RunOutcome::CycleLimit => {
            println!(
                "Simulation stopped at the {}-cycle safety bound; dumps written.",
                sim.cycle
            );
        }
    }
    Ok(())
}
