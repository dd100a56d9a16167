//! Assembler CLI: translate one source file into an instruction-memory image.

use std::fs;
use std::process;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "asm",
    version,
    about = "Two-pass assembler for the quadsim instruction set",
    long_about = "Reads symbolic assembly and writes one 8-digit uppercase hex word per \
line, ready to load as a core's instruction memory (imemN.txt)."
)]
struct Cli {
    /// Assembly source file.
    input: String,

    /// Output image file.
    output: String,
}

fn main() {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        eprintln!("asm: cannot open {}: {e}", cli.input);
        process::exit(1);
    });

    let words = quadsim_asm::assemble(&source).unwrap_or_else(|e| {
        eprintln!("asm: {e}");
        process::exit(1);
    });

    if let Err(e) = fs::write(&cli.output, quadsim_asm::format_image(&words)) {
        eprintln!("asm: cannot write {}: {e}", cli.output);
        process::exit(1);
    }

    println!("Assembled {} -> {} ({} words)", cli.input, cli.output, words.len());
}
