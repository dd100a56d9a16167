//! Final state dumps.
//!
//! Writes the end-of-run files in the fixed reference formats, all 8-digit
//! uppercase hex, one word per line:
//! 1. **memout:** Main memory up to the last non-zero word, with every
//!    Modified cache line folded into the image first so the dump reflects
//!    the architecturally-latest value of each block.
//! 2. **regout:** Registers R2..R15 per core.
//! 3. **dsram / tsram:** Cache data words and `(state << 12) | tag` entries.
//! 4. **stats:** The eight performance counters per core.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::common::constants::CACHE_SETS;
use crate::common::{SimError, WordAddr};
use crate::core::Core;
use crate::core::cache::MesiState;
use crate::sim::files::FileSet;
use crate::sim::simulator::Simulator;

fn create(path: &str) -> Result<BufWriter<File>, SimError> {
    Ok(BufWriter::new(
        File::create(path).map_err(|e| SimError::file(path, e))?,
    ))
}

/// Writes every final dump named in `files`.
pub fn write_outputs(sim: &Simulator, files: &FileSet) -> Result<(), SimError> {
    write_memout(sim, &files.memout)?;
    for core in &sim.cores {
        write_regout(core, &files.regout[core.id])?;
        write_dsram(core, &files.dsram[core.id])?;
        write_tsram(core, &files.tsram[core.id])?;
        write_stats(core, &files.stats[core.id])?;
    }
    Ok(())
}

/// Dumps main memory with Modified lines written back, truncated after the
/// last non-zero word. An all-zero memory produces an empty file.
fn write_memout(sim: &Simulator, path: &str) -> Result<(), SimError> {
    let mut image = sim.memory.words().to_vec();
    for core in &sim.cores {
        for set in 0..CACHE_SETS {
            let entry = core.cache.tag_entry(set);
            if entry.state == MesiState::Modified {
                let base = WordAddr::from_parts(entry.tag, set);
                let words = core.cache.block_words(set);
                for (offset, word) in words.iter().enumerate() {
                    image[base.with_offset(offset).index()] = *word;
                }
            }
        }
    }

    let last = image.iter().rposition(|w| *w != 0);
    let mut out = create(path)?;
    if let Some(last) = last {
        for word in &image[..=last] {
            writeln!(out, "{word:08X}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_regout(core: &Core, path: &str) -> Result<(), SimError> {
    let mut out = create(path)?;
    for reg in 2..16 {
        writeln!(out, "{:08X}", core.regs.read(reg))?;
    }
    out.flush()?;
    Ok(())
}

fn write_dsram(core: &Core, path: &str) -> Result<(), SimError> {
    let mut out = create(path)?;
    for set in 0..CACHE_SETS {
        for word in core.cache.block_words(set) {
            writeln!(out, "{word:08X}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_tsram(core: &Core, path: &str) -> Result<(), SimError> {
    let mut out = create(path)?;
    for set in 0..CACHE_SETS {
        let entry = core.cache.tag_entry(set);
        let encoded = (entry.state.code() << 12) | (entry.tag & 0xFFF);
        writeln!(out, "{encoded:08X}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_stats(core: &Core, path: &str) -> Result<(), SimError> {
    let mut out = create(path)?;
    write!(out, "{}", core.stats)?;
    out.flush()?;
    Ok(())
}
