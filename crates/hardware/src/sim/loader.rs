//! Hex image loader.
//!
//! Reads the line-oriented ASCII images the simulator consumes: one 32-bit
//! hex word per line, in program (or address) order. Inputs are assumed
//! well-formed; lines that fail to parse are silently skipped and every file
//! is capped at its documented word limit. An unopenable file is a
//! configuration error that aborts before any cycle runs.

use std::fs;

use crate::common::constants::{IMEM_WORDS, MEM_WORDS, NUM_CORES};
use crate::common::{SimError, WordAddr};
use crate::sim::files::FileSet;
use crate::soc::MainMemory;

/// Parses one hex word line; accepts an optional `0x` prefix.
fn parse_word(line: &str) -> Option<u32> {
    let t = line.trim();
    let t = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t);
    u32::from_str_radix(t, 16).ok()
}

/// Loads a hex image, returning at most `max_words` words.
pub fn load_hex_file(path: &str, max_words: usize) -> Result<Vec<u32>, SimError> {
    let contents = fs::read_to_string(path).map_err(|e| SimError::file(path, e))?;
    let mut words = Vec::new();
    for line in contents.lines() {
        if let Some(word) = parse_word(line) {
            words.push(word);
            if words.len() == max_words {
                break;
            }
        }
    }
    Ok(words)
}

/// Loads the four instruction memory images.
pub fn load_imems(files: &FileSet) -> Result<[Vec<u32>; NUM_CORES], SimError> {
    let mut images: [Vec<u32>; NUM_CORES] = Default::default();
    for (image, path) in images.iter_mut().zip(&files.imem) {
        *image = load_hex_file(path, IMEM_WORDS)?;
    }
    Ok(images)
}

/// Initializes main memory from the memin image, word 0 upward.
pub fn load_memin(memory: &mut MainMemory, files: &FileSet) -> Result<(), SimError> {
    let words = load_hex_file(&files.memin, MEM_WORDS)?;
    for (i, word) in words.into_iter().enumerate() {
        memory.write_word(WordAddr::new(i as u32), word);
    }
    Ok(())
}
