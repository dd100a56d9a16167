//! Architectural constants shared across the simulator.
//!
//! This module centralizes the fixed hardware parameters of the machine. It covers:
//! 1. **Topology:** Core count and bus agent identifiers.
//! 2. **Storage geometry:** Register file, instruction memory, cache, and main memory sizes.
//! 3. **Timing:** Main-memory access latency and the global safety cycle bound.

/// Number of processor cores sharing the bus.
pub const NUM_CORES: usize = 4;

/// Bus agent id of the main-memory controller (cores are 0..3).
pub const MEMORY_ID: usize = 4;

/// Total number of bus agents (four cores plus memory).
pub const NUM_BUS_AGENTS: usize = NUM_CORES + 1;

/// Number of architectural registers per core.
pub const NUM_REGS: usize = 16;

/// Register hard-wired to zero.
pub const ZERO_REG: usize = 0;

/// Synthetic register index whose reads deliver the sign-extended immediate.
pub const IMM_REG: usize = 1;

/// Link register written by JAL.
pub const LINK_REG: usize = 15;

/// Instruction memory size per core, in words.
pub const IMEM_WORDS: usize = 1024;

/// Mask applied to branch targets; the program counter is a 10-bit word index.
pub const PC_MASK: u32 = (IMEM_WORDS as u32) - 1;

/// Main memory size in words (2^21 word address space).
pub const MEM_WORDS: usize = 1 << 21;

/// Number of direct-mapped cache sets per core.
pub const CACHE_SETS: usize = 64;

/// Words per cache block (and per bus Flush burst).
pub const BLOCK_WORDS: usize = 8;

/// Address bits selecting the word within a block.
pub const OFFSET_BITS: u32 = 3;

/// Address bits selecting the cache set.
pub const SET_BITS: u32 = 6;

/// Shift that isolates the tag from a word address.
pub const TAG_SHIFT: u32 = OFFSET_BITS + SET_BITS;

/// Cycles from a BusRd/BusRdX command to the first word of memory's response.
pub const MEM_READ_LATENCY: u32 = 16;

/// Global cycle bound: the simulation stops here even if cores never halt.
pub const SAFETY_CYCLE_BOUND: u32 = 500_000;
