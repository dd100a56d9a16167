//! Quad-core MESI cache-coherence simulator library.
//!
//! This crate implements a cycle-accurate model of a four-core chip
//! multiprocessor with the following:
//! 1. **Core:** Five-stage in-order pipeline (Fetch, Decode, Execute, Memory,
//!    Writeback), RAW-hazard interlocks, branch resolution in Decode, and a
//!    16-entry register file with hard-wired R0 and immediate-source R1.
//! 2. **Cache:** Per-core direct-mapped write-back L1 data cache (64 sets ×
//!    8 words) with a snoopy MESI controller and a multi-cycle flush engine.
//! 3. **Bus:** Shared single-transaction wires with round-robin arbitration
//!    across the four caches and memory.
//! 4. **Memory:** A 2^21-word main memory with a 16-cycle first-word latency,
//!    8-word burst responses, and a passive write snoop.
//! 5. **Simulation:** `Simulator` (phase-ordered cycle driver), hex image
//!    loader, trace sinks, final dumps, configuration, and statistics.
//!
//! Outputs are deterministic: traces and dumps are byte-comparable against
//! reference runs.

/// Common types and constants (addresses, errors, machine parameters).
pub mod common;
/// Simulator configuration (defaults and JSON overrides).
pub mod config;
/// Processor core: registers, pipeline, and L1 cache.
pub mod core;
/// Instruction set: encoding and decoding.
pub mod isa;
/// Simulation: driver, loader, traces, and dumps.
pub mod sim;
/// Shared fabric: bus and main memory.
pub mod soc;
/// Per-core statistics.
pub mod stats;

/// Run configuration; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// One processor core with its cache and pipeline state.
pub use crate::core::Core;
/// Top-level machine; owns the cores, the bus, and main memory.
pub use crate::sim::Simulator;
