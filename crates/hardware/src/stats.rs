//! Per-core statistics collection.
//!
//! This module tracks the performance counters reported in each core's stats
//! file. It covers:
//! 1. **Progress:** Executed cycles and retired instructions.
//! 2. **Cache behavior:** Read/write hits and misses, counted once per demand.
//! 3. **Stalls:** Decode (RAW hazard) and memory (cache miss) stall cycles.

use std::fmt;

/// Counters maintained by one core and its L1 cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Cycles the core executed before halting.
    pub cycles: u64,
    /// Instructions that entered Writeback (non-bubble retirements).
    pub instructions: u64,
    /// Cache read hits; post-fill retries are not counted.
    pub read_hits: u64,
    /// Cache write hits; post-fill retries are not counted.
    pub write_hits: u64,
    /// Cache read misses, counted at first observation of the demand.
    pub read_misses: u64,
    /// Cache write misses, counted at first observation of the demand.
    pub write_misses: u64,
    /// Cycles Decode spent stalled on a RAW hazard.
    pub decode_stalls: u64,
    /// Cycles the Memory stage spent stalled on the cache.
    pub mem_stalls: u64,
}

impl fmt::Display for CoreStats {
    /// Formats the counters in the stats-file layout, one `name value` line each.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycles {}", self.cycles)?;
        writeln!(f, "instructions {}", self.instructions)?;
        writeln!(f, "read_hit {}", self.read_hits)?;
        writeln!(f, "write_hit {}", self.write_hits)?;
        writeln!(f, "read_miss {}", self.read_misses)?;
        writeln!(f, "write_miss {}", self.write_misses)?;
        writeln!(f, "decode_stall {}", self.decode_stalls)?;
        writeln!(f, "mem_stall {}", self.mem_stalls)
    }
}
