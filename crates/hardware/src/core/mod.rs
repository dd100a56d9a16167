//! Processor core: register file, pipeline state, and L1 cache.
//!
//! A [`Core`] owns everything private to one processor: registers, program
//! counter, instruction memory, the four pipeline latches, its L1 data cache,
//! and its statistics. The shared world (bus, main memory) is driven by the
//! top-level simulator; within a cycle the core only touches its own state,
//! and all bus interaction happens through the cache controller in the
//! driver's bus phases.

/// L1 data cache and MESI controller.
pub mod cache;
/// Five-stage pipeline.
pub mod pipeline;
/// Architectural register file.
pub mod regfile;

use crate::common::constants::IMEM_WORDS;
use crate::core::cache::DataCache;
use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::core::pipeline::stages;
use crate::core::regfile::RegisterFile;
use crate::stats::CoreStats;

/// One processor core.
pub struct Core {
    /// Core index (0..3); doubles as the bus origin id.
    pub id: usize,
    /// Program counter: a 10-bit word index into instruction memory.
    pub pc: u32,
    /// Architectural registers.
    pub regs: RegisterFile,
    /// Private instruction memory, 1024 words.
    pub imem: Vec<u32>,
    /// L1 data cache.
    pub cache: DataCache,

    /// IF/ID latch.
    pub if_id: IfId,
    /// ID/EX latch.
    pub id_ex: IdEx,
    /// EX/MEM latch.
    pub ex_mem: ExMem,
    /// MEM/WB latch.
    pub mem_wb: MemWb,

    /// The core retired HALT and executes no further cycles.
    pub halted: bool,
    /// HALT has been observed in Decode; Fetch is frozen.
    pub halt_seen: bool,
    /// Pipeline-wide stall asserted by the Memory stage this cycle.
    pub stall: bool,
    /// A branch resolved taken in Decode; Fetch redirects and squashes.
    pub branch_pending: bool,
    /// Masked target of the pending branch.
    pub branch_target: u32,
    /// One-cycle broadcast of the destination Writeback just wrote.
    pub wb_broadcast: usize,

    /// Performance counters.
    pub stats: CoreStats,
}

impl Core {
    /// Creates a core with the given instruction memory image.
    ///
    /// The image is padded with zero words (bubbles) to the full 1024-word
    /// instruction memory; longer images are truncated.
    pub fn new(id: usize, mut imem: Vec<u32>) -> Self {
        imem.resize(IMEM_WORDS, 0);
        Self {
            id,
            pc: 0,
            regs: RegisterFile::new(),
            imem,
            cache: DataCache::new(id),
            if_id: IfId::default(),
            id_ex: IdEx::default(),
            ex_mem: ExMem::default(),
            mem_wb: MemWb::default(),
            halted: false,
            halt_seen: false,
            stall: false,
            branch_pending: false,
            branch_target: 0,
            wb_broadcast: 0,
            stats: CoreStats::default(),
        }
    }

    /// Advances the pipeline by one clock cycle.
    ///
    /// Stages run in reverse order against the current latches. A HALT
    /// retiring in Writeback stops the core immediately; otherwise an
    /// instruction entering MEM/WB this cycle is counted as retired (it is
    /// consumed by Writeback exactly once, next cycle).
    pub fn cycle(&mut self) {
        if self.halted {
            return;
        }
        self.stats.cycles += 1;
        self.stall = false;

        if stages::writeback_stage(self) {
            return;
        }
        stages::memory_stage(self);
        stages::execute_stage(self);
        stages::decode_stage(self);
        stages::fetch_stage(self);

        if self.mem_wb.valid {
            self.stats.instructions += 1;
        }
    }
}
