//! Top-level cycle driver.
//!
//! Owns the four cores, the bus, and main memory, and advances them through
//! the strict per-cycle phase order:
//!
//! 1. Reset the bus wires (busy, grant, and the round-robin pointer persist).
//! 2. Gather the five-agent request vector.
//! 3. Arbitrate (a no-op while a transaction holds the bus).
//! 4. Let a granted core place its demand or arm its eviction flush.
//! 5. Snoop/response: memory drives first when it holds the grant, otherwise
//!    caches react first (a cache mid-flush overwrites the wires) and memory
//!    observes afterwards.
//! 6. Latch the shared flag for every cache waiting on the block on the wires.
//! 7. Deliver the (final) wire values to waiting caches as fill data.
//! 8. Emit trace lines.
//! 9. Clock edge: advance every non-halted pipeline.
//! 10. Advance the global cycle and check termination.
//!
//! The ownership mirrors the phase discipline: each phase mutably borrows the
//! bus and exactly one component at a time, so every agent observes a
//! consistent snapshot of the shared wires.

use crate::common::SimError;
use crate::common::constants::{MEMORY_ID, NUM_BUS_AGENTS, NUM_CORES};
use crate::config::Config;
use crate::core::Core;
use crate::sim::trace::{self, TraceSink};
use crate::soc::{Bus, MainMemory};

/// How a simulation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every core retired a HALT.
    Completed,
    /// The safety cycle bound fired before all cores halted.
    CycleLimit,
}

/// The whole machine: four cores, the shared bus, and main memory.
pub struct Simulator {
    /// Processor cores, indexed by bus origin id.
    pub cores: [Core; NUM_CORES],
    /// Shared bus and arbiter.
    pub bus: Bus,
    /// Main memory and its read controller.
    pub memory: MainMemory,
    /// Global cycle counter, starting at zero.
    pub cycle: u32,
    max_cycles: u32,
}

impl Simulator {
    /// Builds a machine from per-core instruction images.
    pub fn new(imems: [Vec<u32>; NUM_CORES], config: &Config) -> Self {
        let mut images = imems.into_iter();
        Self {
            cores: std::array::from_fn(|id| {
                Core::new(id, images.next().unwrap_or_default())
            }),
            bus: Bus::new(),
            memory: MainMemory::new(config),
            cycle: 0,
            max_cycles: config.run.max_cycles,
        }
    }

    /// Returns whether every core has halted.
    pub fn all_halted(&self) -> bool {
        self.cores.iter().all(|c| c.halted)
    }

    /// Advances the machine by one clock cycle.
    pub fn tick(&mut self, sink: &mut dyn TraceSink) -> Result<(), SimError> {
        self.bus.reset_wires();

        let requests = self.gather_requests();
        self.bus.arbitrate(&requests);

        // A flush in progress keeps the bus busy, so arbitration cannot have
        // produced a fresh core grant while one is active; this guard covers
        // the grant that persists across the flush it triggered.
        let flush_active = self.cores.iter().any(|c| c.cache.is_flushing());
        if let Some(grant) = self.bus.grant {
            if grant < MEMORY_ID && !flush_active {
                self.cores[grant].cache.begin_grant(&mut self.bus);
                // The command placement is single-cycle; the responder that
                // picks the transaction up re-asserts busy.
                self.bus.busy = false;
            }
        }

        // Snoop/response. Memory drives before the caches snoop when it holds
        // the grant; otherwise caches go first so a mid-flush cache can
        // overwrite the wires before memory observes them.
        if self.bus.grant == Some(MEMORY_ID) {
            self.memory.listen(&mut self.bus);
            for core in &mut self.cores {
                core.cache.react(&mut self.bus);
            }
        } else {
            for core in &mut self.cores {
                core.cache.react(&mut self.bus);
            }
            self.memory.listen(&mut self.bus);
        }

        // The wires now hold their final value for this cycle; every waiting
        // cache observes the same snapshot, first for the shared flag, then
        // for fill data.
        for core in &mut self.cores {
            core.cache.latch_shared(&self.bus);
        }
        for core in &mut self.cores {
            core.cache.observe_fill(&self.bus);
        }

        if self.bus.command_active() {
            sink.bus_line(&trace::format_bus_line(self.cycle, &self.bus))?;
        }
        for core in &self.cores {
            if !core.halted {
                sink.core_line(core.id, &trace::format_core_line(self.cycle, core))?;
            }
        }

        for core in &mut self.cores {
            core.cycle();
        }

        self.cycle += 1;
        Ok(())
    }

    /// Runs to completion: until every core halts or the safety bound fires.
    pub fn run(&mut self, sink: &mut dyn TraceSink) -> Result<RunOutcome, SimError> {
        loop {
            if self.all_halted() {
                return Ok(RunOutcome::Completed);
            }
            if self.cycle >= self.max_cycles {
                return Ok(RunOutcome::CycleLimit);
            }
            self.tick(sink)?;
        }
    }

    /// Builds the request vector: the memory controller requests exclusively
    /// while a read is in flight (the transaction is still its to finish),
    /// otherwise each cache with an unplaced demand or pending eviction asks.
    fn gather_requests(&self) -> [bool; NUM_BUS_AGENTS] {
        let mut requests = [false; NUM_BUS_AGENTS];
        if self.memory.busy_with_read() {
            requests[MEMORY_ID] = true;
            return requests;
        }
        for core in &self.cores {
            requests[core.id] = core.cache.wants_bus();
        }
        requests
    }
}
