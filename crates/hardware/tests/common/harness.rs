//! Machine harness for end-to-end tests.
//!
//! Builds a full four-core machine from in-memory programs, captures traces
//! in memory, and exposes the state most assertions need. Cores without a
//! program of their own get a bare HALT so the machine terminates.

use quadsim_core::common::WordAddr;
use quadsim_core::sim::{MemorySink, RunOutcome};
use quadsim_core::stats::CoreStats;
use quadsim_core::{Config, Simulator};

use crate::common::builder::halt;

/// A machine plus the traces it produced.
pub struct TestMachine {
    /// The machine under test.
    pub sim: Simulator,
    /// In-memory trace capture.
    pub sink: MemorySink,
}

impl TestMachine {
    /// Builds a machine running the given four programs.
    pub fn with_programs(programs: [&[u32]; 4]) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let imems = programs.map(<[u32]>::to_vec);
        Self {
            sim: Simulator::new(imems, &Config::default()),
            sink: MemorySink::default(),
        }
    }

    /// Builds a machine where only core 0 runs a program; the other cores
    /// halt immediately.
    pub fn single_core(program: &[u32]) -> Self {
        let idle = [halt()];
        Self::with_programs([program, &idle, &idle, &idle])
    }

    /// Preloads main memory words, as a memin image would.
    pub fn with_memory(mut self, words: &[(u32, u32)]) -> Self {
        for (addr, value) in words {
            self.sim.memory.write_word(WordAddr::new(*addr), *value);
        }
        self
    }

    /// Runs to completion and asserts the machine halted on its own.
    pub fn run(&mut self) -> RunOutcome {
        self.sim.run(&mut self.sink).expect("in-memory run cannot fail")
    }

    /// Advances exactly `n` cycles.
    pub fn step(&mut self, n: u32) {
        for _ in 0..n {
            self.sim.tick(&mut self.sink).expect("in-memory tick cannot fail");
        }
    }

    /// Reads a register of a core.
    pub fn reg(&self, core: usize, idx: usize) -> u32 {
        self.sim.cores[core].regs.read(idx)
    }

    /// Reads a main-memory word (the DRAM array, not cached copies).
    pub fn mem(&self, addr: u32) -> u32 {
        self.sim.memory.read_word(WordAddr::new(addr))
    }

    /// Returns a core's statistics.
    pub fn stats(&self, core: usize) -> CoreStats {
        self.sim.cores[core].stats
    }

    /// Returns the bus trace lines whose command field matches `cmd`.
    pub fn bus_lines_with_cmd(&self, cmd: u32) -> Vec<&String> {
        self.sink
            .bus
            .iter()
            .filter(|line| field(line, 2) == format!("{cmd:X}"))
            .collect()
    }

    /// Returns the bus trace lines driven by `origin` with command `cmd`.
    pub fn bus_lines_from(&self, origin: usize, cmd: u32) -> Vec<&String> {
        self.sink
            .bus
            .iter()
            .filter(|line| field(line, 1) == format!("{origin:X}") && field(line, 2) == format!("{cmd:X}"))
            .collect()
    }
}

/// Extracts a whitespace-separated field from a trace line.
pub fn field(line: &str, idx: usize) -> String {
    line.split_whitespace()
        .nth(idx)
        .unwrap_or_default()
        .to_string()
}
