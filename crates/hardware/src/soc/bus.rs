//! Shared system bus and round-robin arbiter.
//!
//! This module implements the single-transaction bus connecting the four L1
//! caches and the main-memory controller. It provides:
//! 1. **Wires:** Origin id, command, address, data, and the open-collector shared line.
//! 2. **Arbitration:** A circular scan over the five agents starting after the
//!    last-served core, with memory wins leaving core priorities untouched.
//! 3. **Transaction State:** The busy flag and current grant that survive the
//!    per-cycle wire reset.

use tracing::debug;

use crate::common::WordAddr;
use crate::common::constants::{MEMORY_ID, NUM_BUS_AGENTS};

/// Command driven on the bus command wires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusCommand {
    /// No transaction this cycle.
    #[default]
    None,
    /// Request for a block with intent to read.
    BusRd,
    /// Request for a block with intent to modify.
    BusRdX,
    /// One word of an 8-word block transfer; the only data-carrying command.
    Flush,
}

impl BusCommand {
    /// Returns the wire encoding used in the bus trace.
    pub fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::BusRd => 1,
            Self::BusRdX => 2,
            Self::Flush => 3,
        }
    }
}

/// The shared bus: driven wires plus arbiter state.
///
/// The wires are reset to idle at the start of every cycle; `busy`, the grant,
/// and the round-robin pointer persist across cycles.
#[derive(Debug)]
pub struct Bus {
    /// Id of the agent driving the wires (0..3 cores, 4 memory).
    pub origin: usize,
    /// Command currently on the wires.
    pub cmd: BusCommand,
    /// Word address of the transaction.
    pub addr: WordAddr,
    /// Data word (meaningful for Flush only).
    pub data: u32,
    /// Open-collector shared line; any snooper with a valid copy may assert it.
    pub shared: bool,

    /// A multi-cycle transaction is occupying the wires.
    pub busy: bool,
    /// Agent currently authorized to drive, if any.
    pub grant: Option<usize>,
    /// Most recently served core; the scan starts just after it.
    rr_last: usize,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an idle bus.
    ///
    /// The round-robin pointer starts at the memory id so the first circular
    /// scan begins at core 0.
    pub fn new() -> Self {
        Self {
            origin: 0,
            cmd: BusCommand::None,
            addr: WordAddr::new(0),
            data: 0,
            shared: false,
            busy: false,
            grant: None,
            rr_last: MEMORY_ID,
        }
    }

    /// Resets the driven wires to idle.
    ///
    /// Internal state (busy, grant, round-robin pointer) is preserved; this
    /// models the wires returning to their undriven values between cycles.
    pub fn reset_wires(&mut self) {
        self.origin = 0;
        self.cmd = BusCommand::None;
        self.addr = WordAddr::new(0);
        self.data = 0;
        self.shared = false;
    }

    /// Arbitrates among the five agents for the coming cycle.
    ///
    /// A no-op while a multi-cycle transaction holds the bus. Otherwise the
    /// request vector is scanned circularly starting from the agent after the
    /// last-served one; the first requester wins and the bus becomes busy. The
    /// round-robin pointer shifts only when a core wins, so memory's turns do
    /// not perturb core fairness.
    pub fn arbitrate(&mut self, requests: &[bool; NUM_BUS_AGENTS]) {
        if self.busy {
            return;
        }

        let mut candidate = (self.rr_last + 1) % NUM_BUS_AGENTS;
        for _ in 0..NUM_BUS_AGENTS {
            if requests[candidate] {
                self.grant = Some(candidate);
                self.busy = true;
                if candidate < MEMORY_ID {
                    self.rr_last = candidate;
                }
                debug!(agent = candidate, "bus granted");
                return;
            }
            candidate = (candidate + 1) % NUM_BUS_AGENTS;
        }

        self.grant = None;
    }

    /// Returns whether a command is active on the wires this cycle.
    pub fn command_active(&self) -> bool {
        self.cmd != BusCommand::None
    }
}
