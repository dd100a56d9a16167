//! Main-memory controller.
//!
//! This module implements the latency-modelled DRAM behind the bus. It
//! provides:
//! 1. **Storage:** The full 2^21-word array, loadable from a memin image.
//! 2. **Write Snoop:** Every core-originated Flush word is written through
//!    unconditionally, keeping memory coherent with written-back blocks.
//! 3. **Read Path:** A fixed first-word latency followed by an 8-word Flush
//!    burst, with the request's shared bit echoed on every word.
//!
//! All timing state lives in the controller struct; a read in flight is
//! abandoned when a cache-to-cache transfer for the same block appears on the
//! wires, since that transfer already satisfies the requester.

use tracing::{debug, trace};

use crate::common::WordAddr;
use crate::common::constants::{BLOCK_WORDS, MEM_WORDS, MEMORY_ID};
use crate::config::Config;
use crate::soc::bus::{Bus, BusCommand};

/// The shared main memory and its read controller.
pub struct MainMemory {
    data: Vec<u32>,
    read_latency: u32,

    processing_read: bool,
    target: WordAddr,
    latency_left: u32,
    serving_shared: bool,
    word_offset: usize,
}

impl MainMemory {
    /// Creates a zeroed memory with the configured read latency.
    pub fn new(config: &Config) -> Self {
        Self {
            data: vec![0; MEM_WORDS],
            read_latency: config.memory.read_latency,
            processing_read: false,
            target: WordAddr::new(0),
            latency_left: 0,
            serving_shared: false,
            word_offset: 0,
        }
    }

    /// Returns whether a block read is in flight (latency countdown or burst).
    ///
    /// While this holds, the controller requests the bus every cycle and the
    /// driver suppresses core requests.
    pub fn busy_with_read(&self) -> bool {
        self.processing_read
    }

    /// Reads one word; used by the loader, dumps, and tests.
    pub fn read_word(&self, addr: WordAddr) -> u32 {
        self.data[addr.index()]
    }

    /// Writes one word; used by the loader and tests.
    pub fn write_word(&mut self, addr: WordAddr, value: u32) {
        self.data[addr.index()] = value;
    }

    /// Returns the backing word array.
    pub fn words(&self) -> &[u32] {
        &self.data
    }

    /// Observes the bus for one cycle and drives the read burst when due.
    ///
    /// Invoked during the snoop/response phase: before the caches when memory
    /// holds the grant (so a burst word is visible to all snoopers this
    /// cycle), after them otherwise (so a cache mid-flush can overwrite the
    /// wires first).
    pub fn listen(&mut self, bus: &mut Bus) {
        // Write-through on Flush: capture every word a core drives back.
        if bus.cmd == BusCommand::Flush && bus.origin < MEMORY_ID {
            self.data[bus.addr.index()] = bus.data;

            // A cache is transferring the very block we were fetching; its
            // copy is newer and the requester is being filled by it, so the
            // pending read is abandoned.
            if self.processing_read && bus.addr.block_base() == self.target.block_base() {
                debug!(addr = %self.target, "memory read aborted by intervening flush");
                self.processing_read = false;
                self.latency_left = 0;
            }
        }

        // A new demand latches the target and starts the access countdown.
        if matches!(bus.cmd, BusCommand::BusRd | BusCommand::BusRdX) && !self.processing_read {
            self.processing_read = true;
            self.target = bus.addr;
            self.latency_left = self.read_latency;
            self.word_offset = 0;
            self.serving_shared = bus.shared;
            debug!(addr = %self.target, shared = self.serving_shared, "memory read started");
        }

        if self.processing_read {
            if self.latency_left > 0 {
                self.latency_left -= 1;
            } else if bus.grant == Some(MEMORY_ID) {
                let addr = self.target.with_offset(self.word_offset);
                bus.origin = MEMORY_ID;
                bus.cmd = BusCommand::Flush;
                bus.addr = addr;
                bus.data = self.data[addr.index()];
                // Echo the shared bit latched at request time so the
                // requester resolves to Shared rather than Exclusive.
                if self.serving_shared {
                    bus.shared = true;
                }
                trace!(addr = %addr, word = self.word_offset, "memory burst word");

                self.word_offset += 1;
                if self.word_offset >= BLOCK_WORDS {
                    self.processing_read = false;
                    bus.busy = false;
                }
            }
        }
    }
}
