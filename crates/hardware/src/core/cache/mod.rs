//! L1 data cache with MESI coherence.
//!
//! This module implements the per-core direct-mapped, write-back,
//! write-allocate data cache and its bus-side controller. It covers:
//! 1. **Local Access:** Hit/miss detection with a one-cycle tag-check latency
//!    and write-permission checks (writes need Exclusive or Modified).
//! 2. **Coherence:** Snoop reactions to remote BusRd/BusRdX, including
//!    cache-to-cache intervention for Modified lines.
//! 3. **Flush Engine:** The 8-word burst that carries evicted or intervened
//!    blocks over the bus, one word per cycle.
//! 4. **Fill Reception:** Capturing Flush words for a pending miss and
//!    resolving the final MESI state from the latched shared bit.
//!
//! A miss is counted exactly once, at its first observation; the retry that
//! follows a completed fill neither recounts the miss nor counts as a hit.

use tracing::{debug, trace};

use crate::common::WordAddr;
use crate::common::constants::{BLOCK_WORDS, CACHE_SETS};
use crate::soc::bus::{Bus, BusCommand};
use crate::stats::CoreStats;

/// MESI coherence state of one cache line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MesiState {
    /// No valid copy; the data array may hold stale words.
    #[default]
    Invalid,
    /// Clean copy, possibly present in other caches.
    Shared,
    /// Clean copy, guaranteed to be the only cached one.
    Exclusive,
    /// Dirty copy, guaranteed to be the only cached one.
    Modified,
}

impl MesiState {
    /// Returns the 2-bit encoding used in the TSRAM dump.
    pub fn code(self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::Shared => 1,
            Self::Exclusive => 2,
            Self::Modified => 3,
        }
    }
}

/// One TSRAM entry: the stored tag and the line's MESI state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag bits of the cached block.
    pub tag: u32,
    /// Coherence state.
    pub state: MesiState,
}

impl TagEntry {
    /// Returns whether this entry holds a valid copy of the block with `tag`.
    fn holds(&self, tag: u32) -> bool {
        self.state != MesiState::Invalid && self.tag == tag
    }
}

/// The per-core L1 data cache and its controller state.
pub struct DataCache {
    core_id: usize,
    data: [[u32; BLOCK_WORDS]; CACHE_SETS],
    tags: [TagEntry; CACHE_SETS],

    // Pending-miss bookkeeping.
    pending: Option<WordAddr>,
    pending_is_write: bool,
    shared_seen: bool,
    waiting_for_fill: bool,
    tag_check_pending: bool,

    // Flush engine.
    flushing: bool,
    flush_base: WordAddr,
    flush_offset: usize,
    eviction_pending: bool,
}

impl DataCache {
    /// Creates an empty cache for the given core.
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            data: [[0; BLOCK_WORDS]; CACHE_SETS],
            tags: [TagEntry::default(); CACHE_SETS],
            pending: None,
            pending_is_write: false,
            shared_seen: false,
            waiting_for_fill: false,
            tag_check_pending: false,
            flushing: false,
            flush_base: WordAddr::new(0),
            flush_offset: 0,
            eviction_pending: false,
        }
    }

    /// Attempts a load; `None` means the pipeline must stall this cycle.
    ///
    /// On a hit the word is returned immediately. A retry after a completed
    /// fill clears the pending address instead of counting a hit. A miss on a
    /// Modified line with a different tag first schedules an eviction flush;
    /// otherwise the miss pays the one-cycle tag check, is counted, and the
    /// pending address is registered for the bus request.
    pub fn read(&mut self, addr: WordAddr, stats: &mut CoreStats) -> Option<u32> {
        let entry = &self.tags[addr.set()];

        if entry.holds(addr.tag()) {
            if self.pending == Some(addr) {
                self.pending = None;
            } else {
                stats.read_hits += 1;
            }
            self.tag_check_pending = false;
            return Some(self.data[addr.set()][addr.offset()]);
        }

        if self.schedule_eviction_if_dirty(addr) {
            return None;
        }

        if self.pending != Some(addr) {
            if !self.tag_check_pending {
                self.tag_check_pending = true;
                return None;
            }
            stats.read_misses += 1;
            debug!(core = self.core_id, addr = %addr, "read miss");
            self.pending = Some(addr);
            self.pending_is_write = false;
            self.shared_seen = false;
            self.tag_check_pending = false;
        }

        None
    }

    /// Attempts a store; `false` means the pipeline must stall this cycle.
    ///
    /// A write hit requires Exclusive or Modified with a matching tag and
    /// leaves the line Modified. A write to a Shared line is a miss travelling
    /// the same BusRdX path as any other write miss; there is no separate
    /// upgrade transaction.
    pub fn write(&mut self, addr: WordAddr, data: u32, stats: &mut CoreStats) -> bool {
        let entry = &self.tags[addr.set()];
        let writable = matches!(entry.state, MesiState::Exclusive | MesiState::Modified);

        if writable && entry.tag == addr.tag() {
            if self.pending == Some(addr) {
                self.pending = None;
            } else {
                stats.write_hits += 1;
            }
            self.data[addr.set()][addr.offset()] = data;
            self.tags[addr.set()].state = MesiState::Modified;
            self.tag_check_pending = false;
            return true;
        }

        if self.schedule_eviction_if_dirty(addr) {
            return false;
        }

        if !self.pending_is_write {
            if !self.tag_check_pending {
                self.tag_check_pending = true;
                return false;
            }
            if self.pending != Some(addr) {
                stats.write_misses += 1;
                debug!(core = self.core_id, addr = %addr, "write miss");
            }
            self.tag_check_pending = false;
        }

        self.pending_is_write = true;
        if self.pending != Some(addr) {
            self.pending = Some(addr);
            self.shared_seen = false;
        }

        false
    }

    /// Schedules a flush of the resident line when it is Modified under a
    /// conflicting tag. Returns `true` while the eviction is outstanding.
    fn schedule_eviction_if_dirty(&mut self, addr: WordAddr) -> bool {
        let entry = &self.tags[addr.set()];
        if entry.state != MesiState::Modified || entry.tag == addr.tag() {
            return false;
        }
        if !self.eviction_pending && !self.flushing {
            self.eviction_pending = true;
            self.flush_base = WordAddr::from_parts(entry.tag, addr.set());
            self.flush_offset = 0;
            debug!(core = self.core_id, victim = %self.flush_base, "eviction scheduled");
        }
        true
    }

    /// Returns whether the controller wants the bus this cycle: a registered
    /// demand not yet placed on the wires, or a pending eviction.
    pub fn wants_bus(&self) -> bool {
        self.eviction_pending || (self.pending.is_some() && !self.waiting_for_fill)
    }

    /// Returns whether the flush engine currently owns the wires.
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Consumes a bus grant.
    ///
    /// An eviction grant arms the flush engine (the first word goes out in
    /// this cycle's snoop phase). A demand grant places BusRd or BusRdX on the
    /// wires and moves the cache into the waiting-for-fill state, after which
    /// it stops requesting the bus.
    pub fn begin_grant(&mut self, bus: &mut Bus) {
        if self.eviction_pending {
            self.eviction_pending = false;
            self.flushing = true;
            self.flush_offset = 0;
            return;
        }

        if let Some(addr) = self.pending {
            bus.origin = self.core_id;
            bus.addr = addr;
            bus.cmd = if self.pending_is_write {
                BusCommand::BusRdX
            } else {
                BusCommand::BusRd
            };
            self.waiting_for_fill = true;
            trace!(core = self.core_id, addr = %addr, cmd = ?bus.cmd, "demand on bus");
        }
    }

    /// Snoop-phase reaction: drives the flush engine or answers remote demands.
    ///
    /// While flushing, one word is driven per cycle and the bus is held busy;
    /// the final word releases it, and a locally-evicted line becomes Invalid
    /// (a snoop-triggered flush already moved the line to its post-snoop
    /// state). Otherwise remote BusRd/BusRdX commands drive the MESI
    /// transitions, asserting the shared line for every valid non-Modified
    /// copy and starting an intervention flush for Modified ones.
    pub fn react(&mut self, bus: &mut Bus) {
        if self.flushing {
            let set = self.flush_base.set();
            bus.busy = true;
            bus.origin = self.core_id;
            bus.cmd = BusCommand::Flush;
            bus.addr = self.flush_base.with_offset(self.flush_offset);
            bus.data = self.data[set][self.flush_offset];
            bus.shared = true;

            self.flush_offset += 1;
            if self.flush_offset >= BLOCK_WORDS {
                self.flushing = false;
                bus.busy = false;
                if self.tags[set].state == MesiState::Modified {
                    self.tags[set].state = MesiState::Invalid;
                }
                debug!(core = self.core_id, base = %self.flush_base, "flush complete");
            }
            return;
        }

        if !matches!(bus.cmd, BusCommand::BusRd | BusCommand::BusRdX) || bus.origin == self.core_id
        {
            return;
        }

        let set = bus.addr.set();
        let entry = self.tags[set];
        if !entry.holds(bus.addr.tag()) {
            return;
        }

        let reading = bus.cmd == BusCommand::BusRd;
        if reading && entry.state != MesiState::Modified {
            bus.shared = true;
        }

        match entry.state {
            MesiState::Modified => {
                // Intervention: this cache supplies the block. The line takes
                // its post-snoop state now; the flush words follow from the
                // next cycle on.
                self.flushing = true;
                bus.busy = true;
                self.flush_base = bus.addr.block_base();
                self.flush_offset = 0;
                self.tags[set].state = if reading {
                    MesiState::Shared
                } else {
                    MesiState::Invalid
                };
                debug!(core = self.core_id, base = %self.flush_base, "intervention flush");
            }
            MesiState::Exclusive => {
                self.tags[set].state = if reading {
                    MesiState::Shared
                } else {
                    MesiState::Invalid
                };
            }
            MesiState::Shared => {
                if !reading {
                    self.tags[set].state = MesiState::Invalid;
                }
            }
            MesiState::Invalid => {}
        }
    }

    /// Latches the shared wire for a pending fill on the block currently on
    /// the wires. Runs after all snoopers have had the chance to assert it.
    pub fn latch_shared(&mut self, bus: &Bus) {
        if !bus.shared || !bus.command_active() || !self.waiting_for_fill {
            return;
        }
        if let Some(pending) = self.pending {
            if bus.addr.block_base() == pending.block_base() {
                self.shared_seen = true;
            }
        }
    }

    /// Captures a Flush word belonging to the pending fill.
    ///
    /// Runs once per cycle after the wires hold their final value, so every
    /// waiting cache observes the word regardless of core index. The eighth
    /// word installs the tag and resolves the line's state: Modified for a
    /// write demand, otherwise Shared or Exclusive from the latched bit.
    pub fn observe_fill(&mut self, bus: &Bus) {
        if bus.cmd != BusCommand::Flush || !self.waiting_for_fill {
            return;
        }
        let Some(pending) = self.pending else { return };
        if bus.addr.block_base() != pending.block_base() {
            return;
        }

        let set = bus.addr.set();
        let offset = bus.addr.offset();
        self.data[set][offset] = bus.data;

        if offset == BLOCK_WORDS - 1 {
            let state = if self.pending_is_write {
                MesiState::Modified
            } else if self.shared_seen {
                MesiState::Shared
            } else {
                MesiState::Exclusive
            };
            self.tags[set] = TagEntry {
                tag: bus.addr.tag(),
                state,
            };
            self.waiting_for_fill = false;
            self.pending_is_write = false;
            debug!(core = self.core_id, base = %bus.addr.block_base(), ?state, "fill complete");
        }
    }

    /// Returns the TSRAM entry of a set.
    pub fn tag_entry(&self, set: usize) -> TagEntry {
        self.tags[set]
    }

    /// Returns the data words of a set.
    pub fn block_words(&self, set: usize) -> &[u32; BLOCK_WORDS] {
        &self.data[set]
    }

    /// Installs a line directly, bypassing the bus. Test and tooling hook.
    pub fn install_line(&mut self, set: usize, tag: u32, state: MesiState, words: [u32; BLOCK_WORDS]) {
        self.tags[set] = TagEntry { tag, state };
        self.data[set] = words;
    }
}
