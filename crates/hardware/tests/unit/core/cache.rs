//! L1 cache controller tests.
//!
//! Exercise the cache in isolation against hand-driven bus wires: miss
//! registration and accounting, write permissions, the eviction and
//! intervention flush engine, the snoop reaction table, and fill-state
//! resolution from the shared latch.

use pretty_assertions::assert_eq;

use quadsim_core::common::WordAddr;
use quadsim_core::common::constants::MEMORY_ID;
use quadsim_core::core::cache::{DataCache, MesiState};
use quadsim_core::soc::{Bus, BusCommand};
use quadsim_core::stats::CoreStats;

fn addr(raw: u32) -> WordAddr {
    WordAddr::new(raw)
}

/// Drives an 8-word memory-style fill burst at the cache.
fn drive_fill(cache: &mut DataCache, base: u32, words: [u32; 8], shared: bool) {
    let mut bus = Bus::new();
    for (i, word) in words.iter().enumerate() {
        bus.reset_wires();
        bus.origin = MEMORY_ID;
        bus.cmd = BusCommand::Flush;
        bus.addr = addr(base + i as u32);
        bus.data = *word;
        bus.shared = shared;
        cache.latch_shared(&bus);
        cache.observe_fill(&bus);
    }
}

/// Registers a read miss (tag check plus registration) and places it on the bus.
fn register_read_miss(cache: &mut DataCache, bus: &mut Bus, a: u32) {
    let mut stats = CoreStats::default();
    assert!(cache.read(addr(a), &mut stats).is_none());
    assert!(cache.read(addr(a), &mut stats).is_none());
    cache.begin_grant(bus);
}

// ══════════════════════════════════════════════════════════
// 1. Local access accounting
// ══════════════════════════════════════════════════════════

#[test]
fn read_miss_pays_tag_check_then_registers_once() {
    let mut cache = DataCache::new(0);
    let mut stats = CoreStats::default();

    assert!(cache.read(addr(0x40), &mut stats).is_none());
    assert_eq!(stats.read_misses, 0, "tag-check cycle counts nothing");
    assert!(!cache.wants_bus());

    assert!(cache.read(addr(0x40), &mut stats).is_none());
    assert_eq!(stats.read_misses, 1);
    assert!(cache.wants_bus());

    assert!(cache.read(addr(0x40), &mut stats).is_none());
    assert_eq!(stats.read_misses, 1, "retries never recount");
}

#[test]
fn post_fill_retry_is_not_a_hit() {
    let mut cache = DataCache::new(0);
    let mut stats = CoreStats::default();
    let mut bus = Bus::new();

    assert!(cache.read(addr(5), &mut stats).is_none());
    assert!(cache.read(addr(5), &mut stats).is_none());
    cache.begin_grant(&mut bus);
    assert_eq!(bus.cmd, BusCommand::BusRd);
    assert!(!cache.wants_bus(), "waiting for fill stops requesting");

    drive_fill(&mut cache, 0, [10, 11, 12, 13, 14, 15, 16, 17], false);
    assert_eq!(cache.tag_entry(0).state, MesiState::Exclusive);

    assert_eq!(cache.read(addr(5), &mut stats), Some(15));
    assert_eq!(stats.read_hits, 0, "the demand was already counted as a miss");

    assert_eq!(cache.read(addr(5), &mut stats), Some(15));
    assert_eq!(stats.read_hits, 1, "a fresh demand counts normally");
}

#[test]
fn write_needs_exclusive_or_modified() {
    let mut stats = CoreStats::default();

    let mut cache = DataCache::new(0);
    cache.install_line(2, 0, MesiState::Exclusive, [0; 8]);
    assert!(cache.write(addr(0x10), 99, &mut stats));
    assert_eq!(cache.tag_entry(2).state, MesiState::Modified);
    assert_eq!(cache.block_words(2)[0], 99);
    assert_eq!(stats.write_hits, 1);

    // A Shared line cannot be written silently: same BusRdX path as a miss.
    let mut cache = DataCache::new(0);
    cache.install_line(2, 0, MesiState::Shared, [0; 8]);
    assert!(!cache.write(addr(0x10), 99, &mut stats));
    assert!(!cache.write(addr(0x10), 99, &mut stats));
    assert_eq!(stats.write_misses, 1);
    assert!(cache.wants_bus());

    let mut bus = Bus::new();
    cache.begin_grant(&mut bus);
    assert_eq!(bus.cmd, BusCommand::BusRdX);
}

#[test]
fn write_fill_resolves_to_modified() {
    let mut cache = DataCache::new(0);
    let mut stats = CoreStats::default();
    let mut bus = Bus::new();

    assert!(!cache.write(addr(8), 7, &mut stats));
    assert!(!cache.write(addr(8), 7, &mut stats));
    cache.begin_grant(&mut bus);

    // Even a shared-asserted burst fills Modified for a write demand.
    drive_fill(&mut cache, 8, [0; 8], true);
    assert_eq!(cache.tag_entry(1).state, MesiState::Modified);

    assert!(cache.write(addr(8), 7, &mut stats));
    assert_eq!(cache.block_words(1)[0], 7);
    assert_eq!(stats.write_hits, 0, "post-fill retry is not a hit");
}

#[test]
fn fill_state_follows_shared_latch() {
    let mut cache = DataCache::new(0);
    let mut bus = Bus::new();
    register_read_miss(&mut cache, &mut bus, 0);
    drive_fill(&mut cache, 0, [0; 8], true);
    assert_eq!(cache.tag_entry(0).state, MesiState::Shared);

    let mut cache = DataCache::new(0);
    let mut bus = Bus::new();
    register_read_miss(&mut cache, &mut bus, 0);
    drive_fill(&mut cache, 0, [0; 8], false);
    assert_eq!(cache.tag_entry(0).state, MesiState::Exclusive);
}

#[test]
fn fill_ignores_other_blocks() {
    let mut cache = DataCache::new(0);
    let mut bus = Bus::new();
    register_read_miss(&mut cache, &mut bus, 0);

    // A burst for an unrelated block must not satisfy the fill.
    drive_fill(&mut cache, 0x100, [1; 8], false);
    assert_eq!(cache.tag_entry(0).state, MesiState::Invalid);
    assert_eq!(cache.tag_entry(0x20).state, MesiState::Invalid);
}

// ══════════════════════════════════════════════════════════
// 2. Eviction
// ══════════════════════════════════════════════════════════

#[test]
fn conflicting_modified_line_is_flushed_before_the_miss() {
    let mut cache = DataCache::new(0);
    let mut stats = CoreStats::default();

    // Dirty block with tag 1 occupies set 0: word address base 0x200.
    cache.install_line(0, 1, MesiState::Modified, [7, 6, 5, 4, 3, 2, 1, 0]);

    assert!(cache.read(addr(0), &mut stats).is_none());
    assert_eq!(stats.read_misses, 0, "miss registration waits for the eviction");
    assert!(cache.wants_bus());

    let mut bus = Bus::new();
    cache.begin_grant(&mut bus);
    assert!(cache.is_flushing());

    for i in 0..8u32 {
        bus.reset_wires();
        cache.react(&mut bus);
        assert_eq!(bus.cmd, BusCommand::Flush);
        assert_eq!(bus.origin, 0);
        assert_eq!(bus.addr, addr(0x200 + i));
        assert_eq!(bus.data, 7 - i);
        assert_eq!(bus.busy, i != 7, "the last word releases the bus");
    }
    assert!(!cache.is_flushing());
    assert_eq!(
        cache.tag_entry(0).state,
        MesiState::Invalid,
        "a local eviction leaves the line Invalid"
    );

    // Only now does the demand itself register.
    assert!(cache.read(addr(0), &mut stats).is_none());
    assert!(cache.read(addr(0), &mut stats).is_none());
    assert_eq!(stats.read_misses, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Snoop reaction table
// ══════════════════════════════════════════════════════════

fn snoop(cache: &mut DataCache, cmd: BusCommand, a: u32) -> Bus {
    let mut bus = Bus::new();
    bus.origin = 1;
    bus.cmd = cmd;
    bus.addr = addr(a);
    cache.react(&mut bus);
    bus
}

#[test]
fn busrd_demotes_exclusive_and_asserts_shared() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 0, MesiState::Exclusive, [0; 8]);
    let bus = snoop(&mut cache, BusCommand::BusRd, 3);
    assert!(bus.shared);
    assert_eq!(cache.tag_entry(0).state, MesiState::Shared);
}

#[test]
fn busrd_on_shared_only_asserts_the_wire() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 0, MesiState::Shared, [0; 8]);
    let bus = snoop(&mut cache, BusCommand::BusRd, 3);
    assert!(bus.shared);
    assert_eq!(cache.tag_entry(0).state, MesiState::Shared);
}

#[test]
fn busrdx_invalidates_clean_copies() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 0, MesiState::Exclusive, [0; 8]);
    let bus = snoop(&mut cache, BusCommand::BusRdX, 3);
    assert!(!bus.shared);
    assert_eq!(cache.tag_entry(0).state, MesiState::Invalid);

    cache.install_line(0, 0, MesiState::Shared, [0; 8]);
    let _ = snoop(&mut cache, BusCommand::BusRdX, 3);
    assert_eq!(cache.tag_entry(0).state, MesiState::Invalid);
}

#[test]
fn modified_line_intervenes_with_a_flush() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 0, MesiState::Modified, [0xAA; 8]);

    let bus = snoop(&mut cache, BusCommand::BusRd, 3);
    assert!(
        !bus.shared,
        "the command cycle itself carries no shared assert from the owner"
    );
    assert!(bus.busy, "the intervening cache takes over the transaction");
    assert!(cache.is_flushing());
    assert_eq!(
        cache.tag_entry(0).state,
        MesiState::Shared,
        "BusRd snoop moves Modified to Shared before the flush runs"
    );

    // The flush words assert shared so the requester resolves to Shared.
    let mut bus = Bus::new();
    for _ in 0..8 {
        bus.reset_wires();
        cache.react(&mut bus);
        assert_eq!(bus.cmd, BusCommand::Flush);
        assert!(bus.shared);
        assert_eq!(bus.data, 0xAA);
    }
    assert_eq!(cache.tag_entry(0).state, MesiState::Shared);
}

#[test]
fn busrdx_snoop_on_modified_flushes_and_invalidates() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 0, MesiState::Modified, [0xBB; 8]);
    let bus = snoop(&mut cache, BusCommand::BusRdX, 3);
    assert!(bus.busy);
    assert!(cache.is_flushing());
    assert_eq!(cache.tag_entry(0).state, MesiState::Invalid);
}

#[test]
fn tag_mismatch_and_own_commands_are_ignored() {
    let mut cache = DataCache::new(0);
    cache.install_line(0, 1, MesiState::Modified, [0; 8]);

    // Same set, different tag: not our block.
    let bus = snoop(&mut cache, BusCommand::BusRd, 3);
    assert!(!bus.shared);
    assert_eq!(cache.tag_entry(0).state, MesiState::Modified);

    // Own command (origin == core id) must not self-snoop.
    let mut bus = Bus::new();
    bus.origin = 0;
    bus.cmd = BusCommand::BusRd;
    bus.addr = addr(0x200);
    cache.react(&mut bus);
    assert_eq!(cache.tag_entry(0).state, MesiState::Modified);
}
