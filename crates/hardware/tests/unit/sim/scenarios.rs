//! End-to-end machine scenarios.
//!
//! Small hand-executable programs pinning down the cycle-level contract:
//! arithmetic retirement timing, the full miss/fill path against memory,
//! coherence demotion on sharing, cache-to-cache intervention, and
//! bus-quiet steady state for disjoint working sets.

use pretty_assertions::assert_eq;

use quadsim_core::core::cache::MesiState;

use crate::common::builder::{add, blt, halt, lw, sw};
use crate::common::harness::{TestMachine, field};

#[test]
fn immediate_add_retires_with_known_timing() {
    let mut m = TestMachine::single_core(&[add(2, 0, 1, 5), halt()]);
    m.run();

    assert_eq!(m.reg(0, 2), 5);
    for reg in 3..16 {
        assert_eq!(m.reg(0, reg), 0);
    }
    assert_eq!(m.stats(0).cycles, 6);
    assert_eq!(m.stats(0).instructions, 2);
}

#[test]
fn add_of_two_immediates_doubles() {
    // ADD R2, R1, R1 with imm=5: both operands deliver the immediate.
    let mut m = TestMachine::single_core(&[add(2, 1, 1, 5), halt()]);
    m.run();

    assert_eq!(m.reg(0, 2), 0xA);
    assert_eq!(m.stats(0).cycles, 6);
    assert_eq!(m.stats(0).instructions, 2);
}

#[test]
fn load_miss_fills_from_memory() {
    let mut m = TestMachine::single_core(&[lw(2, 0, 1, 0), halt()])
        .with_memory(&[(0, 0xDEAD_BEEF)]);
    m.run();

    assert_eq!(m.reg(0, 2), 0xDEAD_BEEF);
    let stats = m.stats(0);
    assert_eq!(stats.read_misses, 1);
    assert_eq!(stats.read_hits, 0);

    // Exactly one BusRd at address 0, answered by an 8-word burst from
    // memory (origin 4).
    let reads = m.bus_lines_with_cmd(1);
    assert_eq!(reads.len(), 1);
    assert_eq!(field(reads[0], 3), "000000");
    assert_eq!(m.bus_lines_from(4, 3).len(), 8);

    // The line lands Exclusive: no other cache held it.
    assert_eq!(m.sim.cores[0].cache.tag_entry(0).state, MesiState::Exclusive);
}

#[test]
fn store_miss_allocates_modified() {
    let mut m = TestMachine::single_core(&[sw(3, 0, 1, 0), halt()]);
    m.sim.cores[0].regs.write(3, 0x1234_5678);
    m.run();

    // The write allocated through BusRdX and the line holds the new word.
    let reads_x = m.bus_lines_with_cmd(2);
    assert_eq!(reads_x.len(), 1);
    let cache = &m.sim.cores[0].cache;
    assert_eq!(cache.tag_entry(0).state, MesiState::Modified);
    assert_eq!(cache.block_words(0)[0], 0x1234_5678);
    assert_eq!(m.stats(0).write_misses, 1);
    assert_eq!(m.stats(0).write_hits, 0);
}

#[test]
fn second_reader_demotes_the_first_to_shared() {
    // Core 0 fills address 0 Exclusive; core 1's later BusRd demotes both
    // copies to Shared with matching tags.
    let mut m = TestMachine::with_programs([
        &[lw(2, 0, 1, 0), halt()],
        &[lw(2, 0, 1, 0), halt()],
        &[halt()],
        &[halt()],
    ])
    .with_memory(&[(0, 77)]);
    m.run();

    assert_eq!(m.reg(0, 2), 77);
    assert_eq!(m.reg(1, 2), 77);
    let entry0 = m.sim.cores[0].cache.tag_entry(0);
    let entry1 = m.sim.cores[1].cache.tag_entry(0);
    assert_eq!(entry0.state, MesiState::Shared);
    assert_eq!(entry1.state, MesiState::Shared);
    assert_eq!(entry0.tag, entry1.tag);
}

#[test]
fn modified_owner_intervenes_for_a_reader() {
    // Core 0 dirties address 0; core 1 reads it later. The block must travel
    // cache-to-cache: one Flush burst from core 0, and no memory response
    // beyond the burst that served core 0's own write allocation.
    let mut m = TestMachine::with_programs([
        &[sw(3, 0, 1, 0), halt()],
        &[
            // Delay so the write completes first.
            add(0, 0, 0, 0),
            add(0, 0, 0, 0),
            add(0, 0, 0, 0),
            lw(2, 0, 1, 0),
            halt(),
        ],
        &[halt()],
        &[halt()],
    ]);
    m.sim.cores[0].regs.write(3, 0xFEED_FACE);
    m.run();

    assert_eq!(m.reg(1, 2), 0xFEED_FACE);
    assert_eq!(m.bus_lines_from(0, 3).len(), 8, "one intervention burst from core 0");
    assert_eq!(
        m.bus_lines_from(4, 3).len(),
        8,
        "memory only answered the original write allocation"
    );
    assert_eq!(m.sim.cores[0].cache.tag_entry(0).state, MesiState::Shared);
    assert_eq!(m.sim.cores[1].cache.tag_entry(0).state, MesiState::Shared);
    // The write-through of the intervention flush landed in memory.
    assert_eq!(m.mem(0), 0xFEED_FACE);
}

#[test]
fn write_then_read_across_cores_observes_the_value() {
    // Round-trip law with a data-dependency barrier: core 1 spins until the
    // flag at address 8 flips, then reads the payload at address 9.
    let mut m = TestMachine::with_programs([
        &[
            add(2, 0, 1, 42), // payload value
            sw(2, 0, 1, 9),   // mem[9] = 42
            add(3, 0, 1, 1),  // flag value
            sw(3, 0, 1, 8),   // mem[8] = 1
            halt(),
        ],
        &[
            // spin: while mem[8] < 1 goto spin
            lw(2, 0, 1, 8),
            blt(1, 2, 3, 0),
            lw(4, 0, 1, 9),
            halt(),
        ],
        &[halt()],
        &[halt()],
    ]);
    m.sim.cores[1].regs.write(3, 1);
    m.run();

    assert_eq!(m.reg(1, 4), 42);
}

#[test]
fn disjoint_counters_stay_private_after_the_initial_fill() {
    // Four cores each bump a counter 100 times at addresses 0, 64, 128, 192:
    // different sets, so after each core's one fill the bus stays quiet.
    fn counter_program(base: i32) -> Vec<u32> {
        vec![
            add(2, 0, 1, base), // r2 = counter address
            add(4, 0, 1, 100),  // r4 = iterations
            add(5, 0, 0, 0),    // r5 = 0
            lw(3, 2, 0, 0),     // loop: r3 = mem[r2]
            add(3, 3, 1, 1),    //   r3 += 1
            sw(3, 2, 0, 0),     //   mem[r2] = r3
            add(5, 5, 1, 1),    //   r5 += 1
            blt(1, 5, 4, 3),    //   while r5 < r4
            halt(),
        ]
    }
    let programs: [Vec<u32>; 4] = std::array::from_fn(|i| counter_program(i as i32 * 64));
    let mut m = TestMachine::with_programs([
        &programs[0],
        &programs[1],
        &programs[2],
        &programs[3],
    ]);
    m.run();

    for core in 0..4 {
        let set = (core * 64) >> 3;
        let cache = &m.sim.cores[core].cache;
        assert_eq!(cache.tag_entry(set).state, MesiState::Modified);
        assert_eq!(cache.block_words(set)[0], 100);

        let stats = m.stats(core);
        assert_eq!(stats.instructions, m.stats(0).instructions);
        assert_eq!(stats.read_misses, 1);
        assert_eq!(stats.write_misses, 0);
        assert_eq!(stats.read_hits, 99);
        assert_eq!(stats.write_hits, 100);

        // No cache-to-cache transfers at all.
        assert_eq!(m.bus_lines_from(core, 3).len(), 0);
    }
    // Memory answered exactly the four initial fills.
    assert_eq!(m.bus_lines_from(4, 3).len(), 32);
}
