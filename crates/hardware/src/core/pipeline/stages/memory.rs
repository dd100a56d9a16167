//! Memory (MEM) stage.
//!
//! Routes LW and SW through the L1 cache. A completed access (hit, or a miss
//! the fill just satisfied) advances MEM/WB; a stalled access asserts the
//! pipeline-wide stall, leaves MEM/WB as a bubble, and freezes every upstream
//! stage for the cycle. Non-memory instructions pass through unchanged.

use crate::common::WordAddr;
use crate::core::Core;
use crate::core::pipeline::latches::MemWb;
use crate::isa::Opcode;

/// Executes the memory stage for one cycle.
pub(crate) fn memory_stage(core: &mut Core) {
    let input = core.ex_mem;
    core.mem_wb.valid = false;
    if !input.valid {
        return;
    }

    let mut mem_val = 0;
    match input.op {
        Opcode::Lw => match core.cache.read(WordAddr::new(input.alu), &mut core.stats) {
            Some(word) => mem_val = word,
            None => {
                core.stall = true;
                core.stats.mem_stalls += 1;
                return;
            }
        },
        Opcode::Sw => {
            if !core
                .cache
                .write(WordAddr::new(input.alu), input.store_val, &mut core.stats)
            {
                core.stall = true;
                core.stats.mem_stalls += 1;
                return;
            }
        }
        _ => {}
    }

    core.mem_wb = MemWb {
        valid: true,
        pc: input.pc,
        op: input.op,
        dest: input.dest,
        alu: input.alu,
        mem_val,
    };
}
