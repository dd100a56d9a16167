//! Instruction Fetch (IF) stage.
//!
//! Fetches the word at the current PC into IF/ID and advances the PC. Fetch
//! freezes while the Memory stage stalls the pipeline, while a Decode hazard
//! leaves IF/ID unconsumed (re-derived here from the current latch), and
//! permanently once HALT has been observed in Decode. A branch taken in
//! Decode this cycle squashes the sequential fetch: IF/ID receives a bubble
//! and the PC becomes the masked target, so the target instruction is fetched
//! next cycle and no delay slot exists.

use crate::common::constants::IMEM_WORDS;
use crate::core::Core;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::IfId;

/// Executes the fetch stage for one cycle.
pub(crate) fn fetch_stage(core: &mut Core) {
    if core.stall {
        return;
    }
    if core.halt_seen {
        core.if_id = IfId::default();
        return;
    }
    if hazards::fetch_blocked(
        &core.if_id,
        &core.id_ex,
        &core.ex_mem,
        &core.mem_wb,
        core.wb_broadcast,
    ) {
        return;
    }

    if core.branch_pending {
        core.branch_pending = false;
        core.pc = core.branch_target;
        core.if_id = IfId::default();
        return;
    }

    if (core.pc as usize) < IMEM_WORDS {
        core.if_id = IfId {
            valid: true,
            pc: core.pc,
            inst: core.imem[core.pc as usize],
        };
        core.pc += 1;
    } else {
        // Past the end of instruction memory: an all-zero word, i.e. a bubble.
        core.if_id = IfId::default();
    }
}
