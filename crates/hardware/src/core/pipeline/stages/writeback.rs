//! Writeback (WB) stage.
//!
//! Retires the instruction in MEM/WB. HALT halts the core; LW writes the
//! loaded word, JAL its link value, and every other writing opcode the ALU
//! result. Writes below R2 are suppressed by the register file. The
//! destination of a performed write is additionally broadcast for one cycle
//! on the hazard wire, covering the window between the latch being consumed
//! and the new register value becoming readable.

use tracing::debug;

use crate::core::Core;
use crate::isa::Opcode;

/// Executes the writeback stage for one cycle.
///
/// Returns `true` when a HALT retired and the core stopped; the remaining
/// stages are skipped in that case.
pub(crate) fn writeback_stage(core: &mut Core) -> bool {
    core.wb_broadcast = 0;
    if !core.mem_wb.valid {
        return false;
    }
    let latch = core.mem_wb;

    if latch.op == Opcode::Halt {
        core.halted = true;
        debug!(core = core.id, cycles = core.stats.cycles, "core halted");
        return true;
    }

    if latch.dest >= 2 {
        let value = if latch.op == Opcode::Lw {
            latch.mem_val
        } else {
            latch.alu
        };
        core.regs.write(latch.dest, value);
        core.wb_broadcast = latch.dest;
    }

    false
}
