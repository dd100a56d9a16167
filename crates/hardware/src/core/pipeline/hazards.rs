//! RAW hazard detection.
//!
//! This module implements the interlock that keeps the in-order pipeline
//! consistent without forwarding paths. It provides:
//! 1. **Decode Check:** Whether an instruction's source reads clash with any
//!    in-flight destination (ID/EX, EX/MEM, MEM/WB, or the one-cycle
//!    writeback broadcast).
//! 2. **Fetch Re-derivation:** The same condition recomputed after the latches
//!    have shifted, so Fetch never overwrites an IF/ID entry Decode could not
//!    consume.
//!
//! Hazard-relevant source reads: rs always; rt unless the opcode is JAL; rd
//! additionally for SW and the conditional branches (their rd is a data
//! source, not a destination). Destinations below R2 never clash.

use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::isa::{Instruction, Opcode};

/// Returns whether `inst`'s rd field is read as a data source.
fn reads_rd(op: Opcode) -> bool {
    op == Opcode::Sw || op.is_conditional_branch()
}

/// Decode-time RAW check against every downstream destination.
///
/// Called before Decode consumes IF/ID, so ID/EX still holds the stale copy
/// of the instruction Execute consumed this cycle; it duplicates the new
/// EX/MEM content and cannot change the verdict.
pub fn decode_hazard(
    inst: &Instruction,
    id_ex: &IdEx,
    ex_mem: &ExMem,
    mem_wb: &MemWb,
    wb_broadcast: usize,
) -> bool {
    let clash = |reg: usize| {
        reg >= 2
            && ((id_ex.valid && id_ex.dest == reg)
                || (ex_mem.valid && ex_mem.dest == reg)
                || (mem_wb.valid && mem_wb.dest == reg)
                || wb_broadcast == reg)
    };

    let mut blocked = clash(inst.rs);
    if inst.opcode != Opcode::Jal {
        blocked |= clash(inst.rt);
    }
    if reads_rd(inst.opcode) {
        blocked |= clash(inst.rd);
    }
    blocked
}

/// Fetch-side re-derivation of the Decode hazard.
///
/// Runs after Decode and Execute have updated their latches. When Decode
/// consumed IF/ID this cycle, the same instruction now sits in ID/EX under
/// the same PC; that entry is excluded so an instruction never blocks on
/// itself. Returns `true` when IF/ID must be held and the PC frozen.
pub fn fetch_blocked(
    if_id: &IfId,
    id_ex: &IdEx,
    ex_mem: &ExMem,
    mem_wb: &MemWb,
    wb_broadcast: usize,
) -> bool {
    if !if_id.valid {
        return false;
    }
    let inst = Instruction::decode(if_id.inst);
    let id_ex_live = id_ex.valid && id_ex.pc != if_id.pc;

    let clash = |reg: usize| {
        reg >= 2
            && ((id_ex_live && id_ex.dest == reg)
                || (ex_mem.valid && ex_mem.dest == reg)
                || (mem_wb.valid && mem_wb.dest == reg)
                || wb_broadcast == reg)
    };

    let mut blocked = clash(inst.rs);
    if inst.opcode != Opcode::Jal {
        blocked |= clash(inst.rt);
    }
    if reads_rd(inst.opcode) {
        blocked |= clash(inst.rd);
    }
    blocked
}
