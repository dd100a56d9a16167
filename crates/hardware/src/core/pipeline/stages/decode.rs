//! Instruction Decode (ID) stage.
//!
//! Extracts fields, detects RAW hazards, reads operands (substituting the
//! sign-extended immediate for R1 reads), and resolves branches. Branches
//! compare the rs/rt reads (signed for the inequality forms) and, when taken,
//! latch a pending target for Fetch: the value read from rd, masked to the
//! 10-bit PC range. JAL is always taken. A decoded HALT freezes Fetch for the
//! remainder of execution so nothing enters the pipe behind it.

use crate::common::constants::{IMM_REG, PC_MASK};
use crate::core::Core;
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::IdEx;
use crate::isa::{Instruction, Opcode};

/// Executes the decode stage for one cycle.
pub(crate) fn decode_stage(core: &mut Core) {
    if core.stall {
        return;
    }
    if core.halt_seen || !core.if_id.valid {
        core.id_ex.valid = false;
        return;
    }

    let inst = Instruction::decode(core.if_id.inst);

    if hazards::decode_hazard(
        &inst,
        &core.id_ex,
        &core.ex_mem,
        &core.mem_wb,
        core.wb_broadcast,
    ) {
        core.id_ex.valid = false;
        core.stats.decode_stalls += 1;
        return;
    }

    if inst.opcode == Opcode::Halt {
        core.halt_seen = true;
    }

    let read = |idx: usize| {
        if idx == IMM_REG {
            inst.imm
        } else {
            core.regs.read(idx)
        }
    };
    let a = read(inst.rs);
    let b = read(inst.rt);
    let rd_val = read(inst.rd);

    let taken = match inst.opcode {
        Opcode::Beq => a == b,
        Opcode::Bne => a != b,
        Opcode::Blt => (a as i32) < (b as i32),
        Opcode::Bgt => (a as i32) > (b as i32),
        Opcode::Ble => (a as i32) <= (b as i32),
        Opcode::Bge => (a as i32) >= (b as i32),
        Opcode::Jal => true,
        _ => false,
    };
    if taken {
        // The target is the rd read (immediate when rd is R1).
        core.branch_pending = true;
        core.branch_target = rd_val & PC_MASK;
    }

    core.id_ex = IdEx {
        valid: true,
        pc: core.if_id.pc,
        op: inst.opcode,
        dest: inst.dest(),
        a,
        b,
        store_val: rd_val,
    };
}
