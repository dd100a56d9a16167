//! Execute (EX) stage.
//!
//! Pure combinational ALU over the operands Decode latched. LW and SW compute
//! the effective word address (rs + rt); JAL passes PC+1 through for the
//! register write; reserved opcodes and branches produce zero. Shift amounts
//! use the low bits of the right operand.

use crate::core::Core;
use crate::core::pipeline::latches::ExMem;
use crate::isa::Opcode;

/// Executes the ALU stage for one cycle.
pub(crate) fn execute_stage(core: &mut Core) {
    if core.stall {
        return;
    }
    let input = core.id_ex;
    core.ex_mem.valid = false;
    if !input.valid {
        return;
    }

    let alu = match input.op {
        Opcode::Add => input.a.wrapping_add(input.b),
        Opcode::Sub => input.a.wrapping_sub(input.b),
        Opcode::And => input.a & input.b,
        Opcode::Or => input.a | input.b,
        Opcode::Xor => input.a ^ input.b,
        Opcode::Mul => input.a.wrapping_mul(input.b),
        Opcode::Sll => input.a.wrapping_shl(input.b),
        Opcode::Sra => ((input.a as i32).wrapping_shr(input.b)) as u32,
        Opcode::Srl => input.a.wrapping_shr(input.b),
        Opcode::Lw | Opcode::Sw => input.a.wrapping_add(input.b),
        Opcode::Jal => input.pc.wrapping_add(1),
        _ => 0,
    };

    core.ex_mem = ExMem {
        valid: true,
        pc: input.pc,
        op: input.op,
        dest: input.dest,
        alu,
        store_val: input.store_val,
    };
}
