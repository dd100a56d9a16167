//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the four buffers connecting the five pipeline stages.
//! Each carries the PC of the resident instruction and a validity bit; the
//! validity bit is the sole marker of bubbles, and a cleared latch is
//! equivalent to "no instruction". Latches are updated in place by the
//! reverse-order stage invocation, which yields edge-triggered behavior
//! without double-buffering.

use crate::isa::Opcode;

/// IF/ID latch (Fetch to Decode): the raw fetched word.
#[derive(Clone, Copy, Debug, Default)]
pub struct IfId {
    /// Bubble marker.
    pub valid: bool,
    /// PC of the fetched instruction.
    pub pc: u32,
    /// Encoded instruction word.
    pub inst: u32,
}

/// ID/EX latch (Decode to Execute): decoded fields and operand values.
#[derive(Clone, Copy, Debug)]
pub struct IdEx {
    /// Bubble marker.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Operation.
    pub op: Opcode,
    /// Writeback destination (0 when the instruction writes nothing).
    pub dest: usize,
    /// First ALU operand (rs read, immediate-substituted).
    pub a: u32,
    /// Second ALU operand (rt read, immediate-substituted).
    pub b: u32,
    /// Value to be stored by SW (the rd read).
    pub store_val: u32,
}

/// EX/MEM latch (Execute to Memory): ALU result and store data.
#[derive(Clone, Copy, Debug)]
pub struct ExMem {
    /// Bubble marker.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Operation.
    pub op: Opcode,
    /// Writeback destination.
    pub dest: usize,
    /// ALU result; the effective word address for LW/SW.
    pub alu: u32,
    /// Value to be stored by SW.
    pub store_val: u32,
}

/// MEM/WB latch (Memory to Writeback): final values for retirement.
#[derive(Clone, Copy, Debug)]
pub struct MemWb {
    /// Bubble marker.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Operation.
    pub op: Opcode,
    /// Writeback destination.
    pub dest: usize,
    /// ALU result.
    pub alu: u32,
    /// Word loaded by LW.
    pub mem_val: u32,
}

impl Default for IdEx {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            op: Opcode::Add,
            dest: 0,
            a: 0,
            b: 0,
            store_val: 0,
        }
    }
}

impl Default for ExMem {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            op: Opcode::Add,
            dest: 0,
            alu: 0,
            store_val: 0,
        }
    }
}

impl Default for MemWb {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            op: Opcode::Add,
            dest: 0,
            alu: 0,
            mem_val: 0,
        }
    }
}
