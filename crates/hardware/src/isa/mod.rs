//! Instruction set: encoding, decoding, and opcode classification.

/// Instruction word format and codec.
pub mod instruction;

pub use instruction::{Instruction, Opcode, encode, sign_extend_12};
