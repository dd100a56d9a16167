//! Two-pass assembler for the quadsim instruction set.
//!
//! Translates symbolic assembly into the simulator's instruction-memory
//! format: one 8-digit uppercase hex word per line, in program order. It
//! performs:
//! 1. **Pass 1:** Symbol collection: every `name:` label is bound to the PC
//!    of the next emitted word.
//! 2. **Pass 2:** Encoding through the simulator's own instruction codec, so
//!    assembled words decode back to identical fields.
//!
//! Syntax, per line: an optional `label:`, then `op rd, rs, rt, imm` with
//! missing operands defaulting to zero (`halt` is legal bare). `#` starts a
//! comment. Registers are `$zero`, `$imm`, or `$rN`/`rN`. Immediates are
//! decimal, `0x` hex, or a label name. `.word <value>` emits the 32-bit
//! value verbatim at the current PC; data memory images are a separate
//! channel and not this tool's concern.

use std::collections::HashMap;

use thiserror::Error;

use quadsim_core::isa::{Opcode, encode};

/// Assembly failures, reported with 1-based source line numbers.
#[derive(Debug, Error)]
pub enum AsmError {
    /// A mnemonic that names no operation.
    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic {
        /// Source line.
        line: usize,
        /// Offending token.
        mnemonic: String,
    },

    /// An immediate referenced a label that was never defined.
    #[error("line {line}: undefined label '{label}'")]
    UndefinedLabel {
        /// Source line.
        line: usize,
        /// Offending label.
        label: String,
    },

    /// A `.word` directive without a value.
    #[error("line {line}: .word requires a value")]
    MissingWordValue {
        /// Source line.
        line: usize,
    },
}

fn opcode_for(mnemonic: &str) -> Option<Opcode> {
    Some(match mnemonic {
        "add" => Opcode::Add,
        "sub" => Opcode::Sub,
        "and" => Opcode::And,
        "or" => Opcode::Or,
        "xor" => Opcode::Xor,
        "mul" => Opcode::Mul,
        "sll" => Opcode::Sll,
        "sra" => Opcode::Sra,
        "srl" => Opcode::Srl,
        "beq" => Opcode::Beq,
        "bne" => Opcode::Bne,
        "blt" => Opcode::Blt,
        "bgt" => Opcode::Bgt,
        "ble" => Opcode::Ble,
        "bge" => Opcode::Bge,
        "jal" => Opcode::Jal,
        "lw" => Opcode::Lw,
        "sw" => Opcode::Sw,
        "halt" => Opcode::Halt,
        _ => return None,
    })
}

/// Parses a register operand. Unrecognized text defaults to R0, matching the
/// permissive reference assembler.
fn parse_register(token: Option<&str>) -> usize {
    let Some(token) = token else { return 0 };
    let t = token.trim().trim_start_matches('$');
    if t.eq_ignore_ascii_case("zero") {
        return 0;
    }
    if t.eq_ignore_ascii_case("imm") {
        return 1;
    }
    let digits = t.trim_start_matches(['r', 'R']);
    digits.parse().unwrap_or(0) & 0xF
}

/// Parses a numeric literal: decimal or `0x` hex, optionally negative.
fn parse_number(token: &str) -> Option<i64> {
    let (negative, t) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let value = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        t.parse().ok()?
    };
    Some(if negative { -value } else { value })
}

/// Splits a line into tokens, dropping the `#` comment tail.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    let code = line.split('#').next().unwrap_or("");
    code.split([' ', '\t', '\r', ',']).filter(|t| !t.is_empty())
}

/// Assembles a source text into instruction-memory words.
pub fn assemble(source: &str) -> Result<Vec<u32>, AsmError> {
    // Pass 1: bind each label to the PC of the next emitted word.
    let mut symbols: HashMap<String, i64> = HashMap::new();
    let mut pc: i64 = 0;
    for line in source.lines() {
        for token in tokens(line) {
            if let Some(name) = token.strip_suffix(':') {
                symbols.insert(name.to_string(), pc);
            } else {
                pc += 1;
                break;
            }
        }
    }

    // Pass 2: encode.
    let mut words = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let mut toks = tokens(line).peekable();

        while toks.peek().is_some_and(|t| t.ends_with(':')) {
            let _ = toks.next();
        }
        let Some(head) = toks.next() else { continue };

        if head == ".word" {
            let value = toks
                .next()
                .and_then(parse_number)
                .ok_or(AsmError::MissingWordValue { line: line_no })?;
            words.push(value as u32);
            continue;
        }

        let opcode = opcode_for(head).ok_or_else(|| AsmError::UnknownMnemonic {
            line: line_no,
            mnemonic: head.to_string(),
        })?;

        let rd = parse_register(toks.next());
        let rs = parse_register(toks.next());
        let rt = parse_register(toks.next());
        let imm = match toks.next() {
            None => 0,
            Some(token) => match parse_number(token) {
                Some(value) => value as i32,
                None => {
                    let value =
                        symbols
                            .get(token)
                            .copied()
                            .ok_or_else(|| AsmError::UndefinedLabel {
                                line: line_no,
                                label: token.to_string(),
                            })?;
                    value as i32
                }
            },
        };

        words.push(encode(opcode, rd, rs, rt, imm));
    }
    Ok(words)
}

/// Renders assembled words in the instruction-memory file format.
pub fn format_image(words: &[u32]) -> String {
    let mut text = String::new();
    for word in words {
        text.push_str(&format!("{word:08X}\n"));
    }
    text
}
