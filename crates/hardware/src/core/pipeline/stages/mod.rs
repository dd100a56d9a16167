//! The five pipeline stages.
//!
//! Invoked in reverse order (WB, MEM, EX, ID, IF) each cycle so that every
//! stage reads the latch values its neighbor produced in the previous cycle,
//! giving edge-triggered behavior without double-buffering.

pub(crate) mod decode;
pub(crate) mod execute;
pub(crate) mod fetch;
pub(crate) mod memory;
pub(crate) mod writeback;

pub(crate) use decode::decode_stage;
pub(crate) use execute::execute_stage;
pub(crate) use fetch::fetch_stage;
pub(crate) use memory::memory_stage;
pub(crate) use writeback::writeback_stage;
