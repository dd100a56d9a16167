//! Shared system fabric: the snooped bus and the main-memory controller.

/// Bus wires, transaction state, and the round-robin arbiter.
pub mod bus;
/// Latency-modelled main memory with a passive write snoop.
pub mod memory;

pub use bus::{Bus, BusCommand};
pub use memory::MainMemory;
