//! Simulation: the cycle driver, image loader, trace emission, and dumps.

/// Command-line to file-path mapping.
pub mod files;
/// Hex image loading.
pub mod loader;
/// Final state dumps.
pub mod output;
/// The top-level cycle driver.
pub mod simulator;
/// Trace formatting and sinks.
pub mod trace;

pub use files::FileSet;
pub use simulator::{RunOutcome, Simulator};
pub use trace::{FileSink, MemorySink, NullSink, TraceSink};
