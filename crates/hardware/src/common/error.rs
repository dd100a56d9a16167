//! Simulator error definitions.
//!
//! This module defines the error type surfaced by simulator setup and output
//! paths. It distinguishes:
//! 1. **Configuration errors:** Wrong argument counts and unopenable files, which
//!    abort before any simulation cycle runs.
//! 2. **Output errors:** Trace or dump writes that fail mid-run.
//!
//! The simulation engine itself (pipeline, cache, bus, memory) has no error
//! channel: every outcome of a legal-but-uncooperative program is expressed as
//! a stall or bounded by the safety cycle cap.

use std::io;

use thiserror::Error;

/// Errors produced while setting up or emitting the results of a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// An input or output file could not be opened or read.
    #[error("cannot open {path}: {source}")]
    File {
        /// Path of the offending file.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The command line carried neither zero nor the full set of file paths.
    #[error("expected 0 or 27 file arguments, got {0}")]
    ArgumentCount(usize),

    /// A configuration override file failed to parse.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A trace line or final dump could not be written.
    #[error("output write failed: {0}")]
    Output(#[from] io::Error),
}

impl SimError {
    /// Wraps an I/O error with the path that produced it.
    pub fn file(path: impl Into<String>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
