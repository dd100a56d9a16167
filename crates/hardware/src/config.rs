//! Simulator configuration.
//!
//! This module defines the small set of tunable run parameters. It provides:
//! 1. **Defaults:** Values that reproduce the reference machine byte-for-byte.
//! 2. **Overrides:** JSON deserialization for experiments (longer memory
//!    latency, tighter safety bound).
//!
//! The architectural geometry (core count, cache shape, address split) is
//! fixed in [`crate::common::constants`]; it is baked into address decoding
//! and the dump formats and is deliberately not configurable.

use serde::Deserialize;

use crate::common::constants::{MEM_READ_LATENCY, SAFETY_CYCLE_BOUND};

/// Tunable parameters of a simulation run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Main-memory timing parameters.
    pub memory: MemoryConfig,
    /// Global run limits.
    pub run: RunConfig,
}

/// Main-memory controller timing.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    /// Cycles from a read command to the first word of the response burst.
    pub read_latency: u32,
}

/// Run-length limits.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Cycle bound after which the simulation stops regardless of halts.
    pub max_cycles: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory: MemoryConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            read_latency: MEM_READ_LATENCY,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: SAFETY_CYCLE_BOUND,
        }
    }
}

impl Config {
    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
