//! In-order five-stage pipeline: latches, hazard interlocks, and stages.

/// RAW hazard detection for Decode and its Fetch-side re-derivation.
pub mod hazards;
/// Inter-stage latch structures.
pub mod latches;
/// Stage implementations.
pub(crate) mod stages;
