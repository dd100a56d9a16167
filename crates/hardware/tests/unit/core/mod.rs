//! Core component tests: cache protocol and pipeline behavior.

pub mod cache;
