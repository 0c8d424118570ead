//! Utility functions shared across layers.
//!
//! - [`hash_generator`] - Short hash generation and uniqueness checks

pub mod hash_generator;
