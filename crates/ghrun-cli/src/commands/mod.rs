//! CLI command implementations.

pub mod runs;
