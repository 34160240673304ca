//! inifold CLI library
//!
//! Exposes the command-line entry points so the binary stays a thin wrapper
//! and the commands can be driven from tests.

mod cli;

pub use cli::{run, run_from};
