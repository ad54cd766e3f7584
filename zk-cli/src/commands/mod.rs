//! Command implementations for zkviz
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod visualize;
