//! CLI module for scoperag
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{parse_context, Args, Commands, Verbosity};
