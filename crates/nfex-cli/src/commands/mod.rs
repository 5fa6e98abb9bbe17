//! Subcommands of the `nfex` binary.

pub mod batch;
pub mod config;
pub mod convert;
