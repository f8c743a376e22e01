//! Subcommand implementations
//!
//! Each command writes its report to the supplied writer so it can be
//! captured in tests; diagnostics go through `tracing`.

pub mod extract;
pub mod get;
pub mod hash;
pub mod index;
pub mod ls;
pub mod pack;
