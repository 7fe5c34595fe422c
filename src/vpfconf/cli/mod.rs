//! # vpfconf CLI
//!
//! The binary is a thin client of the library: `main.rs` calls [`run`] and
//! turns an error into exit status 1.
//!
//! - `setup.rs`: clap argument definitions and the version string
//! - `commands.rs`: context wiring, logging setup and dispatch to `VpfConfigApi`
//! - `render.rs`: terminal output for trees, selections, properties and config
//!
//! Only this layer writes to stdout and stderr. Property lines go to stdout
//! uncolored; diagnostics go to stderr through `tracing`.

mod commands;
mod render;
mod setup;

pub use commands::run;
