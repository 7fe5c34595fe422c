//! # vpfconf Architecture
//!
//! vpfconf builds layer configurations for Vector Product Format (VPF)
//! databases. It reads the library, coverage and feature-class metadata of one
//! or more databases, lets a user choose feature classes with a rendering
//! style each, and turns the choice into the flat `key=value` properties a
//! VPF layer is configured from.
//!
//! Like any library with a CLI client, everything from `api.rs` inward is UI
//! agnostic; the binary in `cli/` is one client of it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - clap parsing, terminal output, logging setup             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Merges stored config with per-call overrides             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - tree, properties, session, config                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  - catalog (FeatureCatalog), selection (accumulator),       │
//! │    properties (PropertyBag), style, layer handlers          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Metadata Layer (source/, vpf/)                             │
//! │  - MetadataSource trait: VpfSource, InMemorySource          │
//! │  - VPF table codec and lat/cat/fcs/fca readers              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`api`]: entry point for all operations
//! - [`commands`]: logic behind each operation
//! - [`catalog`]: the library → coverage → feature tree
//! - [`selection`]: accumulates chosen features and finalizes layer properties
//! - [`properties`]: property bags, `key=value` lines and JSON
//! - [`style`]: per-feature rendering attributes
//! - [`layer`]: receivers of finished layers
//! - [`source`]: where catalog metadata comes from
//! - [`vpf`]: VPF table reading and writing
//! - [`config`]: stored user defaults
//! - [`logging`]: tracing subscriber setup for the binary
//! - [`error`]: error types

pub mod api;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod layer;
pub mod logging;
pub mod model;
pub mod properties;
pub mod selection;
pub mod source;
pub mod style;
pub mod vpf;

#[cfg(test)]
mod test_utils;
