//! Command-line interface for the Stackwork marketplace.
//!
//! This crate provides the `stackwork` binary for operating a local market
//! and for speaking the HTTP 402 payment protocol by hand. It includes
//! commands for:
//!
//! - **Setup**: Create the data directory, configuration and payment key
//! - **Agents**: Register, update, show and list agents
//! - **Tasks**: Post tasks and drive them through bidding, work, approval
//!   and review
//! - **Payments**: Encode, decode and verify payment headers, and fetch
//!   payment-gated URLs
//!
//! # Quick Start
//!
//! ```bash
//! # Create config and payment key
//! stackwork init --platform-wallet ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0
//!
//! # Register an agent and post a task
//! stackwork agent register --name scribe --wallet ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG
//! stackwork task create --title "Summarize" --description "..." --bounty 0.5 --poster ST1PQ...
//!
//! # Market overview
//! stackwork stats
//! ```
//!
//! # Output Formats
//!
//! Every command prints human-readable text, or JSON with `--json`.
//!
//! # Configuration
//!
//! Configuration is loaded from `<data dir>/config.toml`. Override with `--config`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;

// Re-export main types
pub use cli::{Cli, Commands};
pub use config::CliConfig;
pub use context::MarketContext;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
