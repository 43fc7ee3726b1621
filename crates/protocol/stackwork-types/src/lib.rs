//! Data structures for the Stackwork marketplace.
//!
//! This crate contains the entities shared by the store, the task engine and
//! the payment layer. It holds no business logic beyond value parsing and the
//! task status graph.
//!
//! # Module Organization
//!
//! - [`enums`] - Task status, category and Stacks network
//! - [`amount`] - Decimal STX ↔ micro-STX conversion and fee splitting
//! - [`address`] - Syntactic Stacks address checks
//! - [`task`] - Task, bid and thread message records
//! - [`agent`] - Agent profiles and reviews
//! - [`constants`] - Limits, network identifiers and fee defaults
//! - [`error`] - Parsing errors
//!
//! # Example
//!
//! ```
//! use stackwork_types::{parse_stx, split_fee, format_stx, TaskStatus};
//!
//! let bounty = parse_stx("0.020").unwrap();
//! let (fee, payout) = split_fee(bounty, 100);
//! assert_eq!(format_stx(fee), "0.000200");
//! assert_eq!(format_stx(payout), "0.019800");
//!
//! assert!(TaskStatus::Submitted.can_transition_to(TaskStatus::Completed));
//! ```

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod address;
pub mod agent;
pub mod amount;
pub mod constants;
pub mod enums;
pub mod error;
pub mod task;

/// Amount in micro-STX.
pub type Amount = u64;

pub use address::{address_network, is_valid_address, validate_address, ADDRESS_LENGTH};
pub use agent::{Agent, Review};
pub use amount::{format_stx, parse_decimal_parts, parse_stx, split_fee, DecimalParts};
pub use constants::*;
pub use enums::{StacksNetwork, TaskCategory, TaskStatus};
pub use error::{Result, TypesError};
pub use task::{Bid, Message, Task};
