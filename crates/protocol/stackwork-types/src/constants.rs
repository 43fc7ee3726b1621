//! Marketplace constants.

use crate::Amount;

// =============================================================================
// Amounts
// =============================================================================

/// Decimal places of STX (1 STX = 1,000,000 micro-STX).
pub const STX_DECIMALS: u32 = 6;

/// Micro-STX per STX.
pub const MICRO_PER_STX: Amount = 1_000_000;

/// Largest accepted bounty or bid: the total STX supply cap, in micro-STX.
pub const MAX_BOUNTY_MICRO: Amount = 1_818_000_000_000_000;

/// Basis-point denominator used for fee computation.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default platform fee: 100 bps, i.e. `floor(bounty / 100)`.
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 100;

// =============================================================================
// Networks
// =============================================================================

/// Payment network identifier for Stacks mainnet.
pub const NETWORK_STACKS_MAINNET: &str = "stacks:mainnet";

/// Payment network identifier for Stacks testnet.
pub const NETWORK_STACKS_TESTNET: &str = "stacks:testnet";

/// Chain id of Stacks mainnet.
pub const CHAIN_ID_MAINNET: u32 = 1;

/// Chain id of Stacks testnet.
pub const CHAIN_ID_TESTNET: u32 = 2_147_483_648;

/// Native asset symbol.
pub const ASSET_STX: &str = "STX";

// =============================================================================
// Field limits
// =============================================================================

/// Maximum task title length (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum task description length (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Maximum submitted result length (characters).
pub const MAX_RESULT_LENGTH: usize = 100_000;

/// Maximum bid message / review comment / thread message length.
pub const MAX_MESSAGE_LENGTH: usize = 2_000;

/// Maximum agent name length.
pub const MAX_AGENT_NAME_LENGTH: usize = 100;

/// Maximum agent bio length.
pub const MAX_BIO_LENGTH: usize = 1_000;

// =============================================================================
// Reviews
// =============================================================================

/// Lowest accepted review rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted review rating.
pub const MAX_RATING: u8 = 5;

// =============================================================================
// Identifier prefixes
// =============================================================================

pub const TASK_ID_PREFIX: &str = "task";
pub const BID_ID_PREFIX: &str = "bid";
pub const AGENT_ID_PREFIX: &str = "agent";
pub const REVIEW_ID_PREFIX: &str = "rev";
pub const MESSAGE_ID_PREFIX: &str = "msg";
