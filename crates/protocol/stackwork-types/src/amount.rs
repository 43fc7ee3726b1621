//! STX amounts in micro-STX.
//!
//! Amounts are stored and computed as integer micro-STX. Decimal STX strings
//! only exist at the edges (task bounties, display), and converting between
//! the two never goes through floating point.

use crate::constants::{BPS_DENOMINATOR, MICRO_PER_STX, STX_DECIMALS};
use crate::error::{Result, TypesError};
use crate::Amount;

/// A non-negative decimal amount split at the micro-unit boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalParts {
    /// Integer digits (never empty, may carry leading zeros).
    pub whole: String,
    /// Exactly six fraction digits.
    pub fraction: String,
    /// Whether digits past the sixth round the value up by one micro unit.
    pub round_up: bool,
}

/// Split a major-unit decimal string (`"0.020"`, `"12"`, `".5"`) into parts.
///
/// Rejects signs, exponents, separators and empty input. Digits beyond the
/// sixth fraction digit are rounded half-up.
pub fn parse_decimal_parts(input: &str) -> Result<DecimalParts> {
    let s = input.trim();
    let invalid = || TypesError::InvalidAmount(input.to_string());

    let (whole, fraction) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let digits = STX_DECIMALS as usize;
    let mut padded = fraction.to_string();
    while padded.len() < digits {
        padded.push('0');
    }
    let round_up = padded
        .as_bytes()
        .get(digits)
        .is_some_and(|&b| b >= b'5');
    padded.truncate(digits);

    Ok(DecimalParts {
        whole: if whole.is_empty() {
            "0".to_string()
        } else {
            whole.to_string()
        },
        fraction: padded,
        round_up,
    })
}

/// Parse a decimal STX string into micro-STX.
///
/// ```
/// use stackwork_types::parse_stx;
///
/// assert_eq!(parse_stx("0.020").unwrap(), 20_000);
/// assert_eq!(parse_stx("1").unwrap(), 1_000_000);
/// assert_eq!(parse_stx("0.0000005").unwrap(), 1);
/// ```
pub fn parse_stx(input: &str) -> Result<Amount> {
    let parts = parse_decimal_parts(input)?;
    let overflow = || TypesError::AmountOverflow(input.to_string());

    let whole: u64 = parts.whole.parse().map_err(|_| overflow())?;
    let fraction: u64 = parts
        .fraction
        .parse()
        .map_err(|_| TypesError::InvalidAmount(input.to_string()))?;

    whole
        .checked_mul(MICRO_PER_STX)
        .and_then(|v| v.checked_add(fraction))
        .and_then(|v| v.checked_add(u64::from(parts.round_up)))
        .ok_or_else(overflow)
}

/// Format micro-STX as a decimal STX string with exactly six fraction digits.
///
/// ```
/// use stackwork_types::format_stx;
///
/// assert_eq!(format_stx(19_800), "0.019800");
/// assert_eq!(format_stx(1_000_000), "1.000000");
/// ```
pub fn format_stx(micro: Amount) -> String {
    format!("{}.{:06}", micro / MICRO_PER_STX, micro % MICRO_PER_STX)
}

/// Split a bounty into `(platform_fee, payout)` using basis points.
///
/// The fee is floored; the payout absorbs the remainder so that
/// `fee + payout == bounty` always holds.
pub fn split_fee(bounty: Amount, fee_bps: u16) -> (Amount, Amount) {
    let fee = (u128::from(bounty) * u128::from(fee_bps) / u128::from(BPS_DENOMINATOR)) as Amount;
    (fee, bounty - fee)
}
