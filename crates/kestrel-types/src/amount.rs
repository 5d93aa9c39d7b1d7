//! Amount formatting, parsing, and denomination splitting.

use crate::constants::{ATOMIC_UNITS_PER_COIN, COIN_DECIMALS, TICKER};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount: {0}")]
    Invalid(String),

    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u32),

    #[error("amount does not fit in atomic units")]
    Overflow,
}

/// Format atomic units as a decimal string, e.g. `1234` → `"12.34"`.
pub fn format_amount(atomic: u64) -> String {
    let whole = atomic / ATOMIC_UNITS_PER_COIN;
    let frac = atomic % ATOMIC_UNITS_PER_COIN;
    format!("{}.{:0width$}", whole, frac, width = COIN_DECIMALS as usize)
}

/// Format with the ticker appended, e.g. `"12.34 KST"`.
pub fn format_amount_with_ticker(atomic: u64) -> String {
    format!("{} {}", format_amount(atomic), TICKER)
}

/// Parse a decimal string (`"1.5"`, `".25"`, `"10"`) into atomic units.
pub fn parse_amount(s: &str) -> Result<u64, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole_str, frac_str) = s.split_once('.').unwrap_or((s, ""));
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole_str) || !digits_only(frac_str) || (whole_str.is_empty() && frac_str.is_empty()) {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if frac_str.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals(COIN_DECIMALS));
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str.parse().map_err(|_| AmountError::Overflow)?
    };
    let frac: u64 = if frac_str.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_str, width = COIN_DECIMALS as usize)
            .parse()
            .map_err(|_| AmountError::Invalid(s.to_string()))?
    };

    whole
        .checked_mul(ATOMIC_UNITS_PER_COIN)
        .and_then(|w| w.checked_add(frac))
        .ok_or(AmountError::Overflow)
}

/// Split an amount into decimal denominations, smallest first.
///
/// Outputs reveal their amount on chain, so each one must be a single
/// non-zero digit followed by zeros: `1234` → `[4, 30, 200, 1000]`.
pub fn split_into_denominations(amount: u64) -> Vec<u64> {
    let mut parts = Vec::new();
    let mut remaining = amount;
    let mut place: u64 = 1;

    while remaining > 0 {
        let digit = remaining % 10;
        if digit != 0 {
            parts.push(digit * place);
        }
        remaining /= 10;
        place = place.saturating_mul(10);
    }
    parts
}

/// Whether `amount` is a single non-zero digit followed by zeros.
pub fn is_denomination(amount: u64) -> bool {
    split_into_denominations(amount).len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(250), "2.50");
        assert_eq!(format_amount(123_456), "1234.56");
        assert_eq!(format_amount_with_ticker(100), "1.00 KST");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5").unwrap(), 150);
        assert_eq!(parse_amount(".25").unwrap(), 25);
        assert_eq!(parse_amount("10").unwrap(), 1000);
        assert_eq!(parse_amount(" 0.01 ").unwrap(), 1);
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("1.234"), Err(AmountError::TooManyDecimals(2)));
        assert!(matches!(parse_amount("1.2.3"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("-1"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("."), Err(AmountError::Invalid(_))));
        assert_eq!(parse_amount("184467440737095517"), Err(AmountError::Overflow));
    }

    #[test]
    fn test_split_into_denominations() {
        assert_eq!(split_into_denominations(1234), vec![4, 30, 200, 1000]);
        assert_eq!(split_into_denominations(1000), vec![1000]);
        assert_eq!(split_into_denominations(0), Vec::<u64>::new());
        let big = u64::MAX;
        assert_eq!(split_into_denominations(big).iter().sum::<u64>(), big);
    }

    #[test]
    fn test_is_denomination() {
        assert!(is_denomination(9));
        assert!(is_denomination(300));
        assert!(!is_denomination(310));
        assert!(!is_denomination(0));
    }
}
