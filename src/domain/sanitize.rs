//! Validation of user-supplied strings before they reach the chain.
//!
//! All functions here are pure.

use alloy_primitives::{Address, U256};

use super::wager::MarketId;
use crate::error::ValidationError;

/// Accept an unsigned decimal: digits with an optional fractional part.
///
/// Signs, exponents, thousands separators and bare dots are rejected. The
/// trimmed input is returned unchanged.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAmount`] for anything else.
pub fn sanitize_amount(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return Err(ValidationError::InvalidAmount(format!(
            "'{trimmed}' is not an unsigned decimal number"
        )));
    }

    Ok(trimmed.to_string())
}

/// Accept a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase forms are accepted as-is; mixed case must
/// carry a valid EIP-55 checksum. The trimmed input is returned unchanged.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAddress`] on bad length, bad hex, or a
/// wrong checksum.
pub fn sanitize_address(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ValidationError::InvalidAddress(format!("'{trimmed}': {reason}"));

    let hex = trimmed
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix"))?;
    if hex.len() != 40 {
        return Err(invalid("expected 40 hex digits"));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters"));
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(trimmed, None).map_err(|_| invalid("bad checksum"))?;
    }

    Ok(trimmed.to_string())
}

/// Sanitize and parse an address in one step.
///
/// # Errors
///
/// See [`sanitize_address`].
pub fn parse_address(raw: &str) -> Result<Address, ValidationError> {
    let sanitized = sanitize_address(raw)?;
    sanitized
        .parse()
        .map_err(|e| ValidationError::InvalidAddress(format!("'{sanitized}': {e}")))
}

/// Accept a non-negative integer market id that fits in a `uint256`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidMarket`] for signs, fractions, empty
/// input or overflow.
pub fn sanitize_market_id(raw: &str) -> Result<MarketId, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidMarket(format!("'{trimmed}' is not a non-negative integer"));

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let value = U256::from_str_radix(trimmed, 10).map_err(|_| invalid())?;
    Ok(MarketId::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_unsigned_decimals() {
        for input in ["0", "5", "50", "0.5", "12.345", "007", "1.000000"] {
            assert_eq!(sanitize_amount(input).as_deref(), Ok(input));
        }
    }

    #[test]
    fn amount_returns_trimmed_input() {
        assert_eq!(sanitize_amount("  42.5\n").as_deref(), Ok("42.5"));
    }

    #[test]
    fn amount_rejects_malformed_input() {
        for input in [
            "", "   ", "-5", "+5", "5e3", "abc", "1,000", ".5", "5.", "1.2.3", "0x10", "٣",
        ] {
            assert!(
                matches!(sanitize_amount(input), Err(ValidationError::InvalidAmount(_))),
                "expected '{input}' to be rejected"
            );
        }
    }

    #[test]
    fn address_accepts_lowercase() {
        let addr = "0x92a1c620751ba38e885461c3e356d41a226962f3";
        assert_eq!(sanitize_address(addr).as_deref(), Ok(addr));
    }

    #[test]
    fn address_accepts_valid_checksum() {
        let addr = Address::repeat_byte(0xab).to_checksum(None);
        assert_eq!(sanitize_address(&format!(" {addr} ")), Ok(addr));
    }

    #[test]
    fn address_rejects_bad_checksum() {
        let good = Address::repeat_byte(0xab).to_checksum(None);
        // Flip the case of the first hex letter; the rest stays mixed-case.
        let mut bad: Vec<char> = good.chars().collect();
        let pos = bad
            .iter()
            .skip(2)
            .position(|c| c.is_ascii_alphabetic())
            .expect("letter")
            + 2;
        bad[pos] = if bad[pos].is_ascii_uppercase() {
            bad[pos].to_ascii_lowercase()
        } else {
            bad[pos].to_ascii_uppercase()
        };
        let bad: String = bad.into_iter().collect();
        assert!(matches!(
            sanitize_address(&bad),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn address_rejects_wrong_shape() {
        for input in [
            "",
            "92a1c620751ba38e885461c3e356d41a226962f3",
            "0x92a1c620751ba38e885461c3e356d41a226962",
            "0x92a1c620751ba38e885461c3e356d41a226962f3ff",
            "0xg2a1c620751ba38e885461c3e356d41a226962f3",
        ] {
            assert!(
                matches!(sanitize_address(input), Err(ValidationError::InvalidAddress(_))),
                "expected '{input}' to be rejected"
            );
        }
    }

    #[test]
    fn parse_address_returns_typed_value() {
        let addr = parse_address("0x0000000000000000000000000000000000000001").expect("valid");
        assert_eq!(addr, Address::with_last_byte(1));
    }

    #[test]
    fn market_id_accepts_non_negative_integers() {
        assert_eq!(sanitize_market_id("0"), Ok(MarketId::new(U256::ZERO)));
        assert_eq!(sanitize_market_id(" 42 "), Ok(MarketId::new(U256::from(42u8))));
    }

    #[test]
    fn market_id_rejects_everything_else() {
        for input in ["", "-1", "1.5", "abc", "1e3", " "] {
            assert!(
                matches!(sanitize_market_id(input), Err(ValidationError::InvalidMarket(_))),
                "expected '{input}' to be rejected"
            );
        }
    }

    #[test]
    fn market_id_rejects_overflow() {
        let too_big = format!("{}0", U256::MAX);
        assert!(matches!(
            sanitize_market_id(&too_big),
            Err(ValidationError::InvalidMarket(_))
        ));
    }
}
