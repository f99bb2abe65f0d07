//! Conversion between decimal token amounts and smallest-unit integers.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;

/// Scale a sanitized decimal string into the token's smallest unit.
///
/// Fractional digits beyond `decimals` are tolerated only when they are
/// zeros. Zero is a valid result here; callers that need a positive amount
/// use [`scale_amount`].
///
/// # Errors
///
/// - [`ValidationError::InvalidAmount`] for malformed input or excess precision
/// - [`ValidationError::AmountTooLarge`] when the result exceeds `uint256`
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ValidationError> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(format!(
            "'{amount}' is not an unsigned decimal number"
        )));
    }

    let precision = usize::from(decimals);
    let fraction = if fraction.len() > precision {
        let (kept, dropped) = fraction.split_at(precision);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(ValidationError::InvalidAmount(format!(
                "'{amount}' has more than {decimals} decimal places"
            )));
        }
        kept
    } else {
        fraction
    };

    let digits = format!("{whole}{fraction:0<precision$}");
    U256::from_str_radix(&digits, 10).map_err(|_| ValidationError::AmountTooLarge)
}

/// Scale an amount that must be strictly positive.
///
/// # Errors
///
/// As [`parse_units`], plus [`ValidationError::InvalidAmount`] for zero.
pub fn scale_amount(amount: &str, decimals: u8) -> Result<U256, ValidationError> {
    let scaled = parse_units(amount, decimals)?;
    if scaled.is_zero() {
        return Err(ValidationError::InvalidAmount(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(scaled)
}

/// Render smallest-unit integers as a decimal string without trailing zeros.
#[must_use]
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let precision = usize::from(decimals);
    if precision == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = precision + 1);
    let (whole, fraction) = padded.split_at(padded.len() - precision);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// A raw token quantity together with the precision needed to display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    #[must_use]
    pub const fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Decimal view, if the value fits in a [`Decimal`].
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&format_units(self.raw, self.decimals)).ok()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}
