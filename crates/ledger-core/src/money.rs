//! Monetary normalization shared by the store and the mutation service.
//!
//! Every monetary field passes through one of these helpers before it is
//! stored, so the rules live in one place:
//! - non-negative fields clamp to `[0, MAX_MONEY]`
//! - signed fields clamp to `[-MAX_MONEY, MAX_MONEY]`
//! - text that does not parse as a number becomes zero
//! - values are rounded to `MONEY_DP` decimal places

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Largest magnitude accepted for any monetary field (10^15).
pub const MAX_MONEY: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Decimal places kept for monetary values.
pub const MONEY_DP: u32 = 4;

/// Clamp a value that must never be negative.
pub fn clamp_non_negative(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP).max(Decimal::ZERO).min(MAX_MONEY)
}

/// Clamp a value whose sign is free (cashflow outflow).
pub fn clamp_signed(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP).max(-MAX_MONEY).min(MAX_MONEY)
}

/// `part / whole * 100`, or zero when `whole` is not positive.
///
/// Saturates instead of panicking when the quotient overflows.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Coerce free-form input into a number, falling back to zero.
///
/// Accepts plain decimals (`"1500000"`, `"-2.5"`) and scientific notation
/// (`"1e6"`). Anything else, including the empty string, yields zero.
pub fn coerce_money(text: &str) -> Decimal {
    let t = text.trim();
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .unwrap_or(Decimal::ZERO)
}

/// Serde helper: read a monetary field from a number or numeric string,
/// treating any other JSON value as zero instead of failing the document.
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Decimal),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(v) => v,
        Raw::Other(_) => Decimal::ZERO,
    })
}
