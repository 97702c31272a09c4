//! Display formatting for monetary amounts and percentages.
//!
//! Defaults follow Indonesian Rupiah conventions: `Rp 20.000.000`, compact
//! magnitudes `rb` / `jt` / `M` / `T`, comma as decimal separator.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const STRATEGY: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Locale settings for rendering amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_sep: char,
    pub decimal_sep: char,
    pub fraction_digits: u32,
    /// Suffixes for 10^3, 10^6, 10^9, ... in that order.
    pub compact_suffixes: Vec<String>,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "Rp".to_string(),
            thousands_sep: '.',
            decimal_sep: ',',
            fraction_digits: 0,
            compact_suffixes: ["rb", "jt", "M", "T"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn sign_of(v: Decimal) -> &'static str {
    if v.is_sign_negative() && !v.is_zero() {
        "-"
    } else {
        ""
    }
}

impl CurrencyFormat {
    /// Full amount with symbol and grouped thousands, e.g. `Rp 1.500.000`.
    pub fn currency(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(self.fraction_digits, STRATEGY);
        let body = self.grouped(rounded.abs(), self.fraction_digits);
        if self.symbol.is_empty() {
            format!("{}{body}", sign_of(rounded))
        } else {
            format!("{}{} {body}", sign_of(rounded), self.symbol)
        }
    }

    /// Abbreviated magnitude with one decimal at most, e.g. `20 jt`, `1,5 M`.
    pub fn compact(&self, amount: Decimal) -> String {
        let sign = sign_of(amount);
        let tiers = self.compact_suffixes.len();
        let mut tier = 0usize;
        let mut scaled = amount.abs();
        while tier < tiers && scaled >= Decimal::ONE_THOUSAND {
            scaled /= Decimal::ONE_THOUSAND;
            tier += 1;
        }
        let mut rounded = scaled.round_dp_with_strategy(1, STRATEGY);
        // 999.96 rb rounds up to 1000 rb; carry into the next tier
        if rounded >= Decimal::ONE_THOUSAND && tier < tiers {
            rounded = (rounded / Decimal::ONE_THOUSAND).round_dp_with_strategy(1, STRATEGY);
            tier += 1;
        }
        let number = if rounded.fract().is_zero() {
            self.grouped(rounded.trunc(), 0)
        } else {
            self.grouped(rounded, 1)
        };
        match tier {
            0 => format!("{sign}{number}"),
            t => format!("{sign}{number} {}", self.compact_suffixes[t - 1]),
        }
    }

    /// Percentage with two decimals, e.g. `4,76%`.
    pub fn percent(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(2, STRATEGY);
        format!("{}{}%", sign_of(rounded), self.grouped(rounded.abs(), 2))
    }

    fn grouped(&self, abs: Decimal, digits: u32) -> String {
        let text = format!("{:.*}", digits as usize, abs);
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text.as_str(), ""),
        };
        let len = int_part.len();
        let mut out = String::with_capacity(text.len() + len / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.thousands_sep);
            }
            out.push(ch);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal_sep);
            out.push_str(frac_part);
        }
        out
    }
}

/// [`CurrencyFormat::currency`] with the default locale.
pub fn format_currency(amount: Decimal) -> String {
    CurrencyFormat::default().currency(amount)
}

pub fn format_compact(amount: Decimal) -> String {
    CurrencyFormat::default().compact(amount)
}

pub fn format_percent(value: Decimal) -> String {
    CurrencyFormat::default().percent(value)
}
