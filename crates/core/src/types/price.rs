//! Prices in Vietnamese đồng.
//!
//! The backend stores prices as decimals and may return them either as JSON
//! numbers or as strings (`"120000.00"`). Both are accepted; prices are always
//! written back as numbers.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in VND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount with `.` thousands grouping and no currency suffix, e.g. `120.000`.
    ///
    /// Fractional đồng are dropped; VND has no minor unit in practice.
    #[must_use]
    pub fn grouped(&self) -> String {
        let whole = self.0.trunc().abs().to_string();
        let mut out = String::with_capacity(whole.len() + whole.len() / 3 + 1);
        if self.0.is_sign_negative() && !self.0.trunc().is_zero() {
            out.push('-');
        }
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} VNĐ", self.grouped())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
