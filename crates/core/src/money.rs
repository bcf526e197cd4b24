//! Money types: purchase price and accrued revenue.
//!
//! Prices are kept in the smallest currency unit (cents) as plain integers;
//! revenue is tracked in whole Tsh. The original system recorded prices in a
//! larger unit and multiplied by 1000 at the point of revenue accrual; with
//! cents that accrual is `cents * 10` Tsh. The scaling is a fixed domain
//! convention, not configuration.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Lowest accepted price, in cents.
pub const MIN_PRICE_CENTS: u64 = 400;
/// Highest accepted price, in cents.
pub const MAX_PRICE_CENTS: u64 = 5_000;

/// Purchase price of one unit, in cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchasePrice(u64);

impl PurchasePrice {
    /// Build a price from cents, enforcing the accepted band.
    pub fn from_cents(cents: u64) -> Result<Self, DomainError> {
        if cents < MIN_PRICE_CENTS {
            return Err(DomainError::validation_one("price is too low"));
        }
        if cents > MAX_PRICE_CENTS {
            return Err(DomainError::validation_one("price is too high"));
        }
        Ok(Self(cents))
    }

    /// Parse the SMS-facing decimal token (`"10"`, `"10.5"`, `"10.50"`).
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        let cents = parse_decimal_cents(token)
            .ok_or_else(|| DomainError::validation_one("price not understood"))?;
        Self::from_cents(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    /// Revenue accrued by selling one unit at this price, in whole Tsh.
    pub fn revenue_tsh(self) -> i64 {
        self.0 as i64 * 10
    }
}

impl core::fmt::Display for PurchasePrice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}", self.0 / 100)
        } else {
            write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
        }
    }
}

impl ValueObject for PurchasePrice {}

/// Cached running revenue of a retailer, in whole Tsh.
///
/// Signed: cancellations subtract, and a fresh retailer starts at zero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revenue(i64);

impl Revenue {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn tsh(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn accrue(self, price: PurchasePrice) -> Self {
        Self(self.0 + price.revenue_tsh())
    }

    #[must_use]
    pub fn reverse(self, price: PurchasePrice) -> Self {
        Self(self.0 - price.revenue_tsh())
    }
}

impl core::fmt::Display for Revenue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Tsh", self.0)
    }
}

impl ValueObject for Revenue {}

/// Parse a non-negative decimal with at most two fraction digits into cents.
fn parse_decimal_cents(token: &str) -> Option<u64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let (whole, frac) = match token.split_once('.') {
        Some((w, f)) => (w, f),
        None => (token, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = whole.parse().ok()?;
    let frac_cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().ok()? * 10,
        _ => frac.parse::<u64>().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac_cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_prices() {
        assert_eq!(PurchasePrice::parse("10").unwrap().cents(), 1_000);
        assert_eq!(PurchasePrice::parse("10.5").unwrap().cents(), 1_050);
        assert_eq!(PurchasePrice::parse("10.50").unwrap().cents(), 1_050);
    }

    #[test]
    fn rejects_prices_outside_band() {
        assert!(PurchasePrice::parse("3.99").is_err());
        assert!(PurchasePrice::parse("50.01").is_err());
        // Boundary values are accepted.
        assert!(PurchasePrice::parse("4").is_ok());
        assert!(PurchasePrice::parse("50").is_ok());
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(PurchasePrice::parse("ten").is_err());
        assert!(PurchasePrice::parse("10.505").is_err());
        assert!(PurchasePrice::parse("-10").is_err());
        assert!(PurchasePrice::parse("").is_err());
    }

    #[test]
    fn revenue_accrual_matches_price_times_thousand() {
        // 10.00 in the larger unit -> 10 * 1000 = 10_000 Tsh.
        let price = PurchasePrice::parse("10").unwrap();
        assert_eq!(price.revenue_tsh(), 10_000);

        let rev = Revenue::zero().accrue(price);
        assert_eq!(rev.tsh(), 10_000);
        assert_eq!(rev.reverse(price), Revenue::zero());
    }

    #[test]
    fn price_display_round_trips_the_token() {
        assert_eq!(PurchasePrice::parse("10").unwrap().to_string(), "10");
        assert_eq!(PurchasePrice::parse("10.50").unwrap().to_string(), "10.50");
    }
}
