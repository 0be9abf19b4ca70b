//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. All arithmetic is
//! checked: currency mismatches and overflow come back as `None`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Number of minor units in one major unit.
    pub fn minor_units(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount in major units.
    ///
    /// ```
    /// use bazaar_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(299.99, Currency::INR);
    /// assert_eq!(price.amount_cents, 29999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_cents = (amount * currency.minor_units() as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Like [`Money::from_decimal`], but `None` when the amount is not finite
    /// or does not fit in i64 minor units.
    pub fn try_from_decimal(amount: f64, currency: Currency) -> Option<Self> {
        let minor = (amount * currency.minor_units() as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if !minor.is_finite() || minor >= i64::MAX as f64 || minor < i64::MIN as f64 {
            return None;
        }
        Some(Self::new(minor as i64, currency))
    }

    /// Create a whole major-unit amount (e.g., 500 rupees).
    pub fn major(units: i64, currency: Currency) -> Self {
        Self::new(units.saturating_mul(currency.minor_units()), currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / self.currency.minor_units() as f64
    }

    /// Format as a display string (e.g., "₹49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", self.to_decimal())
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` if currencies don't match or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a scalar, returning `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a decimal factor, rounding to the nearest minor unit.
    pub fn multiply_decimal(&self, factor: f64) -> Money {
        let new_amount = (self.amount_cents as f64 * factor).round() as i64;
        Money::new(new_amount, self.currency)
    }

    /// Calculate a percentage of this amount.
    pub fn percentage(&self, percent: f64) -> Money {
        self.multiply_decimal(percent / 100.0)
    }

    /// The smaller of two amounts in the same currency.
    pub fn try_min(&self, other: &Money) -> Option<Money> {
        self.try_cmp(other).map(|ord| match ord {
            Ordering::Greater => *other,
            _ => *self,
        })
    }

    /// Compare two amounts in the same currency.
    pub fn try_cmp(&self, other: &Money) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.amount_cents.cmp(&other.amount_cents))
    }

    /// Floor at zero.
    pub fn clamp_non_negative(&self) -> Money {
        Money::new(self.amount_cents.max(0), self.currency)
    }

    /// Sum an iterator of Money values, returning `None` on mismatch or overflow.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(49.99, Currency::INR);
        assert_eq!(m.amount_cents, 4999);

        let m = Money::from_decimal(100.0, Currency::JPY);
        assert_eq!(m.amount_cents, 100); // JPY has no decimals
    }

    #[test]
    fn test_money_major() {
        assert_eq!(Money::major(500, Currency::INR).amount_cents, 50000);
        assert_eq!(Money::major(500, Currency::JPY).amount_cents, 500);
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(4999, Currency::INR);
        assert_eq!(m.display(), "\u{20b9}49.99");

        let m = Money::new(100, Currency::JPY);
        assert_eq!(m.display(), "\u{00a5}100");
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let a = Money::new(1000, Currency::INR);
        let b = Money::new(300, Currency::INR);
        assert_eq!(a.try_add(&b).unwrap().amount_cents, 1300);
        assert_eq!(a.try_subtract(&b).unwrap().amount_cents, 700);
        assert_eq!(a.try_multiply(3).unwrap().amount_cents, 3000);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let inr = Money::new(1000, Currency::INR);
        let usd = Money::new(1000, Currency::USD);
        assert!(inr.try_add(&usd).is_none());
        assert!(inr.try_cmp(&usd).is_none());
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::new(i64::MAX, Currency::INR);
        assert!(big.try_add(&Money::new(1, Currency::INR)).is_none());
        assert!(big.try_multiply(2).is_none());
    }

    #[test]
    fn test_money_percentage_rounds() {
        let m = Money::new(10000, Currency::INR);
        assert_eq!(m.percentage(10.0).amount_cents, 1000);

        // 18% of 0.05 = 0.009 -> rounds to 0.01
        let m = Money::new(5, Currency::INR);
        assert_eq!(m.percentage(18.0).amount_cents, 1);
    }

    #[test]
    fn test_money_min_and_clamp() {
        let a = Money::new(500, Currency::INR);
        let b = Money::new(200, Currency::INR);
        assert_eq!(a.try_min(&b), Some(b));
        assert_eq!(Money::new(-5, Currency::INR).clamp_non_negative().amount_cents, 0);
    }

    #[test]
    fn test_money_try_sum() {
        let items = [Money::new(100, Currency::INR), Money::new(250, Currency::INR)];
        let sum = Money::try_sum(items.iter(), Currency::INR).unwrap();
        assert_eq!(sum.amount_cents, 350);
        let empty: [Money; 0] = [];
        assert!(Money::try_sum(empty.iter(), Currency::INR).unwrap().is_zero());

        let mixed = [Money::new(100, Currency::INR), Money::new(100, Currency::USD)];
        assert!(Money::try_sum(mixed.iter(), Currency::INR).is_none());
        let huge = [Money::new(i64::MAX, Currency::INR), Money::new(1, Currency::INR)];
        assert!(Money::try_sum(huge.iter(), Currency::INR).is_none());
    }

    #[test]
    fn test_money_try_from_decimal_range() {
        assert_eq!(
            Money::try_from_decimal(299.99, Currency::INR).map(|m| m.amount_cents),
            Some(29999)
        );
        assert!(Money::try_from_decimal(1e20, Currency::INR).is_none());
        assert!(Money::try_from_decimal(-1e20, Currency::INR).is_none());
        assert!(Money::try_from_decimal(f64::NAN, Currency::INR).is_none());
        assert!(Money::try_from_decimal(f64::INFINITY, Currency::INR).is_none());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("INR"), Some(Currency::INR));
        assert_eq!(Currency::from_code(" eur "), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
