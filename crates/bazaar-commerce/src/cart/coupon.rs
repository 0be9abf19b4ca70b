//! Coupon catalog and code resolution.

use crate::catalog::validate_percent;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Percentage of the subtotal.
    Percentage,
    /// Fixed amount off.
    Fixed,
}

/// Value of a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CouponValue {
    /// Percent off (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off.
    Fixed(Money),
}

impl CouponValue {
    pub fn kind(&self) -> CouponKind {
        match self {
            CouponValue::Percentage(_) => CouponKind::Percentage,
            CouponValue::Fixed(_) => CouponKind::Fixed,
        }
    }
}

/// A named discount rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Code as entered by customers; matched case-insensitively.
    pub code: String,
    /// Discount value.
    pub value: CouponValue,
    /// Subtotal must be at least this much.
    pub minimum_order_amount: Money,
    /// Cap on the discount; only consulted for percentage coupons.
    pub maximum_discount_amount: Option<Money>,
    /// Whether the coupon can be redeemed.
    pub active: bool,
    /// Short description for display.
    pub description: Option<String>,
}

impl Coupon {
    /// Create an active percentage coupon.
    pub fn percentage(code: impl Into<String>, percent: f64, minimum_order_amount: Money) -> Self {
        Self {
            code: code.into(),
            value: CouponValue::Percentage(percent),
            minimum_order_amount,
            maximum_discount_amount: None,
            active: true,
            description: None,
        }
    }

    /// Create an active fixed-amount coupon.
    pub fn fixed(code: impl Into<String>, amount: Money, minimum_order_amount: Money) -> Self {
        Self {
            code: code.into(),
            value: CouponValue::Fixed(amount),
            minimum_order_amount,
            maximum_discount_amount: None,
            active: true,
            description: None,
        }
    }

    /// Cap the discount of a percentage coupon.
    pub fn with_cap(mut self, maximum: Money) -> Self {
        self.maximum_discount_amount = Some(maximum);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the coupon inactive.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn kind(&self) -> CouponKind {
        self.value.kind()
    }

    /// Discount this coupon grants on `subtotal`, ignoring eligibility.
    ///
    /// Fixed coupons are not capped by the subtotal here.
    pub fn discount_for(&self, subtotal: &Money) -> Money {
        match &self.value {
            CouponValue::Percentage(percent) => {
                let raw = subtotal.percentage(*percent);
                match &self.maximum_discount_amount {
                    Some(cap) => raw.try_min(cap).unwrap_or(raw),
                    None => raw,
                }
            }
            CouponValue::Fixed(amount) => *amount,
        }
    }

    fn validate(&self, currency: Currency) -> Result<(), CommerceError> {
        if normalize_code(&self.code).is_empty() {
            return Err(CommerceError::ValidationError(
                "coupon code is empty".to_string(),
            ));
        }
        let mut amounts = vec![&self.minimum_order_amount];
        match &self.value {
            CouponValue::Percentage(p) => validate_percent(*p)?,
            CouponValue::Fixed(amount) => amounts.push(amount),
        }
        if let Some(cap) = &self.maximum_discount_amount {
            amounts.push(cap);
        }
        for amount in amounts {
            if amount.currency != currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: amount.currency.code().to_string(),
                });
            }
            if amount.is_negative() {
                return Err(CommerceError::ValidationError(format!(
                    "coupon {} has a negative amount",
                    self.code
                )));
            }
        }
        Ok(())
    }
}

/// Why a code did not produce a discount.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouponRejection {
    #[error("no coupon code entered")]
    EmptyCode,

    #[error("unknown coupon code {0}")]
    NotFound(String),

    #[error("coupon {0} is no longer active")]
    Inactive(String),

    #[error("coupon {code} needs a minimum order of {minimum}, cart is {subtotal}")]
    BelowMinimum {
        code: String,
        minimum: Money,
        subtotal: Money,
    },

    #[error("coupon {code} does not apply to {currency} carts")]
    CurrencyMismatch { code: String, currency: Currency },
}

/// A coupon that passed eligibility, with the amount it grants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    pub code: String,
    pub kind: CouponKind,
    pub amount: Money,
}

/// Canonical lookup form of a code: trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Immutable table of coupons for one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponCatalog {
    currency: Currency,
    coupons: Vec<Coupon>,
}

impl CouponCatalog {
    /// Build a catalog, rejecting duplicate codes and malformed coupons.
    pub fn new(currency: Currency, coupons: Vec<Coupon>) -> Result<Self, CommerceError> {
        let mut seen = std::collections::HashSet::new();
        for coupon in &coupons {
            coupon.validate(currency)?;
            let code = normalize_code(&coupon.code);
            if !seen.insert(code.clone()) {
                return Err(CommerceError::DuplicateCouponCode(code));
            }
        }
        Ok(Self { currency, coupons })
    }

    /// The storefront's built-in coupons.
    pub fn builtin(currency: Currency) -> Self {
        let m = |units| Money::major(units, currency);
        Self {
            currency,
            coupons: vec![
                Coupon::percentage("WELCOME10", 10.0, m(500))
                    .with_cap(m(200))
                    .with_description("10% off your first order"),
                Coupon::fixed("FLAT50", m(50), m(299)).with_description("Flat 50 off"),
                Coupon::percentage("SAVE20", 20.0, m(1000))
                    .with_cap(m(500))
                    .with_description("20% off orders above 1000"),
            ],
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Look up a coupon by code, case-insensitively. Inactive coupons are returned too.
    pub fn get(&self, code: &str) -> Option<&Coupon> {
        let code = normalize_code(code);
        self.coupons
            .iter()
            .find(|c| normalize_code(&c.code) == code)
    }

    /// All coupons, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }

    /// Check a code against the catalog and the current subtotal.
    pub fn evaluate(&self, code: &str, subtotal: &Money) -> Result<AppliedCoupon, CouponRejection> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return Err(CouponRejection::EmptyCode);
        }

        let coupon = self
            .get(&normalized)
            .ok_or_else(|| CouponRejection::NotFound(normalized.clone()))?;

        if !coupon.active {
            return Err(CouponRejection::Inactive(normalized));
        }
        if subtotal.currency != self.currency {
            return Err(CouponRejection::CurrencyMismatch {
                code: normalized,
                currency: subtotal.currency,
            });
        }
        if subtotal.amount_cents < coupon.minimum_order_amount.amount_cents {
            return Err(CouponRejection::BelowMinimum {
                code: normalized,
                minimum: coupon.minimum_order_amount,
                subtotal: *subtotal,
            });
        }

        Ok(AppliedCoupon {
            code: normalized,
            kind: coupon.kind(),
            amount: coupon.discount_for(subtotal),
        })
    }

    /// Discount for `code` at `subtotal`, or zero if the code is rejected.
    pub fn resolve(&self, code: &str, subtotal: &Money) -> Money {
        match self.evaluate(code, subtotal) {
            Ok(applied) => applied.amount,
            Err(rejection) => {
                tracing::debug!(%rejection, "coupon not applied");
                Money::zero(subtotal.currency)
            }
        }
    }
}
