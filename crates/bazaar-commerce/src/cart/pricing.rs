//! Cart pricing calculations.
//!
//! Totals are derived on demand from line items and an already-resolved
//! discount; nothing here is stored or mutated.

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::ids::LineItemId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// What the tax rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    /// Tax on the gross subtotal.
    #[default]
    Subtotal,
    /// Tax on the subtotal after discounts.
    DiscountedSubtotal,
}

impl TaxBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxBasis::Subtotal => "subtotal",
            TaxBasis::DiscountedSubtotal => "discounted_subtotal",
        }
    }
}

/// Shipping and tax rules for one storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub currency: Currency,
    /// Shipping is free once the subtotal exceeds this.
    pub free_shipping_threshold: Money,
    /// Flat shipping fee below the threshold.
    pub shipping_fee: Money,
    /// Tax rate in percent.
    pub tax_rate_percent: f64,
    pub tax_basis: TaxBasis,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::storefront(Currency::default())
    }
}

impl PricingPolicy {
    /// The canonical storefront rules: free shipping above 500, otherwise
    /// 50 flat, 18% tax on the subtotal.
    pub fn storefront(currency: Currency) -> Self {
        Self {
            currency,
            free_shipping_threshold: Money::major(500, currency),
            shipping_fee: Money::major(50, currency),
            tax_rate_percent: 18.0,
            tax_basis: TaxBasis::Subtotal,
        }
    }

    /// Check amounts are non-negative, in the policy currency, and the rate is sane.
    pub fn validate(&self) -> Result<(), CommerceError> {
        for (name, amount) in [
            ("free_shipping_threshold", &self.free_shipping_threshold),
            ("shipping_fee", &self.shipping_fee),
        ] {
            self.check_currency(amount)?;
            if amount.is_negative() {
                return Err(CommerceError::ValidationError(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }
        crate::catalog::validate_percent(self.tax_rate_percent)
    }

    /// Shipping charged on `subtotal`. Empty carts ship for free.
    pub fn shipping_for(&self, subtotal: &Money, is_empty: bool) -> Money {
        if is_empty || subtotal.amount_cents > self.free_shipping_threshold.amount_cents {
            Money::zero(self.currency)
        } else {
            self.shipping_fee
        }
    }

    /// How much more the customer must add to get free shipping.
    pub fn remaining_for_free_shipping(&self, subtotal: &Money) -> Option<Money> {
        let gap = self.free_shipping_threshold.amount_cents - subtotal.amount_cents;
        // threshold must be exceeded, not met
        (gap >= 0).then(|| Money::new(gap + 1, self.currency))
    }

    /// Derive all display totals from `items` and a resolved `discount`.
    ///
    /// The discount (plus any line-level discounts) is clamped to the
    /// subtotal, and the total is floored at zero.
    pub fn compute_totals(
        &self,
        items: &[LineItem],
        discount: Money,
    ) -> Result<CartTotals, CommerceError> {
        self.check_currency(&discount)?;

        let mut lines = Vec::with_capacity(items.len());
        let mut item_count: i64 = 0;
        for item in items {
            self.check_currency(&item.unit_price)?;
            let line = LineTotals::for_item(item)?;
            item_count = item_count
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            lines.push(line);
        }

        let zero = Money::zero(self.currency);
        let subtotal =
            Money::try_sum(lines.iter().map(|l| &l.gross), self.currency).ok_or(CommerceError::Overflow)?;
        let line_discounts = Money::try_sum(lines.iter().map(|l| &l.discount), self.currency)
            .ok_or(CommerceError::Overflow)?;

        let requested = discount
            .clamp_non_negative()
            .try_add(&line_discounts)
            .ok_or(CommerceError::Overflow)?;
        let discount = requested.try_min(&subtotal).unwrap_or(zero);

        let shipping = self.shipping_for(&subtotal, items.is_empty());

        let tax_base = match self.tax_basis {
            TaxBasis::Subtotal => subtotal,
            TaxBasis::DiscountedSubtotal => subtotal
                .try_subtract(&discount)
                .ok_or(CommerceError::Overflow)?,
        };
        let tax = tax_base.percentage(self.tax_rate_percent);

        let total = subtotal
            .try_subtract(&discount)
            .and_then(|m| m.try_add(&tax))
            .and_then(|m| m.try_add(&shipping))
            .ok_or(CommerceError::Overflow)?
            .clamp_non_negative();

        Ok(CartTotals {
            subtotal,
            discount,
            tax,
            shipping,
            total,
            item_count,
            lines,
        })
    }

    fn check_currency(&self, amount: &Money) -> Result<(), CommerceError> {
        if amount.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: amount.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

/// [`PricingPolicy::compute_totals`] with the default storefront policy.
pub fn compute_totals(items: &[LineItem], discount: Money) -> Result<CartTotals, CommerceError> {
    PricingPolicy::default().compute_totals(items, discount)
}

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of unit price times quantity.
    pub subtotal: Money,
    /// Coupon plus line discounts, never more than the subtotal.
    pub discount: Money,
    pub tax: Money,
    pub shipping: Money,
    /// subtotal - discount + tax + shipping, floored at zero.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: i64,
    /// Per-line breakdown.
    pub lines: Vec<LineTotals>,
}

impl CartTotals {
    /// Check if any discounts are applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Get discount percentage of subtotal.
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal.amount_cents == 0 {
            return 0.0;
        }
        (self.discount.amount_cents as f64 / self.subtotal.amount_cents as f64) * 100.0
    }
}

/// Pricing breakdown for a single line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineTotals {
    pub line_item_id: LineItemId,
    pub unit_price: Money,
    pub quantity: i64,
    /// unit_price * quantity.
    pub gross: Money,
    /// Line-level discount from the product's sale percent.
    pub discount: Money,
    /// gross - discount.
    pub net: Money,
}

impl LineTotals {
    fn for_item(item: &LineItem) -> Result<Self, CommerceError> {
        let gross = item
            .unit_price
            .try_multiply(item.quantity)
            .ok_or(CommerceError::Overflow)?;
        let discount = item
            .line_discount_percent
            .map(|p| gross.percentage(p))
            .unwrap_or_else(|| Money::zero(gross.currency));
        let net = gross.try_subtract(&discount).ok_or(CommerceError::Overflow)?;
        Ok(Self {
            line_item_id: item.id.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            gross,
            discount,
            net,
        })
    }

    /// Effective unit price after the line discount.
    pub fn effective_unit_price(&self) -> Money {
        if self.quantity == 0 {
            return self.unit_price;
        }
        Money::new(self.net.amount_cents / self.quantity, self.net.currency)
    }
}
