//! Cart and line item types.

use crate::cart::{AppliedCoupon, CartTotals, CouponCatalog, CouponRejection, PricingPolicy};
use crate::catalog::{validate_percent, Product};
use crate::error::CommerceError;
use crate::ids::{CartId, LineItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A shopping cart.
///
/// Every mutation builds a fresh item list and swaps it in, so a cart
/// snapshot is never observed half-updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Session the cart belongs to.
    pub session_id: String,
    /// Items in the cart.
    pub items: Vec<LineItem>,
    /// Coupon code the customer entered, normalized.
    pub coupon_code: Option<String>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create a new cart for a session.
    pub fn new(session_id: impl Into<String>, currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            session_id: session_id.into(),
            items: Vec::new(),
            coupon_code: None,
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item to the cart.
    ///
    /// Merges into an existing line only when product, unit price and line
    /// discount all match. A differently priced line for the same product is
    /// kept separate.
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - Adding would exceed MAX_QUANTITY_PER_ITEM
    /// - The item is priced in another currency
    pub fn add_item(&mut self, item: LineItem) -> Result<LineItemId, CommerceError> {
        if item.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }
        validate_quantity(item.quantity)?;

        let mut items = self.items.clone();
        let id = if let Some(existing) = items.iter_mut().find(|i| i.same_offer(&item)) {
            let new_quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            validate_quantity(new_quantity)?;
            existing.quantity = new_quantity;
            existing.id.clone()
        } else {
            let id = item.id.clone();
            items.push(item);
            id
        };

        self.replace_items(items);
        Ok(id)
    }

    /// Update item quantity.
    ///
    /// A quantity of zero or less removes the item.
    /// Returns whether a line was found.
    pub fn update_quantity(
        &mut self,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(line_item_id));
        }
        validate_quantity(quantity)?;

        if self.get_item(line_item_id).is_none() {
            return Ok(false);
        }
        let items = self
            .items
            .iter()
            .cloned()
            .map(|mut i| {
                if &i.id == line_item_id {
                    i.quantity = quantity;
                }
                i
            })
            .collect();
        self.replace_items(items);
        Ok(true)
    }

    /// Remove an item from the cart.
    pub fn remove_item(&mut self, line_item_id: &LineItemId) -> bool {
        let items: Vec<LineItem> = self
            .items
            .iter()
            .filter(|i| &i.id != line_item_id)
            .cloned()
            .collect();
        let removed = items.len() < self.items.len();
        if removed {
            self.replace_items(items);
        }
        removed
    }

    /// Clear all items and the coupon.
    pub fn clear(&mut self) {
        self.coupon_code = None;
        self.replace_items(Vec::new());
    }

    /// Validate `code` against the catalog at the current subtotal and remember it.
    ///
    /// A rejected code is not stored.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        catalog: &CouponCatalog,
    ) -> Result<AppliedCoupon, CouponRejection> {
        let applied = catalog.evaluate(code, &self.subtotal())?;
        self.coupon_code = Some(applied.code.clone());
        self.updated_at = current_timestamp();
        Ok(applied)
    }

    /// Forget the coupon. Returns whether one was set.
    pub fn remove_coupon(&mut self) -> bool {
        let removed = self.coupon_code.take().is_some();
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get_item(&self, line_item_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == line_item_id)
    }

    /// Get an item by product ID.
    pub fn get_item_by_product(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Gross subtotal, saturating on overflow.
    pub fn subtotal(&self) -> Money {
        let cents = self.items.iter().fold(0_i64, |acc, i| {
            acc.saturating_add(i.unit_price.amount_cents.saturating_mul(i.quantity))
        });
        Money::new(cents, self.currency)
    }

    /// Calculate totals, re-resolving the stored coupon against the current subtotal.
    ///
    /// A stored coupon that no longer qualifies (e.g. items were removed and the
    /// cart fell below its minimum) contributes nothing.
    pub fn totals(
        &self,
        catalog: &CouponCatalog,
        policy: &PricingPolicy,
    ) -> Result<CartTotals, CommerceError> {
        let discount = match &self.coupon_code {
            Some(code) => catalog.resolve(code, &self.subtotal()),
            None => Money::zero(self.currency),
        };
        policy.compute_totals(&self.items, discount)
    }

    fn replace_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.updated_at = current_timestamp();
        tracing::debug!(cart = %self.id, lines = self.items.len(), "cart items replaced");
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Unique line item identifier.
    pub id: LineItemId,
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// Quantity, at least 1.
    pub quantity: i64,
    /// Unit price.
    pub unit_price: Money,
    /// Sale percent off this line (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_discount_percent: Option<f64>,
}

impl LineItem {
    /// Create a new line item.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, CommerceError> {
        validate_quantity(quantity)?;
        if unit_price.is_negative() {
            return Err(CommerceError::ValidationError(
                "unit price must not be negative".to_string(),
            ));
        }
        Ok(Self {
            id: LineItemId::generate(),
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            line_discount_percent: None,
        })
    }

    /// Create a line for a normalized catalog product.
    pub fn for_product(product: &Product, quantity: i64) -> Result<Self, CommerceError> {
        let mut item = Self::new(product.id.clone(), product.name.clone(), quantity, product.price)?;
        if let Some(percent) = product.discount_percent {
            item = item.with_line_discount(percent)?;
        }
        Ok(item)
    }

    /// Set a sale percent on this line.
    pub fn with_line_discount(mut self, percent: f64) -> Result<Self, CommerceError> {
        validate_percent(percent)?;
        self.line_discount_percent = Some(percent);
        Ok(self)
    }

    /// Same product sold at the same price and line discount.
    fn same_offer(&self, other: &LineItem) -> bool {
        self.product_id == other.product_id
            && self.unit_price == other.unit_price
            && self.line_discount_percent == other.line_discount_percent
    }
}

fn validate_quantity(quantity: i64) -> Result<(), CommerceError> {
    if quantity <= 0 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    Ok(())
}

/// Key under which a session's cart is stored.
pub fn cart_key(session_id: &str) -> String {
    bazaar_cache::cache_key!("cart", session_id)
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(units: i64) -> Money {
        Money::major(units, Currency::INR)
    }

    fn line(product: &str, quantity: i64, price: i64) -> LineItem {
        LineItem::new(ProductId::new(product), product, quantity, inr(price)).unwrap()
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new("sess_1", Currency::INR);
        assert!(cart.is_empty());
        assert_eq!(cart.session_id, "sess_1");
        assert!(cart.coupon_code.is_none());
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new("sess_1", Currency::INR);
        let first = cart.add_item(line("tea", 1, 100)).unwrap();
        let second = cart.add_item(line("tea", 2, 100)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_same_product_at_other_price_keeps_both_lines() {
        let mut cart = Cart::new("sess_1", Currency::INR);
        let first = cart.add_item(line("kurta", 1, 300)).unwrap();
        let second = cart.add_item(line("kurta", 1, 400)).unwrap();

        assert_ne!(first, second);
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.subtotal(), inr(700));
    }

    #[test]
    fn test_update_quantity_and_remove_at_zero() {
        let mut cart = Cart::new("sess_1", Currency::INR);
        let id = cart.add_item(line("tea", 1, 100)).unwrap();

        assert!(cart.update_quantity(&id, 5).unwrap());
        assert_eq!(cart.item_count(), 5);

        assert!(cart.update_quantity(&id, 0).unwrap());
        assert!(cart.is_empty());

        assert!(!cart.update_quantity(&id, 2).unwrap());
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new("sess_1", Currency::INR);
        assert!(matches!(
            LineItem::new(ProductId::new("p"), "p", 0, inr(1)),
            Err(CommerceError::InvalidQuantity(0))
        ));

        cart.add_item(line("tea", MAX_QUANTITY_PER_ITEM, 1)).unwrap();
        assert!(matches!(
            cart.add_item(line("tea", 1, 1)),
            Err(CommerceError::QuantityExceedsLimit(_, _))
        ));
        assert_eq!(cart.item_count(), MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let mut cart = Cart::new("sess_1", Currency::INR);
        let usd = LineItem::new(ProductId::new("p"), "p", 1, Money::major(5, Currency::USD)).unwrap();
        assert!(matches!(
            cart.add_item(usd),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_coupon_stores_normalized_code() {
        let catalog = CouponCatalog::builtin(Currency::INR);
        let mut cart = Cart::new("sess_1", Currency::INR);
        cart.add_item(line("saree", 2, 300)).unwrap();

        let applied = cart.apply_coupon(" welcome10", &catalog).unwrap();
        assert_eq!(applied.amount, inr(60));
        assert_eq!(cart.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[test]
    fn test_rejected_coupon_not_stored() {
        let catalog = CouponCatalog::builtin(Currency::INR);
        let mut cart = Cart::new("sess_1", Currency::INR);
        cart.add_item(line("mug", 1, 100)).unwrap();

        assert!(cart.apply_coupon("FLAT50", &catalog).is_err());
        assert!(cart.coupon_code.is_none());
    }

    #[test]
    fn test_totals_re_resolve_coupon() {
        let catalog = CouponCatalog::builtin(Currency::INR);
        let policy = PricingPolicy::storefront(Currency::INR);
        let mut cart = Cart::new("sess_1", Currency::INR);
        let saree = cart.add_item(line("saree", 2, 300)).unwrap();
        cart.apply_coupon("WELCOME10", &catalog).unwrap();

        assert_eq!(cart.totals(&catalog, &policy).unwrap().discount, inr(60));

        // Drop below the 500 minimum: coupon stays stored but grants nothing
        cart.update_quantity(&saree, 1).unwrap();
        let totals = cart.totals(&catalog, &policy).unwrap();
        assert!(totals.discount.is_zero());
        assert_eq!(cart.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[test]
    fn test_clear_drops_coupon() {
        let catalog = CouponCatalog::builtin(Currency::INR);
        let mut cart = Cart::new("sess_1", Currency::INR);
        cart.add_item(line("saree", 2, 300)).unwrap();
        cart.apply_coupon("WELCOME10", &catalog).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.coupon_code.is_none());
        assert!(!cart.remove_coupon());
    }

    #[test]
    fn test_cart_key() {
        assert_eq!(cart_key("sess_1"), "cart:sess_1");
    }
}
