//! Cart, coupon and pricing logic for the Bazaar storefront.
//!
//! This crate provides the pieces a storefront needs to show a cart:
//!
//! - **Catalog**: Normalization of backend product and cart-line records
//! - **Cart**: Line items, coupon codes, totals, and persisted sessions
//! - **Money**: Integer minor-unit amounts with checked arithmetic
//!
//! # Example
//!
//! ```rust
//! use bazaar_commerce::prelude::*;
//!
//! let mut cart = Cart::new("sess_123", Currency::INR);
//! cart.add_item(
//!     LineItem::new(ProductId::new("kurta"), "Cotton Kurta", 2, Money::major(300, Currency::INR)).unwrap(),
//! )
//! .unwrap();
//!
//! let coupons = CouponCatalog::builtin(Currency::INR);
//! cart.apply_coupon("WELCOME10", &coupons).unwrap();
//!
//! let totals = cart.totals(&coupons, &PricingPolicy::default()).unwrap();
//! assert_eq!(totals.subtotal, Money::major(600, Currency::INR));
//! assert_eq!(totals.discount, Money::major(60, Currency::INR));
//! assert_eq!(totals.total, Money::major(648, Currency::INR));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod cart;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{CartLineRecord, NumberOrString, Product, ProductRecord};

    // Cart
    pub use crate::cart::{
        compute_totals, AppliedCoupon, Cart, CartSession, CartTotals, Coupon, CouponCatalog,
        CouponKind, CouponRejection, CouponValue, LineItem, LineTotals, PricingPolicy, TaxBasis,
    };
}
