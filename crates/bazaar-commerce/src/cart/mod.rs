//! Shopping cart module.
//!
//! Contains the cart and its line items, the coupon catalog, pricing rules,
//! and the persisted cart session.

mod cart;
mod coupon;
mod pricing;
mod session;

pub use cart::{cart_key, Cart, LineItem, MAX_QUANTITY_PER_ITEM};
pub use coupon::{
    normalize_code, AppliedCoupon, Coupon, CouponCatalog, CouponKind, CouponRejection,
    CouponValue,
};
pub use pricing::{compute_totals, CartTotals, LineTotals, PricingPolicy, TaxBasis};
pub use session::CartSession;
