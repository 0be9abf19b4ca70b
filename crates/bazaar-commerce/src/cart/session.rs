//! Cart state holder with injected persistence.

use bazaar_cache::{Cache, CacheError, KvStore, SessionId};

use crate::cart::{cart_key, AppliedCoupon, Cart, CartTotals, CouponCatalog, LineItem, PricingPolicy};
use crate::error::CommerceError;
use crate::ids::LineItemId;
use crate::money::Currency;

/// Owns one session's cart and writes every change through to a store.
///
/// Mutations run against a copy of the cart. The copy is persisted first and
/// only then swapped in, so a failed write leaves both the store and the
/// in-memory cart at the previous snapshot.
///
/// # Example
///
/// ```rust
/// use bazaar_cache::{Cache, MemoryStore, SessionId};
/// use bazaar_commerce::prelude::*;
///
/// let mut session = CartSession::open(
///     Cache::new(MemoryStore::new()),
///     SessionId::new("sess_demo"),
///     Currency::INR,
/// )
/// .unwrap();
///
/// let kurta = LineItem::new(ProductId::new("kurta"), "Kurta", 2, Money::major(300, Currency::INR)).unwrap();
/// session.add(kurta).unwrap();
///
/// let catalog = CouponCatalog::builtin(Currency::INR);
/// session.apply_coupon("welcome10", &catalog).unwrap();
///
/// let totals = session.totals(&catalog, &PricingPolicy::default()).unwrap();
/// assert_eq!(totals.discount, Money::major(60, Currency::INR));
/// ```
pub struct CartSession<S> {
    cache: Cache<S>,
    session_id: SessionId,
    cart: Cart,
}

impl<S: KvStore> CartSession<S> {
    /// Load the session's cart, or start an empty one.
    ///
    /// A stored cart that cannot be decoded, or that was priced in another
    /// currency, is discarded and replaced by an empty cart.
    pub fn open(
        cache: Cache<S>,
        session_id: SessionId,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        let key = cart_key(session_id.as_str());
        let cart = match cache.get::<Cart>(&key) {
            Ok(Some(cart)) if cart.currency == currency => cart,
            Ok(Some(cart)) => {
                tracing::warn!(
                    session = %session_id,
                    stored = %cart.currency,
                    expected = %currency,
                    "stored cart has a different currency, starting fresh"
                );
                Cart::new(session_id.as_str(), currency)
            }
            Ok(None) => Cart::new(session_id.as_str(), currency),
            Err(CacheError::SerializeError(e)) => {
                tracing::warn!(session = %session_id, error = %e, "stored cart is corrupt, starting fresh");
                Cart::new(session_id.as_str(), currency)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            cache,
            session_id,
            cart,
        })
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Add an item, merging with a matching line for the same product.
    pub fn add(&mut self, item: LineItem) -> Result<LineItemId, CommerceError> {
        self.mutate(|cart| cart.add_item(item))
    }

    /// Set a line's quantity; zero removes it.
    pub fn update_quantity(
        &mut self,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        self.mutate(|cart| cart.update_quantity(line_item_id, quantity))
    }

    /// Remove a line. Errors if the line is not in the cart.
    pub fn remove(&mut self, line_item_id: &LineItemId) -> Result<(), CommerceError> {
        self.mutate(|cart| {
            if cart.remove_item(line_item_id) {
                Ok(())
            } else {
                Err(CommerceError::ItemNotInCart(line_item_id.to_string()))
            }
        })
    }

    /// Apply a coupon code; a rejected code leaves the cart untouched.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        catalog: &CouponCatalog,
    ) -> Result<AppliedCoupon, CommerceError> {
        self.mutate(|cart| Ok(cart.apply_coupon(code, catalog)?))
    }

    /// Remove the coupon, returning whether one was set.
    pub fn remove_coupon(&mut self) -> Result<bool, CommerceError> {
        self.mutate(|cart| Ok(cart.remove_coupon()))
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Totals for the current snapshot.
    pub fn totals(
        &self,
        catalog: &CouponCatalog,
        policy: &PricingPolicy,
    ) -> Result<CartTotals, CommerceError> {
        self.cart.totals(catalog, policy)
    }

    /// Delete the stored cart, e.g. after checkout.
    pub fn discard(self) -> Result<(), CommerceError> {
        self.cache.delete(&cart_key(self.session_id.as_str()))?;
        Ok(())
    }

    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut Cart) -> Result<T, CommerceError>,
    ) -> Result<T, CommerceError> {
        let mut next = self.cart.clone();
        let out = f(&mut next)?;
        self.cache
            .set(&cart_key(self.session_id.as_str()), &next)?;
        self.cart = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CouponRejection;
    use crate::ids::ProductId;
    use crate::money::Money;
    use bazaar_cache::MemoryStore;
    use std::sync::Arc;

    /// Shares one MemoryStore between sessions so reopening sees prior writes.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryStore>);

    impl KvStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
            self.0.set(key, value)
        }
        fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.0.delete(key)
        }
        fn keys(&self) -> Result<Vec<String>, CacheError> {
            self.0.keys()
        }
    }

    /// Fails every write.
    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read only".to_string()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(vec![])
        }
    }

    fn inr(units: i64) -> Money {
        Money::major(units, Currency::INR)
    }

    fn kurta(quantity: i64) -> LineItem {
        LineItem::new(ProductId::new("kurta"), "Kurta", quantity, inr(300)).unwrap()
    }

    fn open(store: &SharedStore) -> CartSession<SharedStore> {
        CartSession::open(Cache::new(store.clone()), SessionId::new("sess_1"), Currency::INR).unwrap()
    }

    #[test]
    fn test_changes_survive_reopen() {
        let store = SharedStore::default();
        let catalog = CouponCatalog::builtin(Currency::INR);

        let mut session = open(&store);
        session.add(kurta(2)).unwrap();
        session.apply_coupon("WELCOME10", &catalog).unwrap();

        let reopened = open(&store);
        assert_eq!(reopened.cart().item_count(), 2);
        assert_eq!(reopened.cart().coupon_code.as_deref(), Some("WELCOME10"));
        assert_eq!(reopened.cart().id, session.cart().id);
    }

    #[test]
    fn test_failed_write_keeps_previous_snapshot() {
        let mut session =
            CartSession::open(Cache::new(ReadOnlyStore), SessionId::new("s"), Currency::INR).unwrap();
        assert!(matches!(session.add(kurta(1)), Err(CommerceError::CacheError(_))));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_rejected_coupon_surfaces_reason() {
        let store = SharedStore::default();
        let catalog = CouponCatalog::builtin(Currency::INR);
        let mut session = open(&store);
        session.add(kurta(1)).unwrap();

        let err = session.apply_coupon("WELCOME10", &catalog).unwrap_err();
        assert!(matches!(
            err,
            CommerceError::CouponRejected(CouponRejection::BelowMinimum { .. })
        ));
        assert!(session.cart().coupon_code.is_none());
    }

    #[test]
    fn test_remove_missing_line_is_error() {
        let store = SharedStore::default();
        let mut session = open(&store);
        let err = session.remove(&LineItemId::new("nope")).unwrap_err();
        assert!(matches!(err, CommerceError::ItemNotInCart(_)));
    }

    #[test]
    fn test_corrupt_cart_starts_fresh() {
        let store = SharedStore::default();
        store.set(&cart_key("sess_1"), b"{broken").unwrap();

        let session = open(&store);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_discard_deletes_stored_cart() {
        let store = SharedStore::default();
        let mut session = open(&store);
        session.add(kurta(1)).unwrap();
        session.discard().unwrap();

        assert!(!store.exists(&cart_key("sess_1")).unwrap());
    }
}
