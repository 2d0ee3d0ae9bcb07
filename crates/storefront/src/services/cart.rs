//! Cart container.
//!
//! Mirrors the `cart_items` relation (joined with `products`) for the current
//! user. Uniqueness of a (product, size, color) line is enforced here by
//! find-before-insert, not by a constraint visible through the row API, so
//! concurrent adds from two sessions can still create duplicate lines.

use async_trait::async_trait;
use serde_json::json;

use unison_core::{CartItemId, ProductId, UserId};

use crate::backend::{BackendError, CartItem, NewCartItem, Query, RestClient};

/// Remote operations the cart container needs.
///
/// Implemented by [`RestClient`] against the hosted backend; tests substitute
/// an in-memory fake.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All cart lines for `user`, each with its joined product snapshot.
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<CartItem>, BackendError>;
    /// Insert a new cart line.
    async fn insert(&self, row: NewCartItem) -> Result<(), BackendError>;
    /// Overwrite the quantity of one line.
    async fn set_quantity(&self, item: CartItemId, quantity: i64) -> Result<(), BackendError>;
    /// Delete one line.
    async fn delete(&self, item: CartItemId) -> Result<(), BackendError>;
    /// Delete every line belonging to `user`.
    async fn delete_for_user(&self, user: UserId) -> Result<(), BackendError>;
}

#[async_trait]
impl CartStore for RestClient {
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<CartItem>, BackendError> {
        self.select(
            Query::table("cart_items")
                .select("*,product:products(*)")
                .eq("user_id", user),
        )
        .await
    }

    async fn insert(&self, row: NewCartItem) -> Result<(), BackendError> {
        RestClient::insert(self, "cart_items", &row).await
    }

    async fn set_quantity(&self, item: CartItemId, quantity: i64) -> Result<(), BackendError> {
        self.update(
            Query::table("cart_items").eq("id", item),
            &json!({ "quantity": quantity }),
        )
        .await
    }

    async fn delete(&self, item: CartItemId) -> Result<(), BackendError> {
        RestClient::delete(self, Query::table("cart_items").eq("id", item)).await
    }

    async fn delete_for_user(&self, user: UserId) -> Result<(), BackendError> {
        RestClient::delete(self, Query::table("cart_items").eq("user_id", user)).await
    }
}

/// The cart container.
///
/// Holds the last fetched snapshot of the current user's cart. Every mutation
/// ends with a full [`refresh`](Self::refresh), so observed state is always
/// consistent with the remote store as of the last completed call.
pub struct CartService<S> {
    store: S,
    user: Option<UserId>,
    items: Vec<CartItem>,
    loading: bool,
}

impl<S: CartStore> CartService<S> {
    /// Create a container for `user` (or a signed-out one when `None`).
    ///
    /// The snapshot starts empty; call [`refresh`](Self::refresh) to populate.
    pub const fn new(store: S, user: Option<UserId>) -> Self {
        Self {
            store,
            user,
            items: Vec::new(),
            loading: false,
        }
    }

    /// The current snapshot of cart lines.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of line quantities (the header badge number).
    #[must_use]
    pub fn count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the snapshot with a full fetch for the current user.
    ///
    /// Signed out: the snapshot is cleared without touching the backend.
    /// On fetch failure the previous snapshot is kept (and the failure
    /// logged), matching the observed swallow-at-the-fetch-boundary policy.
    pub async fn refresh(&mut self) {
        let Some(user) = self.user else {
            self.items.clear();
            return;
        };

        self.loading = true;
        match self.store.fetch_for_user(user).await {
            Ok(items) => self.items = items,
            Err(e) => tracing::warn!("failed to fetch cart for {user}: {e}"),
        }
        self.loading = false;
    }

    /// Add `quantity` of a (product, size, color) variant.
    ///
    /// If a line with the same variant key already exists, its quantity is
    /// incremented instead of creating a duplicate line. No-op when signed
    /// out. Always ends with a refresh.
    pub async fn add(&mut self, product_id: ProductId, size: &str, color: &str, quantity: i64) {
        let Some(user) = self.user else {
            return;
        };

        let existing = self
            .items
            .iter()
            .find(|item| item.matches(product_id, size, color))
            .map(|item| (item.id, item.quantity));

        if let Some((id, current)) = existing {
            self.update_quantity(id, current + quantity).await;
        } else {
            let row = NewCartItem {
                user_id: user,
                product_id,
                quantity,
                size: size.to_string(),
                color: color.to_string(),
            };
            if let Err(e) = self.store.insert(row).await {
                tracing::warn!("failed to add cart line: {e}");
            }
            self.refresh().await;
        }
    }

    /// Set a line's quantity. A quantity of zero or less removes the line.
    /// Always ends with a refresh.
    pub async fn update_quantity(&mut self, item: CartItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove(item).await;
            return;
        }

        if let Err(e) = self.store.set_quantity(item, quantity).await {
            tracing::warn!("failed to update cart line {item}: {e}");
        }
        self.refresh().await;
    }

    /// Remove one line. Always ends with a refresh.
    pub async fn remove(&mut self, item: CartItemId) {
        if let Err(e) = self.store.delete(item).await {
            tracing::warn!("failed to remove cart line {item}: {e}");
        }
        self.refresh().await;
    }

    /// Remove every line for the current user. No-op when signed out.
    /// Always ends with a refresh.
    pub async fn clear(&mut self) {
        let Some(user) = self.user else {
            return;
        };

        if let Err(e) = self.store.delete_for_user(user).await {
            tracing::warn!("failed to clear cart for {user}: {e}");
        }
        self.refresh().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use uuid::Uuid;

    use crate::backend::types::tests::test_product;
    use crate::backend::{ApiError, Product};

    use super::*;

    /// In-memory stand-in for the remote `cart_items` relation.
    #[derive(Clone, Default)]
    struct FakeCartStore {
        products: Arc<HashMap<ProductId, Product>>,
        rows: Arc<Mutex<Vec<CartItem>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl FakeCartStore {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products: Arc::new(products.into_iter().map(|p| (p.id, p)).collect()),
                rows: Arc::new(Mutex::new(Vec::new())),
                fail: Arc::new(Mutex::new(false)),
            }
        }

        fn set_failing(&self, failing: bool) {
            *self.fail.lock().unwrap() = failing;
        }

        fn check(&self) -> Result<(), BackendError> {
            if *self.fail.lock().unwrap() {
                Err(BackendError::Api(ApiError {
                    code: None,
                    message: Some("injected failure".to_string()),
                    details: None,
                    hint: None,
                }))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CartStore for FakeCartStore {
        async fn fetch_for_user(&self, user: UserId) -> Result<Vec<CartItem>, BackendError> {
            self.check()?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.user_id == user)
                .cloned()
                .collect())
        }

        async fn insert(&self, row: NewCartItem) -> Result<(), BackendError> {
            self.check()?;
            let product = self.products.get(&row.product_id).unwrap().clone();
            self.rows.lock().unwrap().push(CartItem {
                id: CartItemId::new(Uuid::new_v4()),
                user_id: row.user_id,
                product_id: row.product_id,
                quantity: row.quantity,
                size: row.size,
                color: row.color,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                product,
            });
            Ok(())
        }

        async fn set_quantity(&self, item: CartItemId, quantity: i64) -> Result<(), BackendError> {
            self.check()?;
            if let Some(row) = self
                .rows
                .lock()
                .unwrap()
                .iter_mut()
                .find(|row| row.id == item)
            {
                row.quantity = quantity;
            }
            Ok(())
        }

        async fn delete(&self, item: CartItemId) -> Result<(), BackendError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|row| row.id != item);
            Ok(())
        }

        async fn delete_for_user(&self, user: UserId) -> Result<(), BackendError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|row| row.user_id != user);
            Ok(())
        }
    }

    fn user() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_signed_out_cart_is_empty_and_mutations_are_noops() {
        let tee = test_product("Tee", 29.0);
        let store = FakeCartStore::with_products(vec![tee.clone()]);
        let mut cart = CartService::new(store.clone(), None);

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 1).await;
        cart.clear().await;

        assert!(cart.items().is_empty());
        assert_eq!(cart.count(), 0);
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_creates_line_and_counts_quantities() {
        let tee = test_product("Tee", 29.0);
        let hoodie = test_product("Hoodie", 59.0);
        let store = FakeCartStore::with_products(vec![tee.clone(), hoodie.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 2).await;
        cart.add(hoodie.id, "L", "White", 1).await;

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.count(), 3);
        assert!((cart.subtotal() - (2.0 * 29.0 + 59.0)).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_add_existing_variant_increments_instead_of_duplicating() {
        // Worked example: A(qty 2), B(qty 1); add(A, 3) => single A line qty 5
        let a = test_product("A", 10.0);
        let b = test_product("B", 20.0);
        let store = FakeCartStore::with_products(vec![a.clone(), b.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(a.id, "M", "Black", 2).await;
        cart.add(b.id, "S", "White", 1).await;
        cart.add(a.id, "M", "Black", 3).await;

        let a_lines: Vec<_> = cart
            .items()
            .iter()
            .filter(|item| item.product_id == a.id)
            .collect();
        assert_eq!(a_lines.len(), 1);
        assert_eq!(a_lines.first().unwrap().quantity, 5);

        let b_line = cart
            .items()
            .iter()
            .find(|item| item.product_id == b.id)
            .unwrap();
        assert_eq!(b_line.quantity, 1);
    }

    #[tokio::test]
    async fn test_same_product_different_variant_is_a_new_line() {
        let tee = test_product("Tee", 29.0);
        let store = FakeCartStore::with_products(vec![tee.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 1).await;
        cart.add(tee.id, "L", "Black", 1).await;
        cart.add(tee.id, "M", "White", 1).await;

        assert_eq!(cart.items().len(), 3);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_is_remove() {
        let tee = test_product("Tee", 29.0);
        let store = FakeCartStore::with_products(vec![tee.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 2).await;
        let line = cart.items().first().unwrap().id;

        cart.update_quantity(line, 0).await;

        assert!(cart.items().is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[tokio::test]
    async fn test_update_quantity_overwrites() {
        let tee = test_product("Tee", 29.0);
        let store = FakeCartStore::with_products(vec![tee.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 2).await;
        let line = cart.items().first().unwrap().id;

        cart.update_quantity(line, 7).await;

        assert_eq!(cart.items().first().unwrap().quantity, 7);
        assert_eq!(cart.count(), 7);
    }

    #[tokio::test]
    async fn test_clear_then_refresh_is_empty() {
        let tee = test_product("Tee", 29.0);
        let hoodie = test_product("Hoodie", 59.0);
        let store = FakeCartStore::with_products(vec![tee.clone(), hoodie.clone()]);
        let mut cart = CartService::new(store, Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 2).await;
        cart.add(hoodie.id, "L", "White", 1).await;

        cart.clear().await;
        cart.refresh().await;

        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_switching_user_replaces_contents() {
        let tee = test_product("Tee", 29.0);
        let hoodie = test_product("Hoodie", 59.0);
        let store = FakeCartStore::with_products(vec![tee.clone(), hoodie.clone()]);
        let (alice, bob) = (user(), user());

        let mut alice_cart = CartService::new(store.clone(), Some(alice));
        alice_cart.refresh().await;
        alice_cart.add(tee.id, "M", "Black", 2).await;

        let mut bob_cart = CartService::new(store.clone(), Some(bob));
        bob_cart.refresh().await;
        bob_cart.add(hoodie.id, "L", "White", 1).await;

        // A fresh container for bob sees only bob's lines
        let mut switched = CartService::new(store, Some(bob));
        switched.refresh().await;
        assert_eq!(switched.items().len(), 1);
        assert_eq!(switched.items().first().unwrap().product_id, hoodie.id);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_snapshot() {
        let tee = test_product("Tee", 29.0);
        let store = FakeCartStore::with_products(vec![tee.clone()]);
        let mut cart = CartService::new(store.clone(), Some(user()));

        cart.refresh().await;
        cart.add(tee.id, "M", "Black", 2).await;
        assert_eq!(cart.count(), 2);

        store.set_failing(true);
        cart.refresh().await;

        // The last good snapshot survives a failed fetch
        assert_eq!(cart.count(), 2);
    }
}
