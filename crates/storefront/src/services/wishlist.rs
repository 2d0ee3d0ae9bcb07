//! Wishlist container.
//!
//! Mirrors the `wishlist_items` relation (joined with `products`) for the
//! current user. Conceptually a set of products; membership is the primary
//! operation.

use async_trait::async_trait;

use unison_core::{ProductId, UserId};

use crate::backend::{BackendError, NewWishlistItem, Query, RestClient, WishlistItem};

/// Remote operations the wishlist container needs.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// All wishlist entries for `user`, each with its joined product.
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<WishlistItem>, BackendError>;
    /// Insert a new entry.
    async fn insert(&self, row: NewWishlistItem) -> Result<(), BackendError>;
    /// Delete the entry for (`user`, `product`).
    async fn delete_for_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<(), BackendError>;
}

#[async_trait]
impl WishlistStore for RestClient {
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<WishlistItem>, BackendError> {
        self.select(
            Query::table("wishlist_items")
                .select("*,product:products(*)")
                .eq("user_id", user),
        )
        .await
    }

    async fn insert(&self, row: NewWishlistItem) -> Result<(), BackendError> {
        RestClient::insert(self, "wishlist_items", &row).await
    }

    async fn delete_for_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<(), BackendError> {
        RestClient::delete(
            self,
            Query::table("wishlist_items")
                .eq("user_id", user)
                .eq("product_id", product),
        )
        .await
    }
}

/// The wishlist container.
///
/// Same contract as the cart container: a whole-collection snapshot,
/// re-fetched in full after every mutation, empty when signed out.
pub struct WishlistService<S> {
    store: S,
    user: Option<UserId>,
    items: Vec<WishlistItem>,
    loading: bool,
}

impl<S: WishlistStore> WishlistService<S> {
    /// Create a container for `user` (or a signed-out one when `None`).
    pub const fn new(store: S, user: Option<UserId>) -> Self {
        Self {
            store,
            user,
            items: Vec::new(),
            loading: false,
        }
    }

    /// The current snapshot of wishlist entries.
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    /// Number of saved products (the header badge number).
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Membership test by product identity against the current snapshot.
    #[must_use]
    pub fn contains(&self, product: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product)
    }

    /// Replace the snapshot with a full fetch for the current user.
    /// Same failure policy as the cart container.
    pub async fn refresh(&mut self) {
        let Some(user) = self.user else {
            self.items.clear();
            return;
        };

        self.loading = true;
        match self.store.fetch_for_user(user).await {
            Ok(items) => self.items = items,
            Err(e) => tracing::warn!("failed to fetch wishlist for {user}: {e}"),
        }
        self.loading = false;
    }

    /// Save a product. No-op when signed out. Always ends with a refresh.
    pub async fn add(&mut self, product: ProductId) {
        let Some(user) = self.user else {
            return;
        };

        let row = NewWishlistItem {
            user_id: user,
            product_id: product,
        };
        if let Err(e) = self.store.insert(row).await {
            tracing::warn!("failed to add wishlist entry: {e}");
        }
        self.refresh().await;
    }

    /// Unsave a product. No-op when signed out. Always ends with a refresh.
    pub async fn remove(&mut self, product: ProductId) {
        let Some(user) = self.user else {
            return;
        };

        if let Err(e) = self.store.delete_for_product(user, product).await {
            tracing::warn!("failed to remove wishlist entry: {e}");
        }
        self.refresh().await;
    }

    /// Flip membership: saved products are removed, unsaved ones added.
    pub async fn toggle(&mut self, product: ProductId) {
        if self.contains(product) {
            self.remove(product).await;
        } else {
            self.add(product).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use uuid::Uuid;

    use unison_core::WishlistItemId;

    use crate::backend::Product;
    use crate::backend::types::tests::test_product;

    use super::*;

    /// In-memory stand-in for the remote `wishlist_items` relation.
    #[derive(Clone)]
    struct FakeWishlistStore {
        products: Arc<HashMap<ProductId, Product>>,
        rows: Arc<Mutex<Vec<WishlistItem>>>,
    }

    impl FakeWishlistStore {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products: Arc::new(products.into_iter().map(|p| (p.id, p)).collect()),
                rows: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl WishlistStore for FakeWishlistStore {
        async fn fetch_for_user(&self, user: UserId) -> Result<Vec<WishlistItem>, BackendError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.user_id == user)
                .cloned()
                .collect())
        }

        async fn insert(&self, row: NewWishlistItem) -> Result<(), BackendError> {
            let product = self.products.get(&row.product_id).unwrap().clone();
            self.rows.lock().unwrap().push(WishlistItem {
                id: WishlistItemId::new(Uuid::new_v4()),
                user_id: row.user_id,
                product_id: row.product_id,
                created_at: Utc::now(),
                product,
            });
            Ok(())
        }

        async fn delete_for_product(
            &self,
            user: UserId,
            product: ProductId,
        ) -> Result<(), BackendError> {
            self.rows
                .lock()
                .unwrap()
                .retain(|row| !(row.user_id == user && row.product_id == product));
            Ok(())
        }
    }

    fn user() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_signed_out_wishlist_is_empty_and_mutations_are_noops() {
        let tee = test_product("Tee", 29.0);
        let store = FakeWishlistStore::with_products(vec![tee.clone()]);
        let mut wishlist = WishlistService::new(store.clone(), None);

        wishlist.refresh().await;
        wishlist.add(tee.id).await;
        wishlist.toggle(tee.id).await;

        assert_eq!(wishlist.count(), 0);
        assert!(!wishlist.contains(tee.id));
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_membership_tracks_adds_and_removes() {
        let tee = test_product("Tee", 29.0);
        let hoodie = test_product("Hoodie", 59.0);
        let store = FakeWishlistStore::with_products(vec![tee.clone(), hoodie.clone()]);
        let mut wishlist = WishlistService::new(store, Some(user()));

        wishlist.refresh().await;
        wishlist.add(tee.id).await;
        wishlist.add(hoodie.id).await;
        assert!(wishlist.contains(tee.id));
        assert!(wishlist.contains(hoodie.id));
        assert_eq!(wishlist.count(), 2);

        wishlist.remove(tee.id).await;
        assert!(!wishlist.contains(tee.id));
        assert!(wishlist.contains(hoodie.id));
        assert_eq!(wishlist.count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_dispatches_on_membership() {
        let tee = test_product("Tee", 29.0);
        let store = FakeWishlistStore::with_products(vec![tee.clone()]);
        let mut wishlist = WishlistService::new(store, Some(user()));

        wishlist.refresh().await;
        wishlist.toggle(tee.id).await;
        assert!(wishlist.contains(tee.id));

        wishlist.toggle(tee.id).await;
        assert!(!wishlist.contains(tee.id));

        wishlist.toggle(tee.id).await;
        assert!(wishlist.contains(tee.id));
    }

    #[tokio::test]
    async fn test_final_membership_follows_add_remove_balance() {
        // membership(p) == (adds - removes for p) > 0, for any sequence
        let tee = test_product("Tee", 29.0);
        let store = FakeWishlistStore::with_products(vec![tee.clone()]);
        let mut wishlist = WishlistService::new(store, Some(user()));
        wishlist.refresh().await;

        wishlist.add(tee.id).await;
        wishlist.remove(tee.id).await;
        wishlist.add(tee.id).await;
        wishlist.add(tee.id).await; // second add of a present item
        wishlist.remove(tee.id).await; // removes every row for the product

        assert!(!wishlist.contains(tee.id));
    }

    #[tokio::test]
    async fn test_switching_user_replaces_contents() {
        let tee = test_product("Tee", 29.0);
        let hoodie = test_product("Hoodie", 59.0);
        let store = FakeWishlistStore::with_products(vec![tee.clone(), hoodie.clone()]);
        let (alice, bob) = (user(), user());

        let mut alice_list = WishlistService::new(store.clone(), Some(alice));
        alice_list.refresh().await;
        alice_list.add(tee.id).await;

        let mut bob_list = WishlistService::new(store.clone(), Some(bob));
        bob_list.refresh().await;
        bob_list.add(hoodie.id).await;

        let mut switched = WishlistService::new(store, Some(bob));
        switched.refresh().await;
        assert!(switched.contains(hoodie.id));
        assert!(!switched.contains(tee.id));
        assert_eq!(switched.count(), 1);
    }
}
