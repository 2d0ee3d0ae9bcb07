//! Row types for the hosted backend relations.
//!
//! These mirror the fixed column schema of the remote database. Every entity
//! is owned by the backend; the application only ever holds transient copies
//! that are discarded and wholly replaced after each mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unison_core::{
    CartItemId, OrderId, OrderItemId, OrderStatus, ProductId, ReviewId, UserId, WishlistItemId,
};

// =============================================================================
// Products
// =============================================================================

/// A product row. Read-only from the storefront's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub images: Vec<String>,
    pub stock_quantity: i64,
    pub is_top_selling: bool,
    pub rating: f64,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First image, if any. Templates use this as the card image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Low-stock badge threshold: more than zero but fewer than ten left.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_quantity > 0 && self.stock_quantity < 10
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A bare `cart_items` row, as written to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemRow {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line item with its joined product snapshot, as returned by
/// `cart_items?select=*,product:products(*)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product: Product,
}

impl CartItem {
    /// Whether this line matches an (product, size, color) variant key.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, size: &str, color: &str) -> bool {
        self.product_id == product_id && self.size == size && self.color == color
    }

    /// Line subtotal (unit price times quantity).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

/// Insert payload for a new cart line.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: String,
    pub color: String,
}

// =============================================================================
// Wishlist
// =============================================================================

/// A bare `wishlist_items` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItemRow {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// A wishlist entry with its joined product snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub product: Product,
}

/// Insert payload for a new wishlist entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewWishlistItem {
    pub user_id: UserId,
    pub product_id: ProductId,
}

// =============================================================================
// Profiles
// =============================================================================

/// A `profiles` row keyed by the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Orders and reviews
// =============================================================================

/// An `orders` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// An `order_items` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    pub price_at_purchase: f64,
    pub created_at: DateTime<Utc>,
}

/// A `reviews` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
