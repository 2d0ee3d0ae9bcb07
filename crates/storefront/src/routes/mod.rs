//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /hero                   - Hero carousel fragment (HTMX)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (backend reachability)
//!
//! # Products
//! GET  /products               - Product listing (optional ?category=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page (requires auth)
//! POST /wishlist/toggle        - Toggle membership (returns heart fragment)
//! GET  /wishlist/count         - Wishlist count badge (fragment)
//!
//! # Orders (requires auth)
//! GET  /orders                 - Order history
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/signup            - Signup page
//! POST /auth/signup            - Signup action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod home;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/count", get(wishlist::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page and hero carousel fragment
        .route("/", get(home::home))
        .route("/hero", get(home::hero))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Wishlist routes
        .nest("/wishlist", wishlist_routes())
        // Order history
        .route("/orders", get(orders::index))
        // Auth routes
        .nest("/auth", auth_routes())
}
