//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation goes through the cart container, which re-fetches the whole
//! cart afterwards, so fragments always render from a fresh snapshot.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use unison_core::{CartItemId, ProductId};

use crate::backend::{CartItem, RestClient};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::CartService;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: i64,
    pub unit_price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            name: item.product.name.clone(),
            image: item.product.primary_image().map(String::from),
            size: item.size.clone(),
            color: item.color.clone(),
            quantity: item.quantity,
            unit_price: filters::format_price(item.product.price),
            line_price: filters::format_price(item.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&CartService<RestClient>> for CartView {
    fn from(cart: &CartService<RestClient>) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: filters::format_price(cart.subtotal()),
            item_count: cart.count(),
        }
    }
}

/// Build a cart container for the request's user and load its snapshot.
pub(crate) async fn load_cart(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> CartService<RestClient> {
    let store = user.map_or_else(
        || state.rest().clone(),
        |user| state.rest_as_user(&user.access_token),
    );
    let mut cart = CartService::new(store, user.map(|u| u.id));
    cart.refresh().await;
    cart
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: Option<i64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub signed_in: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Display cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = load_cart(&state, user.as_ref()).await;
    CartShowTemplate {
        cart: CartView::from(&cart),
        signed_in: user.is_some(),
    }
}

/// Add item to cart (HTMX).
///
/// Adding the same variant again increments the existing line instead of
/// creating a duplicate. Returns the count badge with an HTMX trigger so
/// other cart fragments refresh themselves.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let mut cart = load_cart(&state, Some(&user)).await;
    cart.add(
        form.product_id,
        &form.size,
        &form.color,
        form.quantity.unwrap_or(1),
    )
    .await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count: cart.count() },
    )
        .into_response()
}

/// Update cart line quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut cart = load_cart(&state, Some(&user)).await;
    cart.update_quantity(form.item_id, form.quantity).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut cart = load_cart(&state, Some(&user)).await;
    cart.remove(form.item_id).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Empty the cart (HTMX).
#[instrument(skip(state, user))]
pub async fn clear(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Response {
    let mut cart = load_cart(&state, Some(&user)).await;
    cart.clear().await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = load_cart(&state, user.as_ref()).await;
    CartCountTemplate { count: cart.count() }
}
