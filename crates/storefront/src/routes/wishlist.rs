//! Wishlist route handlers.
//!
//! The heart button on product cards posts to `/wishlist/toggle` and swaps
//! itself with the returned fragment, so membership state always reflects the
//! backend after the round trip.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use unison_core::ProductId;

use crate::backend::RestClient;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::routes::products::ProductCardView;
use crate::services::WishlistService;
use crate::state::AppState;

/// Build a wishlist container for the request's user and load its snapshot.
pub(crate) async fn load_wishlist(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> WishlistService<RestClient> {
    let store = user.map_or_else(
        || state.rest().clone(),
        |user| state.rest_as_user(&user.access_token),
    );
    let mut wishlist = WishlistService::new(store, user.map(|u| u.id));
    wishlist.refresh().await;
    wishlist
}

/// The set of product IDs in the user's wishlist, for marking hearts on
/// product cards. Empty when signed out.
pub(crate) async fn membership_for(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> HashSet<ProductId> {
    let Some(user) = user else {
        return HashSet::new();
    };
    let wishlist = load_wishlist(state, Some(user)).await;
    wishlist
        .items()
        .iter()
        .map(|item| item.product_id)
        .collect()
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub products: Vec<ProductCardView>,
}

/// Heart button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: ProductId,
    pub in_wishlist: bool,
    pub signed_in: bool,
}

/// Wishlist count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_count.html")]
pub struct WishlistCountTemplate {
    pub count: usize,
}

/// Display the wishlist page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let wishlist = load_wishlist(&state, Some(&user)).await;
    WishlistShowTemplate {
        products: wishlist
            .items()
            .iter()
            .map(|item| ProductCardView {
                product: item.product.clone(),
                in_wishlist: true,
                signed_in: true,
            })
            .collect(),
    }
}

/// Toggle a product's wishlist membership (HTMX).
///
/// Signed-out fragment requests are rejected with 401 by the extractor;
/// full-page form posts are redirected to the login page.
#[instrument(skip(state, user))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Response {
    let mut wishlist = load_wishlist(&state, Some(&user)).await;
    wishlist.toggle(form.product_id).await;

    (
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
        WishlistButtonTemplate {
            product_id: form.product_id,
            in_wishlist: wishlist.contains(form.product_id),
            signed_in: true,
        },
    )
        .into_response()
}

/// Get wishlist count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let wishlist = load_wishlist(&state, user.as_ref()).await;
    WishlistCountTemplate {
        count: wishlist.count(),
    }
}
