//! Product listing and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query as UrlQuery, State};
use serde::Deserialize;
use tracing::instrument;

use unison_core::ProductId;

use crate::backend::{Product, Query, SortOrder};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::wishlist;
use crate::state::AppState;

/// Product display data for the card partial.
#[derive(Clone)]
pub struct ProductCardView {
    pub product: Product,
    /// Whether the signed-in user has this product in their wishlist.
    pub in_wishlist: bool,
    /// Whether a user is signed in (controls the heart button behavior).
    pub signed_in: bool,
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub category: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: Product,
    pub in_wishlist: bool,
    pub signed_in: bool,
}

/// Display the product listing, optionally filtered by category.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    UrlQuery(list): UrlQuery<ListQuery>,
) -> Result<ProductsIndexTemplate> {
    let mut query = Query::table("products").order("created_at", SortOrder::Descending);
    if let Some(category) = &list.category {
        query = query.eq("category", category);
    }

    let products: Vec<Product> = state.rest().select(query).await?;
    let saved = wishlist::membership_for(&state, user.as_ref()).await;
    let signed_in = user.is_some();

    Ok(ProductsIndexTemplate {
        products: products
            .into_iter()
            .map(|product| ProductCardView {
                in_wishlist: saved.contains(&product.id),
                signed_in,
                product,
            })
            .collect(),
        category: list.category,
    })
}

/// Display a product detail page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let products: Vec<Product> = state
        .rest()
        .select(Query::table("products").eq("id", id).limit(1))
        .await?;
    let product = products
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let saved = wishlist::membership_for(&state, user.as_ref()).await;

    Ok(ProductShowTemplate {
        in_wishlist: saved.contains(&product.id),
        signed_in: user.is_some(),
        product,
    })
}
