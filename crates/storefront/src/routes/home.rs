//! Home page and hero carousel route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query as UrlQuery, State};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::{Product, Query, SortOrder};
use crate::carousel::{self, Direction};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::ProductCardView;
use crate::routes::wishlist;
use crate::state::AppState;

/// Number of products in the hero carousel.
const HERO_SLIDES: u32 = 3;

/// Number of top-selling products on the home page.
const TOP_SELLING_LIMIT: u32 = 6;

/// Number of new arrivals on the home page.
const NEW_ARRIVALS_LIMIT: u32 = 4;

/// Autoplay interval for the hero carousel, in milliseconds.
pub const HERO_AUTOPLAY_MS: u32 = 5000;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Products featured in the hero carousel.
    pub hero_products: Vec<Product>,
    /// Currently displayed hero slide.
    pub hero_index: usize,
    /// Hero autoplay interval in milliseconds.
    pub autoplay_ms: u32,
    /// Top-selling products by rating.
    pub top_selling: Vec<ProductCardView>,
    /// Most recently added products.
    pub new_arrivals: Vec<ProductCardView>,
}

/// Hero carousel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/hero.html")]
pub struct HeroTemplate {
    pub hero_products: Vec<Product>,
    pub hero_index: usize,
    pub autoplay_ms: u32,
}

/// Query parameters for hero carousel navigation.
#[derive(Debug, Deserialize)]
pub struct HeroQuery {
    /// Currently displayed slide index.
    pub index: Option<usize>,
    /// `next` or `prev`; absent for direct (dot) selection.
    pub dir: Option<String>,
}

/// Fetch the hero carousel products (the best-rated top sellers), falling
/// back to an empty carousel.
async fn hero_products(state: &AppState) -> Vec<Product> {
    state
        .rest()
        .select(
            Query::table("products")
                .eq("is_top_selling", "true")
                .order("rating", SortOrder::Descending)
                .limit(HERO_SLIDES),
        )
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch hero products: {e}");
            Vec::new()
        })
}

/// Fetch a home page product strip, falling back to an empty strip.
async fn product_strip(state: &AppState, query: Query, what: &str) -> Vec<Product> {
    state.rest().select(query).await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch {what}: {e}");
        Vec::new()
    })
}

/// Display the home page.
#[instrument(skip(state, user))]
pub async fn home(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> HomeTemplate {
    let hero = hero_products(&state).await;
    let top_selling = product_strip(
        &state,
        Query::table("products")
            .eq("is_top_selling", "true")
            .order("rating", SortOrder::Descending)
            .limit(TOP_SELLING_LIMIT),
        "top-selling products",
    )
    .await;
    let new_arrivals = product_strip(
        &state,
        Query::table("products")
            .order("created_at", SortOrder::Descending)
            .limit(NEW_ARRIVALS_LIMIT),
        "new arrivals",
    )
    .await;

    let saved = wishlist::membership_for(&state, user.as_ref()).await;
    let signed_in = user.is_some();
    let card = |product: Product| ProductCardView {
        in_wishlist: saved.contains(&product.id),
        signed_in,
        product,
    };

    HomeTemplate {
        hero_products: hero,
        hero_index: 0,
        autoplay_ms: HERO_AUTOPLAY_MS,
        top_selling: top_selling.into_iter().map(&card).collect(),
        new_arrivals: new_arrivals.into_iter().map(&card).collect(),
    }
}

/// Hero carousel navigation fragment (HTMX).
///
/// Arrow clicks and the autoplay timer both land here; the response swaps the
/// whole carousel with the slide at the wrapped neighbor index.
#[instrument(skip(state))]
pub async fn hero(
    State(state): State<AppState>,
    UrlQuery(query): UrlQuery<HeroQuery>,
) -> HeroTemplate {
    let hero_products = hero_products(&state).await;
    let current = query.index.unwrap_or(0);

    let hero_index = match query.dir.as_deref().and_then(Direction::parse) {
        Some(direction) => carousel::step(current, hero_products.len(), direction),
        None => carousel::select(current, hero_products.len()),
    };

    HeroTemplate {
        hero_products,
        hero_index,
        autoplay_ms: HERO_AUTOPLAY_MS,
    }
}
