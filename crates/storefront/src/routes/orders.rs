//! Order history route handlers. Read-only; orders are placed elsewhere.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::backend::{Order, Query, SortOrder};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status_label: &'static str,
    pub is_terminal: bool,
    pub total: String,
    pub placed_on: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            status_label: order.status.label(),
            is_terminal: order.status.is_terminal(),
            total: filters::format_price(order.total_amount),
            placed_on: order.created_at.format("%B %e, %Y").to_string(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderView>,
}

/// Display the signed-in user's order history, newest first.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersIndexTemplate> {
    let orders: Vec<Order> = state
        .rest_as_user(&user.access_token)
        .select(
            Query::table("orders")
                .eq("user_id", user.id)
                .order("created_at", SortOrder::Descending),
        )
        .await?;

    Ok(OrdersIndexTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
