//! REST API router for the storefront order service.
//!
//! Used by the binary and by integration tests. Create with [`create_router`].
//! Uses Extension for state so the router is `Router<()>` and works with `into_make_service()`.
//!
//! `POST /orders/import`, `GET /orders` and `PATCH /orders/:id` double as the remote
//! order resource that [`crate::gateway::HttpGateway`] talks to.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;

use crate::audit::InMemoryAuditSink;
use crate::catalog::{CatalogProvider, StaticCatalog};
use crate::error::OrderError;
use crate::gateway::{Gateway, StatusPatch};
use crate::manager::OrderManager;
use crate::service::OrderService;
use crate::types::{CategoryId, CustomerDetails, Order, OrderId, OrderStatus, ProductId};

/// Shared app state: one order service and one catalog per process.
#[derive(Clone)]
pub struct AppState {
    pub(crate) service: OrderService<Gateway>,
    pub(crate) catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(service: OrderService<Gateway>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { service, catalog }
    }

    /// In-memory service, strict transitions, the given catalog.
    pub fn local(catalog: StaticCatalog) -> Self {
        let service = OrderService::new(
            OrderManager::new(),
            Gateway::default(),
            Arc::new(InMemoryAuditSink::new()),
        );
        Self::new(service, Arc::new(catalog))
    }

    pub fn service(&self) -> &OrderService<Gateway> {
        &self.service
    }
}

/// Builds the REST router with state. Returns `Router<()>` so you can call `.into_make_service()` for `axum::serve`.
pub fn create_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/health", get(health))
        .route("/catalog/categories", get(list_categories))
        .route("/catalog/products", get(list_products))
        .route("/catalog/products/:id", get(get_product))
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_cart_item))
        .route(
            "/cart/items/:product_id",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/stats", get(order_stats))
        .route("/orders/import", post(import_order))
        .route("/orders/:id", get(get_order).patch(patch_order))
        .route("/orders/:id/cancel", post(cancel_order))
        .layer(Extension(state))
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = match self {
            OrderError::EmptyCart
            | OrderError::MissingField(_)
            | OrderError::InvalidQuantity(_)
            | OrderError::IdOutOfRange(_)
            | OrderError::DuplicateLine(_)
            | OrderError::ProductMismatch(_)
            | OrderError::NegativePrice(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::IllegalTransition { .. } | OrderError::DuplicateOrder(_) => StatusCode::CONFLICT,
        };
        error(status, self.to_string())
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Order plus its derived totals, as sent to clients.
#[derive(serde::Serialize)]
struct OrderView<'a> {
    #[serde(flatten)]
    order: &'a Order,
    total_amount: Decimal,
    item_count: u64,
}

impl<'a> OrderView<'a> {
    fn of(order: &'a Order) -> Self {
        Self {
            order,
            total_amount: order.total_amount(),
            item_count: order.item_count(),
        }
    }
}

fn order_list(orders: &[Order]) -> Json<Vec<OrderView<'_>>> {
    Json(orders.iter().map(OrderView::of).collect())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn list_categories(Extension(state): Extension<AppState>) -> Response {
    Json(state.catalog.categories()).into_response()
}

#[derive(serde::Deserialize)]
struct ProductQuery {
    category_id: Option<u64>,
}

async fn list_products(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let products = match query.category_id {
        Some(id) => state.catalog.products_by_category(CategoryId(id)),
        None => state.catalog.products(),
    };
    Json(products).into_response()
}

async fn get_product(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    match state.catalog.product(ProductId(id)) {
        Some(product) => Json(product).into_response(),
        None => error(StatusCode::NOT_FOUND, format!("product {} not found", id)),
    }
}

async fn get_cart(Extension(state): Extension<AppState>) -> Response {
    Json(state.service.cart()).into_response()
}

#[derive(serde::Deserialize)]
struct AddItemRequest {
    product_id: u64,
    quantity: Option<u32>,
}

async fn add_cart_item(
    Extension(state): Extension<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Response {
    let quantity = body.quantity.unwrap_or(1);
    if quantity == 0 {
        return error(StatusCode::BAD_REQUEST, "quantity must be at least 1");
    }
    let Some(product) = state.catalog.product(ProductId(body.product_id)) else {
        return error(
            StatusCode::NOT_FOUND,
            format!("product {} not found", body.product_id),
        );
    };
    if !product.in_stock() {
        return error(
            StatusCode::CONFLICT,
            format!("product {} is out of stock", product.id),
        );
    }
    state.service.add_to_cart(&product, quantity);
    Json(state.service.cart()).into_response()
}

#[derive(serde::Deserialize)]
struct UpdateQuantityRequest {
    quantity: i64,
}

async fn update_cart_item(
    Extension(state): Extension<AppState>,
    Path(product_id): Path<u64>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Response {
    state
        .service
        .update_quantity(ProductId(product_id), body.quantity);
    Json(state.service.cart()).into_response()
}

async fn remove_cart_item(
    Extension(state): Extension<AppState>,
    Path(product_id): Path<u64>,
) -> Response {
    state.service.remove_from_cart(ProductId(product_id));
    Json(state.service.cart()).into_response()
}

async fn clear_cart(Extension(state): Extension<AppState>) -> Response {
    state.service.clear_cart();
    Json(state.service.cart()).into_response()
}

async fn create_order(
    Extension(state): Extension<AppState>,
    Json(customer): Json<CustomerDetails>,
) -> Response {
    match state.service.create_order(customer).await {
        Ok(order) => (StatusCode::CREATED, Json(OrderView::of(&order))).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn list_orders(
    Extension(state): Extension<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let orders = match query.limit {
        Some(n) => state.service.recent_orders(n),
        None => state.service.order_history(),
    };
    order_list(&orders).into_response()
}

async fn get_order(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    match state.service.order(OrderId(id)) {
        Some(order) => Json(OrderView::of(&order)).into_response(),
        None => OrderError::NotFound(OrderId(id)).into_response(),
    }
}

async fn patch_order(
    Extension(state): Extension<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<StatusPatch>,
) -> Response {
    let order_id = OrderId(id);
    match state.service.update_status(order_id, body.status).await {
        Ok(_) => match state.service.order(order_id) {
            Some(order) => Json(OrderView::of(&order)).into_response(),
            None => OrderError::NotFound(order_id).into_response(),
        },
        Err(e) => e.into_response(),
    }
}

async fn cancel_order(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    let order_id = OrderId(id);
    match state.service.cancel_order(order_id).await {
        Ok(previous) => {
            #[derive(serde::Serialize)]
            struct Out {
                cancelled: bool,
                previous_status: OrderStatus,
            }
            Json(Out {
                cancelled: true,
                previous_status: previous,
            })
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn order_stats(Extension(state): Extension<AppState>) -> Response {
    Json(state.service.stats()).into_response()
}

async fn import_order(
    Extension(state): Extension<AppState>,
    Json(order): Json<Order>,
) -> Response {
    let id = order.id();
    match state.service.import_order(order) {
        Ok(()) => match state.service.order(id) {
            Some(order) => (StatusCode::CREATED, Json(OrderView::of(&order))).into_response(),
            None => OrderError::NotFound(id).into_response(),
        },
        Err(e) => e.into_response(),
    }
}
