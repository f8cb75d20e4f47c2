use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    domain::{ItemLine, order::Order, user::User},
    extract::AppJson,
    middleware,
};

/// Defines all order routes. Every route requires a caller identity.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_orders, create_order))
            .routes(utoipa_axum::routes!(checkout_order))
            .routes(utoipa_axum::routes!(cancel_order))
            .route_layer(axum::middleware::from_fn(middleware::authenticated)),
    )
}

#[derive(Deserialize, ToSchema)]
pub struct CreateOrderReq {
    pub items: Vec<ItemLine>,
}

/// List orders visible to the caller: their own for members, the whole country for staff.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Orders"],
    responses(
        (status = 200, description = "List orders", body = StdResponse<Vec<Order>, String>)
    )
)]
async fn get_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_orders(&user).await?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get orders successfully"),
    })
}

/// Place an order. Prices come from the menu, never from the request.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Orders"],
    request_body = CreateOrderReq,
    responses(
        (status = 200, description = "Created order successfully", body = StdResponse<Order, String>),
        (status = 400, description = "Empty item list or non-positive quantity"),
        (status = 403, description = "Menu item belongs to another country"),
        (status = 404, description = "Unknown menu item")
    )
)]
async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<CreateOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.create_order(&user, body.items).await?;

    info!(
        "Order #{} created by {} with total {}",
        order.id, user.id, order.total
    );

    Ok(StdResponse {
        data: Some(order),
        message: Some("Create order successfully"),
    })
}

/// Mark an order as paid. Admins and managers of the owner's country only.
#[utoipa::path(
    patch,
    path = "/{id}/checkout",
    tags = ["Orders"],
    params(
        ("id" = Uuid, Path, description = "Order ID to check out")
    ),
    responses(
        (status = 200, description = "Checked out order successfully", body = StdResponse<Order, String>),
        (status = 403, description = "Role or country does not allow checkout"),
        (status = 404, description = "Order not found")
    )
)]
async fn checkout_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.checkout(id, &user).await?;

    info!("Order #{} has been paid by {}", order.id, user.id);

    Ok(StdResponse {
        data: Some(order),
        message: Some("Checked out order successfully"),
    })
}

/// Cancel an order. Admins and managers of the owner's country only.
#[utoipa::path(
    patch,
    path = "/{id}/cancel",
    tags = ["Orders"],
    params(
        ("id" = Uuid, Path, description = "Order ID to cancel")
    ),
    responses(
        (status = 200, description = "Cancelled order successfully", body = StdResponse<Order, String>),
        (status = 403, description = "Role or country does not allow cancelling"),
        (status = 404, description = "Order not found")
    )
)]
async fn cancel_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.cancel(id, &user).await?;

    info!("Order #{} has been cancelled by {}", order.id, user.id);

    Ok(StdResponse {
        data: Some(order),
        message: Some("Cancelled order successfully"),
    })
}
