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
    domain::{
        ItemLine,
        shared_cart::SharedCart,
        user::{Country, User},
    },
    extract::AppJson,
    middleware,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/shared-carts",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_shared_carts, create_shared_cart))
            .routes(utoipa_axum::routes!(get_my_shared_carts))
            .routes(utoipa_axum::routes!(get_shared_cart_by_code))
            .routes(utoipa_axum::routes!(add_items_to_shared_cart))
            .routes(utoipa_axum::routes!(delete_shared_cart))
            .route_layer(axum::middleware::from_fn(middleware::authenticated)),
    )
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSharedCartReq {
    pub country: Country,
    pub items: Vec<ItemLine>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddItemsReq {
    pub items: Vec<ItemLine>,
}

/// Fetch all shared carts of the caller's country.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Shared carts"],
    responses(
        (status = 200, description = "List shared carts", body = StdResponse<Vec<SharedCart>, String>)
    )
)]
async fn get_shared_carts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let carts = state.shared_carts.find_by_country(&user).await?;

    Ok(StdResponse {
        data: Some(carts),
        message: Some("Get shared carts successfully"),
    })
}

/// Create a shared cart visible to everyone in the given country.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Shared carts"],
    request_body = CreateSharedCartReq,
    responses(
        (status = 200, description = "Created shared cart successfully", body = StdResponse<SharedCart, String>),
        (status = 404, description = "Unknown menu item"),
        (status = 409, description = "No unique share code could be allocated")
    )
)]
async fn create_shared_cart(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<CreateSharedCartReq>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state
        .shared_carts
        .create(&user, body.country, body.items)
        .await?;

    info!(
        "Shared cart {} created by {} for {}",
        cart.id, user.id, cart.country
    );

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Create shared cart successfully"),
    })
}

/// Fetch the shared carts created by the caller.
#[utoipa::path(
    get,
    path = "/mine",
    tags = ["Shared carts"],
    responses(
        (status = 200, description = "List my shared carts", body = StdResponse<Vec<SharedCart>, String>)
    )
)]
async fn get_my_shared_carts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let carts = state.shared_carts.find_mine(user.id).await?;

    Ok(StdResponse {
        data: Some(carts),
        message: Some("Get my shared carts successfully"),
    })
}

/// Fetch a shared cart by its share code.
#[utoipa::path(
    get,
    path = "/code/{code}",
    tags = ["Shared carts"],
    params(
        ("code" = String, Path, description = "Share code of the cart")
    ),
    responses(
        (status = 200, description = "Get shared cart successfully", body = StdResponse<SharedCart, String>),
        (status = 403, description = "Cart belongs to another country"),
        (status = 404, description = "Shared cart not found")
    )
)]
async fn get_shared_cart_by_code(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.shared_carts.find_by_code(&code, &user).await?;

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Get shared cart successfully"),
    })
}

/// Add items to a shared cart of the caller's country.
#[utoipa::path(
    post,
    path = "/{id}/items",
    tags = ["Shared carts"],
    params(
        ("id" = Uuid, Path, description = "Shared cart ID")
    ),
    request_body = AddItemsReq,
    responses(
        (status = 200, description = "Added items successfully", body = StdResponse<SharedCart, String>),
        (status = 403, description = "Cart belongs to another country"),
        (status = 404, description = "Shared cart or menu item not found")
    )
)]
async fn add_items_to_shared_cart(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<AddItemsReq>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.shared_carts.add_items(id, body.items, &user).await?;

    info!("Items added to shared cart {} by {}", cart.id, user.id);

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Added items successfully"),
    })
}

/// Delete a shared cart. Only its creator may do so.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Shared carts"],
    params(
        ("id" = Uuid, Path, description = "Shared cart ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted shared cart successfully", body = StdResponse<SharedCart, String>),
        (status = 403, description = "Caller did not create the cart"),
        (status = 404, description = "Shared cart not found")
    )
)]
async fn delete_shared_cart(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.shared_carts.delete(id, user.id).await?;

    info!("Shared cart {} deleted by {}", cart.id, user.id);

    Ok(StdResponse {
        data: Some(cart),
        message: Some("Deleted shared cart successfully"),
    })
}
