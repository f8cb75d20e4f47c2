use axum::{Extension, extract::State, response::IntoResponse};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    domain::{menu::Restaurant, user::User},
    middleware,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/restaurants",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_restaurants))
            .route_layer(axum::middleware::from_fn(middleware::authenticated)),
    )
}

/// Fetch the restaurants and menus of the caller's country.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Restaurants"],
    responses(
        (status = 200, description = "List restaurants", body = StdResponse<Vec<Restaurant>, String>)
    )
)]
async fn get_restaurants(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let restaurants = state.menu.list_restaurants(&user).await?;

    Ok(StdResponse {
        data: Some(restaurants),
        message: Some("Get restaurants successfully"),
    })
}
