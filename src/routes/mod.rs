pub mod orders;
pub mod restaurants;
pub mod shared_carts;

use utoipa_axum::router::OpenApiRouter;

use crate::app_state::AppState;

/// All API routes together with their OpenAPI description.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    orders::routes_with_openapi()
        .merge(shared_carts::routes_with_openapi())
        .merge(restaurants::routes_with_openapi())
}
