use std::sync::Arc;

use crate::{
    app_error::AppError,
    authz::RestaurantScope,
    domain::{menu::Restaurant, user::User},
    store::Store,
};

/// Read-only access to restaurants and menus of the caller's country.
#[derive(Clone)]
pub struct MenuCatalog {
    store: Arc<dyn Store>,
}

impl MenuCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_restaurants(&self, user: &User) -> Result<Vec<Restaurant>, AppError> {
        let restaurants = self
            .store
            .list_restaurants(RestaurantScope::for_user(user))
            .await?;
        Ok(restaurants)
    }
}
