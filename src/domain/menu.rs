use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Country;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    #[schema(value_type = String, example = "14.50")]
    pub price: BigDecimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub country: Country,
    pub menu_items: Vec<MenuItem>,
}

/// Authoritative price and tenant of a menu item, as read when pricing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedMenuItem {
    pub item: MenuItem,
    pub restaurant_country: Country,
}
