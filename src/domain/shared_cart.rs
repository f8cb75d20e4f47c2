use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ItemLine, menu::MenuItem, user::Country, user::UserSummary};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct SharedCartItem {
    pub id: Uuid,
    pub menu_item: MenuItem,
    pub quantity: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct SharedCart {
    pub id: Uuid,
    pub share_code: String,
    pub country: Country,
    pub created_by: UserSummary,
    pub items: Vec<SharedCartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSharedCart {
    pub share_code: String,
    pub country: Country,
    pub created_by_id: Uuid,
    /// Already merged by menu item.
    pub lines: Vec<ItemLine>,
}
