pub mod menu;
pub mod order;
pub mod shared_cart;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound for the quantity of one line, in a request or accumulated in a shared cart.
/// Matches the `quantity` CHECK constraints.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// A `(menu item, quantity)` pair as supplied by a caller.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ItemLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

impl ItemLine {
    pub fn new(menu_item_id: Uuid, quantity: i32) -> Self {
        Self {
            menu_item_id,
            quantity,
        }
    }
}
