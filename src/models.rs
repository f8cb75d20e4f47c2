use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use uuid::Uuid;

use crate::domain::{menu::MenuItem, user::UserSummary};

// Users

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub country: String,
}

impl UserEntity {
    pub fn into_summary(self) -> Result<UserSummary> {
        Ok(UserSummary {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role.parse()?,
            country: self.country.parse()?,
        })
    }
}

// Restaurants & menu

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RestaurantEntity {
    pub id: Uuid,
    pub name: String,
    pub country: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemEntity {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

impl From<MenuItemEntity> for MenuItem {
    fn from(entity: MenuItemEntity) -> Self {
        MenuItem {
            id: entity.id,
            restaurant_id: entity.restaurant_id,
            name: entity.name,
            price: entity.price,
        }
    }
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub position: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub position: i32,
}

// Shared carts

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::shared_carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SharedCartEntity {
    pub id: Uuid,
    pub share_code: String,
    pub country: String,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::shared_carts)]
pub struct CreateSharedCartEntity {
    pub id: Uuid,
    pub share_code: String,
    pub country: String,
    pub created_by_id: Uuid,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::shared_cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SharedCartItemEntity {
    pub id: Uuid,
    pub shared_cart_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::shared_cart_items)]
pub struct CreateSharedCartItemEntity {
    pub id: Uuid,
    pub shared_cart_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
}
