//! In-process store. Every call takes the one lock for its whole duration, so each operation is
//! atomic the same way a single transaction is in [`super::pg::PgStore`].

use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MenuStore, OrderStore, SharedCartStore, StoreError, StoreResult};
use crate::{
    authz::{OrderScope, RestaurantScope, SharedCartScope},
    domain::{
        ItemLine, MAX_LINE_QUANTITY,
        menu::{MenuItem, PricedMenuItem, Restaurant},
        order::{NewOrder, Order, OrderItem, OrderStatus},
        shared_cart::{NewSharedCart, SharedCart, SharedCartItem},
        user::{Country, User, UserSummary},
    },
};

struct RestaurantRow {
    id: Uuid,
    name: String,
    country: Country,
}

struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: OrderStatus,
    total: BigDecimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct LineRow {
    id: Uuid,
    parent_id: Uuid,
    menu_item_id: Uuid,
    quantity: i32,
}

struct SharedCartRow {
    id: Uuid,
    share_code: String,
    country: Country,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Rows are kept in insertion order, so iterating in reverse yields newest first.
#[derive(Default)]
struct Tables {
    users: Vec<UserSummary>,
    restaurants: Vec<RestaurantRow>,
    menu_items: Vec<MenuItem>,
    orders: Vec<OrderRow>,
    order_items: Vec<LineRow>,
    shared_carts: Vec<SharedCartRow>,
    shared_cart_items: Vec<LineRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, user: &User, name: Option<&str>) {
        self.tables().users.push(UserSummary {
            id: user.id,
            email: user.email.clone(),
            name: name.map(str::to_owned),
            role: user.role,
            country: user.country,
        });
    }

    pub fn add_restaurant(&self, name: &str, country: Country) -> Uuid {
        let id = Uuid::new_v4();
        self.tables().restaurants.push(RestaurantRow {
            id,
            name: name.to_owned(),
            country,
        });
        id
    }

    pub fn add_menu_item(&self, restaurant_id: Uuid, name: &str, price: BigDecimal) -> MenuItem {
        let item = MenuItem {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_owned(),
            price,
        };
        self.tables().menu_items.push(item.clone());
        item
    }

    pub fn order_count(&self) -> usize {
        self.tables().orders.len()
    }

    pub fn shared_cart_count(&self) -> usize {
        self.tables().shared_carts.len()
    }
}

impl Tables {
    fn user(&self, id: Uuid) -> StoreResult<UserSummary> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(StoreError::UnknownUser(id))
    }

    fn menu_item(&self, id: Uuid) -> StoreResult<MenuItem> {
        self.menu_items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| StoreError::Other(anyhow!("MenuItem {id} is not registered")))
    }

    fn order(&self, row: &OrderRow) -> StoreResult<Order> {
        let items = self
            .order_items
            .iter()
            .filter(|item| item.parent_id == row.id)
            .map(|item| {
                Ok(OrderItem {
                    id: item.id,
                    menu_item: self.menu_item(item.menu_item_id)?,
                    quantity: item.quantity,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Order {
            id: row.id,
            owner: self.user(row.user_id)?,
            status: row.status,
            items,
            total: row.total.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn shared_cart(&self, row: &SharedCartRow) -> StoreResult<SharedCart> {
        let mut items = self
            .shared_cart_items
            .iter()
            .filter(|item| item.parent_id == row.id)
            .map(|item| {
                Ok(SharedCartItem {
                    id: item.id,
                    menu_item: self.menu_item(item.menu_item_id)?,
                    quantity: item.quantity,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        items.sort_by(|a, b| a.menu_item.name.cmp(&b.menu_item.name));

        Ok(SharedCart {
            id: row.id,
            share_code: row.share_code.clone(),
            country: row.country,
            created_by: self.user(row.created_by_id)?,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn find_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<PricedMenuItem>> {
        let tables = self.tables();
        tables
            .menu_items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .map(|item| {
                let restaurant = tables
                    .restaurants
                    .iter()
                    .find(|r| r.id == item.restaurant_id)
                    .ok_or_else(|| {
                        StoreError::Other(anyhow!("Restaurant {} missing", item.restaurant_id))
                    })?;
                Ok(PricedMenuItem {
                    item: item.clone(),
                    restaurant_country: restaurant.country,
                })
            })
            .collect()
    }

    async fn list_restaurants(&self, scope: RestaurantScope) -> StoreResult<Vec<Restaurant>> {
        let RestaurantScope::Country(country) = scope;
        let tables = self.tables();

        let mut restaurants: Vec<Restaurant> = tables
            .restaurants
            .iter()
            .filter(|r| r.country == country)
            .map(|r| {
                let mut menu_items: Vec<MenuItem> = tables
                    .menu_items
                    .iter()
                    .filter(|item| item.restaurant_id == r.id)
                    .cloned()
                    .collect();
                menu_items.sort_by(|a, b| a.name.cmp(&b.name));
                Restaurant {
                    id: r.id,
                    name: r.name.clone(),
                    country: r.country,
                    menu_items,
                }
            })
            .collect();
        restaurants.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(restaurants)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut tables = self.tables();

        // Validate every reference before writing anything.
        tables.user(order.user_id)?;
        for line in &order.lines {
            tables.menu_item(line.menu_item_id)?;
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        for line in order.lines {
            tables.order_items.push(LineRow {
                id: Uuid::new_v4(),
                parent_id: order_id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            });
        }
        tables.orders.push(OrderRow {
            id: order_id,
            user_id: order.user_id,
            status: order.status,
            total: order.total,
            created_at: now,
            updated_at: now,
        });

        let row = tables.orders.last().ok_or(StoreError::NotFound("Order".into()))?;
        tables.order(row)
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let tables = self.tables();
        tables
            .orders
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.order(row))
            .transpose()
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>> {
        let tables = self.tables();
        let mut orders = Vec::new();
        for row in tables.orders.iter().rev() {
            let visible = match scope {
                OrderScope::Owner(user_id) => row.user_id == user_id,
                OrderScope::OwnerCountry(country) => tables.user(row.user_id)?.country == country,
            };
            if visible {
                orders.push(tables.order(row)?);
            }
        }
        Ok(orders)
    }

    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> StoreResult<Option<Order>> {
        let mut tables = self.tables();
        let Some(index) = tables.orders.iter().position(|row| row.id == id) else {
            return Ok(None);
        };

        let row = &mut tables.orders[index];
        if expected.is_some_and(|expected| row.status != expected) {
            return Ok(None);
        }
        row.status = status;
        row.updated_at = Utc::now();

        tables.order(&tables.orders[index]).map(Some)
    }
}

#[async_trait]
impl SharedCartStore for MemoryStore {
    async fn insert_shared_cart(&self, cart: NewSharedCart) -> StoreResult<SharedCart> {
        let mut tables = self.tables();

        if tables
            .shared_carts
            .iter()
            .any(|row| row.share_code == cart.share_code)
        {
            return Err(StoreError::Conflict("shared_carts_share_code_key".into()));
        }
        tables.user(cart.created_by_id)?;
        for line in &cart.lines {
            tables.menu_item(line.menu_item_id)?;
        }

        let now = Utc::now();
        let cart_id = Uuid::new_v4();
        for line in cart.lines {
            tables.shared_cart_items.push(LineRow {
                id: Uuid::new_v4(),
                parent_id: cart_id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            });
        }
        tables.shared_carts.push(SharedCartRow {
            id: cart_id,
            share_code: cart.share_code,
            country: cart.country,
            created_by_id: cart.created_by_id,
            created_at: now,
            updated_at: now,
        });

        let row = tables
            .shared_carts
            .last()
            .ok_or(StoreError::NotFound("Shared cart".into()))?;
        tables.shared_cart(row)
    }

    async fn find_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>> {
        let tables = self.tables();
        tables
            .shared_carts
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.shared_cart(row))
            .transpose()
    }

    async fn find_shared_cart_by_code(&self, code: &str) -> StoreResult<Option<SharedCart>> {
        let tables = self.tables();
        tables
            .shared_carts
            .iter()
            .find(|row| row.share_code == code)
            .map(|row| tables.shared_cart(row))
            .transpose()
    }

    async fn list_shared_carts(&self, scope: SharedCartScope) -> StoreResult<Vec<SharedCart>> {
        let tables = self.tables();
        tables
            .shared_carts
            .iter()
            .rev()
            .filter(|row| match scope {
                SharedCartScope::Country(country) => row.country == country,
                SharedCartScope::CreatedBy(user_id) => row.created_by_id == user_id,
            })
            .map(|row| tables.shared_cart(row))
            .collect()
    }

    async fn merge_shared_cart_items(
        &self,
        id: Uuid,
        lines: Vec<ItemLine>,
    ) -> StoreResult<SharedCart> {
        let mut tables = self.tables();

        let Some(index) = tables.shared_carts.iter().position(|row| row.id == id) else {
            return Err(StoreError::NotFound("Shared cart".into()));
        };
        for line in &lines {
            tables.menu_item(line.menu_item_id)?;
        }

        // Resolve every new quantity before touching any row, so a rejected line leaves the
        // cart as it was.
        let mut updates: Vec<(Option<usize>, ItemLine)> = Vec::with_capacity(lines.len());
        for line in lines {
            let existing = tables
                .shared_cart_items
                .iter()
                .position(|item| item.parent_id == id && item.menu_item_id == line.menu_item_id);
            let current = existing.map_or(0, |i| tables.shared_cart_items[i].quantity);
            let quantity = current
                .checked_add(line.quantity)
                .filter(|quantity| *quantity <= MAX_LINE_QUANTITY)
                .ok_or_else(|| {
                    StoreError::Invalid(format!(
                        "quantity for menu item {} would exceed {MAX_LINE_QUANTITY}",
                        line.menu_item_id
                    ))
                })?;
            updates.push((existing, ItemLine::new(line.menu_item_id, quantity)));
        }

        for (existing, line) in updates {
            match existing {
                Some(i) => tables.shared_cart_items[i].quantity = line.quantity,
                None => tables.shared_cart_items.push(LineRow {
                    id: Uuid::new_v4(),
                    parent_id: id,
                    menu_item_id: line.menu_item_id,
                    quantity: line.quantity,
                }),
            }
        }
        tables.shared_carts[index].updated_at = Utc::now();

        tables.shared_cart(&tables.shared_carts[index])
    }

    async fn delete_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>> {
        let mut tables = self.tables();

        let Some(index) = tables.shared_carts.iter().position(|row| row.id == id) else {
            return Ok(None);
        };
        let cart = tables.shared_cart(&tables.shared_carts[index])?;

        tables.shared_carts.remove(index);
        tables.shared_cart_items.retain(|item| item.parent_id != id);

        Ok(Some(cart))
    }
}
