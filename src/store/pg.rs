//! PostgreSQL store on top of diesel-async.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::{
    ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper,
    result::{DatabaseErrorKind, Error as DieselError},
    upsert::excluded,
};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{MenuStore, OrderStore, SharedCartStore, StoreError, StoreResult};
use crate::{
    authz::{OrderScope, RestaurantScope, SharedCartScope},
    db::DbPool,
    domain::{
        ItemLine,
        menu::{MenuItem, PricedMenuItem, Restaurant},
        order::{NewOrder, Order, OrderItem, OrderStatus},
        shared_cart::{NewSharedCart, SharedCart, SharedCartItem},
    },
    models::{
        CreateOrderEntity, CreateOrderItemEntity, CreateSharedCartEntity,
        CreateSharedCartItemEntity, MenuItemEntity, OrderEntity, OrderItemEntity,
        RestaurantEntity, SharedCartEntity, SharedCartItemEntity, UserEntity,
    },
    schema::{menu_items, order_items, orders, restaurants, shared_cart_items, shared_carts, users},
};

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound("Record".into()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(
                    info.constraint_name()
                        .unwrap_or("Unique value")
                        .to_string(),
                )
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                StoreError::Invalid(
                    info.constraint_name()
                        .unwrap_or("Value out of range")
                        .to_string(),
                )
            }
            other => StoreError::Other(other.into()),
        }
    }
}

/// The only foreign key on `orders` and `shared_carts` rows points at `users`.
fn unknown_user(user_id: Uuid) -> impl FnOnce(DieselError) -> StoreError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            StoreError::UnknownUser(user_id)
        }
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// Orders

async fn hydrate_orders(
    conn: &mut AsyncPgConnection,
    rows: Vec<(OrderEntity, UserEntity)>,
) -> StoreResult<Vec<Order>> {
    let order_ids: Vec<Uuid> = rows.iter().map(|(order, _)| order.id).collect();

    let order_items: Vec<(OrderItemEntity, MenuItemEntity)> = order_items::table
        .inner_join(menu_items::table)
        .filter(order_items::order_id.eq_any(&order_ids))
        .order_by((order_items::order_id, order_items::position))
        .select((OrderItemEntity::as_select(), MenuItemEntity::as_select()))
        .load(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for (item, menu_item) in order_items {
        group.entry(item.order_id).or_default().push(OrderItem {
            id: item.id,
            menu_item: menu_item.into(),
            quantity: item.quantity,
        });
    }

    let orders = rows
        .into_iter()
        .map(|(order, owner)| {
            Ok(Order {
                items: group.remove(&order.id).unwrap_or_default(),
                id: order.id,
                owner: owner.into_summary()?,
                status: order.status.parse()?,
                total: order.total,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(orders)
}

async fn load_order(conn: &mut AsyncPgConnection, id: Uuid) -> StoreResult<Option<Order>> {
    let row: Option<(OrderEntity, UserEntity)> = orders::table
        .inner_join(users::table)
        .filter(orders::id.eq(id))
        .select((OrderEntity::as_select(), UserEntity::as_select()))
        .first(conn)
        .await
        .optional()
        .context("Failed to get order")?;

    match row {
        Some(row) => Ok(hydrate_orders(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

// Shared carts

async fn hydrate_shared_carts(
    conn: &mut AsyncPgConnection,
    rows: Vec<(SharedCartEntity, UserEntity)>,
) -> StoreResult<Vec<SharedCart>> {
    let cart_ids: Vec<Uuid> = rows.iter().map(|(cart, _)| cart.id).collect();

    let cart_items: Vec<(SharedCartItemEntity, MenuItemEntity)> = shared_cart_items::table
        .inner_join(menu_items::table)
        .filter(shared_cart_items::shared_cart_id.eq_any(&cart_ids))
        .order_by((shared_cart_items::shared_cart_id, menu_items::name))
        .select((SharedCartItemEntity::as_select(), MenuItemEntity::as_select()))
        .load(conn)
        .await
        .context("Failed to get shared cart items")?;

    let mut group: HashMap<Uuid, Vec<SharedCartItem>> = HashMap::new();
    for (item, menu_item) in cart_items {
        group
            .entry(item.shared_cart_id)
            .or_default()
            .push(SharedCartItem {
                id: item.id,
                menu_item: menu_item.into(),
                quantity: item.quantity,
            });
    }

    let carts = rows
        .into_iter()
        .map(|(cart, creator)| {
            Ok(SharedCart {
                items: group.remove(&cart.id).unwrap_or_default(),
                id: cart.id,
                share_code: cart.share_code,
                country: cart.country.parse()?,
                created_by: creator.into_summary()?,
                created_at: cart.created_at,
                updated_at: cart.updated_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(carts)
}

async fn load_shared_cart(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> StoreResult<Option<SharedCart>> {
    let row: Option<(SharedCartEntity, UserEntity)> = shared_carts::table
        .inner_join(users::table)
        .filter(shared_carts::id.eq(id))
        .select((SharedCartEntity::as_select(), UserEntity::as_select()))
        .first(conn)
        .await
        .optional()
        .context("Failed to get shared cart")?;

    match row {
        Some(row) => Ok(hydrate_shared_carts(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

impl PgStore {
    async fn conn(
        &self,
    ) -> Result<diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>>
    {
        self.pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")
    }
}

#[async_trait]
impl MenuStore for PgStore {
    async fn find_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<PricedMenuItem>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let rows: Vec<(MenuItemEntity, String)> = menu_items::table
            .inner_join(restaurants::table)
            .filter(menu_items::id.eq_any(ids))
            .select((MenuItemEntity::as_select(), restaurants::country))
            .load(conn)
            .await
            .context("Failed to get menu items")?;

        let items = rows
            .into_iter()
            .map(|(item, country)| {
                Ok(PricedMenuItem {
                    item: item.into(),
                    restaurant_country: country.parse()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(items)
    }

    async fn list_restaurants(&self, scope: RestaurantScope) -> StoreResult<Vec<Restaurant>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let RestaurantScope::Country(country) = scope;
        let restaurants: Vec<RestaurantEntity> = restaurants::table
            .filter(restaurants::country.eq(country.as_str()))
            .order_by(restaurants::name)
            .select(RestaurantEntity::as_select())
            .load(conn)
            .await
            .context("Failed to get restaurants")?;

        let restaurant_ids: Vec<Uuid> = restaurants.iter().map(|r| r.id).collect();
        let menu_items: Vec<MenuItemEntity> = menu_items::table
            .filter(menu_items::restaurant_id.eq_any(&restaurant_ids))
            .order_by(menu_items::name)
            .select(MenuItemEntity::as_select())
            .load(conn)
            .await
            .context("Failed to get menu items")?;

        let mut group: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
        for item in menu_items {
            group.entry(item.restaurant_id).or_default().push(item.into());
        }

        let restaurants = restaurants
            .into_iter()
            .map(|restaurant| {
                Ok(Restaurant {
                    menu_items: group.remove(&restaurant.id).unwrap_or_default(),
                    id: restaurant.id,
                    name: restaurant.name,
                    country: restaurant.country.parse()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(restaurants)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let order_id = Uuid::new_v4();

                diesel::insert_into(orders::table)
                    .values(CreateOrderEntity {
                        id: order_id,
                        user_id: order.user_id,
                        status: order.status.as_str().into(),
                        total: order.total,
                    })
                    .execute(conn)
                    .await
                    .map_err(unknown_user(order.user_id))?;

                let order_items: Vec<CreateOrderItemEntity> = order
                    .lines
                    .into_iter()
                    .zip(0..)
                    .map(|(line, position)| CreateOrderItemEntity {
                        id: Uuid::new_v4(),
                        order_id,
                        menu_item_id: line.menu_item_id,
                        quantity: line.quantity,
                        position,
                    })
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(order_items)
                    .execute(conn)
                    .await?;

                load_order(conn, order_id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound("Order".into()))
            })
        })
        .await
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let mut pooled = self.conn().await?;
        load_order(&mut pooled, id).await
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let query = orders::table
            .inner_join(users::table)
            .select((OrderEntity::as_select(), UserEntity::as_select()))
            .order_by(orders::created_at.desc())
            .into_boxed();

        let query = match scope {
            OrderScope::Owner(user_id) => query.filter(orders::user_id.eq(user_id)),
            OrderScope::OwnerCountry(country) => {
                query.filter(users::country.eq(country.as_str()))
            }
        };

        let rows: Vec<(OrderEntity, UserEntity)> = query
            .load(conn)
            .await
            .context("Failed to get orders")?;

        hydrate_orders(conn, rows).await
    }

    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> StoreResult<Option<Order>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let changes = (
            orders::status.eq(status.as_str()),
            orders::updated_at.eq(diesel::dsl::now),
        );

        let updated: Option<Uuid> = match expected {
            Some(expected) => diesel::update(
                orders::table
                    .find(id)
                    .filter(orders::status.eq(expected.as_str())),
            )
            .set(changes)
            .returning(orders::id)
            .get_result(conn)
            .await
            .optional()?,
            None => diesel::update(orders::table.find(id))
                .set(changes)
                .returning(orders::id)
                .get_result(conn)
                .await
                .optional()?,
        };

        match updated {
            Some(id) => load_order(conn, id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SharedCartStore for PgStore {
    async fn insert_shared_cart(&self, cart: NewSharedCart) -> StoreResult<SharedCart> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let cart_id = Uuid::new_v4();

                diesel::insert_into(shared_carts::table)
                    .values(CreateSharedCartEntity {
                        id: cart_id,
                        share_code: cart.share_code,
                        country: cart.country.as_str().into(),
                        created_by_id: cart.created_by_id,
                    })
                    .execute(conn)
                    .await
                    .map_err(unknown_user(cart.created_by_id))?;

                let cart_items: Vec<CreateSharedCartItemEntity> = cart
                    .lines
                    .into_iter()
                    .map(|line| CreateSharedCartItemEntity {
                        id: Uuid::new_v4(),
                        shared_cart_id: cart_id,
                        menu_item_id: line.menu_item_id,
                        quantity: line.quantity,
                    })
                    .collect();

                diesel::insert_into(shared_cart_items::table)
                    .values(cart_items)
                    .execute(conn)
                    .await?;

                load_shared_cart(conn, cart_id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound("Shared cart".into()))
            })
        })
        .await
    }

    async fn find_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>> {
        let mut pooled = self.conn().await?;
        load_shared_cart(&mut pooled, id).await
    }

    async fn find_shared_cart_by_code(&self, code: &str) -> StoreResult<Option<SharedCart>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let row: Option<(SharedCartEntity, UserEntity)> = shared_carts::table
            .inner_join(users::table)
            .filter(shared_carts::share_code.eq(code))
            .select((SharedCartEntity::as_select(), UserEntity::as_select()))
            .first(conn)
            .await
            .optional()
            .context("Failed to get shared cart by code")?;

        match row {
            Some(row) => Ok(hydrate_shared_carts(conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_shared_carts(&self, scope: SharedCartScope) -> StoreResult<Vec<SharedCart>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let query = shared_carts::table
            .inner_join(users::table)
            .select((SharedCartEntity::as_select(), UserEntity::as_select()))
            .order_by(shared_carts::created_at.desc())
            .into_boxed();

        let query = match scope {
            SharedCartScope::Country(country) => {
                query.filter(shared_carts::country.eq(country.as_str()))
            }
            SharedCartScope::CreatedBy(user_id) => {
                query.filter(shared_carts::created_by_id.eq(user_id))
            }
        };

        let rows: Vec<(SharedCartEntity, UserEntity)> = query
            .load(conn)
            .await
            .context("Failed to get shared carts")?;

        hydrate_shared_carts(conn, rows).await
    }

    async fn merge_shared_cart_items(
        &self,
        id: Uuid,
        lines: Vec<ItemLine>,
    ) -> StoreResult<SharedCart> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(move |conn| {
            Box::pin(async move {
                // Lock the cart row so a concurrent delete cannot interleave with the merge.
                shared_carts::table
                    .find(id)
                    .select(shared_carts::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await
                    .map_err(|err| match err {
                        DieselError::NotFound => StoreError::NotFound("Shared cart".into()),
                        other => other.into(),
                    })?;

                for line in lines {
                    diesel::insert_into(shared_cart_items::table)
                        .values(CreateSharedCartItemEntity {
                            id: Uuid::new_v4(),
                            shared_cart_id: id,
                            menu_item_id: line.menu_item_id,
                            quantity: line.quantity,
                        })
                        .on_conflict((
                            shared_cart_items::shared_cart_id,
                            shared_cart_items::menu_item_id,
                        ))
                        .do_update()
                        .set(
                            shared_cart_items::quantity
                                .eq(shared_cart_items::quantity
                                    + excluded(shared_cart_items::quantity)),
                        )
                        .execute(conn)
                        .await?;
                }

                diesel::update(shared_carts::table.find(id))
                    .set(shared_carts::updated_at.eq(diesel::dsl::now))
                    .execute(conn)
                    .await?;

                load_shared_cart(conn, id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound("Shared cart".into()))
            })
        })
        .await
    }

    async fn delete_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>> {
        let mut pooled = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let Some(cart) = load_shared_cart(conn, id).await? else {
                    return Ok(None);
                };

                diesel::delete(shared_carts::table.find(id))
                    .execute(conn)
                    .await?;

                Ok::<Option<SharedCart>, StoreError>(Some(cart))
            })
        })
        .await
    }
}
