//! Persistence seam.
//!
//! The services only see these traits. [`pg::PgStore`] is the production implementation on top of
//! diesel-async; [`memory::MemoryStore`] keeps everything behind one mutex and is what the tests
//! run against. Both must give the same atomicity guarantees: order and cart creation persist
//! everything or nothing, share codes are unique, and item merges never lose an increment.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    authz::{OrderScope, RestaurantScope, SharedCartScope},
    domain::{
        ItemLine,
        menu::{PricedMenuItem, Restaurant},
        order::{NewOrder, Order, OrderStatus},
        shared_cart::{NewSharedCart, SharedCart},
    },
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(String),

    /// A value constraint rejected the write, e.g. an accumulated quantity above the cap.
    #[error("Invalid value: {0}")]
    Invalid(String),

    /// The acting user has no local `users` row.
    #[error("User {0} is not provisioned")]
    UnknownUser(Uuid),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only view of restaurants and their authoritative prices.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Returns the items that exist; unknown ids are simply absent from the result.
    async fn find_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<PricedMenuItem>>;

    async fn list_restaurants(&self, scope: RestaurantScope) -> StoreResult<Vec<Restaurant>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order>;

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>>;

    /// Newest first.
    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>>;

    /// Sets `status`. When `expected` is given the write only happens if the current status
    /// matches it; `Ok(None)` means the order is missing or the status did not match.
    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> StoreResult<Option<Order>>;
}

#[async_trait]
pub trait SharedCartStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the share code is already taken.
    async fn insert_shared_cart(&self, cart: NewSharedCart) -> StoreResult<SharedCart>;

    async fn find_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>>;

    async fn find_shared_cart_by_code(&self, code: &str) -> StoreResult<Option<SharedCart>>;

    /// Newest first.
    async fn list_shared_carts(&self, scope: SharedCartScope) -> StoreResult<Vec<SharedCart>>;

    /// Adds each line's quantity to the existing row for that menu item, or inserts a new row.
    /// All lines are applied atomically.
    async fn merge_shared_cart_items(
        &self,
        id: Uuid,
        lines: Vec<ItemLine>,
    ) -> StoreResult<SharedCart>;

    async fn delete_shared_cart(&self, id: Uuid) -> StoreResult<Option<SharedCart>>;
}

pub trait Store: MenuStore + OrderStore + SharedCartStore {}

impl<T: MenuStore + OrderStore + SharedCartStore> Store for T {}
