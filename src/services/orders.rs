use std::{collections::HashMap, sync::Arc};

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::{distinct_menu_item_ids, validate_lines};
use crate::{
    app_error::AppError,
    authz::{Action, OrderScope, ensure_allowed},
    domain::{
        ItemLine,
        order::{NewOrder, Order, OrderStatus, max_order_total},
        user::User,
    },
    store::Store,
};

/// Order creation, listing and status transitions.
#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn Store>,
    strict_transitions: bool,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            strict_transitions: false,
        }
    }

    /// When enabled, checkout/cancel only apply to PENDING orders and anything else is a
    /// [`AppError::Conflict`]. Disabled by default: transitions overwrite whatever status the
    /// order has.
    pub fn with_strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }

    /// Prices every line from the menu and persists the order as PENDING. Nothing is written
    /// unless every line resolves to a menu item in the caller's country.
    pub async fn create_order(&self, user: &User, items: Vec<ItemLine>) -> Result<Order, AppError> {
        ensure_allowed(user, Action::CreateOrder)?;
        validate_lines(&items)?;

        let menu_item_ids = distinct_menu_item_ids(&items);
        let menu_items: HashMap<Uuid, _> = self
            .store
            .find_menu_items(&menu_item_ids)
            .await?
            .into_iter()
            .map(|priced| (priced.item.id, priced))
            .collect();

        let mut total = BigDecimal::from(0);
        for line in &items {
            let priced = menu_items.get(&line.menu_item_id).ok_or_else(|| {
                AppError::NotFound(format!("MenuItem {} not found", line.menu_item_id))
            })?;

            if priced.restaurant_country != user.country {
                return Err(AppError::Forbidden(
                    "Cannot order from restaurant in different country".into(),
                ));
            }

            total += &priced.item.price * BigDecimal::from(line.quantity);
        }

        if total > max_order_total() {
            return Err(AppError::BadRequest(format!(
                "Order total {total} exceeds the maximum of {}",
                max_order_total()
            )));
        }

        let order = self
            .store
            .insert_order(NewOrder {
                user_id: user.id,
                status: OrderStatus::Pending,
                total,
                lines: items,
            })
            .await?;

        Ok(order)
    }

    pub async fn list_orders(&self, user: &User) -> Result<Vec<Order>, AppError> {
        ensure_allowed(user, Action::ViewOwnOrders)?;
        let orders = self.store.list_orders(OrderScope::for_user(user)).await?;
        Ok(orders)
    }

    pub async fn checkout(&self, order_id: Uuid, user: &User) -> Result<Order, AppError> {
        self.transition(order_id, user, Action::CheckoutOrder, OrderStatus::Paid)
            .await
    }

    pub async fn cancel(&self, order_id: Uuid, user: &User) -> Result<Order, AppError> {
        self.transition(order_id, user, Action::CancelOrder, OrderStatus::Cancelled)
            .await
    }

    async fn transition(
        &self,
        order_id: Uuid,
        user: &User,
        action: Action,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        ensure_allowed(user, action)?;

        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

        if order.owner.country != user.country {
            return Err(AppError::Forbidden(
                "Cannot manage order from another country".into(),
            ));
        }

        let expected = if self.strict_transitions {
            if order.status.is_terminal() {
                return Err(AppError::Conflict(format!(
                    "Order is already {}",
                    order.status
                )));
            }
            Some(order.status)
        } else {
            None
        };

        self.store
            .set_order_status(order_id, status, expected)
            .await?
            .ok_or_else(|| {
                if self.strict_transitions {
                    AppError::Conflict("Order status changed concurrently".into())
                } else {
                    AppError::NotFound("Order not found".into())
                }
            })
    }
}
