use uuid::Uuid;

use super::policy::{Action, is_allowed};
use crate::domain::user::{Country, User};

/// Rows of `orders` a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// `orders.user_id = id`
    Owner(Uuid),
    /// `users.country = country`, joined through the order owner.
    OwnerCountry(Country),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantScope {
    Country(Country),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedCartScope {
    Country(Country),
    CreatedBy(Uuid),
}

impl OrderScope {
    pub fn for_user(user: &User) -> Self {
        if is_allowed(user.role, Action::ViewAllOrdersInCountry) {
            OrderScope::OwnerCountry(user.country)
        } else {
            OrderScope::Owner(user.id)
        }
    }
}

impl RestaurantScope {
    pub fn for_user(user: &User) -> Self {
        RestaurantScope::Country(user.country)
    }
}

impl SharedCartScope {
    pub fn for_user(user: &User) -> Self {
        SharedCartScope::Country(user.country)
    }

    pub fn created_by(user_id: Uuid) -> Self {
        SharedCartScope::CreatedBy(user_id)
    }
}
