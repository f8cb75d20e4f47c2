use crate::{
    app_error::AppError,
    domain::user::{Role, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateOrder,
    ViewOwnOrders,
    ViewAllOrdersInCountry,
    CheckoutOrder,
    CancelOrder,
    CreateRestaurant,
    CreatePaymentMethod,
    ViewPaymentMethods,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::CreateOrder,
        Action::ViewOwnOrders,
        Action::ViewAllOrdersInCountry,
        Action::CheckoutOrder,
        Action::CancelOrder,
        Action::CreateRestaurant,
        Action::CreatePaymentMethod,
        Action::ViewPaymentMethods,
    ];

    fn describe(&self) -> &'static str {
        match self {
            Action::CreateOrder => "create orders",
            Action::ViewOwnOrders => "view orders",
            Action::ViewAllOrdersInCountry => "view all orders in the country",
            Action::CheckoutOrder => "checkout orders",
            Action::CancelOrder => "cancel orders",
            Action::CreateRestaurant => "create restaurants",
            Action::CreatePaymentMethod => "create payment methods",
            Action::ViewPaymentMethods => "view payment methods",
        }
    }
}

/// The permission matrix.
pub fn is_allowed(role: Role, action: Action) -> bool {
    use Action::*;
    use Role::*;

    match (role, action) {
        (_, CreateOrder | ViewOwnOrders) => true,
        (Admin | Manager, ViewAllOrdersInCountry | CheckoutOrder | CancelOrder) => true,
        (Admin | Manager, CreateRestaurant) => true,
        (Admin, CreatePaymentMethod | ViewPaymentMethods) => true,
        _ => false,
    }
}

pub fn ensure_allowed(user: &User, action: Action) -> Result<(), AppError> {
    if is_allowed(user.role, action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role {} is not allowed to {}",
            user.role,
            action.describe()
        )))
    }
}
